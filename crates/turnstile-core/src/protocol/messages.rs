//! Message types exchanged between a reader client and the authority.
//!
//! The protocol has exactly one request shape (the raw badge ID) and the
//! three reply shapes below.  Requests carry no envelope at all, so the
//! only typed message is the authority's reply.

use crate::domain::badge::BadgeId;
use crate::domain::decision::Decision;

/// A message sent by the authority to a reader client.
///
/// `Allow` and `Deny` answer one badge request.  `UpdateList` is a push
/// that replaces the reader's cached roster wholesale; it is *not* an
/// answer to any badge, and a reader that receives one mid-request keeps
/// waiting for the real decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityReply {
    /// The badge is authorized right now.
    Allow,
    /// The badge is not authorized right now.
    Deny,
    /// Replace the cached roster with exactly these badges.
    UpdateList(Vec<BadgeId>),
}

impl AuthorityReply {
    /// A short name for this reply, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthorityReply::Allow => "ALLOW",
            AuthorityReply::Deny => "DENY",
            AuthorityReply::UpdateList(_) => "UPDATE_LIST",
        }
    }

    /// Whether this reply settles a pending badge request.
    pub fn is_decision(&self) -> bool {
        !matches!(self, AuthorityReply::UpdateList(_))
    }
}

impl From<Decision> for AuthorityReply {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => AuthorityReply::Allow,
            Decision::Deny => AuthorityReply::Deny,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_kind_names() {
        assert_eq!(AuthorityReply::Allow.kind(), "ALLOW");
        assert_eq!(AuthorityReply::Deny.kind(), "DENY");
        assert_eq!(AuthorityReply::UpdateList(Vec::new()).kind(), "UPDATE_LIST");
    }

    #[test]
    fn test_only_allow_and_deny_are_decisions() {
        assert!(AuthorityReply::Allow.is_decision());
        assert!(AuthorityReply::Deny.is_decision());
        assert!(!AuthorityReply::UpdateList(Vec::new()).is_decision());
    }

    #[test]
    fn test_decision_converts_to_matching_reply() {
        assert_eq!(AuthorityReply::from(Decision::Allow), AuthorityReply::Allow);
        assert_eq!(AuthorityReply::from(Decision::Deny), AuthorityReply::Deny);
    }
}
