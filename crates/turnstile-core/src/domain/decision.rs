//! Decision vocabulary shared by the authority and the client.
//!
//! A door either opens or it does not, so the wire-level answer is the
//! two-valued [`Decision`].  The authority additionally knows *why* it
//! denied a badge; [`Verdict`] carries that reason for logging and the
//! operator console, and collapses to a plain [`Decision`] before
//! anything is sent to a reader.

use std::fmt;

/// The two possible answers to a badge check.
///
/// `Display` renders the exact wire words `ALLOW` and `DENY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Open the door.
    Allow,
    /// Keep the door shut.
    Deny,
}

impl Decision {
    /// The literal token sent over the wire for this decision.
    pub fn wire_word(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Deny => "DENY",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_word())
    }
}

/// Why the authority denied a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The lock window covers the current time; membership was not even
    /// consulted.
    LockWindowActive,
    /// The badge is not in the authorized roster.
    NotAuthorized,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DenyReason::LockWindowActive => "lock window active",
            DenyReason::NotAuthorized => "badge not authorized",
        };
        f.write_str(text)
    }
}

/// An authority-side decision together with its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Access granted.
    Allow,
    /// Access denied, with the reason recorded for the audit log.
    Deny(DenyReason),
}

impl Verdict {
    /// Collapses the verdict to the wire-level decision.
    pub fn decision(&self) -> Decision {
        match self {
            Verdict::Allow => Decision::Allow,
            Verdict::Deny(_) => Decision::Deny,
        }
    }

    /// The deny reason, if this verdict is a denial.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Verdict::Allow => None,
            Verdict::Deny(reason) => Some(*reason),
        }
    }
}
