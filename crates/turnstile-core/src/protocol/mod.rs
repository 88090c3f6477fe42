//! Protocol module containing the reply types and the plain-text codec.

pub mod codec;
pub mod messages;

pub use codec::{
    decode_reply, decode_request, encode_reply, encode_request, ProtocolError, MAX_MESSAGE_BYTES,
};
pub use messages::AuthorityReply;
