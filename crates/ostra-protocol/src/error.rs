//! Error types for protocol operations.

use thiserror::Error;

use crate::ids::MessageId;

/// Errors that can occur while building, parsing, or checking packets.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Adding a reply entry would exceed the variable region.
    #[error("no space for reply entry: {needed} bytes needed, {available} available")]
    NoSpace {
        /// Bytes the insertion would consume.
        needed: usize,
        /// Bytes still free in the variable region.
        available: usize,
    },

    /// The envelope signature did not authenticate the envelope bytes.
    #[error("signature verification failed")]
    SignatureVerification,

    /// The AEAD tag did not authenticate the ciphertext. Also raised
    /// when the channel id or message id used for decryption does not
    /// match the ones the packet was sealed under.
    #[error("authentication failed: AEAD tag rejected")]
    AuthenticationFailed,

    /// A capability carried non-zero bytes after its condition list.
    #[error("capability padding contains non-zero bytes")]
    InvalidPadding,

    /// A varint has an impossible prefix or encodes more than 48 bits.
    #[error("malformed varint")]
    MalformedVarint,

    /// A varint claims more bytes than the input holds.
    #[error("truncated varint")]
    TruncatedVarint,

    /// A reply entry's hash extends past the end of the reply list.
    #[error("truncated reply list")]
    TruncatedReplyList,

    /// Cumulative reply deltas exceed the envelope's own id.
    #[error("reply id underflow: deltas exceed the base id")]
    ReplyIdUnderflow,

    /// A reply entry's id is not below the envelope's own id.
    #[error("reply id {entry} is not less than the envelope id {own}")]
    ReplyIdOutOfOrder {
        /// Id of the rejected entry.
        entry: MessageId,
        /// Id of the envelope being edited.
        own: MessageId,
    },

    /// A reply entry with this id is already present.
    #[error("duplicate reply id {0}")]
    DuplicateReplyId(MessageId),

    /// A capability payload is too short to hold a public key.
    #[error("capability too short to hold a public key")]
    CapabilityTooShort,

    /// The condition list is not valid JSON, or names an unknown tag.
    #[error("malformed condition list: {0}")]
    ConditionParse(String),

    /// A condition value does not fit in 48 bits.
    #[error("condition value exceeds 48 bits")]
    ConditionOutOfRange,

    /// The header's payload type field holds the reserved value.
    #[error("reserved payload type {0}")]
    InvalidPayloadType(u8),

    /// The header's padding bits are non-zero.
    #[error("header padding bits are non-zero")]
    InvalidHeaderPadding,

    /// A fixed-size field or buffer has the wrong length.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },

    /// An underlying cryptographic operation failed.
    #[error("cryptographic error: {0}")]
    Crypto(#[from] ostra_crypto::CryptoError),
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
