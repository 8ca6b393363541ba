//! Wire sizes and field offsets.
//!
//! Every packet is exactly [`PACKET_SIZE`] bytes, chosen to fit the IPv4
//! minimum path MTU after IPv4 and UDP headers. All other sizes follow
//! from that budget; none of them is tunable without breaking the wire
//! format.

/// Total wire length of every sealed packet.
pub const PACKET_SIZE: usize = 504;

/// AEAD authentication tag length.
pub const AUTH_TAG_LEN: usize = 16;

/// Message id length (48-bit big-endian counter).
pub const MSG_ID_LEN: usize = 6;

/// Message id hash length (public per-packet identifier).
pub const MSG_ID_HASH_LEN: usize = 6;

/// Message hash length (reference to a prior packet).
pub const MSG_HASH_LEN: usize = 16;

/// Channel id length. Also the AEAD key.
pub const CHANNEL_ID_LEN: usize = 32;

/// Ed25519 public key length.
pub const ED_PUB_LEN: usize = 32;

/// Ed25519 signature length.
pub const ED_SIG_LEN: usize = 64;

/// Plaintext envelope length: the packet minus id hash and tag.
pub const ENVELOPE_SIZE: usize = PACKET_SIZE - MSG_ID_HASH_LEN - AUTH_TAG_LEN;

/// Length of an intra-channel reference (`message id || message hash`).
pub const REFERENCE_LEN: usize = MSG_ID_LEN + MSG_HASH_LEN;

/// Length of the packed envelope header.
pub const HEADER_LEN: usize = 2;

/// Bytes of the envelope shared between the reply list and the payload.
pub const VARYING_SPACE: usize =
    ENVELOPE_SIZE - HEADER_LEN - REFERENCE_LEN - MSG_HASH_LEN - ED_SIG_LEN;

/// Length of the signed prefix of an envelope (everything before the
/// signature field).
pub const SIGNED_LEN: usize = ENVELOPE_SIZE - ED_SIG_LEN;

const _: () = assert!(ENVELOPE_SIZE == 482);
const _: () = assert!(VARYING_SPACE == 378);
const _: () = assert!(SIGNED_LEN == 418);
