//! # ostra-protocol
//!
//! Wire format for the ostra channel messaging protocol.
//!
//! Every on-wire unit is a fixed 504-byte packet, sized to fit the IPv4
//! minimum path MTU after IPv4 and UDP headers. A packet seals an
//! [`Envelope`] — a signed record carrying payload and references to
//! earlier messages in the channel — under a channel-scoped AEAD keyed
//! by the [`ChannelId`], with the per-sender [`MessageId`] counter as
//! nonce.
//!
//! This crate defines what a message *is* and how it is constructed,
//! verified, and parsed. Transport, channel-id distribution, storage,
//! relaying, and payload schemas live elsewhere.
//!
//! ## Sending
//!
//! ```no_run
//! use ostra_crypto::SigningKeyPair;
//! use ostra_protocol::{
//!     ChannelId, Envelope, IntraChannelReference, Message, MessageHash, MessageId,
//! };
//!
//! # fn main() -> Result<(), ostra_protocol::ProtocolError> {
//! let channel = ChannelId::generate();
//! let keypair = SigningKeyPair::generate();
//! let own_id = MessageId::new(3);
//!
//! let mut envelope = Envelope::init(
//!     &IntraChannelReference::default(),
//!     &MessageHash::from_bytes(*b"previous-msg-hsh"),
//! );
//! envelope.add_in_reply_to(own_id, &IntraChannelReference::default())?;
//! envelope.payload_slice()[..5].copy_from_slice(b"hello");
//! envelope.sign(&keypair);
//!
//! let message = Message::init(&channel, own_id, &envelope)?;
//! let wire: &[u8; 504] = message.as_bytes();
//! # let _ = wire;
//! # Ok(())
//! # }
//! ```
//!
//! ## Receiving
//!
//! Compute the anticipated id hash with [`Message::matches`], then
//! [`Message::decrypt`], then [`Envelope::verify`] — or run the full
//! capability check through [`Authorization::authorizes`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod authorization;
pub mod envelope;
pub mod error;
pub mod ids;
pub mod limits;
pub mod message;
pub mod varint;

pub use authorization::{write_capability, Authorization, Condition};
pub use envelope::{Envelope, PayloadType, ReplyToIter};
pub use error::{ProtocolError, Result};
pub use ids::{ChannelId, IntraChannelReference, MessageHash, MessageId, MessageIdHash};
pub use limits::{ENVELOPE_SIZE, PACKET_SIZE};
pub use message::Message;

#[cfg(test)]
mod proptests;
