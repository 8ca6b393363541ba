//! Capability parsing and the authorization check.
//!
//! A capability is an envelope whose payload region carries:
//!
//! ```text
//! [0..32]   Ed25519 public key
//! [32..k]   JSON array of condition objects
//! [k..end]  zero padding
//! ```
//!
//! [`Authorization`] is a borrowed view over such a payload plus the id
//! of the message that delivered it. [`Authorization::authorizes`]
//! decides whether a candidate envelope was signed by the capability's
//! key and satisfies every condition.
//!
//! The JSON surface is one object per condition, `{"<tag>": <value>}`.
//! Unknown tags are a parse error, not a soft failure: a capability
//! naming a condition this implementation cannot evaluate must not
//! authorize anything. The parser consumes exactly one JSON value and
//! requires every byte after it to be zero, so no instruction can hide
//! behind the condition list.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ostra_crypto::PublicKey;

use crate::envelope::Envelope;
use crate::error::{ProtocolError, Result};
use crate::ids::MessageId;
use crate::limits::ED_PUB_LEN;
use crate::varint;

/// A predicate attached to a capability.
///
/// Closed set; the JSON parser rejects tags not listed here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// The capability authorizes ids up to `ttl` past the id of the
    /// message that minted it, inclusive.
    #[serde(rename = "ttl")]
    Ttl(u64),
}

impl Condition {
    /// Evaluate this condition against a candidate message id.
    pub fn check(&self, capability_id: MessageId, candidate_id: MessageId) -> bool {
        match self {
            Condition::Ttl(ttl) => {
                candidate_id.as_u64() <= capability_id.as_u64().saturating_add(*ttl)
            }
        }
    }
}

/// A borrowed view of a capability payload.
///
/// `bytes` is the payload region of the capability envelope;
/// `message_id` is the id of the message that delivered it (the
/// reference point for [`Condition::Ttl`]).
#[derive(Clone, Copy, Debug)]
pub struct Authorization<'a> {
    bytes: &'a [u8],
    message_id: MessageId,
}

impl<'a> Authorization<'a> {
    /// Create a view over a capability payload.
    pub fn new(bytes: &'a [u8], message_id: MessageId) -> Self {
        Self { bytes, message_id }
    }

    /// View the payload of a decrypted capability envelope.
    pub fn from_envelope(envelope: &'a Envelope, message_id: MessageId) -> Self {
        Self::new(envelope.payload(), message_id)
    }

    /// Id of the message that delivered this capability.
    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    /// The capability's Ed25519 public key.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityTooShort` if the payload cannot hold a key.
    pub fn public_key(&self) -> Result<PublicKey> {
        if self.bytes.len() < ED_PUB_LEN {
            return Err(ProtocolError::CapabilityTooShort);
        }
        Ok(PublicKey::from_bytes(&self.bytes[..ED_PUB_LEN])?)
    }

    /// Parse the condition list and validate the trailing padding.
    ///
    /// # Errors
    ///
    /// - `CapabilityTooShort` if the payload cannot hold a key
    /// - `ConditionParse` for malformed JSON or an unknown tag
    /// - `ConditionOutOfRange` for a value that does not fit in 48 bits
    /// - `InvalidPadding` if any byte after the JSON value is non-zero
    pub fn conditions(&self) -> Result<Vec<Condition>> {
        if self.bytes.len() < ED_PUB_LEN {
            return Err(ProtocolError::CapabilityTooShort);
        }
        let rest = &self.bytes[ED_PUB_LEN..];

        // Consume exactly one JSON value; trailing bytes are the
        // padding region, checked below.
        let mut stream = serde_json::Deserializer::from_slice(rest).into_iter::<Vec<Condition>>();
        let conditions = match stream.next() {
            Some(Ok(conditions)) => conditions,
            Some(Err(error)) => return Err(ProtocolError::ConditionParse(error.to_string())),
            None => return Err(ProtocolError::ConditionParse("missing condition list".into())),
        };
        let consumed = stream.byte_offset();

        if rest[consumed..].iter().any(|&byte| byte != 0) {
            return Err(ProtocolError::InvalidPadding);
        }
        for condition in &conditions {
            let Condition::Ttl(value) = condition;
            if *value > varint::MAX {
                return Err(ProtocolError::ConditionOutOfRange);
            }
        }
        Ok(conditions)
    }

    /// Decide whether this capability authorizes `candidate`.
    ///
    /// Returns `Ok(false)` when the candidate's signature does not
    /// verify under the capability key, or a condition rejects the
    /// candidate id. A capability that cannot be parsed is an error,
    /// not a refusal: the caller should treat it as malformed input.
    pub fn authorizes(&self, candidate: &Envelope, candidate_id: MessageId) -> Result<bool> {
        let key = self.public_key()?;
        if candidate.verify(&key).is_err() {
            debug!(candidate_id = %candidate_id, "candidate signature rejected");
            return Ok(false);
        }
        let conditions = self.conditions()?;
        for condition in &conditions {
            if !condition.check(self.message_id, candidate_id) {
                debug!(
                    candidate_id = %candidate_id,
                    ?condition,
                    "condition rejected candidate"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Lay a capability out into a payload region:
/// `public_key || JSON(conditions) || zero padding`.
///
/// The write-side dual of [`Authorization`], for callers that mint
/// capabilities.
///
/// # Errors
///
/// Returns `NoSpace` if the key and encoded conditions do not fit in
/// `out`.
pub fn write_capability(
    out: &mut [u8],
    public_key: &PublicKey,
    conditions: &[Condition],
) -> Result<()> {
    let json = serde_json::to_vec(conditions)
        .map_err(|error| ProtocolError::ConditionParse(error.to_string()))?;
    let needed = ED_PUB_LEN + json.len();
    if out.len() < needed {
        return Err(ProtocolError::NoSpace {
            needed,
            available: out.len(),
        });
    }
    out[..ED_PUB_LEN].copy_from_slice(public_key.as_bytes());
    out[ED_PUB_LEN..needed].copy_from_slice(&json);
    out[needed..].fill(0);
    Ok(())
}
