use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// 12-byte record identifier rendered as 24 lowercase hex characters.
///
/// Layout: 4 bytes of big-endian unix seconds, 5 random bytes fixed per
/// process, 3 bytes of a wrapping counter. Ids minted in the same process are
/// unique and roughly ordered by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id '{0}': expected 24 hex characters")]
pub struct InvalidObjectId(pub String);

fn process_entropy() -> &'static [u8; 5] {
    use std::sync::OnceLock;
    static ENTROPY: OnceLock<[u8; 5]> = OnceLock::new();
    ENTROPY.get_or_init(|| {
        let random = Uuid::new_v4();
        let mut out = [0u8; 5];
        out.copy_from_slice(&random.as_bytes()[..5]);
        out
    })
}

fn next_counter() -> u32 {
    use std::sync::OnceLock;
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| {
        let seed = *Uuid::new_v4().as_bytes();
        AtomicU32::new(u32::from_be_bytes([0, seed[0], seed[1], seed[2]]))
    });
    counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff
}

impl ObjectId {
    pub fn new() -> Self {
        let mut bytes = [0u8; 12];
        let seconds = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_entropy());
        bytes[9..].copy_from_slice(&next_counter().to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn parse(s: &str) -> Result<Self, InvalidObjectId> {
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidObjectId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_24_lowercase_hex_chars() {
        let id = ObjectId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 24);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(ObjectId::parse(&text).unwrap(), id);
    }

    #[test]
    fn consecutive_ids_are_distinct() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| ObjectId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(ObjectId::parse("").is_err());
        assert!(ObjectId::parse("66eb45085bc5f324f674a07").is_err());
        assert!(ObjectId::parse("66eb45085bc5f324f674a07fz").is_err());
        assert!(ObjectId::parse("zzeb45085bc5f324f674a07f").is_err());
        assert!(ObjectId::parse("66eb45085bc5f324f674a07f00").is_err());
        assert!(ObjectId::parse("+6eb45085bc5f324f674a07f").is_err());
        assert!(ObjectId::parse("66eb45085bc5f324f674a07f").is_ok());
    }

    #[test]
    fn accepts_uppercase_input_and_normalises_output() {
        let id = ObjectId::parse("66EB45085BC5F324F674A07F").unwrap();
        assert_eq!(id.to_string(), "66eb45085bc5f324f674a07f");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ObjectId::parse("66eb45085bc5f324f674a07f").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"66eb45085bc5f324f674a07f\"");
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
