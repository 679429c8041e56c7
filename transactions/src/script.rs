//! Locking and unlocking scripts as opaque bytes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const OP_FALSE: u8 = 0x00;
pub const OP_RETURN: u8 = 0x6a;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A data output: `OP_RETURN ...` or `OP_FALSE OP_RETURN ...`.
    pub fn is_data(&self) -> bool {
        matches!(self.0.as_slice(), [OP_RETURN, ..] | [OP_FALSE, OP_RETURN, ..])
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Script {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_outputs() {
        assert!(Script::new(vec![OP_RETURN, 0x01, 0x02]).is_data());
        assert!(Script::new(vec![OP_FALSE, OP_RETURN]).is_data());
        assert!(!Script::new(vec![OP_FALSE]).is_data());
        assert!(!Script::new(vec![0x76, 0xa9, 0x14]).is_data());
        assert!(!Script::default().is_data());
    }

    #[test]
    fn serde_is_hex() {
        let script = Script::new(vec![0x76, 0xa9]);
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(json, "\"76a9\"");
        assert_eq!(serde_json::from_str::<Script>(&json).unwrap(), script);
    }
}
