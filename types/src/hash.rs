//! Double-SHA256 identifiers for transactions.
//!
//! Bitcoin hashes are stored in internal (hash output) byte order and shown
//! to humans byte-reversed. Both orders are explicit in the API so callers
//! never have to remember which one a `[u8; 32]` is in.

use crate::PaydError;

/// Declares a 32-byte hash newtype with reversed-hex display and serde.
macro_rules! display_hash {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const ZERO: Self = Self([0u8; 32]);

            /// Wrap bytes that are already in internal (hash output) order.
            pub fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Internal byte order, as it appears on the wire.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Display byte order (internal order reversed).
            pub fn to_display_bytes(&self) -> [u8; 32] {
                let mut out = self.0;
                out.reverse();
                out
            }

            /// Build from display-order bytes.
            pub fn from_display_bytes(mut bytes: [u8; 32]) -> Self {
                bytes.reverse();
                Self(bytes)
            }

            /// Build from an internal-order slice, which must be exactly 32 bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, $crate::PaydError> {
                let arr: [u8; 32] =
                    bytes
                        .try_into()
                        .map_err(|_| $crate::PaydError::InvalidLength {
                            what: stringify!($name),
                            expected: 32,
                            got: bytes.len(),
                        })?;
                Ok(Self(arr))
            }

            /// Parse the conventional reversed hex form.
            pub fn from_hex(s: &str) -> Result<Self, $crate::PaydError> {
                let raw = hex::decode(s)?;
                let mut id = Self::from_slice(&raw)?;
                id.0.reverse();
                Ok(id)
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.to_display_bytes())
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.to_hex()[..8])
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::PaydError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use display_hash;

display_hash!(
    /// A 32-byte transaction id (SHA-256d of the raw transaction).
    TxId
);

/// Reverse a byte slice into a new vector.
pub fn reverse_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

/// Decode hex into exactly `N` bytes.
pub fn decode_hex_array<const N: usize>(what: &'static str, s: &str) -> Result<[u8; N], PaydError> {
    let raw = hex::decode(s)?;
    raw.as_slice()
        .try_into()
        .map_err(|_| PaydError::InvalidLength {
            what,
            expected: N,
            got: raw.len(),
        })
}
