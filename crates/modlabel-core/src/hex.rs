//! Hex encoding for addresses as they appear in session documents,
//! snapshot files and the REST API (`"0x401000"`).

use crate::target::Address;

/// Encode an address as an upper-case hex string with a `0x` prefix.
pub fn encode(value: Address) -> String {
    format!("0x{value:X}")
}

/// Parse a hex string with an optional `0x`/`0X` prefix. Surrounding
/// whitespace is ignored; anything else that is not hex is rejected.
pub fn decode(text: &str) -> Option<Address> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Address::from_str_radix(digits, 16).ok()
}

/// `#[serde(with = "crate::hex::serde_hex")]` adapter for address fields.
pub mod serde_hex {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::target::Address;

    pub fn serialize<S: Serializer>(value: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::decode(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid hex address `{raw}`")))
    }
}
