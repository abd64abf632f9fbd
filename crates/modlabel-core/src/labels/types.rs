//! Label entry types, the validated label text, and store error definitions.

use serde::{Deserialize, Serialize};

use crate::target::Address;

/// Label text must be strictly shorter than this many bytes.
pub const MAX_LABEL_LEN: usize = 255;

/// Persisted module names at or above this many bytes are dropped on load.
pub const MAX_MODULE_NAME_LEN: usize = 256;

/// Reserved by downstream consumers as an escape marker.
pub const RESERVED_CHAR: char = '&';

// ==============================================================================
// Errors
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    #[error("no process is being debugged")]
    NotDebugging,

    #[error("address {0:#x} is not readable in the target")]
    UnreadableAddress(Address),

    #[error("label text is {len} bytes, must be shorter than {max}")]
    TextTooLong { len: usize, max: usize },

    #[error("label text must not contain `&`")]
    ReservedCharacter,
}

// ==============================================================================
// Label Text
// ==============================================================================

/// Label text that passed the live-write checks: non-empty, shorter than
/// [`MAX_LABEL_LEN`], free of [`RESERVED_CHAR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelText(String);

impl LabelText {
    /// Validate `text` for storage. Empty text yields `Ok(None)`: an empty
    /// label means "delete", never a stored value.
    pub fn parse(text: &str) -> Result<Option<Self>, LabelError> {
        if text.len() >= MAX_LABEL_LEN {
            return Err(LabelError::TextTooLong {
                len: text.len(),
                max: MAX_LABEL_LEN,
            });
        }
        if text.contains(RESERVED_CHAR) {
            return Err(LabelError::ReservedCharacter);
        }
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self(text.to_string())))
    }

    /// Text read back from a session document. Manual entries get `&`
    /// rewritten to a space; automatic entries are taken as written.
    pub(super) fn from_persisted(text: &str, sanitize: bool) -> Self {
        if sanitize {
            Self(text.replace(RESERVED_CHAR, " "))
        } else {
            Self(text.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LabelText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ==============================================================================
// Entries
// ==============================================================================

/// A stored label. Addresses are kept module-relative; the absolute
/// address is recomputed from the module's current base on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    /// Owning module, empty when the address belonged to no module.
    pub module: String,
    pub offset: Address,
    pub text: LabelText,
    pub manual: bool,
}

/// A label as handed to callers: rebased to an absolute address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelInfo {
    pub module: String,
    #[serde(with = "crate::hex::serde_hex")]
    pub address: Address,
    pub text: String,
    pub manual: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_text() {
        let text = LabelText::parse("main_entry")
            .expect("valid text")
            .expect("non-empty");
        assert_eq!(text.as_str(), "main_entry");
    }

    #[test]
    fn parse_treats_empty_as_delete() {
        assert_eq!(LabelText::parse(""), Ok(None));
    }

    #[test]
    fn parse_rejects_reserved_character() {
        assert_eq!(LabelText::parse("a&b"), Err(LabelError::ReservedCharacter));
    }

    #[test]
    fn parse_enforces_length_limit() {
        let longest = "x".repeat(MAX_LABEL_LEN - 1);
        assert!(LabelText::parse(&longest).is_ok());

        let too_long = "x".repeat(MAX_LABEL_LEN);
        assert_eq!(
            LabelText::parse(&too_long),
            Err(LabelError::TextTooLong {
                len: MAX_LABEL_LEN,
                max: MAX_LABEL_LEN
            })
        );
    }

    #[test]
    fn persisted_manual_text_is_sanitized() {
        assert_eq!(LabelText::from_persisted("a&b&", true).as_str(), "a b ");
        assert_eq!(LabelText::from_persisted("a&b", false).as_str(), "a&b");
    }
}
