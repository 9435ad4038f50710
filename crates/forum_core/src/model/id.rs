//! Store-defined document identifiers.
//!
//! # Invariants
//! - A valid identifier is exactly 24 hexadecimal characters.
//! - Parsed identifiers are normalized to lowercase so equal keys compare
//!   equal as strings inside the store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Number of hexadecimal characters in a document identifier.
pub const DOCUMENT_ID_LEN: usize = 24;

/// Opaque, store-generated document key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

/// Rejected identifier text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDocumentId(pub String);

impl Display for InvalidDocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "`{}` is not a {DOCUMENT_ID_LEN}-character hexadecimal identifier",
            self.0
        )
    }
}

impl Error for InvalidDocumentId {}

impl DocumentId {
    /// Generates a fresh identifier: 4 bytes of big-endian epoch seconds
    /// followed by 8 random bytes.
    pub fn generate() -> Self {
        let epoch_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        let random = Uuid::new_v4();
        let mut tail = [0u8; 8];
        tail.copy_from_slice(&random.as_bytes()[..8]);

        Self::from_parts(epoch_secs, tail)
    }

    // Seconds past the 32-bit range saturate instead of wrapping.
    fn from_parts(epoch_secs: u64, tail: [u8; 8]) -> Self {
        let seconds = u32::try_from(epoch_secs).unwrap_or(u32::MAX);

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&tail);

        Self(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Parses identifier text, accepting either hex case.
    pub fn parse(value: &str) -> Result<Self, InvalidDocumentId> {
        if value.len() == DOCUMENT_ID_LEN && value.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(InvalidDocumentId(value.to_string()))
        }
    }

    /// Returns whether `value` is syntactically a document identifier.
    pub fn is_valid(value: &str) -> bool {
        Self::parse(value).is_ok()
    }

    /// Lowercases well-formed identifier text. Anything else comes back
    /// unchanged for the reference validator to report.
    pub fn canonical_text(raw: &str) -> String {
        match Self::parse(raw) {
            Ok(id) => id.0,
            Err(_) => raw.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentId {
    type Err = InvalidDocumentId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = InvalidDocumentId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentId, DOCUMENT_ID_LEN};
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_well_formed_and_distinct() {
        let ids: HashSet<DocumentId> = (0..256).map(|_| DocumentId::generate()).collect();
        assert_eq!(ids.len(), 256);
        for id in &ids {
            assert_eq!(id.as_str().len(), DOCUMENT_ID_LEN);
            assert!(DocumentId::is_valid(id.as_str()));
        }
    }

    #[test]
    fn timestamp_prefix_saturates_past_u32_range() {
        let tail = [0xab; 8];
        let late = DocumentId::from_parts(u64::from(u32::MAX) + 5, tail);
        assert_eq!(late.as_str(), "ffffffffabababababababab");

        let early = DocumentId::from_parts(1, tail);
        assert!(early.as_str().starts_with("00000001"));
        assert!(early < late);
    }

    #[test]
    fn canonical_text_lowercases_only_well_formed_ids() {
        assert_eq!(
            DocumentId::canonical_text("ABCDEF0123456789ABCDEF01"),
            "abcdef0123456789abcdef01"
        );
        assert_eq!(DocumentId::canonical_text("Not-An-Id"), "Not-An-Id");
    }

    #[test]
    fn parse_enforces_length_and_alphabet() {
        assert!(DocumentId::parse("123456789012345678901234").is_ok());
        assert!(DocumentId::parse("1234").is_err());
        assert!(DocumentId::parse("12345678901234567890123g").is_err());
        assert!(DocumentId::parse("1234567890123456789012345").is_err());
        assert!(DocumentId::parse("").is_err());
    }

    #[test]
    fn parse_normalizes_case() {
        let upper = DocumentId::parse("ABCDEF0123456789ABCDEF01").unwrap();
        let lower = DocumentId::parse("abcdef0123456789abcdef01").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.to_string(), "abcdef0123456789abcdef01");
    }

    #[test]
    fn deserialization_rejects_malformed_ids() {
        let ok: DocumentId = serde_json::from_str("\"123456789012345678901234\"").unwrap();
        assert_eq!(ok.as_str(), "123456789012345678901234");
        assert!(serde_json::from_str::<DocumentId>("\"1234\"").is_err());
    }
}
