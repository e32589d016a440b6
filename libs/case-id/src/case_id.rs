//! The `LOST-XXXXXX` case ID.

use rand::Rng;

use crate::CaseIdError;

/// Literal prefix of every lost case ID.
pub const PREFIX: &str = "LOST-";

/// Symbols used in the code portion.
///
/// Digits 2-9 and upper-case letters without I and O. The length is a power
/// of two so that `byte & 31` maps random bytes uniformly.
pub const ALPHABET: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Number of symbols in a canonical code.
pub const CODE_LENGTH: usize = 6;

const SYMBOL_MASK: u8 = (ALPHABET.len() - 1) as u8;

/// Generates a case ID string with a code of `length` symbols.
///
/// Only `length == CODE_LENGTH` produces IDs accepted by [`is_valid_format`].
pub fn generate(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::rng().fill(bytes.as_mut_slice());

    let mut out = String::with_capacity(PREFIX.len() + length);
    out.push_str(PREFIX);
    out.extend(
        bytes
            .iter()
            .map(|b| ALPHABET[usize::from(b & SYMBOL_MASK)] as char),
    );
    out
}

/// Trims surrounding whitespace and upper-cases the input.
pub fn normalize(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Returns true iff `input` is exactly `LOST-` followed by six alphabet symbols.
///
/// No normalization is applied; callers that accept user input should run
/// [`normalize`] first.
pub fn is_valid_format(input: &str) -> bool {
    let Some(code) = input.strip_prefix(PREFIX) else {
        return false;
    };
    code.len() == CODE_LENGTH && code.bytes().all(is_alphabet_symbol)
}

fn is_alphabet_symbol(b: u8) -> bool {
    ALPHABET.contains(&b)
}

/// A validated, canonical (upper-case) lost case ID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LostCaseId(String);

impl LostCaseId {
    /// Generates a fresh case ID with the canonical code length.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate(CODE_LENGTH))
    }

    /// Parses user input, normalizing it before validation.
    pub fn parse(input: &str) -> Result<Self, CaseIdError> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return Err(CaseIdError::Empty);
        }

        let Some(code) = normalized.strip_prefix(PREFIX) else {
            return Err(CaseIdError::MissingPrefix {
                expected: PREFIX,
                actual: normalized.chars().take(PREFIX.len()).collect(),
            });
        };

        if let Some(bad) = code.chars().find(|c| !c.is_ascii() || !is_alphabet_symbol(*c as u8)) {
            return Err(CaseIdError::InvalidCharacter(bad));
        }

        if code.len() != CODE_LENGTH {
            return Err(CaseIdError::InvalidLength {
                expected: CODE_LENGTH,
                actual: code.len(),
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the code portion without the `LOST-` prefix.
    pub fn code(&self) -> &str {
        &self.0[PREFIX.len()..]
    }
}

impl std::fmt::Display for LostCaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LostCaseId {
    type Err = CaseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for LostCaseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for LostCaseId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for LostCaseId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn code_strategy() -> impl Strategy<Value = String> {
        proptest::collection::vec(proptest::sample::select(ALPHABET.to_vec()), CODE_LENGTH)
            .prop_map(|bytes| format!("{PREFIX}{}", String::from_utf8(bytes).unwrap()))
    }

    #[test]
    fn test_generated_ids_are_valid_and_canonical() {
        for _ in 0..1_000 {
            let id = generate(CODE_LENGTH);
            assert!(is_valid_format(&id), "{id}");
            assert_eq!(normalize(&id), id);
        }
    }

    #[test]
    fn test_generate_respects_length() {
        let id = generate(10);
        assert_eq!(id.len(), PREFIX.len() + 10);
        assert!(!is_valid_format(&id));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate(CODE_LENGTH)).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_alphabet_excludes_confusable_symbols() {
        for c in [b'0', b'1', b'I', b'O'] {
            assert!(!ALPHABET.contains(&c));
        }
        let unique: HashSet<u8> = ALPHABET.iter().copied().collect();
        assert_eq!(unique.len(), 32);
    }

    #[test]
    fn test_normalize_lookup_input() {
        assert_eq!(normalize(" lost-7k4m9b "), "LOST-7K4M9B");
        assert!(is_valid_format(&normalize(" lost-7k4m9b ")));
    }

    #[rstest]
    #[case("")]
    #[case("LOST-")]
    #[case("LOST-7K4M9")]
    #[case("LOST-7K4M9BB")]
    #[case("LOST-7K4M0B")]
    #[case("LOST-7K4MOB")]
    #[case("LOST-7K4M1B")]
    #[case("LOST-7K4MIB")]
    #[case("lost-7k4m9b")]
    #[case(" LOST-7K4M9B")]
    #[case("FOUND-7K4M9B")]
    #[case("LOST_7K4M9B")]
    #[case("LOST-7K4M9É")]
    fn test_invalid_formats(#[case] input: &str) {
        assert!(!is_valid_format(input));
    }

    #[test]
    fn test_parse_normalizes() {
        let id = LostCaseId::parse("  lost-7k4m9b\n").unwrap();
        assert_eq!(id.as_str(), "LOST-7K4M9B");
        assert_eq!(id.code(), "7K4M9B");
        assert_eq!(id.to_string(), "LOST-7K4M9B");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(LostCaseId::parse("   "), Err(CaseIdError::Empty));
        assert!(matches!(
            LostCaseId::parse("CASE-7K4M9B"),
            Err(CaseIdError::MissingPrefix { .. })
        ));
        assert_eq!(
            LostCaseId::parse("LOST-7K4M0B"),
            Err(CaseIdError::InvalidCharacter('0'))
        );
        assert_eq!(
            LostCaseId::parse("LOST-7K4"),
            Err(CaseIdError::InvalidLength {
                expected: CODE_LENGTH,
                actual: 3
            })
        );
    }

    #[test]
    fn test_serde_as_string() {
        let id = LostCaseId::parse("LOST-ABCDEF").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"LOST-ABCDEF\"");

        let parsed: LostCaseId = serde_json::from_str("\"lost-abcdef\"").unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_str::<LostCaseId>("\"LOST-ABC\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in ".*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_case_variants_normalize_to_valid(id in code_strategy(), mask in any::<u64>()) {
            let varied: String = id
                .chars()
                .enumerate()
                .map(|(i, c)| if mask >> (i % 64) & 1 == 1 { c.to_ascii_lowercase() } else { c })
                .collect();
            prop_assert!(is_valid_format(&normalize(&varied)));
            prop_assert_eq!(normalize(&varied), id);
        }

        #[test]
        fn prop_foreign_symbols_rejected(
            id in code_strategy(),
            pos in 0..CODE_LENGTH,
            c in any::<char>().prop_filter("outside alphabet", |c| !c.is_ascii() || !ALPHABET.contains(&(*c as u8))),
        ) {
            let mut chars: Vec<char> = id.chars().collect();
            chars[PREFIX.len() + pos] = c;
            let tampered: String = chars.into_iter().collect();
            prop_assert!(!is_valid_format(&tampered));
        }
    }
}
