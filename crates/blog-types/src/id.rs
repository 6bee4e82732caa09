//! Translation between the opaque string ids handed to clients and the
//! integer primary keys used by the store.
//!
//! Every adapter decodes before binding a parameter and encodes before a key
//! leaves it, so this module is the only place the two forms meet.

use crate::error::StoreError;

pub fn encode(key: i64) -> String {
    key.to_string()
}

/// Accepts plain ASCII digits only. Signs, whitespace, the empty string and
/// values that overflow `i64` are all `InvalidIdentifier`.
pub fn decode(id: &str) -> Result<i64, StoreError> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::InvalidIdentifier(id.to_string()));
    }
    id.parse::<i64>()
        .map_err(|_| StoreError::InvalidIdentifier(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_positive_keys() {
        for n in [1_i64, 7, 42, 1_000, 987_654_321, i64::MAX] {
            assert_eq!(decode(&encode(n)).unwrap(), n);
        }
    }

    #[test]
    fn roundtrip_canonical_strings() {
        for s in ["1", "10", "123", "9223372036854775807"] {
            assert_eq!(encode(decode(s).unwrap()), s);
        }
    }

    #[test]
    fn rejects_malformed() {
        for s in ["abc", "", "-1", "+1", " 1", "1 ", "1.0", "0x10", "١٢"] {
            assert!(
                matches!(decode(s), Err(StoreError::InvalidIdentifier(ref v)) if v == s),
                "expected InvalidIdentifier for {:?}",
                s
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(
            decode("9223372036854775808"),
            Err(StoreError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn zero_is_a_valid_key() {
        assert_eq!(decode("0").unwrap(), 0);
    }
}
