//! Short code generation and custom code validation
//!
//! The generator knows nothing about codes already in use; collision
//! detection belongs to the registry.

use rand::RngExt;

use super::error::ValidationError;

/// The 62 symbols a short code may contain
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const GENERATED_CODE_LENGTH: usize = 6;
pub const CUSTOM_CODE_MIN_LENGTH: usize = 3;
pub const CUSTOM_CODE_MAX_LENGTH: usize = 20;

/// Accept a caller-supplied code or synthesize a random one
pub fn generate(custom_code: Option<&str>) -> Result<String, ValidationError> {
    match custom_code {
        Some(code) if is_valid_custom_code(code) => Ok(code.to_string()),
        Some(_) => Err(ValidationError::InvalidCustomCode),
        None => Ok(random_code()),
    }
}

/// Six symbols drawn independently and uniformly from [`ALPHABET`]
pub fn random_code() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Matches `^[A-Za-z0-9]{3,20}$`
pub fn is_valid_custom_code(code: &str) -> bool {
    (CUSTOM_CODE_MIN_LENGTH..=CUSTOM_CODE_MAX_LENGTH).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_has_62_distinct_symbols() {
        let mut symbols = ALPHABET.to_vec();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), 62);
    }

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..200 {
            let code = generate(None).unwrap();
            assert_eq!(code.len(), GENERATED_CODE_LENGTH);
            assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_custom_code_returned_verbatim() {
        assert_eq!(generate(Some("abc")).unwrap(), "abc");
        assert_eq!(generate(Some("MyLink2024")).unwrap(), "MyLink2024");
        assert_eq!(
            generate(Some("abcdefghij0123456789")).unwrap(),
            "abcdefghij0123456789"
        );
    }

    #[test]
    fn test_custom_code_rejections() {
        for bad in ["", "ab", "abcdefghij01234567890", "has space", "dash-ed", "ünï", "emoji🙂"] {
            assert_eq!(
                generate(Some(bad)),
                Err(ValidationError::InvalidCustomCode),
                "{bad:?} should be rejected"
            );
        }
    }
}
