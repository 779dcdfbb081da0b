//! Nickname validator
//!
//! Implements the admission rules a nickname must pass before it can be registered.

use crate::error::NicknameError;

/// Maximum nickname length, in characters.
pub const MAX_NICKNAME_LENGTH: usize = 10;

/// Validates a requested nickname and returns it with surrounding whitespace removed.
///
/// Checks run in a fixed order and the first failure is reported: length, then the
/// leading letter, then the allowed character set.
pub fn validate_nickname(candidate: &str) -> Result<&str, NicknameError> {
    let nickname = candidate.trim();

    let length = nickname.chars().count();
    if length < 1 || length > MAX_NICKNAME_LENGTH {
        return Err(NicknameError::InvalidLength);
    }

    if !nickname.starts_with(char::is_alphabetic) {
        return Err(NicknameError::MustStartWithLetter);
    }

    if !nickname.chars().all(is_nickname_char) {
        return Err(NicknameError::InvalidCharacters);
    }

    Ok(nickname)
}

fn is_nickname_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_nicknames() {
        assert_eq!(validate_nickname("alice"), Ok("alice"));
        assert_eq!(validate_nickname("a"), Ok("a"));
        assert_eq!(validate_nickname("Bob_42"), Ok("Bob_42"));
        assert_eq!(validate_nickname("abcdefghij"), Ok("abcdefghij"));
    }

    #[test]
    fn test_trims_before_checking() {
        assert_eq!(validate_nickname("  carol \t"), Ok("carol"));
        assert_eq!(
            validate_nickname("   "),
            Err(NicknameError::InvalidLength)
        );
    }

    #[test]
    fn test_rejects_bad_length() {
        assert_eq!(validate_nickname(""), Err(NicknameError::InvalidLength));
        assert_eq!(
            validate_nickname("abcdefghijk"),
            Err(NicknameError::InvalidLength)
        );
    }

    #[test]
    fn test_rejects_leading_non_letter() {
        assert_eq!(
            validate_nickname("1alice"),
            Err(NicknameError::MustStartWithLetter)
        );
        assert_eq!(
            validate_nickname("_alice"),
            Err(NicknameError::MustStartWithLetter)
        );
    }

    #[test]
    fn test_rejects_bad_characters() {
        assert_eq!(
            validate_nickname("al-ice"),
            Err(NicknameError::InvalidCharacters)
        );
        assert_eq!(
            validate_nickname("café"),
            Err(NicknameError::InvalidCharacters)
        );
    }

    #[test]
    fn test_first_failure_wins() {
        // Too long and starts with a digit: length is checked first.
        assert_eq!(
            validate_nickname("1234567890123"),
            Err(NicknameError::InvalidLength)
        );
        // Starts with a digit and has a bad character: leading letter is checked first.
        assert_eq!(
            validate_nickname("9a-b"),
            Err(NicknameError::MustStartWithLetter)
        );
    }
}
