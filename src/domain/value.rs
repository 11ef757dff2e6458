use crate::domain::validation::ValidationError;

use phonenumber::country;

/// Reject values that are empty or consist only of whitespace.
fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

/// Ensure `value` is non-empty and at least `min_len` characters long.
fn require_min_len(
    field: &'static str,
    value: &str,
    min_len: usize,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let actual = value.chars().count();
    if actual < min_len {
        return Err(ValidationError::TooShort {
            field,
            min_len,
            actual,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// NeXXt Mobile API token (`token`).
///
/// Invariant: not blank. The value is kept as provided, surrounding
/// whitespace included.
pub struct Token(String);

impl Token {
    /// Query parameter name used by NeXXt Mobile (`token`).
    pub const FIELD: &'static str = "token";

    /// Create a validated [`Token`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        require_non_blank(Self::FIELD, &value)?;
        Ok(Self(value))
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Originator shown to the recipient of a NeXXt Mobile SMS (`originator`).
///
/// Invariant: longer than three characters, counted as provided. The gateway
/// rejects a bare country prefix such as `+49`.
pub struct SenderNumber(String);

impl SenderNumber {
    /// Query parameter name used by NeXXt Mobile (`originator`).
    pub const FIELD: &'static str = "originator";

    /// Minimum accepted length in characters.
    pub const MIN_LEN: usize = 4;

    /// Create a validated [`SenderNumber`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        require_min_len(Self::FIELD, &value, Self::MIN_LEN)?;
        Ok(Self(value))
    }

    /// Borrow the validated sender number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sipgate account user (basic auth user name or token id).
///
/// Invariant: not blank. The value is kept as provided.
pub struct User(String);

impl User {
    pub const FIELD: &'static str = "user";

    /// Create a validated [`User`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        require_non_blank(Self::FIELD, &value)?;
        Ok(Self(value))
    }

    /// Borrow the validated user.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Sipgate account password or personal access token.
///
/// Invariant: longer than three characters (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    pub const FIELD: &'static str = "password";

    /// Minimum accepted length in characters.
    pub const MIN_LEN: usize = 4;

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        require_min_len(Self::FIELD, &value, Self::MIN_LEN)?;
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text.
///
/// Invariant: non-empty. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Query parameter name used by NeXXt Mobile (`text`).
    pub const FIELD: &'static str = "text";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Borrow at most the first `max_chars` characters of the text.
    pub fn prefix(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient phone number as passed to the gateway (`recipient`).
///
/// Invariant: longer than three characters, counted as provided. This type does
/// not normalize or escape; if you want E.164 normalization, parse into
/// [`PhoneNumber`] and convert it into [`RawPhoneNumber`].
pub struct RawPhoneNumber(String);

impl RawPhoneNumber {
    /// Parameter name used by both gateways (`recipient`).
    pub const FIELD: &'static str = "recipient";

    /// Minimum accepted length in characters.
    pub const MIN_LEN: usize = 4;

    /// Create a validated raw phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        require_min_len(Self::FIELD, &value, Self::MIN_LEN)?;
        Ok(Self(value))
    }

    /// Check that the number can be placed into a query string verbatim.
    ///
    /// Only digits, `+`, spaces, and the separators `-./()` are accepted;
    /// anything else (`&`, `#`, `=`, `%`, ...) would alter the query.
    pub fn ensure_query_safe(&self) -> Result<(), ValidationError> {
        let safe = self.0.chars().all(|c| {
            c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '/' | '(' | ')')
        });
        if safe {
            Ok(())
        } else {
            Err(ValidationError::InvalidPhoneNumber {
                input: self.0.clone(),
            })
        }
    }

    /// Value as sent to the gateway.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for RawPhoneNumber {
    /// Convert an already-parsed phone number to a normalized raw value (E.164).
    fn from(value: PhoneNumber) -> Self {
        Self(value.e164)
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// E.164 output only contains `+` and digits, so it is safe to place in the
/// NeXXt Mobile query string without escaping. Equality and hashing are based
/// on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
}

impl PhoneNumber {
    pub const FIELD: &'static str = "recipient";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;
        if !phonenumber::is_valid(&parsed) {
            return Err(ValidationError::InvalidPhoneNumber { input: raw });
        }

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164 })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_rejects_blank_and_keeps_whitespace() {
        assert!(matches!(
            Token::new("   "),
            Err(ValidationError::Empty {
                field: Token::FIELD
            })
        ));
        assert_eq!(Token::new(" abc ").unwrap().as_str(), " abc ");
        assert_eq!(User::new(" me").unwrap().as_str(), " me");
    }

    #[test]
    fn sender_number_requires_more_than_country_prefix() {
        assert!(matches!(
            SenderNumber::new("+49"),
            Err(ValidationError::TooShort {
                field: SenderNumber::FIELD,
                min_len: 4,
                actual: 3
            })
        ));
        assert!(SenderNumber::new("+491").is_ok());
        assert_eq!(SenderNumber::new("+49 ").unwrap().as_str(), "+49 ");
    }

    #[test]
    fn password_preserves_whitespace_and_hides_debug() {
        let password = Password::new(" ab ").unwrap();
        assert_eq!(password.as_str(), " ab ");
        assert_eq!(format!("{password:?}"), "Password(***)");
        assert!(Password::new("abc").is_err());
        assert!(matches!(
            Password::new(""),
            Err(ValidationError::Empty {
                field: Password::FIELD
            })
        ));
    }

    #[test]
    fn raw_phone_number_length_rule() {
        assert!(RawPhoneNumber::new("123").is_err());
        assert!(RawPhoneNumber::new(" 123").is_ok());
        assert_eq!(RawPhoneNumber::new(" 1234 ").unwrap().raw(), " 1234 ");
    }

    #[test]
    fn query_safe_numbers() {
        for ok in ["+491234567", "+49 170 1234", "0170-123/45", "(030) 1234.5"] {
            assert!(RawPhoneNumber::new(ok).unwrap().ensure_query_safe().is_ok(), "{ok}");
        }
        for bad in ["+4912#34", "+49123&x=1", "+49%2612", "+49?1234", "+49abc12"] {
            assert!(
                matches!(
                    RawPhoneNumber::new(bad).unwrap().ensure_query_safe(),
                    Err(ValidationError::InvalidPhoneNumber { .. })
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn message_prefix_counts_characters_not_bytes() {
        let text = MessageText::new("äöü€x").unwrap();
        assert_eq!(text.prefix(3), "äöü");
        assert_eq!(text.prefix(10), "äöü€x");
        assert_eq!(text.prefix(0), "");
    }

    #[test]
    fn message_text_rejects_empty() {
        assert!(MessageText::new("").is_err());
        assert_eq!(MessageText::new(" ").unwrap().as_str(), " ");
    }
}
