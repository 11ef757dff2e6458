//! Domain layer: strong types with validation and invariants (no I/O).

mod recipient;
mod request;
mod response;
mod settings;
mod validation;
mod value;

pub use recipient::{Recipient, resolve_recipients};
pub use request::{HttpRequest, Method};
pub use response::{ErrorFlag, NexxtMobileResponse};
pub use settings::{
    ConfigStatus, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_SENDER_NUMBER, NexxtMobileSettings,
    SipgateSettings,
};
pub use validation::ValidationError;
pub use value::{
    MessageText, Password, PhoneNumber, RawPhoneNumber, SenderNumber, Token, User,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_number_parses_with_region_and_trims() {
        let pn = PhoneNumber::parse(Some(phonenumber::country::Id::DE), " 030 123456 ").unwrap();
        assert_eq!(pn.raw(), "030 123456");
        assert_eq!(pn.e164(), "+4930123456");
    }

    #[test]
    fn raw_phone_number_from_phone_number_uses_e164() {
        let pn = PhoneNumber::parse(Some(phonenumber::country::Id::DE), "030 123456").unwrap();
        let raw: RawPhoneNumber = pn.into();
        assert_eq!(raw.raw(), "+4930123456");
    }

    #[test]
    fn phone_number_rejects_garbage() {
        assert!(matches!(
            PhoneNumber::parse(Some(phonenumber::country::Id::DE), "not a number"),
            Err(ValidationError::InvalidPhoneNumber { .. })
        ));
        assert!(matches!(
            PhoneNumber::parse(None, "  "),
            Err(ValidationError::Empty {
                field: PhoneNumber::FIELD
            })
        ));
    }

    #[test]
    fn request_debug_hides_secrets() {
        let request = HttpRequest::get("https://api.example.invalid/?token=secret")
            .basic_auth("user", "hunter22");
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("user"));
    }
}
