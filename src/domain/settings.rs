use std::time::Duration;

use serde::Deserialize;

use crate::domain::recipient::{Recipient, resolve_recipients};
use crate::domain::validation::ValidationError;
use crate::domain::value::{Password, RawPhoneNumber, SenderNumber, Token, User};

/// Connect timeout used when the property document does not set `Timeout`.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// Sender number placeholder stored by a freshly created instance.
pub const DEFAULT_SENDER_NUMBER: &str = "+49";

/// Recipient numbers shorter than this are reported by configuration checks.
const RECIPIENT_CHECK_MIN_LEN: usize = 3;

fn default_active() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_sender_number() -> String {
    DEFAULT_SENDER_NUMBER.to_owned()
}

fn default_recipients() -> String {
    "[]".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of a configuration check.
pub enum ConfigStatus {
    /// Instance is enabled and every setting is usable.
    Active,
    /// Instance is switched off; nothing will be sent.
    Inactive,
    /// At least one setting is unusable.
    Invalid(Vec<ValidationError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Snapshot of a NeXXt Mobile instance's stored properties.
pub struct NexxtMobileSettings {
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_sender_number")]
    pub sender_number: String,
    /// Connect timeout in milliseconds.
    #[serde(rename = "Timeout", default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// JSON-encoded recipient list.
    #[serde(default = "default_recipients")]
    pub recipients: String,
}

impl Default for NexxtMobileSettings {
    fn default() -> Self {
        Self {
            active: default_active(),
            token: String::new(),
            sender_number: default_sender_number(),
            timeout_ms: default_timeout_ms(),
            recipients: default_recipients(),
        }
    }
}

impl NexxtMobileSettings {
    /// Parse the host's property document (`{"Active": .., "Token": .., ...}`).
    pub fn from_properties(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Connect timeout per request; zero leaves it to the HTTP client default.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn token(&self) -> Result<Token, ValidationError> {
        Token::new(self.token.as_str())
    }

    pub fn sender_number(&self) -> Result<SenderNumber, ValidationError> {
        SenderNumber::new(self.sender_number.as_str())
    }

    /// Enabled recipients in stored order.
    pub fn recipients(&self) -> Vec<Recipient> {
        resolve_recipients(&self.recipients)
    }

    /// Check every stored setting and collect all problems found.
    pub fn validate(&self) -> ConfigStatus {
        let mut problems = Vec::new();
        if let Err(err) = self.token() {
            problems.push(err);
        }
        if let Err(err) = self.sender_number() {
            problems.push(err);
        }
        problems.extend(check_recipients(&self.recipients()));
        finish_validation(self.active, problems)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Snapshot of a Sipgate instance's stored properties.
pub struct SipgateSettings {
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Connect timeout in milliseconds.
    #[serde(rename = "Timeout", default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// JSON-encoded recipient list.
    #[serde(default = "default_recipients")]
    pub recipients: String,
}

impl Default for SipgateSettings {
    fn default() -> Self {
        Self {
            active: default_active(),
            user: String::new(),
            password: String::new(),
            timeout_ms: default_timeout_ms(),
            recipients: default_recipients(),
        }
    }
}

impl SipgateSettings {
    /// Parse the host's property document (`{"Active": .., "User": .., ...}`).
    pub fn from_properties(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Connect timeout per request; zero leaves it to the HTTP client default.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn user(&self) -> Result<User, ValidationError> {
        User::new(self.user.as_str())
    }

    pub fn password(&self) -> Result<Password, ValidationError> {
        Password::new(self.password.as_str())
    }

    /// Enabled recipients in stored order.
    pub fn recipients(&self) -> Vec<Recipient> {
        resolve_recipients(&self.recipients)
    }

    /// Check every stored setting and collect all problems found.
    pub fn validate(&self) -> ConfigStatus {
        let mut problems = Vec::new();
        if let Err(err) = self.user() {
            problems.push(err);
        }
        if let Err(err) = self.password() {
            problems.push(err);
        }
        problems.extend(check_recipients(&self.recipients()));
        finish_validation(self.active, problems)
    }
}

fn check_recipients(recipients: &[Recipient]) -> Vec<ValidationError> {
    recipients
        .iter()
        .filter_map(|recipient| {
            let actual = recipient.phone_number.chars().count();
            if actual == 0 {
                Some(ValidationError::Empty {
                    field: RawPhoneNumber::FIELD,
                })
            } else if actual < RECIPIENT_CHECK_MIN_LEN {
                Some(ValidationError::TooShort {
                    field: RawPhoneNumber::FIELD,
                    min_len: RECIPIENT_CHECK_MIN_LEN,
                    actual,
                })
            } else {
                None
            }
        })
        .collect()
}

// An inactive instance reports `Inactive` even when settings are broken.
fn finish_validation(active: bool, problems: Vec<ValidationError>) -> ConfigStatus {
    if !active {
        ConfigStatus::Inactive
    } else if problems.is_empty() {
        ConfigStatus::Active
    } else {
        ConfigStatus::Invalid(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nexxtmobile_defaults_match_a_fresh_instance() {
        let settings = NexxtMobileSettings::from_properties("{}").unwrap();
        assert_eq!(settings, NexxtMobileSettings::default());
        assert!(settings.active);
        assert_eq!(settings.sender_number, "+49");
        assert_eq!(settings.connect_timeout(), Duration::from_millis(5000));
        assert!(settings.recipients().is_empty());
    }

    #[test]
    fn nexxtmobile_properties_use_host_key_names() {
        let json = r#"{
            "Active": false,
            "Token": "abc",
            "SenderNumber": "+4917000",
            "Timeout": 2500,
            "Recipients": "[{\"Use\":true,\"PhoneNumber\":\"+491234567\"}]"
        }"#;
        let settings = NexxtMobileSettings::from_properties(json).unwrap();
        assert!(!settings.active);
        assert_eq!(settings.token().unwrap().as_str(), "abc");
        assert_eq!(settings.sender_number().unwrap().as_str(), "+4917000");
        assert_eq!(settings.connect_timeout(), Duration::from_millis(2500));
        assert_eq!(settings.recipients()[0].phone_number, "+491234567");
    }

    #[test]
    fn fresh_nexxtmobile_instance_is_invalid() {
        let status = NexxtMobileSettings::default().validate();
        match status {
            ConfigStatus::Invalid(problems) => {
                assert_eq!(problems.len(), 2);
                assert!(matches!(problems[0], ValidationError::Empty { field: "token" }));
                assert!(matches!(
                    problems[1],
                    ValidationError::TooShort {
                        field: "originator",
                        ..
                    }
                ));
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn inactive_instance_wins_over_problems() {
        let settings = SipgateSettings {
            active: false,
            ..Default::default()
        };
        assert_eq!(settings.validate(), ConfigStatus::Inactive);
    }

    #[test]
    fn sipgate_reports_short_enabled_recipients_only() {
        let settings = SipgateSettings {
            user: "user".to_owned(),
            password: "secret".to_owned(),
            recipients: r#"[
                {"Use": true, "PhoneNumber": "12"},
                {"Use": false, "PhoneNumber": "1"},
                {"Use": true, "PhoneNumber": "+491234567"}
            ]"#
            .to_owned(),
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            ConfigStatus::Invalid(vec![ValidationError::TooShort {
                field: "recipient",
                min_len: 3,
                actual: 2
            }])
        );
    }

    #[test]
    fn valid_sipgate_settings_are_active() {
        let settings = SipgateSettings {
            user: "user".to_owned(),
            password: "secret".to_owned(),
            ..Default::default()
        };
        assert_eq!(settings.validate(), ConfigStatus::Active);
    }
}
