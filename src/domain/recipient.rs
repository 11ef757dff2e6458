use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One entry of the stored recipient list (`{"Use": bool, "PhoneNumber": string}`).
pub struct Recipient {
    #[serde(rename = "PhoneNumber", default)]
    pub phone_number: String,
    #[serde(rename = "Use", default)]
    pub enabled: bool,
}

impl Recipient {
    pub fn new(phone_number: impl Into<String>, enabled: bool) -> Self {
        Self {
            phone_number: phone_number.into(),
            enabled,
        }
    }
}

/// Parse the JSON-encoded recipient list and keep the enabled entries in order.
///
/// An absent, empty, or malformed list resolves to no recipients.
pub fn resolve_recipients(raw: &str) -> Vec<Recipient> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Recipient>>(raw) {
        Ok(recipients) => recipients.into_iter().filter(|it| it.enabled).collect(),
        Err(err) => {
            tracing::debug!(error = %err, "recipient list is not a valid JSON array");
            Vec::new()
        }
    }
}
