use serde::Deserialize;
use serde_json::value::RawValue;

use crate::domain::{
    ErrorFlag, HttpRequest, MessageText, NexxtMobileResponse, RawPhoneNumber, SenderNumber, Token,
};

/// Longest text (in characters) the gateway accepts for one message.
pub const MAX_TEXT_CHARS: usize = 360;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct JsonResponse {
    #[serde(rename = "isError", default, deserialize_with = "present")]
    is_error: Option<serde_json::Value>,
    #[serde(default)]
    result: Option<Box<RawValue>>,
}

#[derive(Debug, Deserialize)]
struct JsonBalanceResult {
    #[serde(rename = "balanceFormated", default)]
    balance_formated: Option<serde_json::Value>,
}

// Distinguishes `"isError": null` (present, falsy) from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Build the `function=sms` request.
///
/// The recipient is inserted verbatim, everything else is percent-encoded and
/// the text is cut to [`MAX_TEXT_CHARS`] characters first.
pub fn encode_send_request(
    endpoint: &str,
    token: &Token,
    sender: &SenderNumber,
    recipient: &RawPhoneNumber,
    text: &MessageText,
) -> HttpRequest {
    let url = format!(
        "{endpoint}?mode=user&{}={}&function=sms&{}={}&{}={}&{}={}",
        Token::FIELD,
        urlencoding::encode(token.as_str()),
        SenderNumber::FIELD,
        urlencoding::encode(sender.as_str()),
        RawPhoneNumber::FIELD,
        recipient.raw(),
        MessageText::FIELD,
        urlencoding::encode(text.prefix(MAX_TEXT_CHARS)),
    );
    HttpRequest::get(url)
}

/// Build the `function=getBalance` request.
pub fn encode_balance_request(endpoint: &str, token: &Token) -> HttpRequest {
    let url = format!(
        "{endpoint}?mode=user&{}={}&function=getBalance",
        Token::FIELD,
        urlencoding::encode(token.as_str()),
    );
    HttpRequest::get(url)
}

/// Decode a reply body. Returns `Ok(None)` for an empty body.
pub fn decode_response(body: &str) -> Result<Option<NexxtMobileResponse>, TransportError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let parsed: JsonResponse = serde_json::from_str(body)?;

    let is_error = match parsed.is_error {
        None => ErrorFlag::Absent,
        Some(value) => ErrorFlag::Set(is_truthy(&value)),
    };

    // `result` is only an object on balance replies; anything else carries no balance.
    let balance_formatted = parsed
        .result
        .and_then(|raw| serde_json::from_str::<JsonBalanceResult>(raw.get()).ok())
        .and_then(|result| result.balance_formated)
        .and_then(|value| render_balance(&value));

    Ok(Some(NexxtMobileResponse {
        is_error,
        balance_formatted,
    }))
}

// Numbers are rendered from their value, so `12.30` becomes `12.3` and `5.0` becomes `5`.
fn render_balance(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(int), _) => Some(int.to_string()),
            (None, Some(float)) => Some(float.to_string()),
            (None, None) => Some(number.to_string()),
        },
        _ => None,
    }
}

// The gateway is not strict about the flag's type; `1` and `"1"` mean true as well.
fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|it| it != 0.0),
        Value::String(text) => !(text.is_empty() || text == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}
