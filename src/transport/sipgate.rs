use serde::Serialize;

use crate::domain::{HttpRequest, MessageText, Password, RawPhoneNumber, User};

/// Sipgate's id for the default web SMS extension.
pub const DEFAULT_SMS_ID: &str = "s0";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to encode JSON request: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SmsJsonRequest<'a> {
    sms_id: &'a str,
    recipient: &'a str,
    message: &'a str,
}

/// Build the `POST /v2/sessions/sms` request. Text is sent untruncated.
pub fn encode_send_request(
    endpoint: &str,
    user: &User,
    password: &Password,
    recipient: &RawPhoneNumber,
    text: &MessageText,
) -> Result<HttpRequest, TransportError> {
    let body = serde_json::to_string(&SmsJsonRequest {
        sms_id: DEFAULT_SMS_ID,
        recipient: recipient.raw(),
        message: text.as_str(),
    })?;

    Ok(HttpRequest::post(endpoint, body)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .basic_auth(user.as_str(), password.as_str()))
}
