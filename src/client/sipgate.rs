use std::sync::Arc;

use url::Url;

use super::{
    HttpTransport, ReqwestTransport, SmsError, broadcast_result, dispatch, ensure_active,
};
use crate::domain::{ConfigStatus, MessageText, RawPhoneNumber, SipgateSettings};
use crate::host::ConfigStore;
use crate::transport::sipgate::encode_send_request;

pub const DEFAULT_SIPGATE_ENDPOINT: &str = "https://api.sipgate.com/v2/sessions/sms";

/// Builder for [`SipgateClient`].
pub struct SipgateClientBuilder {
    config: Arc<dyn ConfigStore<SipgateSettings>>,
    endpoint: String,
    user_agent: Option<String>,
}

impl SipgateClientBuilder {
    /// Create a builder with the default endpoint and no user-agent override.
    pub fn new(config: impl ConfigStore<SipgateSettings> + 'static) -> Self {
        Self {
            config: Arc::new(config),
            endpoint: DEFAULT_SIPGATE_ENDPOINT.to_owned(),
            user_agent: None,
        }
    }

    /// Override the full `sessions/sms` URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`SipgateClient`].
    pub fn build(self) -> Result<SipgateClient, SmsError> {
        let endpoint = Url::parse(&self.endpoint)?;
        Ok(SipgateClient {
            config: self.config,
            endpoint: endpoint.into(),
            http: Arc::new(ReqwestTransport::new(self.user_agent)),
        })
    }
}

#[derive(Clone)]
/// SMS adapter for the Sipgate REST API (`POST /v2/sessions/sms`, basic auth).
pub struct SipgateClient {
    config: Arc<dyn ConfigStore<SipgateSettings>>,
    endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl SipgateClient {
    /// Create a client using the default endpoint.
    pub fn new(config: impl ConfigStore<SipgateSettings> + 'static) -> Self {
        Self {
            config: Arc::new(config),
            endpoint: DEFAULT_SIPGATE_ENDPOINT.to_owned(),
            http: Arc::new(ReqwestTransport::new(None)),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(config: impl ConfigStore<SipgateSettings> + 'static) -> SipgateClientBuilder {
        SipgateClientBuilder::new(config)
    }

    /// Send `text` to every enabled recipient. See [`Self::try_send_message`].
    pub async fn send_message(&self, text: &str) -> bool {
        match self.try_send_message(text).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(op = "send_message", error = %err, "Sipgate broadcast failed");
                false
            }
        }
    }

    /// Send `text` to one recipient. See [`Self::try_send_message_ex`].
    pub async fn send_message_ex(&self, text: &str, phone_number: &str) -> bool {
        match self.try_send_message_ex(text, phone_number).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    op = "send_message_ex",
                    recipient = phone_number,
                    error = %err,
                    "Sipgate send failed"
                );
                false
            }
        }
    }

    /// Send `text` to every enabled recipient, one after another, without
    /// stopping at the first failure.
    pub async fn try_send_message(&self, text: &str) -> Result<(), SmsError> {
        let settings = self.settings()?;
        ensure_active(settings.active)?;
        let text = MessageText::new(text)?;

        let recipients = settings.recipients();
        if recipients.is_empty() {
            return Err(SmsError::NoRecipients);
        }

        let mut failed = 0;
        for recipient in &recipients {
            if let Err(err) = self
                .send_data(&settings, &text, &recipient.phone_number)
                .await
            {
                tracing::warn!(
                    op = "send_data",
                    recipient = %recipient.phone_number,
                    error = %err,
                    "Sipgate send failed"
                );
                failed += 1;
            }
        }
        broadcast_result(failed, recipients.len())
    }

    /// Send `text` to `phone_number`, which must be longer than three characters.
    ///
    /// The reply body is not inspected beyond being non-empty; a body of
    /// whitespace still counts.
    pub async fn try_send_message_ex(&self, text: &str, phone_number: &str) -> Result<(), SmsError> {
        let settings = self.settings()?;
        ensure_active(settings.active)?;
        let text = MessageText::new(text)?;
        self.send_data(&settings, &text, phone_number).await
    }

    /// Check the stored settings without contacting the gateway.
    pub fn validate_configuration(&self) -> Result<ConfigStatus, SmsError> {
        let status = self.settings()?.validate();
        match &status {
            ConfigStatus::Invalid(problems) => {
                for problem in problems {
                    tracing::warn!(problem = %problem, "Sipgate configuration problem");
                }
            }
            ConfigStatus::Inactive => tracing::warn!("Sipgate instance is inactive"),
            ConfigStatus::Active => {}
        }
        Ok(status)
    }

    fn settings(&self) -> Result<SipgateSettings, SmsError> {
        self.config.snapshot().map_err(SmsError::Config)
    }

    async fn send_data(
        &self,
        settings: &SipgateSettings,
        text: &MessageText,
        phone_number: &str,
    ) -> Result<(), SmsError> {
        let recipient = RawPhoneNumber::new(phone_number)?;
        let user = settings.user()?;
        let password = settings.password()?;

        let request = encode_send_request(&self.endpoint, &user, &password, &recipient, text)
            .map_err(|err| SmsError::Encode(Box::new(err)))?;
        let response = dispatch(self.http.as_ref(), &request, settings.connect_timeout()).await?;

        if response.body.is_empty() {
            return Err(SmsError::EmptyResponse);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::testing::FakeTransport;
    use super::*;
    use crate::domain::Method;
    use crate::host::StaticConfig;

    fn settings() -> SipgateSettings {
        SipgateSettings {
            user: "user".to_owned(),
            password: "secret".to_owned(),
            timeout_ms: 1000,
            recipients: r#"[
                {"Use": true, "PhoneNumber": "+491111111"},
                {"Use": true, "PhoneNumber": "+493333333"}
            ]"#
            .to_owned(),
            ..Default::default()
        }
    }

    fn make_client(settings: SipgateSettings, transport: FakeTransport) -> SipgateClient {
        SipgateClient {
            config: Arc::new(StaticConfig::new(settings)),
            endpoint: "https://example.invalid/v2/sessions/sms".to_owned(),
            http: Arc::new(transport),
        }
    }

    #[tokio::test]
    async fn send_message_ex_posts_json_with_basic_auth() {
        let transport = FakeTransport::new().respond(200, r#"{"ok":true}"#);
        let client = make_client(settings(), transport.clone());

        assert!(client.send_message_ex("Hello", "+491234567").await);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let (request, connect_timeout) = &requests[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "https://example.invalid/v2/sessions/sms");
        assert_eq!(
            request.body.as_deref(),
            Some(r#"{"smsId":"s0","recipient":"+491234567","message":"Hello"}"#)
        );
        assert_eq!(
            request.basic_auth,
            Some(("user".to_owned(), "secret".to_owned()))
        );
        assert_eq!(*connect_timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn reply_body_content_is_not_inspected() {
        let transport = FakeTransport::new().respond(200, r#"{"isError":true}"#);
        let client = make_client(settings(), transport);

        assert!(client.send_message_ex("Hello", "+491234567").await);
    }

    #[tokio::test]
    async fn empty_reply_is_a_failure() {
        let transport = FakeTransport::new().respond(204, "");
        let client = make_client(settings(), transport);

        let err = client
            .try_send_message_ex("Hello", "+491234567")
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::EmptyResponse));
    }

    #[tokio::test]
    async fn whitespace_reply_counts_as_sent() {
        let transport = FakeTransport::new().respond(200, "\n").respond(201, " ");
        let client = make_client(settings(), transport);

        assert!(client.send_message_ex("Hello", "+491234567").await);
        assert!(client.send_message_ex("Hello", "+491234567").await);
    }

    #[tokio::test]
    async fn transport_timeout_is_a_failure() {
        let transport = FakeTransport::new().fail("operation timed out");
        let client = make_client(settings(), transport.clone());

        let err = client
            .try_send_message_ex("Hello", "+491234567")
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::Transport(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn http_error_is_a_failure() {
        let transport = FakeTransport::new().respond(403, "");
        let client = make_client(settings(), transport);

        assert!(!client.send_message_ex("Hello", "+491234567").await);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_network() {
        let transport = FakeTransport::new();
        let client = make_client(settings(), transport.clone());
        assert!(!client.send_message_ex("Hello", "+49").await);
        assert!(!client.send_message_ex("", "+491234567").await);

        let client = make_client(
            SipgateSettings {
                password: "abc".to_owned(),
                ..settings()
            },
            transport.clone(),
        );
        assert!(!client.send_message_ex("Hello", "+491234567").await);

        let client = make_client(
            SipgateSettings {
                active: false,
                ..settings()
            },
            transport.clone(),
        );
        assert!(!client.send_message("Hello").await);

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn broadcast_continues_after_a_failure() {
        let transport = FakeTransport::new()
            .fail("connection refused")
            .respond(200, r#"{}"#);
        let client = make_client(settings(), transport.clone());

        assert!(!client.send_message("Alarm").await);

        let bodies = transport
            .requests()
            .into_iter()
            .map(|(request, _)| request.body.unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(bodies.len(), 2);
        assert!(bodies[0].contains("+491111111"));
        assert!(bodies[1].contains("+493333333"));
    }

    #[tokio::test]
    async fn broadcast_without_recipients_makes_no_call() {
        let transport = FakeTransport::new();
        let client = make_client(
            SipgateSettings {
                recipients: "[]".to_owned(),
                ..settings()
            },
            transport.clone(),
        );

        let err = client.try_send_message("Alarm").await.unwrap_err();
        assert!(matches!(err, SmsError::NoRecipients));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn builder_endpoint_override_is_applied() {
        let client = SipgateClient::builder(StaticConfig::new(settings()))
            .endpoint("http://127.0.0.1:9000/v2/sessions/sms")
            .user_agent("smsgate-test")
            .build()
            .unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:9000/v2/sessions/sms");

        let client = SipgateClient::new(StaticConfig::new(settings()));
        assert_eq!(client.endpoint, DEFAULT_SIPGATE_ENDPOINT);
        assert_eq!(client.validate_configuration().unwrap(), ConfigStatus::Active);
    }
}
