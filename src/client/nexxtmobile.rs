use std::sync::Arc;

use url::Url;

use super::balance::BalancePoller;
use super::{
    HttpTransport, ReqwestTransport, SmsError, broadcast_result, dispatch, ensure_active,
};
use crate::domain::{
    ConfigStatus, ErrorFlag, MessageText, NexxtMobileSettings, RawPhoneNumber,
};
use crate::host::{ConfigStore, MemoryScheduler, MemoryValueStore, Scheduler, ValueStore};
use crate::transport::nexxtmobile::{decode_response, encode_balance_request, encode_send_request};

pub const DEFAULT_NEXXTMOBILE_ENDPOINT: &str = "https://api.nexxtmobile.de/";

/// Builder for [`NexxtMobileClient`].
///
/// Use this to plug in the host's scheduler and value store, or to point the
/// client at a different endpoint.
pub struct NexxtMobileClientBuilder {
    config: Arc<dyn ConfigStore<NexxtMobileSettings>>,
    endpoint: String,
    user_agent: Option<String>,
    scheduler: Arc<dyn Scheduler>,
    values: Arc<dyn ValueStore>,
}

impl NexxtMobileClientBuilder {
    /// Create a builder with the default endpoint and in-memory collaborators.
    pub fn new(config: impl ConfigStore<NexxtMobileSettings> + 'static) -> Self {
        Self {
            config: Arc::new(config),
            endpoint: DEFAULT_NEXXTMOBILE_ENDPOINT.to_owned(),
            user_agent: None,
            scheduler: Arc::new(MemoryScheduler::new()),
            values: Arc::new(MemoryValueStore::new()),
        }
    }

    /// Override the gateway base URL (query parameters are appended to it).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Timer collaborator used for the follow-up balance refresh.
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Value collaborator receiving the formatted balance.
    pub fn value_store(mut self, values: Arc<dyn ValueStore>) -> Self {
        self.values = values;
        self
    }

    /// Build a [`NexxtMobileClient`].
    pub fn build(self) -> Result<NexxtMobileClient, SmsError> {
        let endpoint = Url::parse(&self.endpoint)?;
        Ok(NexxtMobileClient {
            config: self.config,
            endpoint: endpoint.into(),
            http: Arc::new(ReqwestTransport::new(self.user_agent)),
            poller: BalancePoller::new(self.scheduler, self.values),
        })
    }
}

#[derive(Clone)]
/// SMS adapter for the NeXXt Mobile gateway.
///
/// Sends are plain `GET` requests against `https://api.nexxtmobile.de/`. Every
/// successful send arms the `GetCurrentBalance` timer for 30 seconds; when the
/// host fires it, call [`NexxtMobileClient::get_current_balance`].
pub struct NexxtMobileClient {
    config: Arc<dyn ConfigStore<NexxtMobileSettings>>,
    endpoint: String,
    http: Arc<dyn HttpTransport>,
    poller: BalancePoller,
}

impl NexxtMobileClient {
    /// Create a client using the default endpoint and in-memory collaborators.
    ///
    /// For more customization, use [`NexxtMobileClient::builder`].
    pub fn new(config: impl ConfigStore<NexxtMobileSettings> + 'static) -> Self {
        Self {
            config: Arc::new(config),
            endpoint: DEFAULT_NEXXTMOBILE_ENDPOINT.to_owned(),
            http: Arc::new(ReqwestTransport::new(None)),
            poller: BalancePoller::new(
                Arc::new(MemoryScheduler::new()),
                Arc::new(MemoryValueStore::new()),
            ),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(
        config: impl ConfigStore<NexxtMobileSettings> + 'static,
    ) -> NexxtMobileClientBuilder {
        NexxtMobileClientBuilder::new(config)
    }

    /// Send `text` to every enabled recipient. See [`Self::try_send_message`].
    pub async fn send_message(&self, text: &str) -> bool {
        match self.try_send_message(text).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(op = "send_message", error = %err, "NeXXt Mobile broadcast failed");
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
                    "NeXXt Mobile send failed"
                );
                false
            }
        }
    }

    /// Send `text` to every enabled recipient, one after another.
    ///
    /// A failing recipient does not stop the remaining ones; the broadcast
    /// succeeds only if every send did.
    ///
    /// Errors:
    /// - [`SmsError::Inactive`] / [`SmsError::Validation`] before any request,
    /// - [`SmsError::NoRecipients`] when no entry is enabled,
    /// - [`SmsError::Broadcast`] when at least one recipient failed.
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
                    "NeXXt Mobile send failed"
                );
                failed += 1;
            }
        }
        broadcast_result(failed, recipients.len())
    }

    /// Send `text` to `phone_number`, which must be longer than three characters.
    ///
    /// Errors:
    /// - [`SmsError::Validation`] for empty text, short numbers, numbers with
    ///   characters that are not query-safe, or unusable credentials,
    /// - [`SmsError::Transport`] / [`SmsError::HttpStatus`] for failed requests,
    /// - [`SmsError::Api`] when the reply sets `isError` or lacks it entirely.
    pub async fn try_send_message_ex(&self, text: &str, phone_number: &str) -> Result<(), SmsError> {
        let settings = self.settings()?;
        ensure_active(settings.active)?;
        let text = MessageText::new(text)?;
        self.send_data(&settings, &text, phone_number).await
    }

    /// Refresh the stored balance; intended as the `GetCurrentBalance` timer callback.
    ///
    /// Disarms the timer first, so a refresh triggered by a send runs once.
    /// Failures leave the stored balance untouched and are only logged.
    pub async fn get_current_balance(&self) {
        self.poller.disarm();
        if let Err(err) = self.refresh_balance().await {
            tracing::warn!(op = "get_current_balance", error = %err, "balance refresh failed");
        }
    }

    /// Query the balance and store it; returns the stored value (e.g. `"12,34 €"`).
    ///
    /// A missing or set `isError` flag is logged but does not prevent storing a
    /// balance that is present in the reply.
    pub async fn refresh_balance(&self) -> Result<String, SmsError> {
        let settings = self.settings()?;
        ensure_active(settings.active)?;
        let token = settings.token()?;

        let request = encode_balance_request(&self.endpoint, &token);
        let response = dispatch(self.http.as_ref(), &request, settings.connect_timeout()).await?;

        let reply = decode_response(&response.body)
            .map_err(|err| SmsError::Parse(Box::new(err)))?
            .ok_or(SmsError::EmptyResponse)?;
        match reply.is_error {
            ErrorFlag::Set(false) => {}
            ErrorFlag::Set(true) => {
                tracing::warn!(op = "refresh_balance", "gateway flagged the balance reply as error");
            }
            ErrorFlag::Absent => {
                tracing::warn!(op = "refresh_balance", "balance reply carries no isError flag");
            }
        }

        let balance = reply.balance_formatted.ok_or(SmsError::MissingBalance)?;
        Ok(self.poller.publish(&balance))
    }

    /// Check the stored settings without contacting the gateway.
    pub fn validate_configuration(&self) -> Result<ConfigStatus, SmsError> {
        let status = self.settings()?.validate();
        match &status {
            ConfigStatus::Invalid(problems) => {
                for problem in problems {
                    tracing::warn!(problem = %problem, "NeXXt Mobile configuration problem");
                }
            }
            ConfigStatus::Inactive => tracing::warn!("NeXXt Mobile instance is inactive"),
            ConfigStatus::Active => {}
        }
        Ok(status)
    }

    fn settings(&self) -> Result<NexxtMobileSettings, SmsError> {
        self.config.snapshot().map_err(SmsError::Config)
    }

    async fn send_data(
        &self,
        settings: &NexxtMobileSettings,
        text: &MessageText,
        phone_number: &str,
    ) -> Result<(), SmsError> {
        let recipient = RawPhoneNumber::new(phone_number)?;
        // The recipient goes into the query unescaped.
        recipient.ensure_query_safe()?;
        let token = settings.token()?;
        let sender = settings.sender_number()?;

        let request = encode_send_request(&self.endpoint, &token, &sender, &recipient, text);
        let response = dispatch(self.http.as_ref(), &request, settings.connect_timeout()).await?;

        // An empty 2xx body counts as accepted.
        let reply = decode_response(&response.body).map_err(|err| SmsError::Parse(Box::new(err)))?;
        if let Some(reply) = reply {
            match reply.is_error {
                ErrorFlag::Set(false) => {}
                ErrorFlag::Set(true) => return Err(SmsError::Api("gateway reported an error")),
                ErrorFlag::Absent => return Err(SmsError::Api("reply carries no isError flag")),
            }
        }

        self.poller.arm();
        Ok(())
    }
}
