//! SMS notification adapters for the NeXXt Mobile and Sipgate HTTP APIs.
//!
//! Each adapter turns a settings snapshot (credentials, recipients, connect
//! timeout) plus a text into gateway requests and reports plain success or
//! failure. The layout follows three layers: a domain layer of strong types,
//! a transport layer for wire-format quirks, and a small client layer
//! orchestrating requests. Host collaborators (settings, timers, displayed
//! values) are injected through the traits in [`host`].
//!
//! ```rust,no_run
//! use smsgate::{NexxtMobileClient, NexxtMobileSettings, StaticConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = NexxtMobileSettings {
//!         token: "...".to_owned(),
//!         sender_number: "+4917012345".to_owned(),
//!         ..Default::default()
//!     };
//!     let client = NexxtMobileClient::new(StaticConfig::new(settings));
//!     let sent = client.send_message_ex("Door opened", "+491701234567").await;
//!     println!("sent: {sent}");
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
pub mod host;
pub mod transport;

pub use client::{
    BALANCE_TIMER, BALANCE_VALUE, NexxtMobileClient, NexxtMobileClientBuilder, SipgateClient,
    SipgateClientBuilder, SmsError,
};
pub use domain::{
    ConfigStatus, HttpRequest, MessageText, NexxtMobileSettings, Password, PhoneNumber,
    RawPhoneNumber, Recipient, SenderNumber, SipgateSettings, Token, User, ValidationError,
    resolve_recipients,
};
pub use host::{
    ConfigStore, MemoryScheduler, MemoryValueStore, Scheduler, StaticConfig, ValueStore,
};
