use std::io;
use std::sync::Arc;

use smsgate::{
    BALANCE_VALUE, MemoryValueStore, NexxtMobileClient, NexxtMobileSettings, PhoneNumber,
    RawPhoneNumber, StaticConfig,
};
use tracing_subscriber::EnvFilter;

fn required(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smsgate=debug")),
        )
        .init();

    let settings = NexxtMobileSettings {
        token: required("NEXXTMOBILE_TOKEN")?,
        sender_number: required("NEXXTMOBILE_SENDER")?,
        ..Default::default()
    };
    let phone: RawPhoneNumber = PhoneNumber::parse(
        Some(phonenumber::country::Id::DE),
        required("NEXXTMOBILE_PHONE")?,
    )?
    .into();
    let message = std::env::var("NEXXTMOBILE_MESSAGE")
        .unwrap_or_else(|_| "Hello from the smsgate demo.".to_owned());

    let values = Arc::new(MemoryValueStore::new());
    let client = NexxtMobileClient::builder(StaticConfig::new(settings))
        .value_store(values.clone())
        .build()?;

    let sent = client.send_message_ex(&message, phone.raw()).await;
    println!("sent: {sent}");

    // No host timer here; query right away instead of after 30 seconds.
    client.get_current_balance().await;
    println!("balance: {:?}", values.get(BALANCE_VALUE));

    Ok(())
}
