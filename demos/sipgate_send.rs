use std::io;

use smsgate::{ConfigStatus, SipgateClient, SipgateSettings, StaticConfig};
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

    // SIPGATE_PROPERTIES holds the instance's property document, e.g.
    // {"User":"...","Password":"...","Recipients":"[{\"Use\":true,\"PhoneNumber\":\"+49...\"}]"}
    let settings = SipgateSettings::from_properties(&required("SIPGATE_PROPERTIES")?)?;
    let message =
        std::env::var("SIPGATE_MESSAGE").unwrap_or_else(|_| "Hello from the smsgate demo.".to_owned());

    let client = SipgateClient::new(StaticConfig::new(settings));
    let status = client.validate_configuration()?;
    if status != ConfigStatus::Active {
        println!("configuration not usable: {status:?}");
        return Ok(());
    }

    let sent = client.send_message(&message).await;
    println!("sent to all enabled recipients: {sent}");

    Ok(())
}
