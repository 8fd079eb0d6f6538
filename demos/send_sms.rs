use std::io;

use gabia_sms::{GabiaSmsClient, Receiver, SendOptions, Settings, SmsType};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let receivers = std::env::var("GABIA_SMS_RECEIVER").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "GABIA_SMS_RECEIVER environment variable is required (comma-separated for bulk)",
        )
    })?;
    let message = std::env::var("GABIA_SMS_MESSAGE")
        .unwrap_or_else(|_| "Hello from the gabia-sms demo.".to_owned());
    let sms_type = match std::env::var("GABIA_SMS_TYPE") {
        Ok(value) => SmsType::parse(&value)?,
        Err(_) => SmsType::default(),
    };

    let receiver = if sms_type.is_multi() {
        Receiver::Many(receivers.split(',').map(str::to_owned).collect())
    } else {
        Receiver::One(receivers)
    };

    // Reads GABIA_SMS_API_ID, GABIA_SMS_API_KEY and GABIA_SMS_SENDER.
    let client = GabiaSmsClient::builder(Settings::from_env()?)
        .after_send(|request| {
            println!("sent {} to {}", request.key(), request.receiver());
            Ok(())
        })
        .build()?;

    let key = client
        .send(&message, receiver, SendOptions::default().sms_type(sms_type))
        .await?;
    println!("dispatch key: {key}");

    Ok(())
}
