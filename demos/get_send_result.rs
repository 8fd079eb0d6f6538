use std::io;

use gabia_sms::{DispatchKey, GabiaSmsClient, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let key: DispatchKey = std::env::var("GABIA_SMS_KEY")
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "GABIA_SMS_KEY environment variable is required",
            )
        })?
        .parse()?;

    let client = GabiaSmsClient::new(Settings::from_env()?);
    let code = client.get_send_result(key).await?;
    println!("key: {key}, result code: {code}, success: {}", code.is_success());

    Ok(())
}
