//! Typed Rust client for the Gabia SMS XML-RPC API.
//!
//! The crate is split into a domain layer of validated types (settings, receivers, request
//! construction, access tokens), a transport layer for the XML-RPC envelope and vendor payloads,
//! and a small client layer that runs the send and result-lookup flows.
//!
//! ```rust,no_run
//! use gabia_sms::{GabiaSmsClient, SendOptions, Settings, SmsType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gabia_sms::GabiaSmsError> {
//!     let client = GabiaSmsClient::new(Settings::from_env()?);
//!
//!     let key = client
//!         .send("hello", "01012345678", SendOptions::default())
//!         .await?;
//!     let _bulk = client
//!         .send(
//!             "hello all",
//!             vec!["01012345678", "01198765432"],
//!             SendOptions::default().sms_type(SmsType::MultiSms),
//!         )
//!         .await?;
//!
//!     let code = client.get_send_result(key).await?;
//!     println!("result: {code}");
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod clock;
pub mod domain;
pub mod settings;
mod transport;
pub mod xml;

pub use client::{
    GabiaSmsClient, GabiaSmsClientBuilder, GabiaSmsError, GatewayError, HookError,
    ResultCodePolicy, SendHook,
};
pub use clock::{Clock, SystemClock};
pub use domain::{
    AccessToken, ApiId, ApiKey, DEFAULT_TITLE, DispatchKey, PHONE_NUMBER_PATTERN, Receiver,
    ResultCode, ScheduledTime, SendOptions, SendRequest, SenderNumber, SmsType, ValidationError,
};
pub use settings::{ConfigurationError, EnvSettings, REQUIRED_SETTINGS, Settings, SettingsSource};
