//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod token;
mod validation;
mod value;

pub use request::{DEFAULT_TITLE, SendOptions, SendRequest};
pub use token::AccessToken;
pub use validation::{PHONE_NUMBER_PATTERN, ValidationError};
pub use value::{
    ApiId, ApiKey, DispatchKey, Receiver, ResultCode, ScheduledTime, SenderNumber, SmsType,
};
