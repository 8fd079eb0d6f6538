use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::value::Receiver;

/// Korean mobile numbering: `01` + carrier digit + 7 or 8 subscriber digits.
pub const PHONE_NUMBER_PATTERN: &str = r"^01[016789][0-9]{7,8}$";

static PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(PHONE_NUMBER_PATTERN).unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    UnknownSmsType { input: String },
    ExpectedSingleReceiver { sms_type: &'static str },
    ExpectedReceiverCollection { sms_type: &'static str },
    InvalidPhoneNumber { input: String },
    InvalidScheduledTime { input: String },
    InvalidDispatchKey { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::UnknownSmsType { input } => write!(f, "unknown sms type: {input}"),
            Self::ExpectedSingleReceiver { sms_type } => {
                write!(f, "{sms_type} expects a single receiver")
            }
            Self::ExpectedReceiverCollection { sms_type } => {
                write!(f, "{sms_type} expects a collection of receivers")
            }
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidScheduledTime { input } => {
                write!(
                    f,
                    "invalid scheduled time: {input} (expected \"0\" or YYYY-MM-DD hh:mm:ss)"
                )
            }
            Self::InvalidDispatchKey { input } => write!(f, "invalid dispatch key: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub(crate) fn is_phone_number(input: &str) -> bool {
    PHONE_NUMBER.is_match(input)
}

// Whitespace-only text counts as empty. The legacy client only rejected empty values.
fn require_message(message: &str) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        return Err(ValidationError::Empty { field: "message" });
    }
    Ok(())
}

fn require_phone_number(input: &str) -> Result<(), ValidationError> {
    if !is_phone_number(input) {
        return Err(ValidationError::InvalidPhoneNumber {
            input: input.to_owned(),
        });
    }
    Ok(())
}

/// Checks a single-recipient send and returns the receiver number.
pub(crate) fn validate_single<'a>(
    message: &str,
    receiver: &'a Receiver,
    sms_type: &'static str,
) -> Result<&'a str, ValidationError> {
    require_message(message)?;
    if receiver.is_empty() {
        return Err(ValidationError::Empty {
            field: Receiver::FIELD,
        });
    }

    let Receiver::One(number) = receiver else {
        return Err(ValidationError::ExpectedSingleReceiver { sms_type });
    };
    require_phone_number(number)?;
    Ok(number.as_str())
}

/// Checks a bulk send and returns the deduplicated receivers.
///
/// Duplicates are collapsed before the numbers are checked, so each distinct
/// number is validated once.
pub(crate) fn validate_multi<'a>(
    message: &str,
    receivers: &'a Receiver,
    sms_type: &'static str,
) -> Result<BTreeSet<&'a str>, ValidationError> {
    require_message(message)?;
    if receivers.is_empty() {
        return Err(ValidationError::Empty {
            field: Receiver::FIELD,
        });
    }

    let Receiver::Many(numbers) = receivers else {
        return Err(ValidationError::ExpectedReceiverCollection { sms_type });
    };

    let unique = numbers.iter().map(String::as_str).collect::<BTreeSet<_>>();
    for number in &unique {
        require_phone_number(number)?;
    }
    Ok(unique)
}
