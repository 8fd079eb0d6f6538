use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Gabia SMS account identifier (`sms-id` on the wire).
///
/// Invariant: non-empty after trimming.
pub struct ApiId(String);

impl ApiId {
    /// Settings key the value is read from.
    pub const SETTING: &'static str = "API_ID";

    /// Create a validated [`ApiId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: Self::SETTING,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Secret API key mixed into every access token. Never sent on the wire.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    /// Settings key the value is read from.
    pub const SETTING: &'static str = "API_KEY";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: Self::SETTING,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the secret.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Registered sender (callback) number.
///
/// Invariant: non-empty after trimming. The number must be registered with the gateway;
/// its shape is not checked locally.
pub struct SenderNumber(String);

impl SenderNumber {
    /// Settings key the value is read from.
    pub const SETTING: &'static str = "SENDER";

    /// Create a validated [`SenderNumber`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: Self::SETTING,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the sender number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Message variant: short or long message, to one receiver or many.
pub enum SmsType {
    /// Short message to a single receiver.
    #[default]
    Sms,
    /// Long message (LMS) to a single receiver.
    Lms,
    /// Short message to a collection of receivers.
    MultiSms,
    /// Long message to a collection of receivers.
    MultiLms,
}

impl SmsType {
    pub const ALL: [SmsType; 4] = [Self::Sms, Self::Lms, Self::MultiSms, Self::MultiLms];

    /// Parse one of `sms`, `lms`, `multi_sms`, `multi_lms`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|it| it.label() == input)
            .ok_or_else(|| ValidationError::UnknownSmsType {
                input: input.to_owned(),
            })
    }

    /// Label as accepted by [`SmsType::parse`].
    pub fn label(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Lms => "lms",
            Self::MultiSms => "multi_sms",
            Self::MultiLms => "multi_lms",
        }
    }

    /// Value of the protocol's `send_type` field. Bulk variants are narrowed to their
    /// base type; bulk is signalled by the request template instead.
    pub fn wire_label(self) -> &'static str {
        match self {
            Self::Sms | Self::MultiSms => "sms",
            Self::Lms | Self::MultiLms => "lms",
        }
    }

    /// Whether this variant addresses a collection of receivers.
    pub fn is_multi(self) -> bool {
        matches!(self, Self::MultiSms | Self::MultiLms)
    }
}

impl FromStr for SmsType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SmsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Receiver argument of a send: one number, or a collection for bulk variants.
///
/// Numbers are not validated on construction; validation depends on the [`SmsType`] of the
/// send and happens when the request is built.
pub enum Receiver {
    One(String),
    Many(Vec<String>),
}

impl Receiver {
    /// Field name used in validation errors.
    pub const FIELD: &'static str = "receiver";

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(number) => number.trim().is_empty(),
            Self::Many(numbers) => numbers.is_empty(),
        }
    }
}

impl From<&str> for Receiver {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<String> for Receiver {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for Receiver {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl From<Vec<&str>> for Receiver {
    fn from(value: Vec<&str>) -> Self {
        Self::Many(value.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Receiver {
    fn from(value: [&str; N]) -> Self {
        Self::Many(value.into_iter().map(str::to_owned).collect())
    }
}

impl From<BTreeSet<String>> for Receiver {
    fn from(value: BTreeSet<String>) -> Self {
        Self::Many(value.into_iter().collect())
    }
}

impl<S> From<HashSet<String, S>> for Receiver {
    fn from(value: HashSet<String, S>) -> Self {
        Self::Many(value.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Reservation time (`reserve`): `"0"` sends immediately, otherwise `YYYY-MM-DD hh:mm:ss`
/// in the gateway's local time.
pub struct ScheduledTime(String);

impl ScheduledTime {
    const IMMEDIATELY: &'static str = "0";
    const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// Send as soon as the gateway accepts the request.
    pub fn immediately() -> Self {
        Self(Self::IMMEDIATELY.to_owned())
    }

    /// Reserve delivery for the given local time.
    pub fn at(time: NaiveDateTime) -> Self {
        Self(time.format(Self::FORMAT).to_string())
    }

    /// Parse `"0"` or a `YYYY-MM-DD hh:mm:ss` timestamp.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed == Self::IMMEDIATELY {
            return Ok(Self::immediately());
        }
        NaiveDateTime::parse_from_str(trimmed, Self::FORMAT)
            .map(Self::at)
            .map_err(|_| ValidationError::InvalidScheduledTime {
                input: input.to_owned(),
            })
    }

    pub fn is_immediate(&self) -> bool {
        self.0 == Self::IMMEDIATELY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScheduledTime {
    fn default() -> Self {
        Self::immediately()
    }
}

impl FromStr for ScheduledTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Correlation id of a send (`ref_key`), in whole seconds since the Unix epoch.
///
/// Two sends built within the same second receive the same key; the gateway expects the
/// plain seconds value, so no disambiguator is added.
pub struct DispatchKey(u64);

impl DispatchKey {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for DispatchKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for DispatchKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidDispatchKey {
                input: s.to_owned(),
            })
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Status code reported by the gateway, preserved as-is.
pub struct ResultCode(String);

impl ResultCode {
    /// Code reported for an accepted request.
    pub const SUCCESS: &'static str = "0000";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for ResultCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
