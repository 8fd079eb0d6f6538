use std::collections::BTreeMap;

use crate::clock::Clock;
use crate::domain::validation::{ValidationError, validate_multi, validate_single};
use crate::domain::value::{DispatchKey, Receiver, ScheduledTime, SenderNumber, SmsType};
use crate::settings::Settings;
use crate::xml;

/// Title used when the caller does not provide one. Only LMS variants display it.
pub const DEFAULT_TITLE: &str = "SEND";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Per-send options. Defaults: title `SEND`, type `sms`, send immediately, no context.
pub struct SendOptions {
    pub title: String,
    pub sms_type: SmsType,
    pub scheduled_time: ScheduledTime,
    /// Caller data handed to the send hooks of this call only. Never sent to the gateway.
    pub context: BTreeMap<String, String>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            sms_type: SmsType::default(),
            scheduled_time: ScheduledTime::default(),
            context: BTreeMap::new(),
        }
    }
}

impl SendOptions {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn sms_type(mut self, sms_type: SmsType) -> Self {
        self.sms_type = sms_type;
        self
    }

    pub fn scheduled_time(mut self, scheduled_time: ScheduledTime) -> Self {
        self.scheduled_time = scheduled_time;
        self
    }

    pub fn context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A validated send, ready to be rendered into the vendor payload.
///
/// `message` and `title` are stored XML-escaped; `receiver` is either the single number or
/// the comma-joined deduplicated set of numbers.
pub struct SendRequest {
    sender: SenderNumber,
    sms_type: SmsType,
    message: String,
    receiver: String,
    title: String,
    scheduled_time: ScheduledTime,
    key: DispatchKey,
    context: BTreeMap<String, String>,
}

impl SendRequest {
    /// Validate the inputs and assemble a request keyed by the current clock second.
    ///
    /// Reads the clock only after validation succeeds; nothing else is touched.
    pub fn build(
        message: &str,
        receiver: &Receiver,
        options: &SendOptions,
        settings: &Settings,
        clock: &dyn Clock,
    ) -> Result<Self, ValidationError> {
        let sms_type = options.sms_type;
        let receiver = if sms_type.is_multi() {
            validate_multi(message, receiver, sms_type.label())?
                .into_iter()
                .collect::<Vec<_>>()
                .join(",")
        } else {
            validate_single(message, receiver, sms_type.label())?.to_owned()
        };

        let seconds = clock.now().timestamp().max(0) as u64;

        Ok(Self {
            sender: settings.sender().clone(),
            sms_type,
            message: xml::escape(message).into_owned(),
            receiver,
            title: xml::escape(&options.title).into_owned(),
            scheduled_time: options.scheduled_time.clone(),
            key: DispatchKey::new(seconds),
            context: options.context.clone(),
        })
    }

    pub fn sender(&self) -> &SenderNumber {
        &self.sender
    }

    /// Variant requested by the caller.
    pub fn sms_type(&self) -> SmsType {
        self.sms_type
    }

    /// Value of the protocol's type field (`sms` or `lms`).
    pub fn wire_type(&self) -> &'static str {
        self.sms_type.wire_label()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn scheduled_time(&self) -> &ScheduledTime {
        &self.scheduled_time
    }

    pub fn key(&self) -> DispatchKey {
        self.key
    }

    /// Context supplied through [`SendOptions::context`] for this call.
    pub fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }
}
