//! Transport layer: the XML-RPC envelope, vendor payloads and response parsing.

mod result_code;
mod send_sms;
mod xmlrpc;

use std::error::Error as StdError;

pub use result_code::parse_result_code;
pub use send_sms::{encode_send_payload, encode_send_result_payload};
pub use xmlrpc::{METHOD_NAME, decode_method_response, encode_method_call};

#[derive(Debug, thiserror::Error)]
/// Faults talking to the gateway. Logged by the client, never returned to callers.
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(#[source] Box<dyn StdError + Send + Sync>),

    #[error("unexpected HTTP status: {status} (body: {body:?})")]
    HttpStatus { status: u16, body: Option<String> },

    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i32, message: String },

    #[error("malformed XML-RPC response: {0}")]
    MalformedResponse(&'static str),

    #[error("response does not contain a result code")]
    MissingResultCode,
}
