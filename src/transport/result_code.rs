use once_cell::sync::Lazy;
use regex::Regex;

use super::TransportError;
use crate::domain::ResultCode;

static CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<code>\s*([0-9a-z]{4})\s*</code>").unwrap());

/// Extract the four-character status from a gateway response document.
///
/// The gateway answers every method with `<response><code>....</code>...</response>`;
/// the first `<code>` element wins.
pub fn parse_result_code(response: &str) -> Result<ResultCode, TransportError> {
    CODE.captures(response)
        .and_then(|it| it.get(1))
        .map(|it| ResultCode::new(it.as_str()))
        .ok_or(TransportError::MissingResultCode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_response() {
        let response = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <code>0000</code>
  <mesg>success</mesg>
  <result>
    <BEFORE_SMS_QTY>100</BEFORE_SMS_QTY>
    <AFTER_SMS_QTY>99</AFTER_SMS_QTY>
  </result>
</response>"#;
        let code = parse_result_code(response).unwrap();
        assert_eq!(code, "0000");
        assert!(code.is_success());
    }

    #[test]
    fn parses_failure_code_verbatim() {
        let response = "<response><code>E002</code><mesg>invalid access token</mesg></response>";
        assert_eq!(parse_result_code(response).unwrap(), "E002");
    }

    #[test]
    fn first_code_element_wins() {
        let response = "<response><code> 0001 </code><result><code>0000</code></result></response>";
        assert_eq!(parse_result_code(response).unwrap(), "0001");
    }

    #[test]
    fn missing_code_is_an_error() {
        for response in ["", "<response><mesg>ok</mesg></response>", "<code>12345</code>"] {
            assert!(matches!(
                parse_result_code(response),
                Err(TransportError::MissingResultCode)
            ));
        }
    }
}
