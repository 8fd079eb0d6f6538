use once_cell::sync::Lazy;
use regex::Regex;

use super::TransportError;
use crate::xml;

/// The gateway exposes a single remote procedure taking one string argument.
pub const METHOD_NAME: &str = "gabiasms";

static FAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<fault(?:\s[^>]*)?>(.*?)</fault\s*>").unwrap());

static MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<member(?:\s[^>]*)?>\s*<name(?:\s[^>]*)?>([^<]*)</name\s*>\s*(<value.*?</value\s*>)",
    )
    .unwrap()
});

static FIRST_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<params(?:\s[^>]*)?>\s*<param(?:\s[^>]*)?>\s*(<value.*?</value\s*>)").unwrap()
});

// Groups: 1 = self-closing type, 2/3 = typed value and its text, 4 = untyped text.
// Text may mix escaped characters and CDATA sections but no nested elements.
static SCALAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?s)^<value(?:\s[^>]*)?>\s*(?:",
        r"<([A-Za-z0-9.]+)[^>]*/>",
        r"|<([A-Za-z0-9.]+)(?:\s[^>]*)?>((?:<!\[CDATA\[.*?\]\]>|[^<])*)</[A-Za-z0-9.]+\s*>",
        r"|((?:<!\[CDATA\[.*?\]\]>|[^<])*)",
        r")\s*</value\s*>$",
    ))
    .unwrap()
});

static CDATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>").unwrap());

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Encode a `methodCall` with a single string parameter.
pub fn encode_method_call(method: &str, argument: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\
<methodCall>\
<methodName>{method}</methodName>\
<params><param><value><string>{argument}</string></value></param></params>\
</methodCall>",
        method = xml::escape(method),
        argument = xml::escape(argument),
    )
}

/// Decode a `methodResponse` whose first parameter is a string.
///
/// A `<fault>` response becomes [`TransportError::Fault`]. Untyped values count as strings;
/// any other scalar type is rejected.
pub fn decode_method_response(body: &str) -> Result<String, TransportError> {
    if !body.contains("<methodResponse") {
        return Err(TransportError::MalformedResponse(
            "missing <methodResponse> element",
        ));
    }

    if let Some(fault) = FAULT.captures(body) {
        return Err(decode_fault(fault.get(1).map_or("", |it| it.as_str())));
    }

    let value = FIRST_PARAM
        .captures(body)
        .and_then(|it| it.get(1))
        .ok_or(TransportError::MalformedResponse("missing parameter"))?;
    match scalar(value.as_str()) {
        Some(("string", text)) => Ok(text),
        Some(_) => Err(TransportError::MalformedResponse(
            "expected a string parameter",
        )),
        None => Err(TransportError::MalformedResponse(
            "parameter is not a scalar value",
        )),
    }
}

fn decode_fault(fault: &str) -> TransportError {
    let mut code = 0;
    let mut message = String::new();
    for member in MEMBER.captures_iter(fault) {
        let (Some(name), Some(value)) = (member.get(1), member.get(2)) else {
            continue;
        };
        let Some((_, text)) = scalar(value.as_str()) else {
            continue;
        };
        match name.as_str().trim() {
            "faultCode" => code = text.trim().parse().unwrap_or_default(),
            "faultString" => message = text.trim().to_owned(),
            _ => {}
        }
    }
    TransportError::Fault { code, message }
}

/// Type name and decoded text of a scalar `<value>` element. Untyped values are strings.
fn scalar(value: &str) -> Option<(&str, String)> {
    let captures = SCALAR.captures(value)?;
    if let Some(kind) = captures.get(1) {
        return Some((kind.as_str(), String::new()));
    }
    if let Some(kind) = captures.get(2) {
        let text = captures.get(3).map_or("", |it| it.as_str());
        return Some((kind.as_str(), decode_text(text)));
    }
    let text = captures.get(4).map_or("", |it| it.as_str());
    Some(("string", decode_text(text)))
}

fn decode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = 0;
    for section in CDATA.find_iter(raw) {
        out.push_str(&xml::unescape(&raw[rest..section.start()]));
        let inner = section
            .as_str()
            .strip_prefix(CDATA_OPEN)
            .and_then(|it| it.strip_suffix(CDATA_CLOSE))
            .unwrap_or_default();
        out.push_str(inner);
        rest = section.end();
    }
    out.push_str(&xml::unescape(&raw[rest..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_method_call_escapes_argument() {
        let body = encode_method_call(METHOD_NAME, "<request>a & b</request>");
        assert_eq!(
            body,
            "<?xml version=\"1.0\"?><methodCall><methodName>gabiasms</methodName>\
<params><param><value><string>&lt;request&gt;a &amp; b&lt;/request&gt;</string></value></param></params>\
</methodCall>"
        );
    }

    #[test]
    fn decode_string_param() {
        let body = r#"<?xml version='1.0'?>
<methodResponse>
<params>
<param>
<value><string>&lt;response&gt;&lt;code&gt;0000&lt;/code&gt;&lt;/response&gt;</string></value>
</param>
</params>
</methodResponse>
"#;
        assert_eq!(
            decode_method_response(body).unwrap(),
            "<response><code>0000</code></response>"
        );
    }

    #[test]
    fn decode_untyped_param_value() {
        let body = "<methodResponse><params><param><value>plain &amp; simple</value></param></params></methodResponse>";
        assert_eq!(decode_method_response(body).unwrap(), "plain & simple");
    }

    #[test]
    fn decode_empty_string_param() {
        let body = "<methodResponse><params><param><value><string/></value></param></params></methodResponse>";
        assert_eq!(decode_method_response(body).unwrap(), "");
    }

    #[test]
    fn decode_fault_response() {
        let body = r#"<?xml version="1.0"?>
<methodResponse>
  <fault>
    <value>
      <struct>
        <member>
          <name>faultCode</name>
          <value><int>4</int></value>
        </member>
        <member>
          <name>faultString</name>
          <value><string>Too many parameters.</string></value>
        </member>
      </struct>
    </value>
  </fault>
</methodResponse>
"#;
        match decode_method_response(body).unwrap_err() {
            TransportError::Fault { code, message } => {
                assert_eq!(code, 4);
                assert_eq!(message, "Too many parameters.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_string_with_attributes_and_cdata() {
        let body = r#"<methodResponse xmlns:ex="urn:ex">
<params><param><value><string xml:space="preserve"><![CDATA[<response><code>0000</code></response>]]> &amp; more</string></value></param></params>
</methodResponse>"#;
        assert_eq!(
            decode_method_response(body).unwrap(),
            "<response><code>0000</code></response> & more"
        );
    }

    #[test]
    fn decode_rejects_non_string_param() {
        let body = "<methodResponse><params><param><value><int>1</int></value></param></params></methodResponse>";
        let err = decode_method_response(body).unwrap_err();
        assert!(matches!(
            err,
            TransportError::MalformedResponse("expected a string parameter")
        ));

        let body = "<methodResponse><params><param><value><struct></struct></value></param></params></methodResponse>";
        let err = decode_method_response(body).unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse(_)));
    }

    #[test]
    fn decode_fault_reads_only_the_first_fault() {
        let body = r#"<methodResponse>
<fault><value><struct>
<member><name>faultString</name><value>Bad &lt;request&gt;</value></member>
<member><name>faultCode</name><value><i4>-32600</i4></value></member>
</struct></value></fault>
<fault><value><struct>
<member><name>faultCode</name><value><int>5</int></value></member>
<member><name>faultString</name><value><string>later</string></value></member>
</struct></value></fault>
</methodResponse>"#;
        match decode_method_response(body).unwrap_err() {
            TransportError::Fault { code, message } => {
                assert_eq!(code, -32600);
                assert_eq!(message, "Bad <request>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_non_xmlrpc_body() {
        let err = decode_method_response("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse(_)));

        let err = decode_method_response("<methodResponse></methodResponse>").unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse(_)));
    }
}
