use crate::domain::{AccessToken, ApiId, DispatchKey, SendRequest};
use crate::xml;

pub const SEND_METHOD: &str = "SMS.send";
pub const MULTI_SEND_METHOD: &str = "SMS.multi_send";
pub const STATUS_BY_REF_METHOD: &str = "SMS.getStatusByRef";

/// Wrap method parameters in the vendor's authenticated `<request>` document.
fn envelope(api_id: &ApiId, token: &AccessToken, method: &str, params: &str) -> String {
    format!(
        "<request>\
<sms-id>{api_id}</sms-id>\
<access-token>{token}</access-token>\
<response-format>xml</response-format>\
<method>{method}</method>\
<params>{params}</params>\
</request>",
        api_id = xml::escape(api_id.as_str()),
        token = token.as_str(),
    )
}

/// Render a send. Bulk variants use `SMS.multi_send`; the field set is the same.
///
/// `message` and `title` are already escaped by [`SendRequest::build`].
pub fn encode_send_payload(api_id: &ApiId, token: &AccessToken, request: &SendRequest) -> String {
    let method = if request.sms_type().is_multi() {
        MULTI_SEND_METHOD
    } else {
        SEND_METHOD
    };

    let params = format!(
        "<send_type>{send_type}</send_type>\
<ref_key>{key}</ref_key>\
<subject>{title}</subject>\
<message>{message}</message>\
<callback>{sender}</callback>\
<phone>{receiver}</phone>\
<reserve>{scheduled_time}</reserve>",
        send_type = request.wire_type(),
        key = request.key(),
        title = request.title(),
        message = request.message(),
        sender = xml::escape(request.sender().as_str()),
        receiver = request.receiver(),
        scheduled_time = request.scheduled_time().as_str(),
    );

    envelope(api_id, token, method, &params)
}

/// Render a delivery-result lookup by dispatch key.
pub fn encode_send_result_payload(
    api_id: &ApiId,
    token: &AccessToken,
    key: DispatchKey,
) -> String {
    envelope(
        api_id,
        token,
        STATUS_BY_REF_METHOD,
        &format!("<ref_key>{key}</ref_key>"),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::clock::Clock;
    use crate::domain::{ApiKey, Receiver, SendOptions, SenderNumber, SmsType};
    use crate::settings::Settings;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        }
    }

    fn settings() -> Settings {
        Settings::new(
            ApiId::new("id1").unwrap(),
            ApiKey::new("key1").unwrap(),
            SenderNumber::new("0100000000").unwrap(),
        )
    }

    fn token() -> AccessToken {
        AccessToken::with_nonce("nonce", &ApiKey::new("key1").unwrap())
    }

    #[test]
    fn encode_single_send_payload() {
        let request = SendRequest::build(
            "a & b",
            &Receiver::from("01012345678"),
            &SendOptions::default(),
            &settings(),
            &FixedClock,
        )
        .unwrap();

        let payload = encode_send_payload(settings().api_id(), &token(), &request);
        assert_eq!(
            payload,
            format!(
                "<request><sms-id>id1</sms-id><access-token>{}</access-token>\
<response-format>xml</response-format><method>SMS.send</method><params>\
<send_type>sms</send_type><ref_key>1700000000</ref_key><subject>SEND</subject>\
<message>a &amp; b</message><callback>0100000000</callback><phone>01012345678</phone>\
<reserve>0</reserve></params></request>",
                token().as_str()
            )
        );
    }

    #[test]
    fn encode_multi_send_payload_uses_bulk_method() {
        let request = SendRequest::build(
            "hi",
            &Receiver::from(vec!["01198765432", "01012345678"]),
            &SendOptions::default().sms_type(SmsType::MultiLms),
            &settings(),
            &FixedClock,
        )
        .unwrap();

        let payload = encode_send_payload(settings().api_id(), &token(), &request);
        assert!(payload.contains("<method>SMS.multi_send</method>"));
        assert!(payload.contains("<send_type>lms</send_type>"));
        assert!(payload.contains("<phone>01012345678,01198765432</phone>"));
    }

    #[test]
    fn encode_send_result_payload_carries_key() {
        let payload =
            encode_send_result_payload(settings().api_id(), &token(), DispatchKey::new(123));
        assert!(payload.contains("<sms-id>id1</sms-id>"));
        assert!(payload.contains("<method>SMS.getStatusByRef</method>"));
        assert!(payload.contains("<params><ref_key>123</ref_key></params>"));
        assert!(!payload.contains("<message>"));
    }
}
