//! Request/response plumbing shared by the forward and reverse paths.

use crate::message::{Endpoint, Request, Response, Transaction};
use crate::sanitize::{SanitizePolicy, sanitize};

/// Stamp the correlation fields first, before any other response
/// mutation, so the caller can always match response to request even
/// when a path bails out early.
pub fn prime_response(transaction: &mut Transaction) {
    transaction.response.token = transaction.request.token.clone();
    transaction.response.destination = transaction.request.source.clone();
}

/// Synthesize the outbound copy of an inbound request: sanitized
/// options, the downstream path, the resolved destination, and the
/// method code and payload verbatim. Token and message id are left for
/// the outbound client, which runs its own correlation on its hop.
pub fn build_outbound(
    inbound: &Request,
    policy: &SanitizePolicy,
    path: &str,
    destination: Endpoint,
) -> Request {
    let mut options = sanitize(&inbound.options, policy);
    options.set_uri_path(path);
    Request {
        code: inbound.code,
        options,
        payload: inbound.payload.clone(),
        destination: Some(destination),
        ..Request::default()
    }
}

/// Copy a backend response into the transaction's response: payload,
/// code and options move over wholesale; token and destination stay as
/// primed.
pub fn absorb_response(response: &mut Response, backend: Response) {
    response.payload = backend.payload;
    response.code = backend.code;
    response.options = backend.options;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Code;
    use crate::options::OptionNumber;
    use bytes::Bytes;

    #[test]
    fn test_prime_response_correlates() {
        let mut request = Request::new(Code::GET);
        request.token = Bytes::from_static(b"\x12\x34");
        request.source = Some(Endpoint::new("client.local", 40001));
        let mut transaction = Transaction::new(request);

        prime_response(&mut transaction);
        assert_eq!(transaction.response.token, transaction.request.token);
        assert_eq!(
            transaction.response.destination,
            Some(Endpoint::new("client.local", 40001))
        );
    }

    #[test]
    fn test_build_outbound_is_fresh_and_pruned() {
        let mut inbound = Request::new(Code::PUT);
        inbound.options.set_proxy_uri("coap://device.local/led");
        inbound.options.set_uri_path("/led");
        inbound.payload = Bytes::from_static(b"on");
        inbound.source = Some(Endpoint::new("client.local", 40001));

        let destination = Endpoint::new("device.local", 5683);
        let outbound = build_outbound(
            &inbound,
            &SanitizePolicy::default(),
            "/actuators/led",
            destination.clone(),
        );

        assert_eq!(outbound.code, Code::PUT);
        assert_eq!(outbound.payload, inbound.payload);
        assert_eq!(outbound.destination, Some(destination));
        assert_eq!(outbound.options.uri_path(), "actuators/led");
        assert!(!outbound.options.contains(OptionNumber::PROXY_URI));
        assert!(outbound.source.is_none());
        assert!(outbound.token.is_empty());
        // Inbound request untouched.
        assert_eq!(inbound.options.uri_path(), "led");
        assert!(inbound.options.contains(OptionNumber::PROXY_URI));
    }

    #[test]
    fn test_absorb_response_keeps_correlation() {
        let mut response = Response::default();
        response.token = Bytes::from_static(b"\x01");
        response.destination = Some(Endpoint::new("client.local", 40001));

        let mut backend = Response::default();
        backend.code = Code::CONTENT;
        backend.payload = Bytes::from_static(b"22.5");
        backend.options.set_content_format(0);

        absorb_response(&mut response, backend);
        assert_eq!(response.code, Code::CONTENT);
        assert_eq!(response.payload, Bytes::from_static(b"22.5"));
        assert_eq!(response.options.content_format(), Some(0));
        assert_eq!(response.token, Bytes::from_static(b"\x01"));
        assert_eq!(response.destination, Some(Endpoint::new("client.local", 40001)));
    }
}
