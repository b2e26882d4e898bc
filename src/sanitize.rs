use crate::options::{ForwardingClass, OptionNumber, OptionSet};
use serde::{Deserialize, Serialize};

/// Capability flags controlling what the sanitizer lets through.
/// Observe stays stripped until the proxy grows its own notification
/// relay; flipping `forward_observe` is all an implementation of that
/// will need from this module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SanitizePolicy {
    #[serde(default)]
    pub forward_observe: bool,
}

/// Copy an option set, dropping everything that only has meaning on
/// the proxy-facing hop: Proxy-Uri, Proxy-Scheme, both blockwise
/// control options and (unless the policy says otherwise) Observe.
/// The input is never mutated, and the result is a fixed point:
/// sanitizing twice changes nothing.
pub fn sanitize(options: &OptionSet, policy: &SanitizePolicy) -> OptionSet {
    options
        .iter()
        .filter(|o| match o.number.forwarding_class() {
            ForwardingClass::EndToEnd => true,
            ForwardingClass::ProxyOnly => false,
            ForwardingClass::HopByHop => {
                policy.forward_observe && o.number == OptionNumber::OBSERVE
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{BlockValue, CoapOption};

    fn proxied_options() -> OptionSet {
        let mut options = OptionSet::new();
        options.set_proxy_uri("coap://device.local/sensors");
        options.push(CoapOption::text(OptionNumber::PROXY_SCHEME, "coap")).unwrap();
        options.set_block1(BlockValue { num: 0, more: true, size: 64 });
        options.set_block2(BlockValue { num: 2, more: false, size: 64 });
        options.set_observe(0);
        options.set_uri_path("/sensors/temp");
        options.push(CoapOption::text(OptionNumber::URI_QUERY, "unit=c")).unwrap();
        options.set_content_format(50);
        options
    }

    #[test]
    fn test_strips_proxy_hop_options() {
        let inbound = proxied_options();
        let outbound = sanitize(&inbound, &SanitizePolicy::default());

        assert!(!outbound.contains(OptionNumber::PROXY_URI));
        assert!(!outbound.contains(OptionNumber::PROXY_SCHEME));
        assert!(!outbound.contains(OptionNumber::BLOCK1));
        assert!(!outbound.contains(OptionNumber::BLOCK2));
        assert!(!outbound.contains(OptionNumber::OBSERVE));
        // End-to-end options survive untouched.
        assert_eq!(outbound.uri_path(), "sensors/temp");
        assert_eq!(outbound.content_format(), Some(50));
        assert!(outbound.contains(OptionNumber::URI_QUERY));
    }

    #[test]
    fn test_input_not_mutated() {
        let inbound = proxied_options();
        let before = inbound.clone();
        let _ = sanitize(&inbound, &SanitizePolicy::default());
        assert_eq!(inbound, before);
    }

    #[test]
    fn test_idempotent() {
        let inbound = proxied_options();
        let policy = SanitizePolicy::default();
        let once = sanitize(&inbound, &policy);
        let twice = sanitize(&once, &policy);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_observe_passthrough_flag() {
        let inbound = proxied_options();
        let policy = SanitizePolicy { forward_observe: true };
        let outbound = sanitize(&inbound, &policy);

        assert_eq!(outbound.observe(), Some(0));
        // The flag only widens observe, never the rest.
        assert!(!outbound.contains(OptionNumber::BLOCK1));
        assert!(!outbound.contains(OptionNumber::PROXY_URI));
    }
}
