use crate::error::ProxyError;
use bytes::Bytes;
use std::fmt;

/// CoAP option number, RFC 7252 registry numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionNumber(pub u16);

impl OptionNumber {
    pub const IF_MATCH: OptionNumber = OptionNumber(1);
    pub const URI_HOST: OptionNumber = OptionNumber(3);
    pub const ETAG: OptionNumber = OptionNumber(4);
    pub const IF_NONE_MATCH: OptionNumber = OptionNumber(5);
    pub const OBSERVE: OptionNumber = OptionNumber(6);
    pub const URI_PORT: OptionNumber = OptionNumber(7);
    pub const LOCATION_PATH: OptionNumber = OptionNumber(8);
    pub const URI_PATH: OptionNumber = OptionNumber(11);
    pub const CONTENT_FORMAT: OptionNumber = OptionNumber(12);
    pub const MAX_AGE: OptionNumber = OptionNumber(14);
    pub const URI_QUERY: OptionNumber = OptionNumber(15);
    pub const ACCEPT: OptionNumber = OptionNumber(17);
    pub const LOCATION_QUERY: OptionNumber = OptionNumber(20);
    pub const BLOCK2: OptionNumber = OptionNumber(23);
    pub const BLOCK1: OptionNumber = OptionNumber(27);
    pub const SIZE2: OptionNumber = OptionNumber(28);
    pub const PROXY_URI: OptionNumber = OptionNumber(35);
    pub const PROXY_SCHEME: OptionNumber = OptionNumber(39);
    pub const SIZE1: OptionNumber = OptionNumber(60);

    pub fn name(self) -> &'static str {
        match self {
            OptionNumber::IF_MATCH => "If-Match",
            OptionNumber::URI_HOST => "Uri-Host",
            OptionNumber::ETAG => "ETag",
            OptionNumber::IF_NONE_MATCH => "If-None-Match",
            OptionNumber::OBSERVE => "Observe",
            OptionNumber::URI_PORT => "Uri-Port",
            OptionNumber::LOCATION_PATH => "Location-Path",
            OptionNumber::URI_PATH => "Uri-Path",
            OptionNumber::CONTENT_FORMAT => "Content-Format",
            OptionNumber::MAX_AGE => "Max-Age",
            OptionNumber::URI_QUERY => "Uri-Query",
            OptionNumber::ACCEPT => "Accept",
            OptionNumber::LOCATION_QUERY => "Location-Query",
            OptionNumber::BLOCK2 => "Block2",
            OptionNumber::BLOCK1 => "Block1",
            OptionNumber::SIZE2 => "Size2",
            OptionNumber::PROXY_URI => "Proxy-Uri",
            OptionNumber::PROXY_SCHEME => "Proxy-Scheme",
            OptionNumber::SIZE1 => "Size1",
            _ => "Unregistered",
        }
    }

    /// Whether the option may occur more than once in one message.
    /// Unregistered numbers are treated as repeatable so unknown
    /// end-to-end options survive the proxy untouched.
    pub fn is_repeatable(self) -> bool {
        matches!(
            self,
            OptionNumber::IF_MATCH
                | OptionNumber::ETAG
                | OptionNumber::LOCATION_PATH
                | OptionNumber::URI_PATH
                | OptionNumber::URI_QUERY
                | OptionNumber::LOCATION_QUERY
        ) || !self.is_registered()
    }

    pub fn is_registered(self) -> bool {
        matches!(
            self.0,
            1 | 3 | 4 | 5 | 6 | 7 | 8 | 11 | 12 | 14 | 15 | 17 | 20 | 23 | 27 | 28 | 35 | 39 | 60
        )
    }

    pub fn forwarding_class(self) -> ForwardingClass {
        match self {
            OptionNumber::PROXY_URI | OptionNumber::PROXY_SCHEME => ForwardingClass::ProxyOnly,
            OptionNumber::BLOCK1 | OptionNumber::BLOCK2 | OptionNumber::OBSERVE => {
                ForwardingClass::HopByHop
            }
            _ => ForwardingClass::EndToEnd,
        }
    }
}

impl fmt::Display for OptionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How an option relates to the proxy hop: safe to replay downstream,
/// negotiated per hop, or meaningful only on the proxy-facing leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardingClass {
    EndToEnd,
    HopByHop,
    ProxyOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Empty,
    Uint(u64),
    Opaque(Bytes),
    Text(String),
}

impl OptionValue {
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            OptionValue::Empty => Some(0),
            OptionValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Empty => write!(f, "(empty)"),
            OptionValue::Uint(v) => write!(f, "{}", v),
            OptionValue::Opaque(b) => write!(f, "0x{:02x?}", &b[..b.len().min(8)]),
            OptionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapOption {
    pub number: OptionNumber,
    pub value: OptionValue,
}

impl CoapOption {
    pub fn empty(number: OptionNumber) -> Self {
        CoapOption { number, value: OptionValue::Empty }
    }

    pub fn uint(number: OptionNumber, value: u64) -> Self {
        CoapOption { number, value: OptionValue::Uint(value) }
    }

    pub fn text(number: OptionNumber, value: impl Into<String>) -> Self {
        CoapOption { number, value: OptionValue::Text(value.into()) }
    }

    pub fn opaque(number: OptionNumber, value: Bytes) -> Self {
        CoapOption { number, value: OptionValue::Opaque(value) }
    }
}

impl fmt::Display for CoapOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.number, self.value)
    }
}

/// Decoded Block1/Block2 value: block number, more-blocks flag and
/// block size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockValue {
    pub num: u32,
    pub more: bool,
    pub size: u16,
}

impl BlockValue {
    /// Decode the packed `num / m / szx` wire form.
    pub fn parse(raw: u64) -> BlockValue {
        let szx = (raw & 0x7) as u16;
        BlockValue {
            num: (raw >> 4) as u32,
            more: raw & 0x8 != 0,
            size: 1 << (szx + 4),
        }
    }

    /// Encode to the packed wire form. Sizes are bucketed to the
    /// nearest szx exponent; anything above 512 encodes as szx 6.
    pub fn encode(&self) -> u64 {
        let szx: u64 = match self.size {
            s if s > 512 => 6,
            s if s > 256 => 5,
            s if s > 128 => 4,
            s if s > 64 => 3,
            s if s > 32 => 2,
            s if s > 16 => 1,
            _ => 0,
        };
        ((self.num as u64) << 4) | ((self.more as u64) << 3) | szx
    }
}

/// Ordered multiset of options. Insertion order is preserved, which
/// keeps repeatable path/query segments in the order they arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: Vec<CoapOption>,
}

impl OptionSet {
    pub fn new() -> Self {
        OptionSet::default()
    }

    /// Add an option, rejecting duplicates of non-repeatable numbers.
    pub fn push(&mut self, option: CoapOption) -> Result<(), ProxyError> {
        if !option.number.is_repeatable() && self.contains(option.number) {
            return Err(ProxyError::RepeatedOption(option.number.name()));
        }
        self.options.push(option);
        Ok(())
    }

    /// Replace every occurrence of the option's number with this value.
    pub fn replace(&mut self, option: CoapOption) {
        self.remove_all(option.number);
        self.options.push(option);
    }

    pub fn remove_all(&mut self, number: OptionNumber) {
        self.options.retain(|o| o.number != number);
    }

    pub fn contains(&self, number: OptionNumber) -> bool {
        self.options.iter().any(|o| o.number == number)
    }

    pub fn first(&self, number: OptionNumber) -> Option<&CoapOption> {
        self.options.iter().find(|o| o.number == number)
    }

    pub fn all(&self, number: OptionNumber) -> impl Iterator<Item = &CoapOption> {
        self.options.iter().filter(move |o| o.number == number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoapOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn proxy_uri(&self) -> Option<String> {
        self.first(OptionNumber::PROXY_URI)
            .and_then(|o| o.value.as_text())
            .map(str::to_owned)
    }

    pub fn set_proxy_uri(&mut self, uri: &str) {
        self.replace(CoapOption::text(OptionNumber::PROXY_URI, uri));
    }

    /// Uri-Path segments joined with `/`, without a leading slash.
    pub fn uri_path(&self) -> String {
        self.join_segments(OptionNumber::URI_PATH)
    }

    pub fn set_uri_path(&mut self, path: &str) {
        self.set_segments(OptionNumber::URI_PATH, path);
    }

    /// Location-Path segments joined with `/`, or None when the
    /// response carries no location.
    pub fn location_path(&self) -> Option<String> {
        if self.contains(OptionNumber::LOCATION_PATH) {
            Some(self.join_segments(OptionNumber::LOCATION_PATH))
        } else {
            None
        }
    }

    pub fn set_location_path(&mut self, path: &str) {
        self.set_segments(OptionNumber::LOCATION_PATH, path);
    }

    /// Observe register value; an empty option value reads as 0.
    pub fn observe(&self) -> Option<u64> {
        self.first(OptionNumber::OBSERVE).and_then(|o| o.value.as_uint())
    }

    pub fn set_observe(&mut self, register: u64) {
        self.replace(CoapOption::uint(OptionNumber::OBSERVE, register));
    }

    pub fn block1(&self) -> Option<BlockValue> {
        self.first(OptionNumber::BLOCK1)
            .and_then(|o| o.value.as_uint())
            .map(BlockValue::parse)
    }

    pub fn set_block1(&mut self, block: BlockValue) {
        self.replace(CoapOption::uint(OptionNumber::BLOCK1, block.encode()));
    }

    pub fn block2(&self) -> Option<BlockValue> {
        self.first(OptionNumber::BLOCK2)
            .and_then(|o| o.value.as_uint())
            .map(BlockValue::parse)
    }

    pub fn set_block2(&mut self, block: BlockValue) {
        self.replace(CoapOption::uint(OptionNumber::BLOCK2, block.encode()));
    }

    pub fn content_format(&self) -> Option<u64> {
        self.first(OptionNumber::CONTENT_FORMAT).and_then(|o| o.value.as_uint())
    }

    pub fn set_content_format(&mut self, format: u64) {
        self.replace(CoapOption::uint(OptionNumber::CONTENT_FORMAT, format));
    }

    fn join_segments(&self, number: OptionNumber) -> String {
        self.all(number)
            .filter_map(|o| o.value.as_text())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn set_segments(&mut self, number: OptionNumber, path: &str) {
        self.remove_all(number);
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            self.options.push(CoapOption::text(number, segment));
        }
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a CoapOption;
    type IntoIter = std::slice::Iter<'a, CoapOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

impl FromIterator<CoapOption> for OptionSet {
    fn from_iter<T: IntoIterator<Item = CoapOption>>(iter: T) -> Self {
        OptionSet { options: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_repeatable_rejected() {
        let mut options = OptionSet::new();
        options.push(CoapOption::uint(OptionNumber::CONTENT_FORMAT, 50)).unwrap();
        let err = options.push(CoapOption::uint(OptionNumber::CONTENT_FORMAT, 0));
        assert!(err.is_err());

        // Repeatable numbers accept duplicates.
        options.push(CoapOption::text(OptionNumber::URI_QUERY, "a=1")).unwrap();
        options.push(CoapOption::text(OptionNumber::URI_QUERY, "b=2")).unwrap();
        assert_eq!(options.all(OptionNumber::URI_QUERY).count(), 2);
    }

    #[test]
    fn test_uri_path_round_trip() {
        let mut options = OptionSet::new();
        options.set_uri_path("/sensors/temp/1");
        assert_eq!(options.uri_path(), "sensors/temp/1");
        assert_eq!(options.all(OptionNumber::URI_PATH).count(), 3);

        options.set_uri_path("other");
        assert_eq!(options.uri_path(), "other");
        assert_eq!(options.all(OptionNumber::URI_PATH).count(), 1);
    }

    #[test]
    fn test_location_path_absent_vs_empty() {
        let options = OptionSet::new();
        assert_eq!(options.location_path(), None);

        let mut options = OptionSet::new();
        options.set_location_path("sensors/42");
        assert_eq!(options.location_path(), Some("sensors/42".to_string()));
    }

    #[test]
    fn test_observe_empty_value_reads_zero() {
        let mut options = OptionSet::new();
        options.push(CoapOption::empty(OptionNumber::OBSERVE)).unwrap();
        assert_eq!(options.observe(), Some(0));
    }

    #[test]
    fn test_block_encode_size_buckets() {
        let cases = [
            (16u16, 0u64),
            (32, 1),
            (64, 2),
            (128, 3),
            (256, 4),
            (512, 5),
            (1024, 6),
        ];
        for (size, szx) in cases {
            let block = BlockValue { num: 0, more: false, size };
            assert_eq!(block.encode() & 0x7, szx, "size {}", size);
        }
    }

    #[test]
    fn test_block_parse_round_trip() {
        let block = BlockValue { num: 11, more: true, size: 256 };
        let parsed = BlockValue::parse(block.encode());
        assert_eq!(parsed, block);

        let mut options = OptionSet::new();
        options.set_block2(block);
        assert_eq!(options.block2(), Some(block));
        assert_eq!(options.block1(), None);
    }

    #[test]
    fn test_forwarding_classes() {
        assert_eq!(OptionNumber::PROXY_URI.forwarding_class(), ForwardingClass::ProxyOnly);
        assert_eq!(OptionNumber::PROXY_SCHEME.forwarding_class(), ForwardingClass::ProxyOnly);
        assert_eq!(OptionNumber::BLOCK1.forwarding_class(), ForwardingClass::HopByHop);
        assert_eq!(OptionNumber::OBSERVE.forwarding_class(), ForwardingClass::HopByHop);
        assert_eq!(OptionNumber::ETAG.forwarding_class(), ForwardingClass::EndToEnd);
        assert_eq!(OptionNumber(2049).forwarding_class(), ForwardingClass::EndToEnd);
    }
}
