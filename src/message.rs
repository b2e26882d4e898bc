use crate::options::OptionSet;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// CoAP code as a class.detail pair, e.g. 2.01 Created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    pub class: u8,
    pub detail: u8,
}

impl Code {
    pub const EMPTY: Code = Code::new(0, 0);

    // Methods (class 0).
    pub const GET: Code = Code::new(0, 1);
    pub const POST: Code = Code::new(0, 2);
    pub const PUT: Code = Code::new(0, 3);
    pub const DELETE: Code = Code::new(0, 4);

    // Success responses.
    pub const CREATED: Code = Code::new(2, 1);
    pub const DELETED: Code = Code::new(2, 2);
    pub const VALID: Code = Code::new(2, 3);
    pub const CHANGED: Code = Code::new(2, 4);
    pub const CONTENT: Code = Code::new(2, 5);
    pub const CONTINUE: Code = Code::new(2, 31);

    // Errors.
    pub const BAD_REQUEST: Code = Code::new(4, 0);
    pub const NOT_FOUND: Code = Code::new(4, 4);
    pub const SERVICE_UNAVAILABLE: Code = Code::new(5, 3);

    pub const fn new(class: u8, detail: u8) -> Code {
        Code { class, detail }
    }

    pub const fn from_raw(raw: u8) -> Code {
        Code { class: raw >> 5, detail: raw & 0x1f }
    }

    pub const fn to_raw(self) -> u8 {
        (self.class << 5) | self.detail
    }

    pub const fn is_request(self) -> bool {
        self.class == 0 && self.detail != 0
    }

    pub const fn is_response(self) -> bool {
        self.class >= 2
    }

    pub const fn is_error(self) -> bool {
        self.class == 4 || self.class == 5
    }
}

impl Default for Code {
    fn default() -> Self {
        Code::EMPTY
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.class, self.detail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Confirmable,
    NonConfirmable,
    Acknowledgement,
    Reset,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::Confirmable => "CON",
            MessageType::NonConfirmable => "NON",
            MessageType::Acknowledgement => "ACK",
            MessageType::Reset => "RST",
        };
        write!(f, "{}", name)
    }
}

/// A remote peer as (host, port).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Endpoint {
        Endpoint { host: host.into(), port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Decoded inbound request. Outbound copies are always fresh objects
/// built by the forwarding paths; the inbound request is never mutated.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub mtype: MessageType,
    pub mid: u16,
    pub token: Bytes,
    pub code: Code,
    pub options: OptionSet,
    pub payload: Bytes,
    pub source: Option<Endpoint>,
    pub destination: Option<Endpoint>,
}

impl Request {
    pub fn new(code: Code) -> Request {
        Request { code, ..Request::default() }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {} /{} [{} options] {} bytes",
            self.mtype,
            self.mid,
            self.code,
            self.options.uri_path(),
            self.options.len(),
            self.payload.len()
        )
    }
}

/// In-progress response paired with an inbound request.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub mtype: MessageType,
    pub mid: u16,
    pub token: Bytes,
    pub code: Code,
    pub options: OptionSet,
    pub payload: Bytes,
    pub destination: Option<Endpoint>,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {} [{} options] {} bytes",
            self.mtype,
            self.mid,
            self.code,
            self.options.len(),
            self.payload.len()
        )
    }
}

/// The unit of work for the forwarding layer: one inbound request and
/// the response under construction for it.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub request: Request,
    pub response: Response,
}

impl Transaction {
    /// Pair a request with an empty response shell. The forwarding
    /// paths stamp token and destination before any other mutation so
    /// the caller can correlate even on early-exit errors.
    pub fn new(request: Request) -> Transaction {
        Transaction { request, response: Response::default() }
    }
}
