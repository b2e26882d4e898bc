pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod forward_proxy;
pub mod logging;
pub mod message;
pub mod options;
pub mod resource;
pub mod reverse_proxy;
pub mod sanitize;
pub mod uri;

pub use client::OutboundClient;
pub use config::BridgeConfig;
pub use error::ProxyError;
pub use forward_proxy::ForwardProxy;
pub use message::{Code, Endpoint, MessageType, Request, Response, Transaction};
pub use resource::{MemoryTree, Resource, ResourceTree};
pub use reverse_proxy::{DiscoveryHandler, ReverseProxy};
pub use sanitize::{SanitizePolicy, sanitize};
