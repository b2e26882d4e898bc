use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing proxy target URI")]
    MissingProxyTarget,

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid target URI: {0}")]
    Target(String),

    #[error("option {0} is not repeatable")]
    RepeatedOption(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
