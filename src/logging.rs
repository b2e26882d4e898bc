use crate::error::ProxyError;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::io::Write;

/// Initialize env_logger from the configured level and format. The
/// RUST_LOG environment variable still wins over the configured level.
pub fn init(log_level: Option<&str>, log_format: Option<&str>) -> Result<(), ProxyError> {
    let level = log_level.unwrap_or("info");
    let format = log_format.unwrap_or("text");

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    match format {
        "json" => {
            builder.format(|buf, record| {
                let timestamp: DateTime<Utc> = Utc::now();
                let entry = json!({
                    "timestamp": timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
                    "level": record.level().to_string().to_lowercase(),
                    "target": record.target(),
                    "module": record.module_path().unwrap_or("unknown"),
                    "message": record.args().to_string(),
                });
                writeln!(buf, "{}", entry)
            });
        }
        "text" => {}
        other => {
            return Err(ProxyError::Config(format!(
                "invalid log format: {}. Must be one of: text, json",
                other
            )));
        }
    }

    builder
        .try_init()
        .map_err(|e| ProxyError::Config(format!("logger already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_format() {
        assert!(matches!(
            init(Some("info"), Some("xml")),
            Err(ProxyError::Config(_))
        ));
    }
}
