use crate::error::AppError;
use crate::services::anonymizer::ReceiverRedaction;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Period of the expiry sweeper.
    pub sweep_interval: Duration,
    pub receiver_redaction: ReceiverRedaction,
    pub json_logs: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", lookup("PORT"), 8080u16)?;

        let sweep_interval_ms = parse_or("SWEEP_INTERVAL_MS", lookup("SWEEP_INTERVAL_MS"), 5000u64)?;
        if sweep_interval_ms == 0 {
            return Err(AppError::Config(
                "SWEEP_INTERVAL_MS must be greater than zero".into(),
            ));
        }

        let receiver_redaction = match lookup("ANONYMIZE_RECEIVED_MESSAGES") {
            Some(raw) => ReceiverRedaction::from_str(&raw)
                .map_err(|e| AppError::Config(format!("ANONYMIZE_RECEIVED_MESSAGES: {e}")))?,
            None => ReceiverRedaction::default(),
        };

        let json_logs = lookup("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            sweep_interval: Duration::from_millis(sweep_interval_ms),
            receiver_redaction,
            json_logs,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn test_defaults() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            sweep_interval: Duration::from_millis(50),
            receiver_redaction: ReceiverRedaction::Keep,
            json_logs: false,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has invalid value: {value}"))),
        None => Ok(default),
    }
}
