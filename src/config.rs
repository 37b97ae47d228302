use std::str::FromStr;

use anyhow::Context;
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

/// Credentials and endpoints for the messaging and telephony providers.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub sms_url: String,
    pub sms_api_key: String,
    pub call_url: String,
    pub call_api_key: String,
    pub sender: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub notify: NotifyConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let algorithm = std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            algorithm: parse_algorithm(&algorithm)?,
            ttl_minutes: ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok())?,
        };

        let notify = NotifyConfig {
            sms_url: std::env::var("SMS_API_URL").context("SMS_API_URL is not set")?,
            sms_api_key: std::env::var("SMS_API_KEY").context("SMS_API_KEY is not set")?,
            call_url: std::env::var("CALL_API_URL").context("CALL_API_URL is not set")?,
            call_api_key: std::env::var("CALL_API_KEY").context("CALL_API_KEY is not set")?,
            sender: std::env::var("NOTIFY_SENDER").unwrap_or_else(|_| "Parkside".into()),
            timeout_secs: parse_or(
                "NOTIFY_TIMEOUT_SECS",
                std::env::var("NOTIFY_TIMEOUT_SECS").ok(),
                5,
            )?,
        };
        anyhow::ensure!(notify.timeout_secs > 0, "NOTIFY_TIMEOUT_SECS must be positive");

        Ok(Self {
            database_url,
            jwt,
            notify,
        })
    }
}

/// Longest accepted session lifetime: 30 days.
const MAX_TTL_MINUTES: i64 = 30 * 24 * 60;

/// `default` when unset; a value that does not parse is a startup error.
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {v:?}")),
        None => Ok(default),
    }
}

fn ttl_minutes(raw: Option<String>) -> anyhow::Result<i64> {
    let ttl = parse_or("JWT_TTL_MINUTES", raw, 60)?;
    anyhow::ensure!(
        (1..=MAX_TTL_MINUTES).contains(&ttl),
        "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {ttl}"
    );
    Ok(ttl)
}

/// Only HMAC algorithms are accepted since the key is a shared secret.
pub fn parse_algorithm(name: &str) -> anyhow::Result<Algorithm> {
    let alg = Algorithm::from_str(name.trim())
        .map_err(|_| anyhow::anyhow!("unknown JWT_ALGORITHM {name}"))?;
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
        other => anyhow::bail!("unsupported JWT_ALGORITHM {other:?}; expected HS256, HS384 or HS512"),
    }
}
