//! Outbound owner notifications.
//!
//! Dispatch is best-effort: one attempt, no retry or queue. Callers decide
//! whether a failure matters; registry writes never depend on it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod client;

pub use client::HttpNotifier;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("provider unreachable: {0}")]
    Unreachable(String),
    #[error("provider rejected request: status={status} body={body}")]
    Rejected { status: u16, body: String },
}

/// Provider-assigned identifier of a placed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_owner(&self, phone_number: &str, message: &str) -> Result<(), DeliveryError>;
    async fn place_call(&self, phone_number: &str, script: &str) -> Result<CallId, DeliveryError>;
}

pub fn blocking_message(plate: &str) -> String {
    format!("Your car {plate} is blocking another vehicle. Please move it.")
}

pub fn call_script(plate: &str) -> String {
    format!(
        "Hello. This is an automated call about your car with plate {plate}. \
         It is blocking another vehicle. Please move it as soon as possible."
    )
}
