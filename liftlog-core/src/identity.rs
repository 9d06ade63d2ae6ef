//! The authenticated end user and the provider that supplies it.
//!
//! Authentication itself is outside this crate: a provider only answers "who
//! is signed in" and forgets that answer on sign-out.

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::IdentityConfig;

const METADATA_FULL_NAME: &str = "full_name";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub metadata: Value,
}

impl Identity {
    /// Ids are derived from the email, so the same email always maps to the same rows.
    pub fn for_email(email: &str, full_name: Option<&str>) -> Self {
        let email = email.trim().to_lowercase();
        let metadata = match full_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => json!({ "full_name": name }),
            None => json!({}),
        };
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("mailto:{}", email).as_bytes()),
            email,
            metadata,
        }
    }

    /// `full_name` from the metadata, else the local part of the email.
    pub fn display_name(&self) -> String {
        self.metadata
            .get(METADATA_FULL_NAME)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.email
                    .split('@')
                    .next()
                    .unwrap_or(&self.email)
                    .to_string()
            })
    }
}

#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    async fn current_identity(&self) -> Option<Identity>;
    async fn sign_in(&self, email: &str, full_name: Option<&str>) -> Option<Identity>;
    async fn sign_out(&self);
}

/// Keeps the signed-in identity in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct LocalIdentityProvider {
    current: Mutex<Option<Identity>>,
}

impl LocalIdentityProvider {
    pub fn new(initial: Option<Identity>) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    pub fn from_config(config: Option<&IdentityConfig>) -> Self {
        Self::new(config.map(|c| Identity::for_email(&c.email, c.full_name.as_deref())))
    }
}

impl IdentityProvider for LocalIdentityProvider {
    async fn current_identity(&self) -> Option<Identity> {
        self.current.lock().await.clone()
    }

    async fn sign_in(&self, email: &str, full_name: Option<&str>) -> Option<Identity> {
        if email.trim().is_empty() || !email.contains('@') {
            return None;
        }
        let identity = Identity::for_email(email, full_name);
        info!("Signed in as {}", identity.email);
        *self.current.lock().await = Some(identity.clone());
        Some(identity)
    }

    async fn sign_out(&self) {
        if let Some(previous) = self.current.lock().await.take() {
            info!("Signed out {}", previous.email);
        }
    }
}
