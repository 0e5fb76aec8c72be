use md5::{Digest, Md5};

use crate::config::{PRIVATE_KEY_ENV, PUBLIC_KEY_ENV};
use crate::error::ProxyError;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub public_key: String,
    pub private_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Where the proxy gets its upstream keys. Consulted once per request.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Result<Credentials, ProxyError>;
}

/// Reads `CAMEO_PUBLIC_KEY` / `CAMEO_PRIVATE_KEY` from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Result<Credentials, ProxyError> {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        match (read(PUBLIC_KEY_ENV), read(PRIVATE_KEY_ENV)) {
            (Some(public_key), Some(private_key)) => Ok(Credentials { public_key, private_key }),
            _ => Err(ProxyError::MissingCredentials),
        }
    }
}

/// Fixed keys, for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Option<Credentials>);

impl CredentialSource for StaticCredentials {
    fn credentials(&self) -> Result<Credentials, ProxyError> {
        self.0.clone().ok_or(ProxyError::MissingCredentials)
    }
}

/// The `ts`/`apikey`/`hash` triple the upstream expects on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub ts: String,
    pub apikey: String,
    pub hash: String,
}

impl Signature {
    /// Sign with the current time in milliseconds.
    pub fn now(creds: &Credentials) -> Self {
        Self::at(current_millis().to_string(), creds)
    }

    pub fn at(ts: String, creds: &Credentials) -> Self {
        let mut hasher = Md5::new();
        hasher.update(ts.as_bytes());
        hasher.update(creds.private_key.as_bytes());
        hasher.update(creds.public_key.as_bytes());
        let hash = format!("{:x}", hasher.finalize());
        Self { ts, apikey: creds.public_key.clone(), hash }
    }
}

fn current_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
