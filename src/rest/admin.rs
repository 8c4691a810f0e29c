// rest/admin.rs — Operator credential for the admin routes.
//
// The storefront has exactly one operator credential: a bearer secret
// generated on first start and persisted next to the database. It never
// ships to a browser; the operator reads it once with `butikd token` and
// pastes it into their tooling.

use anyhow::{Context as _, Result};
use axum::http::HeaderMap;
use rand::{distributions::Alphanumeric, Rng};
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;

const TOKEN_FILE: &str = "admin_token";
const SECRET_LEN: usize = 40;

/// The bearer secret guarding the order-management surface.
#[derive(Clone)]
pub struct AdminToken {
    secret: String,
}

impl AdminToken {
    /// Wrap an already-known secret (tests, or callers that manage
    /// persistence themselves).
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Load the persisted secret for this data dir, generating and storing
    /// a fresh one when none exists. The file is owner-only (0600 on Unix).
    pub fn load_or_generate(config: &StoreConfig) -> Result<Self> {
        let path = Self::token_path(config);
        if let Some(secret) = read_secret(&path)? {
            return Ok(Self { secret });
        }

        let secret = generate_secret();
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("Creating data dir {}", config.data_dir.display()))?;
        write_secret(&path, &secret)
            .with_context(|| format!("Writing admin token to {}", path.display()))?;
        Ok(Self { secret })
    }

    fn token_path(config: &StoreConfig) -> PathBuf {
        config.data_dir.join(TOKEN_FILE)
    }

    /// True when the request carries `Authorization: Bearer <secret>`.
    pub fn authorizes(&self, headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|candidate| candidate == self.secret)
    }

    /// The raw secret, for the `token` CLI subcommand.
    pub fn reveal(&self) -> &str {
        &self.secret
    }
}

fn generate_secret() -> String {
    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LEN)
        .map(char::from)
        .collect();
    format!("btk_{body}")
}

/// `Ok(None)` means no usable secret on disk: missing file, or a file left
/// empty by a crashed first start.
fn read_secret(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Reading admin token from {}", path.display()))?;
    let secret = raw.trim();
    if secret.is_empty() {
        return Ok(None);
    }
    Ok(Some(secret.to_string()))
}

#[cfg(unix)]
fn write_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    use std::io::Write as _;
    use std::os::unix::fs::OpenOptionsExt as _;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(secret.as_bytes())
}

#[cfg(not(unix))]
fn write_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    std::fs::write(path, secret)
}
