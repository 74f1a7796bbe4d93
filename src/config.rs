//! Connection settings resolved once from CLI flags and environment.
//!
//! Everything downstream receives this value explicitly; nothing reads
//! process-wide state after parse time, which keeps the client and engine
//! testable without environment mutation.

use anyhow::{Result, bail};

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_user: String,
    pub api_key: String,
    pub client_id: Option<String>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let Some(base_url) = cli.url.clone().filter(|url| !url.is_empty()) else {
            bail!("base URL must be provided (--url or DDM_URL)");
        };
        let Some(api_key) = cli.api_key.clone().filter(|key| !key.is_empty()) else {
            bail!("API key must be provided (--api-key or DDM_API_KEY)");
        };
        Ok(Self {
            base_url,
            api_user: cli.api_user.clone(),
            api_key,
            client_id: cli.client_id.clone(),
        })
    }

    /// Base URL joined with the server's DDM API prefix.
    pub fn api_url(&self) -> String {
        format!("{}/api/v1/ddm", self.base_url.trim_end_matches('/'))
    }

    /// The enrollment ID for device-scoped commands.
    pub fn require_client_id(&self) -> Result<&str> {
        match self.client_id.as_deref() {
            Some(id) if plausible_enrollment_id(id) => Ok(id),
            Some(id) => bail!("{id} does not look like a valid enrollment ID"),
            None => bail!("client ID must be provided (--client-id or DDM_CLIENT_ID)"),
        }
    }
}

// Enrollment IDs are UUIDs (36 chars) or compressed UUIDs (25 chars).
fn plausible_enrollment_id(id: &str) -> bool {
    matches!(id.len(), 25 | 36)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, client_id: Option<&str>) -> Config {
        Config {
            base_url: base_url.to_string(),
            api_user: "kmfddm".to_string(),
            api_key: "secret".to_string(),
            client_id: client_id.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn api_url_joins_prefix() {
        assert_eq!(
            config("https://ddm.example.org", None).api_url(),
            "https://ddm.example.org/api/v1/ddm"
        );
        assert_eq!(
            config("https://ddm.example.org/", None).api_url(),
            "https://ddm.example.org/api/v1/ddm"
        );
    }

    #[test]
    fn client_id_must_look_like_a_uuid() {
        let uuid = "ECA5E0AE-9E99-4AF9-B619-4DD5C3D5A123";
        assert_eq!(uuid.len(), 36);
        assert!(config("https://x", Some(uuid)).require_client_id().is_ok());
        assert!(
            config("https://x", Some("nope"))
                .require_client_id()
                .is_err()
        );
        assert!(config("https://x", None).require_client_id().is_err());
    }
}
