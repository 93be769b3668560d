use std::path::PathBuf;

use crate::ClientError;
use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    /// Where the session is persisted between runs. `None` keeps it in memory.
    pub session_file: Option<PathBuf>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ClientError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("OUTLET_DASHBOARD_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:8000".into());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "OUTLET_DASHBOARD_BASE_URL must be an http(s) URL, got {base_url}"
            )));
        }
        let session_file = get("OUTLET_DASHBOARD_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let email = get("OUTLET_DASHBOARD_EMAIL").filter(|v| !v.trim().is_empty());
        let password = get("OUTLET_DASHBOARD_PASSWORD").map(|p| SecretString::new(p.into()));
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session_file,
            email,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_defaults() {
        let cfg = Config::from_env_with(|_| None).expect("cfg");
        assert_eq!(cfg.base_url, "http://localhost:8000");
        assert!(cfg.session_file.is_none());
        assert!(cfg.password.is_none());
    }

    #[test]
    fn from_env_reads_values() {
        let get = |k: &str| match k {
            "OUTLET_DASHBOARD_BASE_URL" => Some("https://reports.example.com/".into()),
            "OUTLET_DASHBOARD_SESSION_FILE" => Some("/tmp/session.json".into()),
            "OUTLET_DASHBOARD_EMAIL" => Some("admin@example.com".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.base_url, "https://reports.example.com");
        assert_eq!(cfg.session_file, Some(PathBuf::from("/tmp/session.json")));
        assert_eq!(cfg.email.as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn from_env_rejects_non_http_url() {
        let get = |k: &str| match k {
            "OUTLET_DASHBOARD_BASE_URL" => Some("ftp://example.com".into()),
            _ => None,
        };
        assert!(Config::from_env_with(get).is_err());
    }
}
