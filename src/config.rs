//! Server configuration
//!
//! Configuration is read from a JSON file. Every key is optional and falls
//! back to its default:
//!
//! ```json
//! {
//!     "host": "127.0.0.1",
//!     "port": 9876,
//!     "interest_rate": 0.05,
//!     "auto_interest_interval": 60,
//!     "critical_section_delay_ms": 0,
//!     "auditor": "Audit",
//!     "seed_accounts": true
//! }
//! ```

use crate::core::interest::rate_from_f64;
use crate::types::LedgerError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File read when no explicit path is given, if it exists
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Interface to listen on
    pub host: String,

    /// TCP port, 0 picks an ephemeral port
    pub port: u16,

    /// Loan interest rate applied per run
    pub interest_rate: f64,

    /// Seconds between automatic interest runs, 0 disables them
    pub auto_interest_interval: u64,

    /// Artificial pause inside every mutating critical section
    pub critical_section_delay_ms: u64,

    /// Identity allowed to run privileged commands
    pub auditor: String,

    /// Install the demo accounts at startup
    pub seed_accounts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9876,
            interest_rate: 0.05,
            auto_interest_interval: 60,
            critical_section_delay_ms: 0,
            auditor: "Audit".to_string(),
            seed_accounts: true,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// # Arguments
    ///
    /// * `path` - explicit file; it must exist. With `None`, `config.json` in
    ///   the working directory is used if present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// * `Io` - the file could not be read
    /// * `InvalidConfig` - the file is not valid JSON for this schema
    pub fn load(path: Option<&Path>) -> Result<Self, LedgerError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, LedgerError> {
        let text = fs::read_to_string(path).map_err(|e| LedgerError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, LedgerError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check ranges the type system cannot
    pub fn validate(&self) -> Result<(), LedgerError> {
        rate_from_f64(self.interest_rate)?;
        if self.host.trim().is_empty() {
            return Err(LedgerError::invalid_config("host must not be empty"));
        }
        if self.auditor.trim().is_empty() {
            return Err(LedgerError::invalid_config("auditor must not be empty"));
        }
        Ok(())
    }

    /// `host:port` suitable for `TcpListener::bind`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn interest_period(&self) -> Duration {
        Duration::from_secs(self.auto_interest_interval)
    }

    pub fn critical_section_delay(&self) -> Duration {
        Duration::from_millis(self.critical_section_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.listen_addr(), "127.0.0.1:9876");
        assert_eq!(config.interest_period(), Duration::from_secs(60));
        assert_eq!(config.critical_section_delay(), Duration::ZERO);
        assert!(config.seed_accounts);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 5000, "interest_rate": 0.1}}"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.interest_rate, 0.1);
        assert_eq!(config.auto_interest_interval, 60);
        assert_eq!(config.auditor, "Audit");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.json")));

        assert!(matches!(result, Err(LedgerError::Io { .. })));
    }

    #[rstest]
    #[case::not_json("port = 5000")]
    #[case::wrong_type(r#"{"port": "high"}"#)]
    #[case::unknown_key(r#"{"prot": 5000}"#)]
    fn test_invalid_json(#[case] text: &str) {
        assert!(matches!(
            Config::from_json(text),
            Err(LedgerError::InvalidConfig { .. })
        ));
    }

    #[rstest]
    #[case::rate_too_low(r#"{"interest_rate": -1.0}"#)]
    #[case::empty_auditor(r#"{"auditor": ""}"#)]
    #[case::empty_host(r#"{"host": " "}"#)]
    fn test_validation_failures(#[case] text: &str) {
        let config = Config::from_json(text).unwrap();
        assert!(matches!(
            config.validate(),
            Err(LedgerError::InvalidConfig { .. })
        ));
    }
}
