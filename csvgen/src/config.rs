//! Service configuration, built once at startup and injected into the writer
//! and sweeper.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};

/// Path segment under which artifacts are published.
pub const UPLOADS_SEGMENT: &str = "uploads";

/// Global retention rules for generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Artifacts strictly older than this are deleted by the next sweep pass.
    pub max_age: Duration,
    /// Time between sweep passes. Passes are aligned to multiples of this
    /// interval since the Unix epoch (`*/30 * * * *` for the default).
    pub sweep_interval: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Port the HTTP server listens on. Also decides whether the public base
    /// URL carries an explicit port.
    pub port: u16,
    /// Externally visible scheme + host, e.g. `https://csv.example.com`.
    pub domain_name: String,
    /// Shared directory for generated artifacts.
    pub upload_dir: PathBuf,
    /// Directory for per-request JSON logs (only used when `debug` is set).
    pub log_dir: PathBuf,
    /// Directory holding the auxiliary static assets.
    pub static_dir: PathBuf,
    /// Write every request to `log_dir` as a JSON file.
    pub debug: bool,
    pub retention: RetentionPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 80,
            domain_name: "http://localhost".to_string(),
            upload_dir: PathBuf::from("uploads"),
            log_dir: PathBuf::from("logs"),
            static_dir: PathBuf::from("static"),
            debug: false,
            retention: RetentionPolicy::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.domain_name.trim().is_empty() {
            return Err(anyhow!("domain_name must be non-empty"));
        }
        if self.retention.max_age.is_zero() {
            return Err(anyhow!("retention max_age must be > 0"));
        }
        if self.retention.sweep_interval.is_zero() {
            return Err(anyhow!("retention sweep_interval must be > 0"));
        }
        Ok(())
    }

    /// Base URL clients use to reach this service.
    ///
    /// Port 80 is implied; any other port is appended to the domain.
    pub fn public_base_url(&self) -> String {
        let domain = self.domain_name.trim_end_matches('/');
        if self.port == 80 {
            domain.to_string()
        } else {
            format!("{}:{}", domain, self.port)
        }
    }

    /// Public URL of the artifact named `file_name`.
    pub fn artifact_url(&self, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url(),
            UPLOADS_SEGMENT,
            file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.port, 80);
        assert_eq!(cfg.domain_name, "http://localhost");
        assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
        assert_eq!(cfg.log_dir, PathBuf::from("logs"));
        assert!(!cfg.debug);
        assert_eq!(cfg.retention.max_age, Duration::from_millis(1_800_000));
        assert_eq!(cfg.retention.sweep_interval, Duration::from_secs(1800));
        cfg.validate().expect("defaults validate");
    }

    #[test]
    fn base_url_omits_port_80() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.public_base_url(), "http://localhost");
        assert_eq!(
            cfg.artifact_url("0123456789abcdef.csv"),
            "http://localhost/uploads/0123456789abcdef.csv"
        );
    }

    #[test]
    fn base_url_appends_other_ports_and_trims_slash() {
        let cfg = ServiceConfig {
            port: 8080,
            domain_name: "https://csv.example.com/".to_string(),
            ..ServiceConfig::default()
        };
        assert_eq!(cfg.public_base_url(), "https://csv.example.com:8080");
    }

    #[test]
    fn rejects_zero_durations() {
        let cfg = ServiceConfig {
            retention: RetentionPolicy {
                max_age: Duration::ZERO,
                ..RetentionPolicy::default()
            },
            ..ServiceConfig::default()
        };
        let err = cfg.validate().expect_err("zero max_age");
        assert!(err.to_string().contains("max_age"));

        let cfg = ServiceConfig {
            retention: RetentionPolicy {
                sweep_interval: Duration::ZERO,
                ..RetentionPolicy::default()
            },
            ..ServiceConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_blank_domain() {
        let cfg = ServiceConfig {
            domain_name: "  ".to_string(),
            ..ServiceConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
