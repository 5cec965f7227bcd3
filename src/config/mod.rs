pub mod cli;

use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_positive_number, validate_template, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Ticketing-portal settings: where the inbox lives, the fallback
/// credentials, and which submitters are proxies filing on behalf of a
/// store (their tickets carry the real store in the owner field).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub inbox_url: String,
    pub email: String,
    pub password: String,
    pub proxy_submitters: Vec<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            inbox_url: "https://gratis-it.4me.com/inbox".to_string(),
            email: String::new(),
            password: String::new(),
            proxy_submitters: vec![
                "Ayse GORDAG".to_string(),
                "Eren BESIROGLU".to_string(),
                "Ahmet Hakan ERGUL".to_string(),
            ],
        }
    }
}

/// Carrier polling settings. The URL template carries a `{tracking}`
/// placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierConfig {
    pub status_url_template: String,
    pub max_in_flight: usize,
    pub request_spacing_ms: u64,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            status_url_template: "https://www.ups.com.tr/WaybillSorgu.aspx?Waybill={tracking}"
                .to_string(),
            max_in_flight: 2,
            request_spacing_ms: 500,
        }
    }
}

/// Every settle delay, bounded wait and step size the harvester uses, in one
/// place instead of scattered sleep literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestTuning {
    pub after_navigation_ms: u64,
    pub between_login_steps_ms: u64,
    pub after_login_ms: u64,
    pub login_wait_secs: u64,
    pub after_open_item_ms: u64,
    pub detail_wait_secs: u64,
    pub after_back_ms: u64,
    pub after_back_on_timeout_ms: u64,
    pub scroll_step_px: i64,
    pub after_scroll_ms: u64,
    pub max_no_progress_sweeps: u32,
}

impl Default for HarvestTuning {
    fn default() -> Self {
        Self {
            after_navigation_ms: 5000,
            between_login_steps_ms: 3000,
            after_login_ms: 5000,
            login_wait_secs: 30,
            after_open_item_ms: 750,
            detail_wait_secs: 10,
            after_back_ms: 500,
            after_back_on_timeout_ms: 1000,
            scroll_step_px: 150,
            after_scroll_ms: 1500,
            max_no_progress_sweeps: 5,
        }
    }
}

impl HarvestTuning {
    pub fn login_wait(&self) -> Duration {
        Duration::from_secs(self.login_wait_secs)
    }

    pub fn detail_wait(&self) -> Duration {
        Duration::from_secs(self.detail_wait_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub portal: PortalConfig,
    pub carrier: CarrierConfig,
    pub harvest: HarvestTuning,
}

impl AppConfig {
    /// Load from a TOML file, or fall back to defaults when no path is
    /// given. Sections and fields may be omitted freely.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| SyncError::Config {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("portal.inbox_url", &self.portal.inbox_url)?;
        validate_template(
            "carrier.status_url_template",
            &self.carrier.status_url_template,
            crate::core::poller::TRACKING_PLACEHOLDER,
        )?;
        validate_positive_number("carrier.max_in_flight", self.carrier.max_in_flight, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [portal]
            email = "ops@example.com"

            [harvest]
            after_scroll_ms = 200
            "#,
        )
        .unwrap();

        assert_eq!(config.portal.email, "ops@example.com");
        assert_eq!(config.portal.proxy_submitters.len(), 3);
        assert_eq!(config.harvest.after_scroll_ms, 200);
        assert_eq!(config.harvest.max_no_progress_sweeps, 5);
        assert_eq!(config.carrier.max_in_flight, 2);
    }

    #[test]
    fn zero_gate_capacity_is_rejected() {
        let mut config = AppConfig::default();
        config.carrier.max_in_flight = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let mut config = AppConfig::default();
        config.carrier.status_url_template = "https://carrier.test/q".to_string();
        assert!(config.validate().is_err());
    }
}
