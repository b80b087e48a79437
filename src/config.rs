//! Process configuration.
//!
//! [`Settings`] is read once from the environment (after `.env` is loaded).
//! The [`WeightTable`] comes from a JSON file shaped like
//!
//! ```json
//! {
//!   "environmental": { "co2": 1.0, "ch4": 0.5 },
//!   "social": { "education": 1.0 },
//!   "governance": { "cpi": 2.0 }
//! }
//! ```
//!
//! or, when no file is configured, from the catalog defaults.

use crate::error::ScoreError;
use crate::scoring::{WeightTable, validate_weights};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Base URLs of the public data sources.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderBases {
    pub world_bank: String,
    pub un_sdg: String,
    pub climate_monitor: String,
    pub imf: String,
    pub oecd: String,
    pub sec: String,
}

impl Default for ProviderBases {
    fn default() -> Self {
        Self {
            world_bank: "https://api.worldbank.org/v2".into(),
            un_sdg: "https://unstats.un.org/SDGAPI/v1".into(),
            climate_monitor: "https://climatemonitor.info/api/public/v1".into(),
            imf: "https://dataservices.imf.org/REST/SDMX_JSON.svc".into(),
            oecd: "https://sdmx.oecd.org/public/rest/data".into(),
            sec: "https://data.sec.gov".into(),
        }
    }
}

impl ProviderBases {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let pick = |key: &str, default: String| lookup(key).unwrap_or(default);
        Self {
            world_bank: pick("WORLD_BANK_BASE", defaults.world_bank),
            un_sdg: pick("UN_SDG_BASE", defaults.un_sdg),
            climate_monitor: pick("CLIMATE_MONITOR_BASE", defaults.climate_monitor),
            imf: pick("IMF_BASE", defaults.imf),
            oecd: pick("OECD_BASE", defaults.oecd),
            sec: pick("SEC_BASE", defaults.sec),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub update_frequency: Duration,
    pub history_size: usize,
    pub request_timeout: Duration,
    pub weights_path: Option<PathBuf>,
    pub bases: ProviderBases,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 3001,
            update_frequency: Duration::from_secs(60 * 60),
            history_size: 24,
            request_timeout: Duration::from_secs(5),
            weights_path: None,
            bases: ProviderBases::default(),
        }
    }
}

impl Settings {
    /// Reads `PORT`, `UPDATE_FREQUENCY` (minutes), `HISTORY_SIZE`,
    /// `REQUEST_TIMEOUT_SECS`, `WEIGHTS_PATH` and the provider base URLs.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let update_frequency = match parse_var::<u64>(&lookup, "UPDATE_FREQUENCY")? {
            Some(minutes) => minutes
                .checked_mul(60)
                .map(Duration::from_secs)
                .with_context(|| format!("UPDATE_FREQUENCY of {minutes} minutes is too large"))?,
            None => defaults.update_frequency,
        };
        let history_size = parse_var(&lookup, "HISTORY_SIZE")?.unwrap_or(defaults.history_size);
        let request_timeout = parse_var(&lookup, "REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        if update_frequency.is_zero() {
            anyhow::bail!("UPDATE_FREQUENCY must be at least 1 minute");
        }
        if history_size == 0 {
            anyhow::bail!("HISTORY_SIZE must be at least 1");
        }

        Ok(Self {
            port,
            update_frequency,
            history_size,
            request_timeout,
            weights_path: lookup("WEIGHTS_PATH").map(PathBuf::from),
            bases: ProviderBases::from_lookup(&lookup),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {key}: '{raw}'"))
        })
        .transpose()
}

impl WeightTable {
    /// Loads weights from a JSON file and validates them.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read weights from {}", path.display()))?;
        let table: WeightTable = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse weights in {}", path.display()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        for (_, weights) in self.iter() {
            validate_weights(weights)?;
        }
        Ok(())
    }
}
