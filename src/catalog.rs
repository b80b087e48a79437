//! Declarative table of every metric the oracle collects.
//!
//! Each entry says where a raw value comes from, how to find it in the
//! response, what range it is scored against and what to use when the
//! source is unavailable. Providers and the normalizer both read from here.

use crate::config::ProviderBases;
use crate::error::ScoreError;
use crate::scoring::{Category, MetricRange, RangeTable, WeightTable};
use serde::Serialize;

pub const DEFAULT_USER_AGENT: &str = "ESGOracle/1.0";

/// SEC EDGAR asks for a contact address in the user agent.
pub const SEC_USER_AGENT: &str = "ESGOracle/1.0 (contact@dpx.project)";

/// Apple Inc., used as the reference filer for the assets metric.
const SEC_REFERENCE_CIK: &str = "0000320193";

/// Where and how to read one raw metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSpec {
    pub category: Category,
    pub name: String,
    pub url: String,
    /// JSON pointer (RFC 6901) to the value. If it lands on an array the
    /// last element is used.
    pub pointer: String,
    /// Field to read from the element the pointer selects.
    pub field: Option<String>,
    pub range: MetricRange,
    /// Raw value substituted when the source cannot be read.
    pub fallback: f64,
}

/// A data source and the metrics it contributes.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSpec {
    pub name: String,
    pub user_agent: String,
    pub metrics: Vec<MetricSpec>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    providers: Vec<ProviderSpec>,
}

impl Catalog {
    pub fn new(providers: Vec<ProviderSpec>) -> Self {
        Self { providers }
    }

    /// The public climate, economic and regulatory sources.
    pub fn standard(bases: &ProviderBases) -> Self {
        use Category::{Environmental, Governance, Social};

        let metric = |category, name: &str, url: String, pointer: &str, range, fallback| {
            MetricSpec {
                category,
                name: name.to_string(),
                url,
                pointer: pointer.to_string(),
                field: None,
                range,
                fallback,
            }
        };

        let world_bank = ProviderSpec {
            name: "WorldBank".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            metrics: vec![metric(
                Environmental,
                "co2_per_capita",
                format!(
                    "{}/country/all/indicator/EN.ATM.CO2E.PC?format=json&date=2020:2023&per_page=1",
                    bases.world_bank
                ),
                "/1/0/value",
                // tons per capita
                MetricRange::new(0.0, 20.0, true),
                4.5,
            )],
        };

        let climate_monitor = ProviderSpec {
            name: "ClimateMonitor".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            metrics: vec![
                metric(
                    Environmental,
                    "co2",
                    format!("{}/co2/latest", bases.climate_monitor),
                    "/value",
                    // ppm
                    MetricRange::new(300.0, 500.0, true),
                    420.0,
                ),
                metric(
                    Environmental,
                    "ch4",
                    format!("{}/ch4/monthly", bases.climate_monitor),
                    "/value",
                    // ppb
                    MetricRange::new(1500.0, 2000.0, true),
                    1900.0,
                ),
            ],
        };

        let un = ProviderSpec {
            name: "UN".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            metrics: vec![
                // SDG 4.1.1, minimum reading proficiency
                metric(
                    Social,
                    "education",
                    format!("{}/sdg/Indicator/Data?indicator=4.1.1&pageSize=1", bases.un_sdg),
                    "/data/0/value",
                    MetricRange::new(0.0, 100.0, false),
                    70.0,
                ),
                // SDG 3.8.1, universal health coverage index
                metric(
                    Social,
                    "health",
                    format!("{}/sdg/Indicator/Data?indicator=3.8.1&pageSize=1", bases.un_sdg),
                    "/data/0/value",
                    MetricRange::new(0.0, 100.0, false),
                    75.0,
                ),
            ],
        };

        let imf = ProviderSpec {
            name: "IMF".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            metrics: vec![MetricSpec {
                field: Some("@OBS_VALUE".into()),
                ..metric(
                    Governance,
                    "cpi",
                    format!("{}/CompactData/CPI/A.US.PCPI_IX", bases.imf),
                    "/CompactData/DataSet/Series/Obs",
                    MetricRange::new(50.0, 200.0, true),
                    100.0,
                )
            }],
        };

        let oecd = ProviderSpec {
            name: "OECD".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            metrics: vec![metric(
                Governance,
                "gdp",
                format!(
                    "{}/OECD.SDD.NAD,DSD_NAAG@DF_NAAG_I?dimensionAtObservation=AllDimensions&format=jsondata",
                    bases.oecd
                ),
                "/data/dataSets/0/observations/0:0:0:0:0:0/0",
                MetricRange::new(50.0, 500.0, false),
                100.0,
            )],
        };

        let sec = ProviderSpec {
            name: "SEC".into(),
            user_agent: SEC_USER_AGENT.into(),
            metrics: vec![MetricSpec {
                field: Some("val".into()),
                ..metric(
                    Governance,
                    "assets",
                    format!(
                        "{}/api/xbrl/companyfacts/CIK{}.json",
                        bases.sec, SEC_REFERENCE_CIK
                    ),
                    "/facts/us-gaap/Assets/units/USD",
                    // $1B to $5T
                    MetricRange::new(1e9, 5e12, false),
                    1e11,
                )
            }],
        };

        Self::new(vec![world_bank, climate_monitor, un, imf, oecd, sec])
    }

    pub fn providers(&self) -> &[ProviderSpec] {
        &self.providers
    }

    pub fn metrics(&self) -> impl Iterator<Item = &MetricSpec> {
        self.providers.iter().flat_map(|p| p.metrics.iter())
    }

    /// Checks every declared range and fallback.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for spec in self.metrics() {
            spec.range.validate()?;
            if !spec.fallback.is_finite() {
                return Err(ScoreError::NonFiniteValue);
            }
        }
        Ok(())
    }

    /// Ranges keyed the way the normalizer looks them up. If two providers
    /// declare the same metric, the later declaration wins.
    pub fn ranges(&self) -> RangeTable {
        let mut table = RangeTable::default();
        for spec in self.metrics() {
            table
                .get_mut(spec.category)
                .insert(spec.name.clone(), spec.range);
        }
        table
    }

    /// Equal weight for every declared metric.
    pub fn default_weights(&self) -> WeightTable {
        let mut table = WeightTable::default();
        for spec in self.metrics() {
            table.get_mut(spec.category).insert(spec.name.clone(), 1.0);
        }
        table
    }
}
