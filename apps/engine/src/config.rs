use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::report::DimensionId;

/// Per-dimension weights. A dimension's weight doubles as its max score, so
/// the weighted sum normalizes cleanly over whichever evaluators actually
/// ran. These are product-tunable defaults, not contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub ats: u32,
    pub coverage: u32,
    pub content: u32,
    pub role_reality: u32,
    pub market_fit: u32,
    pub credibility: u32,
    pub trajectory: u32,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        DimensionWeights {
            ats: 20,
            coverage: 15,
            content: 25,
            role_reality: 15,
            market_fit: 10,
            credibility: 10,
            trajectory: 5,
        }
    }
}

impl DimensionWeights {
    pub fn for_dimension(&self, dimension: DimensionId) -> u32 {
        match dimension {
            DimensionId::AtsParseability => self.ats,
            DimensionId::RequirementCoverage => self.coverage,
            DimensionId::ContentSignal => self.content,
            DimensionId::RoleReality => self.role_reality,
            DimensionId::MarketFit => self.market_fit,
            DimensionId::ExperienceCredibility => self.credibility,
            DimensionId::CareerTrajectory => self.trajectory,
        }
    }
}

/// Status band cutoffs over the normalized 0–100 overall score:
/// critical < weak_from, weak < moderate_from, moderate < strong_from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCutoffs {
    pub weak_from: u32,
    pub moderate_from: u32,
    pub strong_from: u32,
}

impl Default for BandCutoffs {
    fn default() -> Self {
        BandCutoffs {
            weak_from: 30,
            moderate_from: 50,
            strong_from: 70,
        }
    }
}

/// Engine configuration. Defaults work out of the box; env vars and an
/// optional JSON file override them. Invalid configuration is fatal — the
/// engine refuses to run rather than score with wrong weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub weights: DimensionWeights,
    #[serde(default)]
    pub bands: BandCutoffs,
    /// ATS gate: when the ATS score falls below this fraction of its max,
    /// every other dimension becomes informational only.
    #[serde(default = "default_gate_ratio")]
    pub ats_gate_ratio: f64,
    /// How many ranked failure causes to surface.
    #[serde(default = "default_top_failure_causes")]
    pub top_failure_causes: usize,
    /// Directory of reference-data override files, if any.
    #[serde(default)]
    pub reference_dir: Option<PathBuf>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_rust_log")]
    pub rust_log: String,
}

fn default_gate_ratio() -> f64 {
    0.75
}

fn default_top_failure_causes() -> usize {
    5
}

fn default_port() -> u16 {
    8080
}

fn default_rust_log() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            weights: DimensionWeights::default(),
            bands: BandCutoffs::default(),
            ats_gate_ratio: default_gate_ratio(),
            top_failure_causes: default_top_failure_causes(),
            reference_dir: None,
            port: default_port(),
            rust_log: default_rust_log(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the environment on top of defaults.
    /// `RESCORE_CONFIG` may point at a JSON file supplying any subset of
    /// fields; individual env vars win over the file.
    pub fn from_env() -> Result<Self, EngineError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut config = match std::env::var("RESCORE_CONFIG") {
            Ok(path) => Self::from_file(&PathBuf::from(path))?,
            Err(_) => EngineConfig::default(),
        };

        if let Ok(dir) = std::env::var("RESCORE_REFERENCE_DIR") {
            config.reference_dir = Some(PathBuf::from(dir));
        }
        if let Ok(ratio) = std::env::var("RESCORE_ATS_GATE_RATIO") {
            config.ats_gate_ratio = ratio
                .parse::<f64>()
                .context("RESCORE_ATS_GATE_RATIO must be a number")
                .map_err(|e| EngineError::Config(e.to_string()))?;
        }
        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse::<u16>()
                .context("PORT must be a valid port number")
                .map_err(|e| EngineError::Config(e.to_string()))?;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.rust_log = level;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &PathBuf) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: EngineConfig = serde_json::from_str(&raw)
            .map_err(|e| EngineError::Config(format!("malformed {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.weights.ats == 0 {
            return Err(EngineError::Config(
                "ATS weight must be positive (it drives the gate)".into(),
            ));
        }
        let total: u32 = DimensionId::ALL
            .iter()
            .map(|d| self.weights.for_dimension(*d))
            .sum();
        if total == 0 {
            return Err(EngineError::Config("all dimension weights are zero".into()));
        }
        if !(self.ats_gate_ratio > 0.0 && self.ats_gate_ratio <= 1.0) {
            return Err(EngineError::Config(format!(
                "ats_gate_ratio must be in (0, 1], got {}",
                self.ats_gate_ratio
            )));
        }
        if !(self.bands.weak_from < self.bands.moderate_from
            && self.bands.moderate_from < self.bands.strong_from
            && self.bands.strong_from <= 100)
        {
            return Err(EngineError::Config(
                "band cutoffs must be ascending and at most 100".into(),
            ));
        }
        if self.top_failure_causes == 0 {
            return Err(EngineError::Config("top_failure_causes must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_weights_total_100() {
        let w = DimensionWeights::default();
        let total: u32 = DimensionId::ALL.iter().map(|d| w.for_dimension(*d)).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_zero_ats_weight_rejected() {
        let mut config = EngineConfig::default();
        config.weights.ats = 0;
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_gate_ratio_out_of_range_rejected() {
        let mut config = EngineConfig::default();
        config.ats_gate_ratio = 1.5;
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_descending_bands_rejected() {
        let mut config = EngineConfig::default();
        config.bands.moderate_from = 20;
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let parsed: EngineConfig =
            serde_json::from_str(r#"{"ats_gate_ratio": 0.5}"#).unwrap();
        assert!((parsed.ats_gate_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(parsed.weights, DimensionWeights::default());
        assert_eq!(parsed.top_failure_causes, 5);
    }
}
