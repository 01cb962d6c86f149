//! Configuration for the Bloom Sensor Agent.

use crate::catalog::AssetPattern;
use crate::core::{ClassifierConfig, PipelineConfig, VitalityConfig};
use crate::source::{InteractiveConfig, LidarConfig, SourceKind, SyntheticConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Main configuration for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Smoothing, thresholds, rates and selection mode
    pub pipeline: PipelineConfig,

    /// Simulated seconds per tick, fed to the state models
    pub dt_secs: f64,

    /// Wall-clock pause between ticks
    #[serde(with = "duration_millis")]
    pub tick_interval: Duration,

    /// Directory holding the asset catalog
    pub asset_dir: Option<PathBuf>,

    /// File name pattern of catalog entries
    pub asset_pattern: AssetPattern,

    pub lidar: LidarConfig,
    pub synthetic: SyntheticConfig,
    pub interactive: InteractiveConfig,

    /// Path for exporting session summaries
    pub export_path: PathBuf,

    /// Path for storing state
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bloom-sensor-agent");

        Self {
            pipeline: PipelineConfig::default(),
            dt_secs: 0.05,
            tick_interval: Duration::from_millis(50),
            asset_dir: None,
            asset_pattern: AssetPattern::default(),
            lidar: LidarConfig::default(),
            synthetic: SyntheticConfig::default(),
            interactive: InteractiveConfig::default(),
            export_path: data_dir.join("exports"),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration as pretty JSON to `path`, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bloom-sensor-agent")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Copy of this configuration with a preset's parameters applied.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        preset.apply(&mut self);
        self
    }

    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pipeline;
        if p.smoothing_window == 0 {
            return Err(ConfigError::Invalid(
                "smoothing_window must be at least 1".to_string(),
            ));
        }

        let c = &p.classifier;
        let thresholds = [c.near_cm, c.hunched_cm, c.far_cm];
        if thresholds.iter().any(|t| !t.is_finite()) {
            return Err(ConfigError::Invalid(
                "classifier thresholds must be finite".to_string(),
            ));
        }
        if !(c.near_cm <= c.hunched_cm && c.hunched_cm < c.far_cm) {
            return Err(ConfigError::Invalid(format!(
                "thresholds must satisfy near <= hunched < far (got {} / {} / {})",
                c.near_cm, c.hunched_cm, c.far_cm
            )));
        }

        let v = &p.vitality;
        for (name, rate) in [("decay_rate", v.decay_rate), ("recover_rate", v.recover_rate)] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number (got {rate})"
                )));
            }
        }

        if !(self.dt_secs.is_finite() && self.dt_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "dt_secs must be positive (got {})",
                self.dt_secs
            )));
        }
        Ok(())
    }
}

/// Far threshold of the interactive preset. The arena's 150 px radius
/// (60 cm) is inclusive, so the cutoff sits just past it.
pub const INTERACTIVE_FAR_CM: f64 = 60.000_001;

/// Parameter sets matching the deployments the agent ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Desk-mounted range finder, 20 Hz
    Lidar,
    /// Generated scripts, one simulated second per tick
    Synthetic,
    /// Keyboard steering at 30 frames per second
    Interactive,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Lidar, Preset::Synthetic, Preset::Interactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Lidar => "lidar",
            Preset::Synthetic => "synthetic",
            Preset::Interactive => "interactive",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Preset::Lidar => "5-sample smoothing, decay 5/s, recover 3/s, 50 ms ticks",
            Preset::Synthetic => "no smoothing, decay 5/s, recover 3/s, 1 s ticks shown every 100 ms",
            Preset::Interactive => "no smoothing, no near cutoff, decay 10/s, recover 10/s, 30 fps",
        }
    }

    /// Preset a source runs with unless told otherwise.
    pub fn for_source(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Lidar => Preset::Lidar,
            SourceKind::Synthetic | SourceKind::Pattern => Preset::Synthetic,
            SourceKind::Interactive => Preset::Interactive,
        }
    }

    /// Overwrite the pipeline and timing parameters of `config`.
    ///
    /// Selection mode, paths and source geometry are left alone.
    pub fn apply(&self, config: &mut Config) {
        let selection = config.pipeline.selection;
        match self {
            Preset::Lidar => {
                config.pipeline = PipelineConfig {
                    smoothing_window: 5,
                    classifier: ClassifierConfig::default(),
                    vitality: VitalityConfig::default(),
                    selection,
                };
                config.dt_secs = 0.05;
                config.tick_interval = Duration::from_millis(50);
            }
            Preset::Synthetic => {
                config.pipeline = PipelineConfig {
                    smoothing_window: 1,
                    classifier: ClassifierConfig::default(),
                    vitality: VitalityConfig::default(),
                    selection,
                };
                config.dt_secs = 1.0;
                config.tick_interval = Duration::from_millis(100);
            }
            Preset::Interactive => {
                config.pipeline = PipelineConfig {
                    smoothing_window: 1,
                    classifier: ClassifierConfig {
                        near_cm: 0.0,
                        far_cm: INTERACTIVE_FAR_CM,
                        ..ClassifierConfig::default()
                    },
                    vitality: VitalityConfig::symmetric(10.0),
                    selection,
                };
                config.dt_secs = 1.0 / 30.0;
                config.tick_interval = Duration::from_millis(33);
                config.interactive.step_secs = config.dt_secs;
            }
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lidar" => Ok(Preset::Lidar),
            "synthetic" | "sim" => Ok(Preset::Synthetic),
            "interactive" => Ok(Preset::Interactive),
            other => Err(ConfigError::UnknownName(format!("preset '{other}'"))),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    UnknownName(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::UnknownName(e) => write!(f, "Unknown {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as whole milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SelectionMode;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pipeline.smoothing_window, 5);
        assert_eq!(config.pipeline.classifier.far_cm, 60.0);
        assert_eq!(config.pipeline.vitality.decay_rate, 5.0);
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let interactive = Config::default().with_preset(Preset::Interactive);
        assert_eq!(interactive.pipeline.vitality.decay_rate, 10.0);
        assert_eq!(interactive.pipeline.vitality.recover_rate, 10.0);
        assert_eq!(interactive.pipeline.classifier.near_cm, 0.0);
        assert_eq!(interactive.interactive.step_secs, interactive.dt_secs);
        assert!(interactive.validate().is_ok());

        let synthetic = Config::default().with_preset(Preset::Synthetic);
        assert_eq!(synthetic.dt_secs, 1.0);
        assert_eq!(synthetic.pipeline.smoothing_window, 1);
        assert!(synthetic.validate().is_ok());
    }

    #[test]
    fn test_interactive_radius_is_inclusive() {
        use crate::core::PresenceClassifier;

        let config = Config::default().with_preset(Preset::Interactive);
        let classifier = PresenceClassifier::new(config.pipeline.classifier);
        let cm_per_px = config.interactive.cm_per_px;

        assert!(classifier.classify(Some(150.0 * cm_per_px)).presence);
        assert!(!classifier.classify(Some(151.0 * cm_per_px)).presence);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("bloom-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("config.json");

        // Missing file means defaults
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let mut config = Config::default().with_preset(Preset::Lidar);
        config.asset_dir = Some(PathBuf::from("/srv/flowers"));
        config.pipeline.selection = SelectionMode::Detection;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.asset_dir, config.asset_dir);
        assert_eq!(loaded.pipeline, config.pipeline);
        assert_eq!(loaded.tick_interval, config.tick_interval);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_preset_keeps_selection_mode() {
        let mut config = Config::default();
        config.pipeline.selection = SelectionMode::Detection;
        let config = config.with_preset(Preset::Lidar);
        assert_eq!(config.pipeline.selection, SelectionMode::Detection);
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("LIDAR".parse::<Preset>().unwrap(), Preset::Lidar);
        assert!(matches!(
            "sonar".parse::<Preset>(),
            Err(ConfigError::UnknownName(_))
        ));
        assert_eq!(Preset::for_source(SourceKind::Pattern), Preset::Synthetic);
    }

    #[test]
    fn test_validation_rejects_bad_thresholds() {
        let mut config = Config::default();
        config.pipeline.classifier.hunched_cm = 70.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.pipeline.vitality.recover_rate = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.dt_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pipeline.smoothing_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_and_partial_files() {
        let config = Config::default().with_preset(Preset::Synthetic);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.pipeline, config.pipeline);
        assert_eq!(parsed.tick_interval, config.tick_interval);
        assert_eq!(parsed.asset_pattern, config.asset_pattern);

        let partial: Config = serde_json::from_str(r#"{"tick_interval": 250}"#).unwrap();
        assert_eq!(partial.tick_interval, Duration::from_millis(250));
        assert_eq!(partial.pipeline, PipelineConfig::default());
    }
}
