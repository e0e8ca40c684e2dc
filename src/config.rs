//! TOML-based grid configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::voltage::TierTable;

/// Top-level grid configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`GridConfig::from_toml_file`] or use [`GridConfig::default`].
/// The configuration is read-only once handed to the grid core.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Topology scan and cache bounds.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Overvoltage safety model.
    #[serde(default)]
    pub overvoltage: OvervoltageConfig,
    /// Per-tier packet ceilings.
    #[serde(default)]
    pub tiers: TierConfig,
}

/// Topology scan and cache bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Maximum cells a single reachability scan may visit.
    pub max_network_size: usize,
    /// Ticks a cached network stays valid.
    pub cache_expiry_ticks: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_network_size: 4096,
            cache_expiry_ticks: 100,
        }
    }
}

/// Overvoltage safety model parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OvervoltageConfig {
    /// Master switch for placement checks and flow-time consequences.
    pub enabled: bool,
    /// Maximum cells a placement-time overvoltage scan may visit.
    pub max_scan_size: usize,
    /// Destruction radius for a gap of 2 (scaled by 1.5 for larger gaps).
    pub explosion_radius: f32,
}

impl Default for OvervoltageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_scan_size: 1024,
            explosion_radius: 2.0,
        }
    }
}

/// Per-tier packet ceilings, lowest tier first.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TierConfig {
    pub max_packet: [u64; 4],
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            max_packet: [32, 128, 512, 2048],
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"network.max_network_size"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Bounds applied by [`GridConfig::clamped`].
const NETWORK_SIZE_RANGE: (usize, usize) = (1, 1 << 20);
const EXPIRY_RANGE: (u64, u64) = (1, 72_000);
const EXPLOSION_RADIUS_RANGE: (f32, f32) = (0.5, 16.0);

impl GridConfig {
    /// Returns the tier table described by this configuration.
    pub fn tier_table(&self) -> TierTable {
        TierTable::new(self.tiers.max_packet)
    }

    /// Preset for sprawling bases: larger scans, longer-lived cache.
    pub fn large_networks() -> Self {
        Self {
            network: NetworkConfig {
                max_network_size: 65_536,
                cache_expiry_ticks: 400,
            },
            overvoltage: OvervoltageConfig {
                max_scan_size: 16_384,
                ..OvervoltageConfig::default()
            },
            tiers: TierConfig::default(),
        }
    }

    /// Preset with the overvoltage model switched off.
    pub fn no_overvoltage() -> Self {
        Self {
            overvoltage: OvervoltageConfig {
                enabled: false,
                ..OvervoltageConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "large_networks", "no_overvoltage"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "large_networks" => Ok(Self::large_networks()),
            "no_overvoltage" => Ok(Self::no_overvoltage()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// Out-of-range numeric values are clamped (see [`GridConfig::clamped`]),
    /// so the returned config always carries positive bounds.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let parsed: Self =
            toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))?;
        Ok(parsed.clamped())
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let n = &self.network;
        if n.max_network_size == 0 {
            errors.push(ConfigError::new("network.max_network_size", "must be > 0"));
        }
        if n.cache_expiry_ticks == 0 {
            errors.push(ConfigError::new("network.cache_expiry_ticks", "must be > 0"));
        }

        let o = &self.overvoltage;
        if o.max_scan_size == 0 {
            errors.push(ConfigError::new("overvoltage.max_scan_size", "must be > 0"));
        }
        if !(o.explosion_radius.is_finite() && o.explosion_radius > 0.0) {
            errors.push(ConfigError::new(
                "overvoltage.explosion_radius",
                "must be a finite value > 0",
            ));
        }

        let p = &self.tiers.max_packet;
        if p[0] == 0 {
            errors.push(ConfigError::new("tiers.max_packet", "ceilings must be > 0"));
        }
        if p.windows(2).any(|w| w[0] >= w[1]) {
            errors.push(ConfigError::new(
                "tiers.max_packet",
                format!("ceilings must be strictly increasing, got {p:?}"),
            ));
        }

        errors
    }

    /// Returns a copy with numeric bounds clamped into their sane ranges.
    ///
    /// Tier ceilings are not clamped; a non-monotonic table is reported by
    /// [`GridConfig::validate`] instead.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();

        out.network.max_network_size = clamp_logged(
            "network.max_network_size",
            out.network.max_network_size,
            NETWORK_SIZE_RANGE,
        );
        out.network.cache_expiry_ticks = clamp_logged(
            "network.cache_expiry_ticks",
            out.network.cache_expiry_ticks,
            EXPIRY_RANGE,
        );
        out.overvoltage.max_scan_size = clamp_logged(
            "overvoltage.max_scan_size",
            out.overvoltage.max_scan_size,
            NETWORK_SIZE_RANGE,
        );

        let radius = out.overvoltage.explosion_radius;
        let (lo, hi) = EXPLOSION_RADIUS_RANGE;
        let clamped = if radius.is_finite() { radius.clamp(lo, hi) } else { lo };
        if clamped != radius {
            warn!(
                field = "overvoltage.explosion_radius",
                from = radius,
                to = clamped,
                "clamped config value"
            );
        }
        out.overvoltage.explosion_radius = clamped;

        out
    }
}

fn clamp_logged<T>(field: &'static str, value: T, (lo, hi): (T, T)) -> T
where
    T: Copy + Ord + std::fmt::Debug,
{
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        warn!(field, from = ?value, to = ?clamped, "clamped config value");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voltage::Tier;

    #[test]
    fn default_config_valid() {
        let cfg = GridConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = GridConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
        assert_eq!(e.field, "preset");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in GridConfig::PRESETS {
            let cfg = GridConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[network]
max_network_size = 512
cache_expiry_ticks = 20

[overvoltage]
enabled = false
max_scan_size = 256
explosion_radius = 3.5

[tiers]
max_packet = [8, 32, 128, 512]
"#;
        let cfg = GridConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.network.max_network_size), Some(512));
        assert_eq!(cfg.as_ref().map(|c| c.overvoltage.enabled), Some(false));
        assert_eq!(
            cfg.as_ref().map(|c| c.tier_table().max_packet(Tier::T2)),
            Some(32)
        );
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[network]
cache_expiry_ticks = 5
"#;
        let cfg = GridConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.network.cache_expiry_ticks), Some(5));
        assert_eq!(
            cfg.as_ref().map(|c| c.network.max_network_size),
            Some(4096)
        );
        assert_eq!(cfg.as_ref().map(|c| c.overvoltage.enabled), Some(true));
    }

    #[test]
    fn toml_values_are_clamped_on_load() {
        let toml = r#"
[network]
max_network_size = 0
cache_expiry_ticks = 0

[overvoltage]
explosion_radius = 100.0
"#;
        let cfg = GridConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.network.max_network_size), Some(1));
        assert_eq!(cfg.as_ref().map(|c| c.network.cache_expiry_ticks), Some(1));
        assert_eq!(
            cfg.as_ref().map(|c| c.overvoltage.explosion_radius),
            Some(16.0)
        );
        assert!(cfg.is_some_and(|c| c.validate().is_empty()));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[network]
max_network_size = 10
bogus_field = true
"#;
        assert!(GridConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_zero_bounds() {
        let mut cfg = GridConfig::default();
        cfg.network.max_network_size = 0;
        cfg.overvoltage.max_scan_size = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "network.max_network_size"));
        assert!(errors.iter().any(|e| e.field == "overvoltage.max_scan_size"));
    }

    #[test]
    fn validation_catches_non_monotonic_tiers() {
        let mut cfg = GridConfig::default();
        cfg.tiers.max_packet = [32, 32, 512, 2048];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tiers.max_packet"));
    }

    #[test]
    fn validation_catches_bad_radius() {
        let mut cfg = GridConfig::default();
        cfg.overvoltage.explosion_radius = f32::NAN;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "overvoltage.explosion_radius"));
    }

    #[test]
    fn clamped_pulls_values_into_range() {
        let mut cfg = GridConfig::default();
        cfg.network.max_network_size = 0;
        cfg.network.cache_expiry_ticks = 0;
        cfg.overvoltage.explosion_radius = 100.0;
        let cfg = cfg.clamped();
        assert_eq!(cfg.network.max_network_size, 1);
        assert_eq!(cfg.network.cache_expiry_ticks, 1);
        assert_eq!(cfg.overvoltage.explosion_radius, 16.0);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn clamped_leaves_valid_config_alone() {
        let cfg = GridConfig::large_networks();
        let clamped = cfg.clamped();
        assert_eq!(
            clamped.network.max_network_size,
            cfg.network.max_network_size
        );
        assert_eq!(
            clamped.overvoltage.explosion_radius,
            cfg.overvoltage.explosion_radius
        );
    }

    #[test]
    fn config_error_display_names_field() {
        let e = ConfigError::new("network.max_network_size", "must be > 0");
        assert_eq!(
            e.to_string(),
            "config error: network.max_network_size: must be > 0"
        );
    }
}
