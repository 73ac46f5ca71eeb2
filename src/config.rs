// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! This module handles persistent configuration storage using TOML format.
//! It covers the data directory, distance display preferences, default
//! filter and nearest-lookup settings, a location override for machines
//! without a location source, and migration from the pre-versioned format.

use std::path::PathBuf;

use log::info;
use proximity::{DistanceUnit, NearestQuery, PassNetwork, MAX_DISTANCE_SLIDER_MILES};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "skiwithcare";
const CONFIG_NAME: &str = "config";
const CURRENT_CONFIG_VERSION: u32 = 2;

/// Legacy configuration format for migration (pre-versioned)
#[derive(Debug, Default, Serialize, Deserialize)]
struct LegacyAppConfig {
    data_dir: Option<PathBuf>,
    use_kilometers: Option<bool>,
    max_distance: Option<f64>,
    show_epic: Option<bool>,
    show_ikon: Option<bool>,
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations. Files without one are legacy.
    #[serde(default)]
    pub config_version: u32,

    /// Directory holding resorts.json, clinics.json, hospitals.json, facilities.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Unit for displayed distances
    #[serde(default)]
    pub units: DistanceUnit,

    /// Default distance ceiling in miles (200 = unlimited)
    #[serde(default = "default_max_distance")]
    pub max_distance_miles: f64,

    /// Pass networks enabled in the resort list
    #[serde(default = "default_pass_networks")]
    pub enabled_pass_networks: Vec<PassNetwork>,

    /// Override latitude (for machines without a location source)
    #[serde(default)]
    pub override_latitude: Option<f64>,

    /// Override longitude (for machines without a location source)
    #[serde(default)]
    pub override_longitude: Option<f64>,

    /// Verification age in days after which contact data is flagged
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,

    /// Nearest-facility lookup settings
    #[serde(default)]
    pub nearest: NearestQuery,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_max_distance() -> f64 {
    MAX_DISTANCE_SLIDER_MILES
}

fn default_pass_networks() -> Vec<PassNetwork> {
    PassNetwork::ALL.to_vec()
}

fn default_stale_after_days() -> i64 {
    365
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            data_dir: default_data_dir(),
            units: DistanceUnit::default(),
            max_distance_miles: default_max_distance(),
            enabled_pass_networks: default_pass_networks(),
            override_latitude: None,
            override_longitude: None,
            stale_after_days: default_stale_after_days(),
            nearest: NearestQuery::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk with automatic migration from legacy format
    pub fn load() -> Result<Self, confy::ConfyError> {
        let config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;

        // Missing or older version indicates the legacy format
        if config.config_version < CURRENT_CONFIG_VERSION {
            if let Ok(legacy_config) = Self::try_load_legacy() {
                info!(
                    "Migrating legacy configuration (version {})",
                    config.config_version
                );
                let migrated = Self::migrate_from_legacy(legacy_config);
                migrated.save()?;
                return Ok(migrated);
            }
        }

        Ok(config)
    }

    /// Attempt to load legacy configuration format
    fn try_load_legacy() -> Result<LegacyAppConfig, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Migrate from the pre-versioned flat format
    fn migrate_from_legacy(legacy: LegacyAppConfig) -> Self {
        let mut enabled_pass_networks = Vec::new();
        if legacy.show_epic.unwrap_or(true) {
            enabled_pass_networks.push(PassNetwork::Epic);
        }
        if legacy.show_ikon.unwrap_or(true) {
            enabled_pass_networks.push(PassNetwork::Ikon);
        }

        Self {
            config_version: default_config_version(),
            data_dir: legacy.data_dir.unwrap_or_else(default_data_dir),
            units: if legacy.use_kilometers.unwrap_or(false) {
                DistanceUnit::Kilometers
            } else {
                DistanceUnit::Miles
            },
            max_distance_miles: legacy.max_distance.unwrap_or_else(default_max_distance),
            enabled_pass_networks,
            ..Self::default()
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Location override, if both halves are set.
    pub fn override_location(&self) -> Option<(f64, f64)> {
        self.override_latitude.zip(self.override_longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_from_legacy() {
        let legacy = LegacyAppConfig {
            data_dir: Some(PathBuf::from("/srv/data")),
            use_kilometers: Some(true),
            max_distance: Some(75.0),
            show_epic: Some(false),
            show_ikon: None,
        };
        let config = AppConfig::migrate_from_legacy(legacy);
        assert_eq!(config.config_version, CURRENT_CONFIG_VERSION);
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.units, DistanceUnit::Kilometers);
        assert_eq!(config.max_distance_miles, 75.0);
        assert_eq!(config.enabled_pass_networks, vec![PassNetwork::Ikon]);
    }

    #[test]
    fn test_override_location_needs_both_halves() {
        let mut config = AppConfig {
            override_latitude: Some(39.6),
            ..AppConfig::default()
        };
        assert_eq!(config.override_location(), None);
        config.override_longitude = Some(-106.3);
        assert_eq!(config.override_location(), Some((39.6, -106.3)));
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: AppConfig = serde_json::from_str(r#"{"units": "kilometers"}"#).unwrap();
        assert_eq!(config.units, DistanceUnit::Kilometers);
        assert_eq!(config.max_distance_miles, MAX_DISTANCE_SLIDER_MILES);
        assert_eq!(config.nearest, NearestQuery::default());
        assert_eq!(config.config_version, 0);
        assert_eq!(AppConfig::default().config_version, CURRENT_CONFIG_VERSION);
    }
}
