// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! Loaded from an optional `studyroom.toml`, then overridden by
//! `STUDYROOM_*` environment variables (`__` separates nested keys, e.g.
//! `STUDYROOM_STORE__URL`).

use crate::catalog::Catalog;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "studyroom.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Deployed script URL.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_refresh_interval_secs() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub catalog: Catalog,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Reads `path` if it exists, then applies environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("STUDYROOM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let range = self.catalog.student_ids;
        if range.min > range.max {
            return Err(ConfigError::Message(format!(
                "catalog.student_ids: min {} exceeds max {}",
                range.min, range.max
            )));
        }
        for slot in &self.catalog.time_slots {
            if slot.cutoff.is_some_and(|c| c > Catalog::END_OF_DAY) {
                return Err(ConfigError::Message(format!(
                    "time slot {}: cutoff must be a minute of the day",
                    slot.id
                )));
            }
        }
        Ok(())
    }

    /// Store URL, required for any command that talks to the store.
    pub fn store_url(&self) -> Result<&str, ConfigError> {
        if self.store.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "store.url is required (set STUDYROOM_STORE__URL)".to_string(),
            ));
        }
        Ok(self.store.url.trim())
    }
}
