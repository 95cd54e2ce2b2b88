// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Configuration of the reading of TransXChange documents.

use crate::{
    bank_holidays::{BankHolidays, DEFAULT_DIVISION},
    Result,
};
use anyhow::Context;
use serde::Deserialize;
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::info;

fn default_division() -> String {
    DEFAULT_DIVISION.to_string()
}

/// Settings used when reading TransXChange documents.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Path to a gov.uk `bank-holidays.json` file
    #[serde(default)]
    pub bank_holidays: Option<PathBuf>,
    /// Division of the bank holidays calendar
    #[serde(default = "default_division")]
    pub division: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            bank_holidays: None,
            division: default_division(),
        }
    }
}

impl Configuration {
    /// Load the bank holidays calendar, empty if no file is configured.
    pub fn bank_holidays(&self) -> Result<BankHolidays> {
        match &self.bank_holidays {
            Some(path) => BankHolidays::from_path(path, &self.division),
            None => Ok(BankHolidays::default()),
        }
    }
}

/// Read a JSON configuration file. A relative path to the bank holidays
/// file is relative to the configuration file.
///
/// Below is an example of this file
/// ```text
/// {
///     "bank_holidays": "bank-holidays.json",
///     "division": "england-and-wales"
/// }
/// ```
pub fn read_config<P: AsRef<Path>>(config_path: Option<P>) -> Result<Configuration> {
    let config_path = match config_path {
        Some(config_path) => config_path,
        None => return Ok(Configuration::default()),
    };
    let config_path = config_path.as_ref();
    info!("Reading configuration from {:?}", config_path);
    let json_config_file =
        File::open(config_path).with_context(|| format!("Error reading {:?}", config_path))?;
    let mut configuration: Configuration = serde_json::from_reader(json_config_file)
        .with_context(|| format!("Invalid configuration {:?}", config_path))?;
    if let Some(bank_holidays) = configuration.bank_holidays.take() {
        let config_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
        configuration.bank_holidays = Some(config_dir.join(bank_holidays));
    }
    Ok(configuration)
}
