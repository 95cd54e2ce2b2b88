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

//! The `transxchange_model` crate reads
//! [TransXChange](https://www.gov.uk/government/collections/transxchange)
//! documents into an in-memory model and answers which stops a vehicle
//! journey visits, at what times, and on which dates it runs.

#![warn(missing_docs)]

#[macro_use]
pub(crate) mod utils;
pub mod bank_holidays;
pub mod configuration;
pub mod journey_pattern;
pub mod literals;
mod minidom_utils;
pub mod objects;
pub mod operating_profile;
pub mod read;
pub mod timing;
pub mod transxchange;
pub mod vehicle_journey;

pub use crate::literals::{parse_date, parse_duration, parse_time, LiteralError};
pub use crate::transxchange::TransXChange;
pub use crate::utils::{clear_warnings, warn_once};

/// The error type used by the crate.
pub type Error = anyhow::Error;

/// The corresponding result type used by the crate.
pub type Result<T> = std::result::Result<T, Error>;
