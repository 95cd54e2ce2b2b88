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

//! Module to handle Bank Holidays in UK
//! The data structure is based on the JSON provided by the UK government at
//! https://www.gov.uk/bank-holidays.json

use crate::{
    literals::{parse_date, Date},
    Result,
};
use anyhow::{anyhow, Context};
use chrono::Datelike;
use serde::Deserialize;
use std::{
    collections::{BTreeSet, HashMap},
    fs::File,
    io::Read,
    path::Path,
};
use tracing::{debug, info};

/// Division used when none is configured.
pub const DEFAULT_DIVISION: &str = "england-and-wales";
const SCOTLAND_DIVISION: &str = "scotland";

#[derive(Debug, Deserialize)]
struct BankHolidayDivision {
    events: Vec<BankHolidayEvent>,
}

#[derive(Debug, Deserialize)]
struct BankHolidayEvent {
    title: String,
    date: String,
}

/// The bank holidays named in `BankHolidayOperation`.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Ord, PartialOrd, PartialEq, Eq, Hash)]
pub enum BankHoliday {
    NewYearsDay,
    // Bank Holiday for New Year, only when not on the 1st of January
    NewYearsDayHoliday,
    Jan2ndScotland,
    // Bank Holiday for January Second, only when not on the 2nd of January
    Jan2ndScotlandHoliday,
    GoodFriday,
    EasterMonday,
    MayDay,
    SpringBank,
    LateSummerBankHolidayNotScotland,
    AugustBankHolidayScotland,
    StAndrewsDay,
    // Bank Holiday for Saint Andrews, only when not on the 30th of November
    StAndrewsDayHoliday,
    ChristmasEve,
    ChristmasDay,
    // Bank Holiday for Christmas, only when not on the 25th of December
    ChristmasDayHoliday,
    BoxingDay,
    // Bank Holiday for Boxing Day, only when not on the 26th of December
    BoxingDayHoliday,
    NewYearsEve,
}

use BankHoliday::*;

const HOLIDAYS: &[BankHoliday] = &[NewYearsDay, Jan2ndScotland, GoodFriday, StAndrewsDay];
const HOLIDAY_MONDAYS: &[BankHoliday] = &[
    EasterMonday,
    MayDay,
    SpringBank,
    LateSummerBankHolidayNotScotland,
    AugustBankHolidayScotland,
];
const CHRISTMAS: &[BankHoliday] = &[ChristmasDay, BoxingDay];
const DISPLACEMENT_HOLIDAYS: &[BankHoliday] = &[
    NewYearsDayHoliday,
    Jan2ndScotlandHoliday,
    StAndrewsDayHoliday,
    ChristmasDayHoliday,
    BoxingDayHoliday,
];
const EARLY_RUN_OFF: &[BankHoliday] = &[ChristmasEve, NewYearsEve];

impl BankHoliday {
    /// Expand a child element name of `DaysOfOperation` or
    /// `DaysOfNonOperation` in `BankHolidayOperation` into the bank holidays
    /// it stands for. Unknown names give `None`.
    pub fn from_element_name(name: &str) -> Option<Vec<BankHoliday>> {
        let bank_holidays = match name {
            "AllBankHolidays" => [HOLIDAYS, HOLIDAY_MONDAYS, CHRISTMAS, DISPLACEMENT_HOLIDAYS].concat(),
            "AllHolidaysExceptChristmas" => [HOLIDAYS, HOLIDAY_MONDAYS].concat(),
            "Holidays" => HOLIDAYS.to_vec(),
            "HolidayMondays" => HOLIDAY_MONDAYS.to_vec(),
            "Christmas" => CHRISTMAS.to_vec(),
            "DisplacementHolidays" => DISPLACEMENT_HOLIDAYS.to_vec(),
            "EarlyRunOff" => EARLY_RUN_OFF.to_vec(),
            "NewYearsDay" => vec![NewYearsDay],
            "NewYearsDayHoliday" => vec![NewYearsDayHoliday],
            "Jan2ndScotland" => vec![Jan2ndScotland],
            "Jan2ndScotlandHoliday" => vec![Jan2ndScotlandHoliday],
            "GoodFriday" => vec![GoodFriday],
            "EasterMonday" => vec![EasterMonday],
            "MayDay" => vec![MayDay],
            "SpringBank" => vec![SpringBank],
            "LateSummerBankHolidayNotScotland" => vec![LateSummerBankHolidayNotScotland],
            "AugustBankHolidayScotland" => vec![AugustBankHolidayScotland],
            "StAndrewsDay" => vec![StAndrewsDay],
            "StAndrewsDayHoliday" => vec![StAndrewsDayHoliday],
            "ChristmasEve" => vec![ChristmasEve],
            "ChristmasDay" => vec![ChristmasDay],
            "ChristmasDayHoliday" => vec![ChristmasDayHoliday],
            "BoxingDay" => vec![BoxingDay],
            "BoxingDayHoliday" => vec![BoxingDayHoliday],
            "NewYearsEve" => vec![NewYearsEve],
            _ => return None,
        };
        Some(bank_holidays)
    }

    /// Month and day of the holidays which never move.
    fn fixed_day(self) -> Option<(u32, u32)> {
        match self {
            NewYearsDay => Some((1, 1)),
            Jan2ndScotland => Some((1, 2)),
            StAndrewsDay => Some((11, 30)),
            ChristmasEve => Some((12, 24)),
            ChristmasDay => Some((12, 25)),
            BoxingDay => Some((12, 26)),
            NewYearsEve => Some((12, 31)),
            _ => None,
        }
    }

    /// The fixed holiday a displacement holiday replaces.
    fn displaced(self) -> Option<BankHoliday> {
        match self {
            NewYearsDayHoliday => Some(NewYearsDay),
            Jan2ndScotlandHoliday => Some(Jan2ndScotland),
            StAndrewsDayHoliday => Some(StAndrewsDay),
            ChristmasDayHoliday => Some(ChristmasDay),
            BoxingDayHoliday => Some(BoxingDay),
            _ => None,
        }
    }

    fn from_title(title: &str, division: &str) -> Option<BankHoliday> {
        // "Early May bank holiday (VE Day)" is still the early May bank
        // holiday, so anything in parenthesis is dropped
        let title = title.split('(').next().unwrap_or_default().trim();
        let bank_holiday = match title.replace('’', "'").as_str() {
            "New Year's Day" => NewYearsDayHoliday,
            "2nd January" => Jan2ndScotlandHoliday,
            "Good Friday" => GoodFriday,
            "Easter Monday" => EasterMonday,
            "Early May bank holiday" => MayDay,
            "Spring bank holiday" => SpringBank,
            "Summer bank holiday" if division == SCOTLAND_DIVISION => AugustBankHolidayScotland,
            "Summer bank holiday" => LateSummerBankHolidayNotScotland,
            "St Andrew's Day" => StAndrewsDayHoliday,
            "Christmas Day" => ChristmasDayHoliday,
            "Boxing Day" => BoxingDayHoliday,
            _ => return None,
        };
        Some(bank_holiday)
    }
}

/// Dates of the moveable bank holidays. Fixed bank holidays are recognised
/// from the date alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankHolidays {
    dates: HashMap<BankHoliday, BTreeSet<Date>>,
}

impl BankHolidays {
    /// Read the gov.uk `bank-holidays.json` file, keeping the events of one
    /// division (`england-and-wales`, `scotland` or `northern-ireland`).
    pub fn from_path<P: AsRef<Path>>(path: P, division: &str) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading bank holidays from {:?}", path);
        let file = File::open(path).with_context(|| format!("Error reading {:?}", path))?;
        BankHolidays::from_reader(file, division)
    }

    /// Same as [from_path](BankHolidays::from_path) from any reader.
    pub fn from_reader<R: Read>(reader: R, division: &str) -> Result<Self> {
        let mut divisions: HashMap<String, BankHolidayDivision> =
            serde_json::from_reader(reader).context("Failed to parse the bank holidays")?;
        let events = divisions
            .remove(division)
            .ok_or_else(|| anyhow!("No bank holidays for division '{}'", division))?
            .events;
        let mut bank_holidays = BankHolidays::default();
        for event in events {
            let bank_holiday = match BankHoliday::from_title(&event.title, division) {
                Some(bank_holiday) => bank_holiday,
                None => {
                    debug!("Ignoring bank holiday '{}'", event.title);
                    continue;
                }
            };
            let date = parse_date(&event.date)
                .with_context(|| format!("Invalid date for bank holiday '{}'", event.title))?;
            bank_holidays.insert(bank_holiday, date);
        }
        Ok(bank_holidays)
    }

    /// Register `date` as an occurrence of `bank_holiday`. A displacement
    /// holiday falling on the day it replaces is not a displacement.
    pub fn insert(&mut self, bank_holiday: BankHoliday, date: Date) {
        let on_displaced_day = bank_holiday
            .displaced()
            .and_then(BankHoliday::fixed_day)
            .map_or(false, |(month, day)| date.month() == month && date.day() == day);
        if on_displaced_day {
            return;
        }
        self.dates.entry(bank_holiday).or_default().insert(date);
    }

    /// Returns `true` if `date` is an occurrence of `bank_holiday`.
    pub fn is_bank_holiday(&self, bank_holiday: BankHoliday, date: Date) -> bool {
        if let Some((month, day)) = bank_holiday.fixed_day() {
            return date.month() == month && date.day() == day;
        }
        self.dates
            .get(&bank_holiday)
            .map_or(false, |dates| dates.contains(&date))
    }
}
