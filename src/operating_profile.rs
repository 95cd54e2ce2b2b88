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

//! Calendar rules: on which dates does a journey run.

use crate::{
    bank_holidays::{BankHoliday, BankHolidays},
    literals::{parse_date, Date, LiteralError},
    minidom_utils::ElementExt,
    objects::{date_ranges, DateRange, ServicedOrganisation},
};
use chrono::{Datelike, Weekday};
use minidom::Element;
use minidom_ext::OnlyChildElementExt;
use std::{convert::TryFrom, fmt, str::FromStr};
use typed_index_collection::CollectionWithId;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A day of the week, Monday is `0` and Sunday is `6`.
///
/// ```
/// use std::convert::TryFrom;
/// use transxchange_model::operating_profile::DayOfWeek;
///
/// let friday: DayOfWeek = "Friday".parse().unwrap();
/// assert_eq!(DayOfWeek::try_from(4u8).unwrap(), friday);
/// assert_eq!(friday, 4u8);
/// assert_eq!("Friday", friday.to_string());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayOfWeek {
    day: u8,
}

impl DayOfWeek {
    /// Number of the day, from `0` (Monday) to `6` (Sunday).
    pub fn day(self) -> u8 {
        self.day
    }

    /// English name of the day.
    pub fn name(self) -> &'static str {
        DAY_NAMES[usize::from(self.day)]
    }

    /// Every day of the week, from Monday to Sunday.
    pub fn every_day() -> Vec<DayOfWeek> {
        (0..7).map(|day| DayOfWeek { day }).collect()
    }

    fn range(first: u8, last: u8) -> impl Iterator<Item = DayOfWeek> {
        (first..=last).map(|day| DayOfWeek { day })
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = LiteralError;
    fn try_from(day: u8) -> Result<Self, Self::Error> {
        if usize::from(day) < DAY_NAMES.len() {
            Ok(DayOfWeek { day })
        } else {
            Err(LiteralError::DayOutOfRange(day))
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = LiteralError;
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        DAY_NAMES
            .iter()
            .position(|day_name| *day_name == name)
            .map(|day| DayOfWeek { day: day as u8 })
            .ok_or_else(|| LiteralError::UnknownDay(name.to_string()))
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        DayOfWeek {
            day: weekday.num_days_from_monday() as u8,
        }
    }
}

impl PartialEq<u8> for DayOfWeek {
    fn eq(&self, day: &u8) -> bool {
        self.day == *day
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Days of operation or non-operation taken from the working days or the
/// holidays of a serviced organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicedOrganisationDayType {
    /// Code of the serviced organisation
    pub organisation_ref: String,
    /// `true` under `DaysOfOperation`, `false` under `DaysOfNonOperation`
    pub operation: bool,
    /// `true` for `WorkingDays`, `false` for `Holidays`
    pub working: bool,
    /// Ranges of dates picked from the organisation, empty if the
    /// organisation is unknown
    pub date_ranges: Vec<DateRange>,
    organisation_name: String,
}

impl ServicedOrganisationDayType {
    /// Resolve the organisation against the registry. An unknown
    /// organisation contributes no date and emits a warning.
    pub fn new(
        serviced_organisations: &CollectionWithId<ServicedOrganisation>,
        organisation_ref: &str,
        operation: bool,
        working: bool,
    ) -> Self {
        let (organisation_name, date_ranges) = match serviced_organisations.get(organisation_ref) {
            Some(organisation) => {
                let date_ranges = if working {
                    organisation.working_days.clone()
                } else {
                    organisation.holidays.clone()
                };
                (organisation.to_string(), date_ranges)
            }
            None => {
                warn_once!("ServicedOrganisation '{}' not found", organisation_ref);
                (organisation_ref.to_string(), Vec::new())
            }
        };
        ServicedOrganisationDayType {
            organisation_ref: organisation_ref.to_string(),
            operation,
            working,
            date_ranges,
            organisation_name,
        }
    }

    /// Returns `true` if the date is one of the days picked from the
    /// organisation.
    pub fn contains(&self, date: Date) -> bool {
        self.date_ranges.iter().any(|range| range.contains(date))
    }
}

// Not running on holidays is running on working days, and the other way
// around.
impl fmt::Display for ServicedOrganisationDayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operation == self.working {
            write!(f, "{} days", self.organisation_name)
        } else {
            write!(f, "{} holidays", self.organisation_name)
        }
    }
}

/// Where a set of special days comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayRule {
    /// Explicit range of dates
    Range(DateRange),
    /// Days derived from a serviced organisation
    ServicedOrganisation(ServicedOrganisationDayType),
    /// A bank holiday
    BankHoliday(BankHoliday),
}

impl DayRule {
    /// Returns `true` if the rule covers the date.
    pub fn contains(&self, date: Date, bank_holidays: &BankHolidays) -> bool {
        match self {
            DayRule::Range(range) => range.contains(date),
            DayRule::ServicedOrganisation(day_type) => day_type.contains(date),
            DayRule::BankHoliday(bank_holiday) => bank_holidays.is_bank_holiday(*bank_holiday, date),
        }
    }
}

/// The rules deciding on which dates a journey runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatingProfile {
    /// Days of the week of normal operation, in order of declaration
    pub regular_days: Vec<DayOfWeek>,
    /// Dates of operation, whatever the day of the week
    pub operation_days: Vec<DayRule>,
    /// Dates of non-operation, they win over everything else
    pub nonoperation_days: Vec<DayRule>,
}

impl Default for OperatingProfile {
    fn default() -> Self {
        OperatingProfile {
            regular_days: DayOfWeek::every_day(),
            operation_days: Vec::new(),
            nonoperation_days: Vec::new(),
        }
    }
}

impl OperatingProfile {
    /// Read an `OperatingProfile` element. Serviced organisations are needed
    /// to resolve `ServicedOrganisationDayType`.
    pub fn from_element(
        profile_element: &Element,
        serviced_organisations: &CollectionWithId<ServicedOrganisation>,
    ) -> Self {
        let mut operating_profile = OperatingProfile {
            regular_days: Self::regular_days(profile_element.only_child("RegularDayType")),
            operation_days: Vec::new(),
            nonoperation_days: Vec::new(),
        };
        if let Some(special_days) = profile_element.only_child("SpecialDaysOperation") {
            operating_profile.read_special_days(special_days);
        }
        if let Some(day_type) = profile_element.only_child("ServicedOrganisationDayType") {
            operating_profile.read_serviced_organisations(day_type, serviced_organisations);
        }
        if let Some(bank_holiday_operation) = profile_element.only_child("BankHolidayOperation") {
            operating_profile.read_bank_holidays(bank_holiday_operation);
        }
        operating_profile
    }

    fn regular_days(regular_day_type: Option<&Element>) -> Vec<DayOfWeek> {
        let regular_day_type = match regular_day_type {
            Some(regular_day_type) => regular_day_type,
            None => return DayOfWeek::every_day(),
        };
        let days_of_week = match regular_day_type.only_child("DaysOfWeek") {
            Some(days_of_week) => days_of_week,
            // 'HolidaysOnly': only the special days
            None => return Vec::new(),
        };
        if days_of_week.children().next().is_none() {
            return DayOfWeek::every_day();
        }
        let mut regular_days: Vec<DayOfWeek> = Vec::new();
        for element in days_of_week.children() {
            let days: Vec<DayOfWeek> = match element.name() {
                "MondayToFriday" => DayOfWeek::range(0, 4).collect(),
                "MondayToSaturday" => DayOfWeek::range(0, 5).collect(),
                "MondayToSunday" => DayOfWeek::every_day(),
                "Weekend" => DayOfWeek::range(5, 6).collect(),
                name => match name.strip_prefix("Not") {
                    Some(excluded) => match excluded.parse::<DayOfWeek>() {
                        Ok(excluded) => DayOfWeek::every_day()
                            .into_iter()
                            .filter(|day| *day != excluded)
                            .collect(),
                        Err(_) => {
                            warn_once!("Tag '{}' is not a valid tag for DaysOfWeek", name);
                            continue;
                        }
                    },
                    None => vec![skip_fail!(name.parse::<DayOfWeek>())],
                },
            };
            for day in days {
                if !regular_days.contains(&day) {
                    regular_days.push(day);
                }
            }
        }
        regular_days
    }

    fn read_special_days(&mut self, special_days: &Element) {
        let ranges = |name: &str| {
            date_ranges(special_days.only_child(name))
                .into_iter()
                .map(DayRule::Range)
        };
        self.operation_days.extend(ranges("DaysOfOperation"));
        self.nonoperation_days.extend(ranges("DaysOfNonOperation"));
    }

    fn read_serviced_organisations(
        &mut self,
        day_type: &Element,
        serviced_organisations: &CollectionWithId<ServicedOrganisation>,
    ) {
        for (operation, days_name) in &[(true, "DaysOfOperation"), (false, "DaysOfNonOperation")] {
            let days = match day_type.only_child(days_name) {
                Some(days) => days,
                None => continue,
            };
            for (working, kind_name) in &[(true, "WorkingDays"), (false, "Holidays")] {
                for organisation_ref in days
                    .children_named(kind_name)
                    .flat_map(|kind| kind.children_named("ServicedOrganisationRef"))
                {
                    let organisation_ref = organisation_ref.text();
                    let rule = DayRule::ServicedOrganisation(ServicedOrganisationDayType::new(
                        serviced_organisations,
                        organisation_ref.trim(),
                        *operation,
                        *working,
                    ));
                    if *operation {
                        self.operation_days.push(rule);
                    } else {
                        self.nonoperation_days.push(rule);
                    }
                }
            }
        }
    }

    fn read_bank_holidays(&mut self, bank_holiday_operation: &Element) {
        let rules = |name: &str| {
            let mut rules = Vec::new();
            for element in bank_holiday_operation
                .only_child(name)
                .into_iter()
                .flat_map(|days| days.children())
            {
                if element.name() == "OtherPublicHoliday" {
                    let date = skip_fail!(element.try_child_text("Date").and_then(|date| {
                        parse_date(&date).map_err(crate::Error::from)
                    }));
                    rules.push(DayRule::Range(DateRange {
                        start_date: date,
                        end_date: date,
                    }));
                    continue;
                }
                match BankHoliday::from_element_name(element.name()) {
                    Some(bank_holidays) => {
                        rules.extend(bank_holidays.into_iter().map(DayRule::BankHoliday))
                    }
                    None => {
                        warn_once!("Tag '{}' is not a valid bank holiday", element.name());
                    }
                }
            }
            rules
        };
        self.operation_days.extend(rules("DaysOfOperation"));
        self.nonoperation_days.extend(rules("DaysOfNonOperation"));
    }

    /// Returns `true` if the profile runs on the date. Days of
    /// non-operation win over days of operation, which win over the regular
    /// days.
    pub fn runs_on(&self, date: Date, bank_holidays: &BankHolidays) -> bool {
        if self
            .nonoperation_days
            .iter()
            .any(|rule| rule.contains(date, bank_holidays))
        {
            return false;
        }
        if self
            .operation_days
            .iter()
            .any(|rule| rule.contains(date, bank_holidays))
        {
            return true;
        }
        self.regular_days.contains(&DayOfWeek::from(date.weekday()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(date: &str) -> Date {
        parse_date(date).unwrap()
    }

    fn school() -> CollectionWithId<ServicedOrganisation> {
        let organisation = ServicedOrganisation {
            code: "SD".to_string(),
            name: Some("School".to_string()),
            working_days: vec![DateRange {
                start_date: date("2025-09-01"),
                end_date: date("2025-10-24"),
            }],
            holidays: vec![DateRange {
                start_date: date("2025-10-25"),
                end_date: date("2025-11-02"),
            }],
        };
        CollectionWithId::new(vec![organisation]).unwrap()
    }

    fn profile(xml: &str) -> OperatingProfile {
        let root: Element = xml.parse().unwrap();
        OperatingProfile::from_element(&root, &school())
    }

    mod day_of_week {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn from_name() {
            let monday: DayOfWeek = "Monday".parse().unwrap();
            assert_eq!(0, monday.day());
            assert_eq!("Monday", monday.to_string());
        }

        #[test]
        fn from_number() {
            let friday = DayOfWeek::try_from(4u8).unwrap();
            assert_eq!(4, friday.day());
            assert_eq!("Friday", friday.to_string());
        }

        #[test]
        fn equality() {
            let wednesday: DayOfWeek = "Wednesday".parse().unwrap();
            assert!(wednesday == 2u8);
            assert!(wednesday != 3u8);
            let friday: DayOfWeek = "Friday".parse().unwrap();
            assert_eq!(DayOfWeek::try_from(4u8).unwrap(), friday);
        }

        #[test]
        fn from_weekday() {
            assert_eq!(DayOfWeek::from(Weekday::Sun), 6u8);
        }

        #[test]
        #[should_panic(expected = "UnknownDay(\"monday\")")]
        fn case_sensitive_name() {
            "monday".parse::<DayOfWeek>().unwrap();
        }

        #[test]
        #[should_panic(expected = "DayOutOfRange(7)")]
        fn out_of_range() {
            DayOfWeek::try_from(7u8).unwrap();
        }
    }

    mod serviced_organisation_day_type {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn labels() {
            let organisations = school();
            let label = |operation, working| {
                ServicedOrganisationDayType::new(&organisations, "SD", operation, working).to_string()
            };
            assert_eq!("School days", label(true, true));
            assert_eq!("School holidays", label(true, false));
            assert_eq!("School holidays", label(false, true));
            assert_eq!("School days", label(false, false));
        }

        #[test]
        fn picks_ranges() {
            let day_type = ServicedOrganisationDayType::new(&school(), "SD", true, false);
            assert!(day_type.contains(date("2025-10-30")));
            assert!(!day_type.contains(date("2025-10-01")));
        }

        #[test]
        fn unknown_organisation() {
            testing_logger::setup();
            let day_type = ServicedOrganisationDayType::new(&school(), "operating-profile-unknown-org", true, true);
            assert!(day_type.date_ranges.is_empty());
            assert_eq!("operating-profile-unknown-org days", day_type.to_string());
            testing_logger::validate(|captured_logs| {
                assert!(captured_logs.iter().any(|captured_log| captured_log.level
                    == log::Level::Warn
                    && captured_log
                        .body
                        .contains("ServicedOrganisation 'operating-profile-unknown-org' not found")));
            });
        }
    }

    mod from_element {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn monday_to_friday() {
            let profile = profile(
                r#"<OperatingProfile>
                    <RegularDayType>
                        <DaysOfWeek>
                            <MondayToFriday />
                        </DaysOfWeek>
                    </RegularDayType>
                </OperatingProfile>"#,
            );
            let days: Vec<u8> = profile.regular_days.iter().map(|day| day.day()).collect();
            assert_eq!(vec![0, 1, 2, 3, 4], days);
        }

        #[test]
        fn shorthands_and_duplicates() {
            let profile = profile(
                r#"<OperatingProfile>
                    <RegularDayType>
                        <DaysOfWeek>
                            <Sunday />
                            <NotSaturday />
                            <Weekend />
                        </DaysOfWeek>
                    </RegularDayType>
                </OperatingProfile>"#,
            );
            let days: Vec<u8> = profile.regular_days.iter().map(|day| day.day()).collect();
            assert_eq!(vec![6, 0, 1, 2, 3, 4, 5], days);
        }

        #[test]
        fn empty_days_of_week() {
            let profile = profile(
                r#"<OperatingProfile>
                    <RegularDayType>
                        <DaysOfWeek />
                    </RegularDayType>
                </OperatingProfile>"#,
            );
            assert_eq!(DayOfWeek::every_day(), profile.regular_days);
        }

        #[test]
        fn holidays_only() {
            let profile = profile(
                r#"<OperatingProfile>
                    <RegularDayType>
                        <HolidaysOnly />
                    </RegularDayType>
                    <BankHolidayOperation>
                        <DaysOfOperation>
                            <Christmas />
                        </DaysOfOperation>
                    </BankHolidayOperation>
                </OperatingProfile>"#,
            );
            assert!(profile.regular_days.is_empty());
            assert_eq!(
                vec![
                    DayRule::BankHoliday(BankHoliday::ChristmasDay),
                    DayRule::BankHoliday(BankHoliday::BoxingDay)
                ],
                profile.operation_days
            );
        }

        #[test]
        fn special_days() {
            let profile = profile(
                r#"<OperatingProfile>
                    <RegularDayType>
                        <DaysOfWeek>
                            <Monday />
                        </DaysOfWeek>
                    </RegularDayType>
                    <SpecialDaysOperation>
                        <DaysOfOperation>
                            <DateRange>
                                <StartDate>2025-12-26</StartDate>
                                <EndDate>2025-12-26</EndDate>
                            </DateRange>
                        </DaysOfOperation>
                        <DaysOfNonOperation>
                            <DateRange>
                                <StartDate>2025-12-25</StartDate>
                                <EndDate>2025-12-25</EndDate>
                            </DateRange>
                            <DateRange>
                                <StartDate>2026-01-01</StartDate>
                            </DateRange>
                        </DaysOfNonOperation>
                    </SpecialDaysOperation>
                </OperatingProfile>"#,
            );
            assert_eq!(1, profile.operation_days.len());
            assert_eq!(2, profile.nonoperation_days.len());
        }

        #[test]
        fn serviced_organisations() {
            let profile = profile(
                r#"<OperatingProfile>
                    <ServicedOrganisationDayType>
                        <DaysOfOperation>
                            <WorkingDays>
                                <ServicedOrganisationRef>SD</ServicedOrganisationRef>
                            </WorkingDays>
                        </DaysOfOperation>
                        <DaysOfNonOperation>
                            <Holidays>
                                <ServicedOrganisationRef>SD</ServicedOrganisationRef>
                            </Holidays>
                        </DaysOfNonOperation>
                    </ServicedOrganisationDayType>
                </OperatingProfile>"#,
            );
            match profile.operation_days.as_slice() {
                [DayRule::ServicedOrganisation(day_type)] => {
                    assert_eq!("School days", day_type.to_string())
                }
                rules => panic!("unexpected operation days {:?}", rules),
            }
            match profile.nonoperation_days.as_slice() {
                [DayRule::ServicedOrganisation(day_type)] => {
                    assert_eq!("School days", day_type.to_string())
                }
                rules => panic!("unexpected non-operation days {:?}", rules),
            }
        }

        #[test]
        fn other_public_holiday() {
            let profile = profile(
                r#"<OperatingProfile>
                    <BankHolidayOperation>
                        <DaysOfNonOperation>
                            <OtherPublicHoliday>
                                <Description>Coronation</Description>
                                <Date>2023-05-08</Date>
                            </OtherPublicHoliday>
                        </DaysOfNonOperation>
                    </BankHolidayOperation>
                </OperatingProfile>"#,
            );
            assert_eq!(
                vec![DayRule::Range(DateRange {
                    start_date: date("2023-05-08"),
                    end_date: date("2023-05-08"),
                })],
                profile.nonoperation_days
            );
        }
    }

    mod runs_on {
        use super::*;

        fn school_days_profile() -> OperatingProfile {
            profile(
                r#"<OperatingProfile>
                    <RegularDayType>
                        <DaysOfWeek>
                            <MondayToFriday />
                        </DaysOfWeek>
                    </RegularDayType>
                    <SpecialDaysOperation>
                        <DaysOfOperation>
                            <DateRange>
                                <StartDate>2025-09-06</StartDate>
                            </DateRange>
                        </DaysOfOperation>
                        <DaysOfNonOperation>
                            <DateRange>
                                <StartDate>2025-09-06</StartDate>
                                <EndDate>2025-09-06</EndDate>
                            </DateRange>
                        </DaysOfNonOperation>
                    </SpecialDaysOperation>
                    <ServicedOrganisationDayType>
                        <DaysOfOperation>
                            <WorkingDays>
                                <ServicedOrganisationRef>SD</ServicedOrganisationRef>
                            </WorkingDays>
                        </DaysOfOperation>
                        <DaysOfNonOperation>
                            <Holidays>
                                <ServicedOrganisationRef>SD</ServicedOrganisationRef>
                            </Holidays>
                        </DaysOfNonOperation>
                    </ServicedOrganisationDayType>
                    <BankHolidayOperation>
                        <DaysOfNonOperation>
                            <ChristmasDay />
                        </DaysOfNonOperation>
                    </BankHolidayOperation>
                </OperatingProfile>"#,
            )
        }

        #[test]
        fn regular_days() {
            let profile = school_days_profile();
            let bank_holidays = BankHolidays::default();
            // Monday and Sunday, outside of the school calendar
            assert!(profile.runs_on(date("2025-08-25"), &bank_holidays));
            assert!(!profile.runs_on(date("2025-08-24"), &bank_holidays));
        }

        #[test]
        fn operation_days_beat_regular_days() {
            let profile = school_days_profile();
            // Sunday during school working days
            assert!(profile.runs_on(date("2025-09-07"), &BankHolidays::default()));
        }

        #[test]
        fn nonoperation_days_beat_operation_days() {
            let profile = school_days_profile();
            let bank_holidays = BankHolidays::default();
            // Saturday, both an explicit operation and non-operation day
            assert!(!profile.runs_on(date("2025-09-06"), &bank_holidays));
            // Monday during school holidays
            assert!(!profile.runs_on(date("2025-10-27"), &bank_holidays));
            // Christmas is a Thursday
            assert!(!profile.runs_on(date("2025-12-25"), &bank_holidays));
            assert!(profile.runs_on(date("2025-12-24"), &bank_holidays));
        }

        #[test]
        fn default_runs_every_day() {
            let profile = OperatingProfile::default();
            for day in 1..=7 {
                assert!(profile.runs_on(date(&format!("2025-09-0{}", day)), &BankHolidays::default()));
            }
        }
    }
}
