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

//! Vehicle journeys, their dead runs and the timing links they follow.

use crate::{
    journey_pattern::{JourneyPatternTimingLink, StopUsage},
    literals::{format_time, parse_duration, parse_time},
    minidom_utils::ElementExt,
    objects::{Block, ServicedOrganisation, VehicleType},
    operating_profile::OperatingProfile,
    timing::{self, Cell},
    transxchange::TransXChange,
    Error, Result,
};
use anyhow::{anyhow, Context};
use chrono::Duration;
use minidom::Element;
use minidom_ext::OnlyChildElementExt;
use std::{convert::TryFrom, fmt};
use typed_index_collection::CollectionWithId;

/// Identifier of the timing link referenced by a `StartDeadRun` or an
/// `EndDeadRun` element, found under `ShortWorking`.
///
/// ```
/// # use minidom::Element;
/// # use transxchange_model::vehicle_journey::dead_run_ref;
/// let xml = r#"<StartDeadRun xmlns="http://www.transxchange.org.uk/">
///     <ShortWorking>
///         <JourneyPatternTimingLinkRef>JPL_123</JourneyPatternTimingLinkRef>
///     </ShortWorking>
/// </StartDeadRun>"#;
/// let dead_run: Element = xml.parse().unwrap();
/// assert_eq!(Some("JPL_123".to_string()), dead_run_ref(Some(&dead_run)));
/// assert_eq!(None, dead_run_ref(None));
/// ```
pub fn dead_run_ref(dead_run: Option<&Element>) -> Option<String> {
    dead_run?
        .only_child("ShortWorking")?
        .child_text("JourneyPatternTimingLinkRef")
}

/// Start and end dead run references of a `VehicleJourney` element.
pub fn dead_runs(journey_element: &Element) -> (Option<String>, Option<String>) {
    (
        dead_run_ref(journey_element.only_child("StartDeadRun")),
        dead_run_ref(journey_element.only_child("EndDeadRun")),
    )
}

/// Journey specific values overriding a journey pattern timing link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleJourneyTimingLink {
    /// Identifier of the link
    pub id: Option<String>,
    /// Identifier of the overridden journey pattern timing link
    pub journey_pattern_timing_link_ref: String,
    /// Time to run the link
    pub run_time: Option<Duration>,
    /// Wait time at the origin of the link
    pub from_wait_time: Option<Duration>,
    /// Wait time at the destination of the link
    pub to_wait_time: Option<Duration>,
    /// Activity at the origin of the link
    pub from_activity: Option<String>,
    /// Activity at the destination of the link
    pub to_activity: Option<String>,
}

fn optional_duration(element: Option<&Element>, child_name: &str) -> Result<Option<Duration>> {
    element
        .and_then(|element| element.child_text(child_name))
        .map(|duration| parse_duration(&duration))
        .transpose()
        .map_err(Error::from)
}

impl TryFrom<&Element> for VehicleJourneyTimingLink {
    type Error = Error;
    fn try_from(link_element: &Element) -> Result<Self> {
        let journey_pattern_timing_link_ref = link_element.try_child_text("JourneyPatternTimingLinkRef")?;
        let context = || {
            format!(
                "Invalid VehicleJourneyTimingLink for '{}'",
                journey_pattern_timing_link_ref
            )
        };
        let from = link_element.only_child("From");
        let to = link_element.only_child("To");
        Ok(VehicleJourneyTimingLink {
            id: link_element.attr("id").map(str::to_string),
            run_time: optional_duration(Some(link_element), "RunTime").with_context(context)?,
            from_wait_time: optional_duration(from, "WaitTime").with_context(context)?,
            to_wait_time: optional_duration(to, "WaitTime").with_context(context)?,
            from_activity: from.and_then(|from| from.child_text("Activity")),
            to_activity: to.and_then(|to| to.child_text("Activity")),
            journey_pattern_timing_link_ref,
        })
    }
}

/// A journey pattern timing link seen by one vehicle journey: the values of
/// the vehicle journey timing link, if any, win over the pattern's.
#[derive(Debug, Clone, Copy)]
pub struct TimingLink<'a> {
    /// The link of the journey pattern
    pub pattern_link: &'a JourneyPatternTimingLink,
    /// The journey override, if any
    pub journey_link: Option<&'a VehicleJourneyTimingLink>,
}

impl<'a> TimingLink<'a> {
    /// Identifier of the journey pattern timing link.
    pub fn id(&self) -> Option<&'a str> {
        self.pattern_link.id.as_deref()
    }

    /// Origin of the link.
    pub fn from(&self) -> &'a StopUsage {
        &self.pattern_link.from
    }

    /// Destination of the link.
    pub fn to(&self) -> &'a StopUsage {
        &self.pattern_link.to
    }

    /// Time to run the link.
    pub fn run_time(&self) -> Duration {
        self.journey_link
            .and_then(|link| link.run_time)
            .unwrap_or(self.pattern_link.run_time)
    }

    /// Wait time at the origin of the link.
    pub fn from_wait_time(&self) -> Option<Duration> {
        self.journey_link
            .and_then(|link| link.from_wait_time)
            .or_else(|| self.pattern_link.from_wait_time())
    }

    /// Wait time at the destination of the link.
    pub fn to_wait_time(&self) -> Option<Duration> {
        self.journey_link
            .and_then(|link| link.to_wait_time)
            .or_else(|| self.pattern_link.to_wait_time())
    }

    /// Activity at the origin of the link.
    pub fn from_activity(&self) -> Option<&'a str> {
        self.journey_link
            .and_then(|link| link.from_activity.as_deref())
            .or_else(|| self.from().activity.as_deref())
    }

    /// Activity at the destination of the link.
    pub fn to_activity(&self) -> Option<&'a str> {
        self.journey_link
            .and_then(|link| link.to_activity.as_deref())
            .or_else(|| self.to().activity.as_deref())
    }

    /// Time elapsed from the arrival at the origin of the link to the
    /// departure from its destination, `None` on overflow.
    pub(crate) fn total_time(&self) -> Option<Duration> {
        self.from_wait_time()
            .unwrap_or_else(Duration::zero)
            .checked_add(&self.run_time())?
            .checked_add(&self.to_wait_time().unwrap_or_else(Duration::zero))
    }
}

fn shifted_departure_time(departure_time: Duration, departure_day_shift: i64) -> Option<Duration> {
    Duration::try_days(departure_day_shift).and_then(|shift| departure_time.checked_add(&shift))
}

/// One timetabled trip of a vehicle.
#[derive(Debug, Clone)]
pub struct VehicleJourney {
    /// Code of the journey
    pub code: String,
    /// Private code of the journey
    pub private_code: Option<String>,
    /// Journey code printed on tickets
    pub ticket_machine_journey_code: Option<String>,
    /// Time of departure from the origin, since midnight
    pub departure_time: Duration,
    /// Number of days after the operating day the journey departs
    pub departure_day_shift: i64,
    /// Code of the service
    pub service_ref: String,
    /// Identifier of the line
    pub line_ref: String,
    /// Identifier of the journey pattern, possibly inherited through
    /// `vehicle_journey_ref`
    pub journey_pattern_ref: Option<String>,
    /// Code of a journey this one is based on
    pub vehicle_journey_ref: Option<String>,
    /// Operating profile declared by the journey itself
    pub operating_profile: Option<OperatingProfile>,
    /// Block the journey belongs to
    pub block: Option<Block>,
    /// Type of vehicle
    pub vehicle_type: Option<VehicleType>,
    /// The journey starts after this timing link
    pub start_dead_run: Option<String>,
    /// The journey ends before this timing link
    pub end_dead_run: Option<String>,
    /// Journey specific timing values
    pub timing_links: Vec<VehicleJourneyTimingLink>,
}

impl VehicleJourney {
    /// Read a `VehicleJourney` element.
    pub fn from_element(
        journey_element: &Element,
        serviced_organisations: &CollectionWithId<ServicedOrganisation>,
    ) -> Result<Self> {
        let code = journey_element.try_child_text("VehicleJourneyCode")?;
        let context = || format!("Invalid VehicleJourney '{}'", code);
        let departure_time =
            parse_time(&journey_element.try_child_text("DepartureTime").with_context(context)?)
                .with_context(context)?;
        let departure_day_shift = journey_element
            .child_text("DepartureDayShift")
            .map(|shift| shift.parse::<i64>())
            .transpose()
            .with_context(context)?
            .unwrap_or_default();
        shifted_departure_time(departure_time, departure_day_shift)
            .ok_or_else(|| anyhow!("DepartureDayShift {} is out of range", departure_day_shift))
            .with_context(context)?;
        let operational = journey_element.only_child("Operational");
        let block = operational
            .and_then(|operational| operational.only_child("Block"))
            .map(Block::try_from)
            .transpose()
            .with_context(context)?;
        let vehicle_type = operational
            .and_then(|operational| operational.only_child("VehicleType"))
            .map(VehicleType::try_from)
            .transpose()
            .with_context(context)?;
        let mut timing_links = Vec::new();
        for link_element in journey_element.children_named("VehicleJourneyTimingLink") {
            timing_links.push(skip_fail!(VehicleJourneyTimingLink::try_from(link_element)));
        }
        let (start_dead_run, end_dead_run) = dead_runs(journey_element);
        Ok(VehicleJourney {
            private_code: journey_element.child_text("PrivateCode"),
            ticket_machine_journey_code: operational
                .and_then(|operational| operational.only_child("TicketMachine"))
                .and_then(|ticket_machine| ticket_machine.child_text("JourneyCode")),
            departure_time,
            departure_day_shift,
            service_ref: journey_element.try_child_text("ServiceRef").with_context(context)?,
            line_ref: journey_element.try_child_text("LineRef").with_context(context)?,
            journey_pattern_ref: journey_element.child_text("JourneyPatternRef"),
            vehicle_journey_ref: journey_element.child_text("VehicleJourneyRef"),
            operating_profile: journey_element
                .only_child("OperatingProfile")
                .map(|profile| OperatingProfile::from_element(profile, serviced_organisations)),
            block,
            vehicle_type,
            start_dead_run,
            end_dead_run,
            timing_links,
            code,
        })
    }

    fn journey_link(&self, pattern_link: &JourneyPatternTimingLink) -> Option<&VehicleJourneyTimingLink> {
        let id = pattern_link.id.as_deref()?;
        self.timing_links
            .iter()
            .find(|link| link.journey_pattern_timing_link_ref == id)
    }

    // Every link of the journey pattern, dead runs included.
    fn all_timing_links<'a>(
        &'a self,
        transxchange: &'a TransXChange,
    ) -> impl Iterator<Item = TimingLink<'a>> + Clone + 'a {
        transxchange
            .journey_pattern(self)
            .into_iter()
            .flat_map(move |pattern| pattern.timing_links(transxchange))
            .map(move |pattern_link| TimingLink {
                pattern_link,
                journey_link: self.journey_link(pattern_link),
            })
    }

    // Positions of the first link after the start dead run and of the end
    // dead run link. A dead run not found in the chain trims nothing.
    fn dead_run_bounds<'a, I>(&self, timing_links: I) -> (usize, usize)
    where
        I: Iterator<Item = TimingLink<'a>> + Clone,
    {
        let position = |dead_run: &str| {
            let position = timing_links.clone().position(|link| link.id() == Some(dead_run));
            if position.is_none() {
                warn_once!(
                    "Dead run '{}' not found in the timing links of VehicleJourney '{}'",
                    dead_run,
                    self.code
                );
            }
            position
        };
        let start = self
            .start_dead_run
            .as_deref()
            .and_then(position)
            .map_or(0, |position| position + 1);
        let end = self
            .end_dead_run
            .as_deref()
            .and_then(position)
            .unwrap_or_else(|| timing_links.clone().count());
        (start, end.max(start))
    }

    /// Iterates over the timing links of the journey: the links of its
    /// journey pattern with the journey overrides applied, without the dead
    /// runs. The iterator can be cloned to walk the chain again.
    pub fn timing_links<'a>(
        &'a self,
        transxchange: &'a TransXChange,
    ) -> impl Iterator<Item = TimingLink<'a>> + Clone + 'a {
        let timing_links = self.all_timing_links(transxchange);
        let (start, end) = self.dead_run_bounds(timing_links.clone());
        timing_links.skip(start).take(end - start)
    }

    /// Stops visited by the journey with their arrival and departure times.
    pub fn times<'a>(&'a self, transxchange: &'a TransXChange) -> Vec<Cell<'a>> {
        let timing_links = self.all_timing_links(transxchange);
        let (start, end) = self.dead_run_bounds(timing_links.clone());
        // The departure time is the one of the pattern origin, dead runs
        // included
        let departure_time = shifted_departure_time(self.departure_time, self.departure_day_shift)
            .and_then(|departure_time| {
                timing_links
                    .clone()
                    .take(start)
                    .try_fold(departure_time, |time, link| time.checked_add(&link.total_time()?))
            });
        let departure_time = match departure_time {
            Some(departure_time) => departure_time,
            None => {
                warn_once!("Times of VehicleJourney '{}' overflow", self.code);
                return Vec::new();
            }
        };
        timing::resolve_times(
            transxchange,
            departure_time,
            timing_links.skip(start).take(end - start),
        )
    }
}

impl fmt::Display for VehicleJourney {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, format_time(self.departure_time))
    }
}
