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

//! Arrival and departure times along a chain of timing links.

use crate::{
    journey_pattern::StopUsage, objects::Stop, transxchange::TransXChange,
    vehicle_journey::TimingLink,
};
use chrono::Duration;

/// One stop visited by a journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell<'a> {
    /// Usage of the stop in the journey pattern
    pub stop_usage: &'a StopUsage,
    /// The stop
    pub stop: &'a Stop,
    /// Arrival time since midnight, `None` at the origin
    pub arrival_time: Option<Duration>,
    /// Departure time since midnight, `None` at the destination
    pub departure_time: Option<Duration>,
    /// Identifier of the timing link the cell comes from
    pub timing_link: Option<&'a str>,
    /// What passengers can do at the stop
    pub activity: Option<&'a str>,
}

impl<'a> Cell<'a> {
    /// Create a new `Cell`.
    pub fn new(
        stop_usage: &'a StopUsage,
        stop: &'a Stop,
        arrival_time: Option<Duration>,
        departure_time: Option<Duration>,
        timing_link: Option<&'a str>,
        activity: Option<&'a str>,
    ) -> Self {
        Cell {
            stop_usage,
            stop,
            arrival_time,
            departure_time,
            timing_link,
            activity,
        }
    }

    /// Time spent at the stop. `None` when the vehicle does not wait or
    /// when one of the times is unknown.
    pub fn wait_time(&self) -> Option<Duration> {
        match (self.arrival_time, self.departure_time) {
            (Some(arrival_time), Some(departure_time)) if arrival_time != departure_time => {
                departure_time.checked_sub(&arrival_time)
            }
            _ => None,
        }
    }
}

fn stop<'a>(
    transxchange: &'a TransXChange,
    timing_link: &TimingLink<'_>,
    stop_usage: &StopUsage,
) -> Option<&'a Stop> {
    match stop_usage.stop_point_ref.as_deref() {
        Some(stop_ref) => transxchange.stop(stop_ref),
        None => {
            warn_once!(
                "Stop usage {:?} of timing link {:?} without StopPointRef",
                stop_usage.sequence_number,
                timing_link.id()
            );
            None
        }
    }
}

/// Departure from the origin of `timing_link`, arrival at its destination
/// and end of the wait there, starting at `time`. `None` on overflow.
fn link_times(time: Duration, timing_link: &TimingLink<'_>) -> Option<(Duration, Duration, Duration)> {
    let departure = time.checked_add(&timing_link.from_wait_time().unwrap_or_else(Duration::zero))?;
    let arrival = departure.checked_add(&timing_link.run_time())?;
    let end = arrival.checked_add(&timing_link.to_wait_time().unwrap_or_else(Duration::zero))?;
    Some((departure, arrival, end))
}

/// Walk the timing links from `departure_time` and compute one cell per
/// stop. A stop unknown to the registry is skipped. The walk stops at the
/// first link whose times overflow.
pub fn resolve_times<'a, I>(
    transxchange: &'a TransXChange,
    departure_time: Duration,
    timing_links: I,
) -> Vec<Cell<'a>>
where
    I: IntoIterator<Item = TimingLink<'a>>,
{
    let mut timing_links = timing_links.into_iter().peekable();
    let mut cells = Vec::new();
    // The cell waiting for its departure time
    let mut pending = match timing_links.peek() {
        Some(origin) => stop(transxchange, origin, origin.from()).map(|stop| {
            Cell::new(
                origin.from(),
                stop,
                None,
                None,
                origin.id(),
                origin.from_activity(),
            )
        }),
        None => return cells,
    };
    let mut time = departure_time;
    for timing_link in timing_links {
        let (departure, arrival, end) = match link_times(time, &timing_link) {
            Some(times) => times,
            None => {
                warn_once!("Times overflow at timing link {:?}", timing_link.id());
                return cells;
            }
        };
        if let Some(mut cell) = pending.take() {
            cell.departure_time = Some(departure);
            cells.push(cell);
        }
        pending = stop(transxchange, &timing_link, timing_link.to()).map(|stop| {
            Cell::new(
                timing_link.to(),
                stop,
                Some(arrival),
                None,
                timing_link.id(),
                timing_link.to_activity(),
            )
        });
        time = end;
    }
    cells.extend(pending);
    cells
}
