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

//! The registry of every object of a TransXChange document.

use crate::{
    bank_holidays::BankHolidays,
    journey_pattern::{JourneyPattern, JourneyPatternSection},
    literals::Date,
    minidom_utils::ElementExt,
    objects::{Operator, Route, RouteLink, RouteSection, Service, ServicedOrganisation, Stop},
    operating_profile::OperatingProfile,
    vehicle_journey::VehicleJourney,
    Result,
};
use anyhow::{anyhow, bail};
use minidom::Element;
use minidom_ext::OnlyChildElementExt;
use std::{
    collections::{HashMap, HashSet},
    convert::TryFrom,
    fmt,
};
use tracing::info;
use typed_index_collection::{CollectionWithId, Id, Idx};

const STOP_ELEMENTS: &[&str] = &["StopPoint", "AnnotatedStopPointRef"];
const OPERATOR_ELEMENTS: &[&str] = &["Operator", "LicensedOperator"];

/// Read every child named one of `names` of the container element `container`
/// into a collection. Invalid and duplicated objects are skipped.
fn collection<T, F>(
    root: &Element,
    container: &str,
    names: &[&str],
    parse: F,
) -> CollectionWithId<T>
where
    T: Id<T> + fmt::Debug,
    F: Fn(&Element) -> Result<T>,
{
    let mut collection = CollectionWithId::default();
    for element in root
        .only_child(container)
        .into_iter()
        .flat_map(|container| container.children())
        .filter(|element| names.contains(&element.name()))
    {
        let object = skip_fail!(parse(element));
        skip_fail!(collection
            .push(object)
            .map_err(|e| anyhow!("Duplicate {} skipped: {}", element.name(), e)));
    }
    collection
}

/// An in-memory TransXChange document, every cross reference is resolved by
/// identifier against the collections below.
#[derive(Debug, Clone)]
pub struct TransXChange {
    /// Serviced organisations, like schools
    pub serviced_organisations: CollectionWithId<ServicedOrganisation>,
    /// Stops, by ATCO code
    pub stops: CollectionWithId<Stop>,
    /// Route sections
    pub route_sections: CollectionWithId<RouteSection>,
    /// Routes
    pub routes: CollectionWithId<Route>,
    /// Journey pattern sections
    pub journey_pattern_sections: CollectionWithId<JourneyPatternSection>,
    /// Operators
    pub operators: CollectionWithId<Operator>,
    /// Services, by service code
    pub services: CollectionWithId<Service>,
    /// Vehicle journeys, in document order
    pub journeys: Vec<VehicleJourney>,
    /// Dates of the moveable bank holidays
    pub bank_holidays: BankHolidays,
    route_links: HashMap<String, (Idx<RouteSection>, usize)>,
    default_operating_profile: OperatingProfile,
}

impl TransXChange {
    /// Build the registry from the root `TransXChange` element, without any
    /// moveable bank holiday.
    pub fn new(root: &Element) -> Result<Self> {
        TransXChange::with_bank_holidays(root, BankHolidays::default())
    }

    /// Build the registry from the root `TransXChange` element. Invalid
    /// objects are skipped with a warning.
    pub fn with_bank_holidays(root: &Element, bank_holidays: BankHolidays) -> Result<Self> {
        if root.name() != "TransXChange" {
            bail!("Expected a 'TransXChange' root element, found '{}'", root.name());
        }
        let serviced_organisations = collection(
            root,
            "ServicedOrganisations",
            &["ServicedOrganisation"],
            |element| ServicedOrganisation::try_from(element),
        );
        let stops = collection(root, "StopPoints", STOP_ELEMENTS, |element| Stop::try_from(element));
        let route_sections = collection(root, "RouteSections", &["RouteSection"], |element| {
            RouteSection::try_from(element)
        });
        let routes = collection(root, "Routes", &["Route"], |element| Route::try_from(element));
        let journey_pattern_sections = collection(
            root,
            "JourneyPatternSections",
            &["JourneyPatternSection"],
            |element| JourneyPatternSection::try_from(element),
        );
        let operators = collection(root, "Operators", OPERATOR_ELEMENTS, |element| {
            Operator::try_from(element)
        });
        let services = collection(root, "Services", &["Service"], |service| {
            Service::from_element(service, &serviced_organisations)
        });
        let mut journeys = Vec::new();
        for journey_element in root
            .only_child("VehicleJourneys")
            .into_iter()
            .flat_map(|journeys| journeys.children_named("VehicleJourney"))
        {
            journeys.push(skip_fail!(VehicleJourney::from_element(
                journey_element,
                &serviced_organisations
            )));
        }
        inherit_journey_patterns(&mut journeys);

        let mut route_links = HashMap::new();
        for (section_idx, section) in route_sections.iter() {
            for (position, link) in section.links.iter().enumerate() {
                if let Some(id) = &link.id {
                    route_links.entry(id.clone()).or_insert((section_idx, position));
                }
            }
        }
        info!(
            "{} stops, {} services and {} vehicle journeys read",
            stops.len(),
            services.len(),
            journeys.len()
        );
        Ok(TransXChange {
            serviced_organisations,
            stops,
            route_sections,
            routes,
            journey_pattern_sections,
            operators,
            services,
            journeys,
            bank_holidays,
            route_links,
            default_operating_profile: OperatingProfile::default(),
        })
    }

    /// Look up a stop, warning once if it is unknown.
    pub fn stop(&self, atco_code: &str) -> Option<&Stop> {
        let stop = self.stops.get(atco_code);
        if stop.is_none() {
            warn_once!("Stop '{}' not found", atco_code);
        }
        stop
    }

    /// Look up a journey pattern section, warning once if it is unknown.
    pub fn journey_pattern_section(&self, id: &str) -> Option<&JourneyPatternSection> {
        let section = self.journey_pattern_sections.get(id);
        if section.is_none() {
            warn_once!("JourneyPatternSection '{}' not found", id);
        }
        section
    }

    /// Iterates over the route sections of a route, in order. Unknown
    /// sections are skipped with a warning.
    pub fn route_sections<'a>(
        &'a self,
        route: &'a Route,
    ) -> impl Iterator<Item = &'a RouteSection> + Clone + 'a {
        route.route_section_refs.iter().filter_map(move |section_ref| {
            let section = self.route_sections.get(section_ref);
            if section.is_none() {
                warn_once!("RouteSection '{}' not found for Route '{}'", section_ref, route.id);
            }
            section
        })
    }

    /// Look up a route link by identifier, across every route section.
    pub fn route_link(&self, id: &str) -> Option<&RouteLink> {
        let link = self
            .route_links
            .get(id)
            .and_then(|(section_idx, position)| self.route_sections[*section_idx].links.get(*position));
        if link.is_none() {
            warn_once!("RouteLink '{}' not found", id);
        }
        link
    }

    /// Origin and destination stops of a route link.
    pub fn route_link_stops(&self, link: &RouteLink) -> Option<(&Stop, &Stop)> {
        Some((self.stop(&link.from_stop)?, self.stop(&link.to_stop)?))
    }

    /// The journey pattern followed by a journey.
    pub fn journey_pattern(&self, journey: &VehicleJourney) -> Option<&JourneyPattern> {
        let pattern_ref = match &journey.journey_pattern_ref {
            Some(pattern_ref) => pattern_ref,
            None => {
                warn_once!("No JourneyPattern for VehicleJourney '{}'", journey.code);
                return None;
            }
        };
        let service = match self.services.get(&journey.service_ref) {
            Some(service) => service,
            None => {
                warn_once!(
                    "Service '{}' not found for VehicleJourney '{}'",
                    journey.service_ref,
                    journey.code
                );
                return None;
            }
        };
        let pattern = service.journey_patterns.get(pattern_ref);
        if pattern.is_none() {
            warn_once!(
                "JourneyPattern '{}' not found in Service '{}'",
                pattern_ref,
                service.service_code
            );
        }
        pattern
    }

    /// The operating profile of a journey: its own, or else the one of its
    /// journey pattern, or else the one of its service, or else every day.
    pub fn operating_profile<'a>(&'a self, journey: &'a VehicleJourney) -> &'a OperatingProfile {
        journey
            .operating_profile
            .as_ref()
            .or_else(|| {
                journey
                    .journey_pattern_ref
                    .as_ref()
                    .and_then(|_| self.journey_pattern(journey))
                    .and_then(|pattern| pattern.operating_profile.as_ref())
            })
            .or_else(|| {
                self.services
                    .get(&journey.service_ref)
                    .and_then(|service| service.operating_profile.as_ref())
            })
            .unwrap_or(&self.default_operating_profile)
    }

    /// Returns `true` if the journey runs on the date: the date must be in
    /// the operating period of its service and allowed by its operating
    /// profile.
    pub fn runs_on(&self, journey: &VehicleJourney, date: Date) -> bool {
        let in_operating_period = self
            .services
            .get(&journey.service_ref)
            .map_or(true, |service| service.operating_period.contains(date));
        in_operating_period && self.operating_profile(journey).runs_on(date, &self.bank_holidays)
    }

    /// Journeys of a line of a service, in document order.
    pub fn get_journeys(&self, service_code: &str, line_id: &str) -> Vec<&VehicleJourney> {
        self.journeys
            .iter()
            .filter(|journey| journey.service_ref == service_code && journey.line_ref == line_id)
            .collect()
    }
}

// A journey without journey pattern takes the one of the journey it refers
// to, following the chain of references.
fn inherit_journey_patterns(journeys: &mut [VehicleJourney]) {
    let mut journey_indexes: HashMap<String, usize> = HashMap::new();
    for (index, journey) in journeys.iter().enumerate() {
        if journey_indexes.contains_key(&journey.code) {
            warn_once!("VehicleJourney '{}' declared twice", journey.code);
            continue;
        }
        journey_indexes.insert(journey.code.clone(), index);
    }
    for index in 0..journeys.len() {
        if journeys[index].journey_pattern_ref.is_some() {
            continue;
        }
        let mut visited = HashSet::new();
        let mut current = index;
        let journey_pattern_ref = loop {
            if !visited.insert(current) {
                warn_once!(
                    "Cyclic VehicleJourneyRef from VehicleJourney '{}'",
                    journeys[index].code
                );
                break None;
            }
            let journey = &journeys[current];
            if let Some(journey_pattern_ref) = &journey.journey_pattern_ref {
                break Some(journey_pattern_ref.clone());
            }
            let vehicle_journey_ref = match &journey.vehicle_journey_ref {
                Some(vehicle_journey_ref) => vehicle_journey_ref,
                None => break None,
            };
            match journey_indexes.get(vehicle_journey_ref) {
                Some(next) => current = *next,
                None => {
                    warn_once!(
                        "VehicleJourney '{}' not found for VehicleJourney '{}'",
                        vehicle_journey_ref,
                        journey.code
                    );
                    break None;
                }
            }
        };
        journeys[index].journey_pattern_ref = journey_pattern_ref;
    }
}
