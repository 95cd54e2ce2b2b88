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

//! The flat records of a TransXChange document. Cross references are kept as
//! identifiers and resolved through [TransXChange](crate::TransXChange).

use crate::{
    journey_pattern::JourneyPattern,
    literals::{parse_date, Date},
    minidom_utils::ElementExt,
    operating_profile::OperatingProfile,
    Error, Result,
};
use anyhow::{anyhow, Context};
use minidom::Element;
use minidom_ext::{AttributeElementExt, OnlyChildElementExt};
use std::{collections::HashMap, convert::TryFrom, fmt};
use typed_index_collection::{impl_id, CollectionWithId};

/// Separates a line name from its brand in `LineName`, as in `54 | Colchester Buses`.
const LINE_BRAND_SEPARATOR: char = '|';

/// A stop point, either a full `StopPoint` or an `AnnotatedStopPointRef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// ATCO code of the stop
    pub atco_code: String,
    /// Name of the stop, if any
    pub common_name: Option<String>,
    /// Short indicator like `Stop A` or `opp`
    pub indicator: Option<String>,
    /// Name of the locality the stop belongs to
    pub locality: Option<String>,
}

impl_id!(Stop, Stop, atco_code);

impl TryFrom<&Element> for Stop {
    type Error = Error;
    fn try_from(stop_element: &Element) -> Result<Self> {
        let atco_code = stop_element
            .child_text("AtcoCode")
            .or_else(|| stop_element.child_text("StopPointRef"))
            .ok_or_else(|| {
                anyhow!(
                    "Failed to find 'AtcoCode' or 'StopPointRef' in '{}'",
                    stop_element.name()
                )
            })?;
        let descriptor = stop_element.only_child("Descriptor");
        let descriptor_text = |name: &str| {
            stop_element
                .child_text(name)
                .or_else(|| descriptor.and_then(|descriptor| descriptor.child_text(name)))
        };
        let locality = stop_element.child_text("LocalityName").or_else(|| {
            stop_element
                .only_child("Place")
                .and_then(|place| place.child_text("LocalityName"))
        });
        Ok(Stop {
            atco_code,
            common_name: descriptor_text("CommonName"),
            indicator: descriptor_text("Indicator"),
            locality,
        })
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match &self.common_name {
            Some(name) => name,
            None => return write!(f, "{}", self.atco_code),
        };
        if let Some(indicator) = &self.indicator {
            return write!(f, "{} ({})", name, indicator);
        }
        match &self.locality {
            Some(locality) if !name.to_lowercase().contains(&locality.to_lowercase()) => {
                write!(f, "{} {}", locality, name)
            }
            _ => write!(f, "{}", name),
        }
    }
}

/// A line of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Identifier of the line
    pub id: String,
    /// Public name, like `54`
    pub line_name: String,
    /// Brand written after the separator in `LineName`, empty if none
    pub line_brand: String,
    /// Colour of the line
    pub colour: Option<String>,
    /// Description of the outbound direction
    pub outbound_description: Option<String>,
    /// Description of the inbound direction
    pub inbound_description: Option<String>,
}

impl TryFrom<&Element> for Line {
    type Error = Error;
    fn try_from(line_element: &Element) -> Result<Self> {
        let id: String = line_element.try_attribute("id").map_err(|e| anyhow!("{}", e))?;
        let label = line_element.child_text("LineName").unwrap_or_default();
        let (line_name, line_brand) = match label.split_once(LINE_BRAND_SEPARATOR) {
            Some((name, brand)) => (name.trim().to_string(), brand.trim().to_string()),
            None => (label, String::new()),
        };
        let direction_description = |direction: &str| {
            line_element
                .only_child(direction)
                .and_then(|description| description.child_text("Description"))
        };
        Ok(Line {
            id,
            line_name,
            line_brand,
            colour: line_element.child_text("LineColour"),
            outbound_description: direction_description("OutboundDescription"),
            inbound_description: direction_description("InboundDescription"),
        })
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line_name)
    }
}

/// WGS84 position along a route link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Longitude
    pub longitude: f64,
    /// Latitude
    pub latitude: f64,
}

impl TryFrom<&Element> for Location {
    type Error = Error;
    fn try_from(location_element: &Element) -> Result<Self> {
        // Coordinates are either direct children or wrapped in 'Translation'
        let coordinates = location_element
            .only_child("Translation")
            .unwrap_or(location_element);
        let coordinate = |name: &str| -> Result<f64> {
            let text = coordinates.try_child_text(name)?;
            text.parse()
                .with_context(|| format!("Failed to parse {} '{}'", name, text))
        };
        Ok(Location {
            longitude: coordinate("Longitude")?,
            latitude: coordinate("Latitude")?,
        })
    }
}

/// Link between two consecutive stops of a route section.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLink {
    /// Identifier of the link, some producers omit it
    pub id: Option<String>,
    /// ATCO code of the origin stop
    pub from_stop: String,
    /// ATCO code of the destination stop
    pub to_stop: String,
    /// Length of the link in metres
    pub distance: Option<u32>,
    /// Track followed by the link
    pub locations: Vec<Location>,
}

impl TryFrom<&Element> for RouteLink {
    type Error = Error;
    fn try_from(link_element: &Element) -> Result<Self> {
        let id = link_element.attr("id").map(str::to_string);
        let stop_ref = |end: &str| -> Result<String> {
            link_element
                .try_only_child(end)
                .map_err(|e| anyhow!("{}", e))?
                .try_child_text("StopPointRef")
                .with_context(|| format!("RouteLink {:?} has no '{}' stop", id, end))
        };
        let from_stop = stop_ref("From")?;
        let to_stop = stop_ref("To")?;
        let distance = link_element
            .child_text("Distance")
            .and_then(|distance| distance.parse().ok());
        let locations = link_element
            .only_child("Track")
            .and_then(|track| track.only_child("Mapping"))
            .map(|mapping| {
                mapping
                    .children_named("Location")
                    .filter_map(|location| Location::try_from(location).ok())
                    .collect()
            })
            .unwrap_or_default();
        Ok(RouteLink {
            id,
            from_stop,
            to_stop,
            distance,
            locations,
        })
    }
}

/// Ordered list of route links, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSection {
    /// Identifier of the section
    pub id: String,
    /// Links of the section
    pub links: Vec<RouteLink>,
}

impl_id!(RouteSection);

impl TryFrom<&Element> for RouteSection {
    type Error = Error;
    fn try_from(section_element: &Element) -> Result<Self> {
        let id: String = section_element.try_attribute("id").map_err(|e| anyhow!("{}", e))?;
        let mut links = Vec::new();
        for link_element in section_element.children_named("RouteLink") {
            let link = skip_fail!(RouteLink::try_from(link_element)
                .with_context(|| format!("RouteLink skipped in RouteSection '{}'", id)));
            links.push(link);
        }
        Ok(RouteSection { id, links })
    }
}

/// A route, as a list of references to route sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Identifier of the route
    pub id: String,
    /// Private code of the route
    pub private_code: Option<String>,
    /// Description of the route
    pub description: Option<String>,
    /// Identifiers of the route sections, in order
    pub route_section_refs: Vec<String>,
}

impl_id!(Route);

impl TryFrom<&Element> for Route {
    type Error = Error;
    fn try_from(route_element: &Element) -> Result<Self> {
        let id: String = route_element.try_attribute("id").map_err(|e| anyhow!("{}", e))?;
        let route_section_refs = route_element
            .children_named("RouteSectionRef")
            .map(|section_ref| section_ref.text().trim().to_string())
            .filter(|section_ref| !section_ref.is_empty())
            .collect();
        Ok(Route {
            id,
            private_code: route_element.child_text("PrivateCode"),
            description: route_element.child_text("Description"),
            route_section_refs,
        })
    }
}

/// The operator of services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// Identifier of the operator in the document
    pub id: String,
    /// National operator code, or local code if absent
    pub code: Option<String>,
    /// Short name
    pub short_name: Option<String>,
    /// Trading name
    pub trading_name: Option<String>,
}

impl_id!(Operator);

impl TryFrom<&Element> for Operator {
    type Error = Error;
    fn try_from(operator_element: &Element) -> Result<Self> {
        let id: String = operator_element.try_attribute("id").map_err(|e| anyhow!("{}", e))?;
        let code = operator_element
            .child_text("NationalOperatorCode")
            .or_else(|| operator_element.child_text("OperatorCode"));
        Ok(Operator {
            id,
            code,
            short_name: operator_element.child_text("OperatorShortName"),
            trading_name: operator_element.child_text("TradingName"),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .trading_name
            .as_ref()
            .or(self.short_name.as_ref())
            .or(self.code.as_ref())
            .unwrap_or(&self.id);
        write!(f, "{}", name)
    }
}

/// Type of vehicle operating a journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleType {
    /// Code of the vehicle type
    pub code: String,
    /// Description, like `Single Deck Bus`
    pub description: Option<String>,
}

impl TryFrom<&Element> for VehicleType {
    type Error = Error;
    fn try_from(vehicle_type_element: &Element) -> Result<Self> {
        Ok(VehicleType {
            code: vehicle_type_element.try_child_text("VehicleTypeCode")?,
            description: vehicle_type_element.child_text("Description"),
        })
    }
}

/// Vehicle working a sequence of journeys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block number
    pub code: String,
    /// Description of the block
    pub description: Option<String>,
}

impl TryFrom<&Element> for Block {
    type Error = Error;
    fn try_from(block_element: &Element) -> Result<Self> {
        Ok(Block {
            code: block_element.try_child_text("BlockNumber")?,
            description: block_element.child_text("Description"),
        })
    }
}

/// Inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    /// First day of the range
    pub start_date: Date,
    /// Last day of the range, included
    pub end_date: Date,
}

impl DateRange {
    /// Returns `true` if the date is inside the range, bounds included.
    pub fn contains(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

impl TryFrom<&Element> for DateRange {
    type Error = Error;
    // A range without 'EndDate' is a single day
    fn try_from(date_range_element: &Element) -> Result<Self> {
        let start_date = parse_date(&date_range_element.try_child_text("StartDate")?)?;
        let end_date = match date_range_element.child_text("EndDate") {
            Some(end_date) => parse_date(&end_date)?,
            None => start_date,
        };
        Ok(DateRange {
            start_date,
            end_date,
        })
    }
}

pub(crate) fn date_ranges(element: Option<&Element>) -> Vec<DateRange> {
    let mut date_ranges = Vec::new();
    for date_range_element in element.into_iter().flat_map(|e| e.children_named("DateRange")) {
        date_ranges.push(skip_fail!(DateRange::try_from(date_range_element)));
    }
    date_ranges
}

/// External calendar, like a school, gating the operation of journeys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicedOrganisation {
    /// Code of the organisation
    pub code: String,
    /// Name of the organisation
    pub name: Option<String>,
    /// Date ranges when the organisation works
    pub working_days: Vec<DateRange>,
    /// Date ranges when the organisation is on holiday
    pub holidays: Vec<DateRange>,
}

impl_id!(ServicedOrganisation, ServicedOrganisation, code);

impl TryFrom<&Element> for ServicedOrganisation {
    type Error = Error;
    fn try_from(organisation_element: &Element) -> Result<Self> {
        Ok(ServicedOrganisation {
            code: organisation_element.try_child_text("OrganisationCode")?,
            name: organisation_element.child_text("Name"),
            working_days: date_ranges(organisation_element.only_child("WorkingDays")),
            holidays: date_ranges(organisation_element.only_child("Holidays")),
        })
    }
}

impl fmt::Display for ServicedOrganisation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.as_ref().unwrap_or(&self.code))
    }
}

/// Period during which a service is registered to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingPeriod {
    /// First day of operation
    pub start_date: Date,
    /// Last day of operation, open-ended if absent
    pub end_date: Option<Date>,
}

impl OperatingPeriod {
    /// Returns `true` if the service is registered on this date.
    pub fn contains(&self, date: Date) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end_date| date <= end_date)
    }
}

impl TryFrom<&Element> for OperatingPeriod {
    type Error = Error;
    fn try_from(operating_period: &Element) -> Result<Self> {
        let start_date = parse_date(&operating_period.try_child_text("StartDate")?)?;
        let end_date = operating_period
            .child_text("EndDate")
            .map(|end_date| parse_date(&end_date))
            .transpose()?;
        Ok(OperatingPeriod {
            start_date,
            end_date,
        })
    }
}

/// A service, with its lines and journey patterns.
#[derive(Debug, Clone)]
pub struct Service {
    /// Code of the service
    pub service_code: String,
    /// Period of registration of the service
    pub operating_period: OperatingPeriod,
    /// Lines of the service
    pub lines: Vec<Line>,
    /// Journey patterns of the service, by identifier
    pub journey_patterns: HashMap<String, JourneyPattern>,
    /// Description of the service
    pub description: Option<String>,
    /// Origin of the standard service
    pub origin: Option<String>,
    /// Destination of the standard service
    pub destination: Option<String>,
    /// Identifier of the operator
    pub operator_ref: Option<String>,
    /// Default operating profile of the journeys of this service
    pub operating_profile: Option<OperatingProfile>,
}

impl_id!(Service, Service, service_code);

impl Service {
    /// Read a `Service` element. Serviced organisations are needed to
    /// resolve the operating profiles.
    pub fn from_element(
        service_element: &Element,
        serviced_organisations: &CollectionWithId<ServicedOrganisation>,
    ) -> Result<Self> {
        let service_code = service_element.try_child_text("ServiceCode")?;
        let operating_period_element = service_element
            .try_only_child("OperatingPeriod")
            .map_err(|e| anyhow!("{}", e))?;
        let operating_period = OperatingPeriod::try_from(operating_period_element)
            .with_context(|| format!("Invalid OperatingPeriod for service '{}'", service_code))?;
        let mut lines = Vec::new();
        for line_element in service_element
            .only_child("Lines")
            .into_iter()
            .flat_map(|lines| lines.children_named("Line"))
        {
            lines.push(skip_fail!(Line::try_from(line_element)));
        }
        let standard_service = service_element.only_child("StandardService");
        let mut journey_patterns = HashMap::new();
        for pattern_element in standard_service
            .into_iter()
            .flat_map(|standard_service| standard_service.children_named("JourneyPattern"))
        {
            let journey_pattern = skip_fail!(JourneyPattern::from_element(
                pattern_element,
                serviced_organisations
            ));
            if journey_patterns.contains_key(&journey_pattern.id) {
                warn_once!(
                    "JourneyPattern '{}' declared twice in service '{}'",
                    journey_pattern.id,
                    service_code
                );
                continue;
            }
            journey_patterns.insert(journey_pattern.id.clone(), journey_pattern);
        }
        let standard_text = |name: &str| standard_service.and_then(|service| service.child_text(name));
        let operating_profile = service_element
            .only_child("OperatingProfile")
            .map(|profile| OperatingProfile::from_element(profile, serviced_organisations));
        Ok(Service {
            service_code,
            operating_period,
            lines,
            journey_patterns,
            description: service_element.child_text("Description"),
            origin: standard_text("Origin"),
            destination: standard_text("Destination"),
            operator_ref: service_element.child_text("RegisteredOperatorRef"),
            operating_profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    mod stop {
        use super::*;
        use pretty_assertions::assert_eq;

        fn stop(xml: &str) -> Stop {
            let root: Element = xml.parse().unwrap();
            Stop::try_from(&root).unwrap()
        }

        #[test]
        fn only_atco_code() {
            let stop = stop("<StopPoint><AtcoCode>123456789</AtcoCode></StopPoint>");
            assert_eq!("123456789", stop.atco_code);
            assert_eq!("123456789", stop.to_string());
        }

        #[test]
        fn with_indicator() {
            let stop = stop(
                r#"<StopPoint>
                    <AtcoCode>123456789</AtcoCode>
                    <CommonName>Test Stop</CommonName>
                    <Indicator>Stop A</Indicator>
                </StopPoint>"#,
            );
            assert_eq!("Test Stop (Stop A)", stop.to_string());
        }

        #[test]
        fn with_locality() {
            let stop = stop(
                r#"<StopPoint>
                    <AtcoCode>123456789</AtcoCode>
                    <CommonName>Market Square</CommonName>
                    <LocalityName>Colchester</LocalityName>
                </StopPoint>"#,
            );
            assert_eq!("Colchester Market Square", stop.to_string());
        }

        #[test]
        fn locality_already_in_name() {
            let stop = stop(
                r#"<StopPoint>
                    <AtcoCode>123456789</AtcoCode>
                    <CommonName>Colchester Market Square</CommonName>
                    <LocalityName>colchester</LocalityName>
                </StopPoint>"#,
            );
            assert_eq!("Colchester Market Square", stop.to_string());
        }

        #[test]
        fn descriptor_common_name() {
            let stop = stop(
                r#"<StopPoint>
                    <AtcoCode>123456789</AtcoCode>
                    <Descriptor>
                        <CommonName>Descriptor Name</CommonName>
                        <Indicator>opp</Indicator>
                    </Descriptor>
                </StopPoint>"#,
            );
            assert_eq!(Some(String::from("Descriptor Name")), stop.common_name);
            assert_eq!("Descriptor Name (opp)", stop.to_string());
        }

        #[test]
        fn annotated_stop_point_ref() {
            let stop = stop(
                r#"<AnnotatedStopPointRef>
                    <StopPointRef>150033038003</StopPointRef>
                    <CommonName>Osborne Street</CommonName>
                </AnnotatedStopPointRef>"#,
            );
            assert_eq!("150033038003", stop.atco_code);
            assert_eq!("Osborne Street", stop.to_string());
        }

        #[test]
        #[should_panic(expected = "Failed to find 'AtcoCode' or 'StopPointRef' in 'StopPoint'")]
        fn no_code() {
            stop("<StopPoint><CommonName>Nowhere</CommonName></StopPoint>");
        }
    }

    mod line {
        use super::*;
        use pretty_assertions::assert_eq;

        fn line(xml: &str) -> Line {
            let root: Element = xml.parse().unwrap();
            Line::try_from(&root).unwrap()
        }

        #[test]
        fn with_brand() {
            let line = line(
                r#"<Line id="L001">
                    <LineName>54 | Colchester Buses</LineName>
                    <LineColour>FF0000</LineColour>
                </Line>"#,
            );
            assert_eq!("L001", line.id);
            assert_eq!("54", line.line_name);
            assert_eq!("Colchester Buses", line.line_brand);
            assert_eq!(Some(String::from("FF0000")), line.colour);
        }

        #[test]
        fn without_brand() {
            let line = line(r#"<Line id="L002"><LineName>55</LineName></Line>"#);
            assert_eq!("55", line.line_name);
            assert_eq!("", line.line_brand);
            assert_eq!(None, line.colour);
        }

        #[test]
        fn with_descriptions() {
            let line = line(
                r#"<Line id="L003">
                    <LineName>56</LineName>
                    <OutboundDescription>
                        <Description>To Town Centre</Description>
                    </OutboundDescription>
                    <InboundDescription>
                        <Description>To Station</Description>
                    </InboundDescription>
                </Line>"#,
            );
            assert_eq!(Some(String::from("To Town Centre")), line.outbound_description);
            assert_eq!(Some(String::from("To Station")), line.inbound_description);
        }
    }

    mod route {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn section_refs_in_order() {
            let xml = r#"<Route id="RT001">
                    <RouteSectionRef>RS001</RouteSectionRef>
                    <RouteSectionRef>RS002</RouteSectionRef>
                </Route>"#;
            let root: Element = xml.parse().unwrap();
            let route = Route::try_from(&root).unwrap();
            assert_eq!("RT001", route.id);
            assert_eq!(vec!["RS001", "RS002"], route.route_section_refs);
        }
    }

    mod route_section {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn links_in_document_order() {
            let xml = r#"<RouteSection id="RS1">
                    <RouteLink id="RL2">
                        <From><StopPointRef>B</StopPointRef></From>
                        <To><StopPointRef>C</StopPointRef></To>
                        <Distance>420</Distance>
                    </RouteLink>
                    <RouteLink id="RL1">
                        <From><StopPointRef>A</StopPointRef></From>
                        <To><StopPointRef>B</StopPointRef></To>
                        <Track><Mapping>
                            <Location id="L1"><Longitude>0.9</Longitude><Latitude>51.8</Latitude></Location>
                            <Location id="L2"><Translation><Longitude>0.91</Longitude><Latitude>51.81</Latitude></Translation></Location>
                        </Mapping></Track>
                    </RouteLink>
                </RouteSection>"#;
            let root: Element = xml.parse().unwrap();
            let section = RouteSection::try_from(&root).unwrap();
            let ids: Vec<_> = section.links.iter().map(|link| link.id.as_deref()).collect();
            assert_eq!(vec![Some("RL2"), Some("RL1")], ids);
            assert_eq!(Some(420), section.links[0].distance);
            assert_eq!("A", section.links[1].from_stop);
            assert_eq!(2, section.links[1].locations.len());
            assert_eq!(0.91, section.links[1].locations[1].longitude);
        }

        #[test]
        fn link_without_stop_is_skipped() {
            let xml = r#"<RouteSection id="RS2">
                    <RouteLink id="RL1">
                        <From><StopPointRef>A</StopPointRef></From>
                    </RouteLink>
                    <RouteLink>
                        <From><StopPointRef>A</StopPointRef></From>
                        <To><StopPointRef>B</StopPointRef></To>
                    </RouteLink>
                </RouteSection>"#;
            let root: Element = xml.parse().unwrap();
            let section = RouteSection::try_from(&root).unwrap();
            assert_eq!(1, section.links.len());
            assert_eq!(None, section.links[0].id);
        }
    }

    mod serviced_organisation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn with_dates() {
            let xml = r#"<ServicedOrganisation>
                    <OrganisationCode>SD</OrganisationCode>
                    <Name>School Days</Name>
                    <WorkingDays>
                        <DateRange>
                            <StartDate>2025-09-01</StartDate>
                            <EndDate>2025-10-24</EndDate>
                        </DateRange>
                    </WorkingDays>
                    <Holidays>
                        <DateRange>
                            <StartDate>2025-10-25</StartDate>
                            <EndDate>2025-11-02</EndDate>
                        </DateRange>
                    </Holidays>
                </ServicedOrganisation>"#;
            let root: Element = xml.parse().unwrap();
            let organisation = ServicedOrganisation::try_from(&root).unwrap();
            assert_eq!("SD", organisation.code);
            assert_eq!(1, organisation.working_days.len());
            assert_eq!(1, organisation.holidays.len());
            assert_eq!("School Days", organisation.to_string());
            let half_term = organisation.holidays[0];
            assert!(half_term.contains(Date::from_ymd_opt(2025, 10, 25).unwrap()));
            assert!(half_term.contains(Date::from_ymd_opt(2025, 11, 2).unwrap()));
            assert!(!half_term.contains(Date::from_ymd_opt(2025, 11, 3).unwrap()));
        }

        #[test]
        fn no_name() {
            let xml = r#"<ServicedOrganisation>
                    <OrganisationCode>ABC</OrganisationCode>
                </ServicedOrganisation>"#;
            let root: Element = xml.parse().unwrap();
            let organisation = ServicedOrganisation::try_from(&root).unwrap();
            assert_eq!("ABC", organisation.to_string());
            assert!(organisation.working_days.is_empty());
        }
    }

    mod vehicle_type {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn code_and_description() {
            let xml = r#"<VehicleType>
                    <VehicleTypeCode>SB</VehicleTypeCode>
                    <Description>Single Deck Bus</Description>
                </VehicleType>"#;
            let root: Element = xml.parse().unwrap();
            let vehicle_type = VehicleType::try_from(&root).unwrap();
            assert_eq!("SB", vehicle_type.code);
            assert_eq!(Some(String::from("Single Deck Bus")), vehicle_type.description);
        }
    }

    mod block {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn code_and_description() {
            let xml = r#"<Block>
                    <BlockNumber>BLK001</BlockNumber>
                    <Description>Morning Block</Description>
                </Block>"#;
            let root: Element = xml.parse().unwrap();
            let block = Block::try_from(&root).unwrap();
            assert_eq!("BLK001", block.code);
            assert_eq!(Some(String::from("Morning Block")), block.description);
        }
    }

    mod operating_period {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn open_ended() {
            let xml = r#"<OperatingPeriod><StartDate>2025-09-07</StartDate></OperatingPeriod>"#;
            let root: Element = xml.parse().unwrap();
            let period = OperatingPeriod::try_from(&root).unwrap();
            assert_eq!(None, period.end_date);
            assert!(!period.contains(Date::from_ymd_opt(2025, 9, 6).unwrap()));
            assert!(period.contains(Date::from_ymd_opt(2030, 1, 1).unwrap()));
        }

        #[test]
        #[should_panic(expected = "malformed date 'NotADate'")]
        fn invalid_end_date() {
            let xml = r#"<OperatingPeriod>
                    <StartDate>2019-01-01</StartDate>
                    <EndDate>NotADate</EndDate>
                </OperatingPeriod>"#;
            let root: Element = xml.parse().unwrap();
            OperatingPeriod::try_from(&root).unwrap();
        }
    }
}
