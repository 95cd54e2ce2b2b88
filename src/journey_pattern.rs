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

//! Journey patterns: the template chain of timing links followed by a
//! family of vehicle journeys.

use crate::{
    literals::parse_duration,
    minidom_utils::ElementExt,
    objects::ServicedOrganisation,
    operating_profile::OperatingProfile,
    transxchange::TransXChange,
    Error, Result,
};
use anyhow::{anyhow, Context};
use chrono::Duration;
use minidom::Element;
use minidom_ext::{AttributeElementExt, OnlyChildElementExt};
use std::convert::TryFrom;
use typed_index_collection::{impl_id, CollectionWithId};

/// One end of a timing link: the stop, what passengers can do there and
/// how long the vehicle waits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopUsage {
    /// Position of the stop in the pattern
    pub sequence_number: Option<u32>,
    /// ATCO code of the stop
    pub stop_point_ref: Option<String>,
    /// `pickUp`, `setDown`, `pickUpAndSetDown` or `pass`
    pub activity: Option<String>,
    /// `principalTimingPoint`, `otherPoint`...
    pub timing_status: Option<String>,
    /// Time spent at the stop
    pub wait_time: Option<Duration>,
}

impl TryFrom<&Element> for StopUsage {
    type Error = Error;
    fn try_from(stop_usage_element: &Element) -> Result<Self> {
        let wait_time = stop_usage_element
            .child_text("WaitTime")
            .map(|wait_time| parse_duration(&wait_time))
            .transpose()?;
        Ok(StopUsage {
            sequence_number: stop_usage_element
                .attr("SequenceNumber")
                .and_then(|sequence| sequence.trim().parse().ok()),
            stop_point_ref: stop_usage_element.child_text("StopPointRef"),
            activity: stop_usage_element.child_text("Activity"),
            timing_status: stop_usage_element.child_text("TimingStatus"),
            wait_time,
        })
    }
}

/// A stop to stop segment of a journey pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyPatternTimingLink {
    /// Identifier, referenced by dead runs and vehicle journey timing links
    pub id: Option<String>,
    /// Identifier of the corresponding route link
    pub route_link_ref: Option<String>,
    /// Origin of the link
    pub from: StopUsage,
    /// Destination of the link
    pub to: StopUsage,
    /// Time to run from origin to destination
    pub run_time: Duration,
}

impl JourneyPatternTimingLink {
    /// Wait time at the origin of the link.
    pub fn from_wait_time(&self) -> Option<Duration> {
        self.from.wait_time
    }

    /// Wait time at the destination of the link.
    pub fn to_wait_time(&self) -> Option<Duration> {
        self.to.wait_time
    }
}

impl TryFrom<&Element> for JourneyPatternTimingLink {
    type Error = Error;
    fn try_from(link_element: &Element) -> Result<Self> {
        let id = link_element.attr("id").map(str::to_string);
        let context = || format!("Invalid JourneyPatternTimingLink {:?}", id);
        let run_time = parse_duration(&link_element.try_child_text("RunTime").with_context(context)?)
            .with_context(context)?;
        let stop_usage = |end: &str| -> Result<StopUsage> {
            let usage_element = link_element
                .try_only_child(end)
                .map_err(|e| anyhow!("{}", e))
                .with_context(context)?;
            StopUsage::try_from(usage_element).with_context(context)
        };
        let from = stop_usage("From")?;
        let to = stop_usage("To")?;
        Ok(JourneyPatternTimingLink {
            route_link_ref: link_element.child_text("RouteLinkRef"),
            id,
            from,
            to,
            run_time,
        })
    }
}

/// Ordered list of timing links, shared between journey patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyPatternSection {
    /// Identifier of the section
    pub id: String,
    /// Timing links, in document order
    pub timing_links: Vec<JourneyPatternTimingLink>,
}

impl_id!(JourneyPatternSection);

impl TryFrom<&Element> for JourneyPatternSection {
    type Error = Error;
    fn try_from(section_element: &Element) -> Result<Self> {
        let id: String = section_element.try_attribute("id").map_err(|e| anyhow!("{}", e))?;
        let mut timing_links = Vec::new();
        for link_element in section_element.children_named("JourneyPatternTimingLink") {
            timing_links.push(skip_fail!(JourneyPatternTimingLink::try_from(link_element)
                .with_context(|| format!("in JourneyPatternSection '{}'", id))));
        }
        Ok(JourneyPatternSection { id, timing_links })
    }
}

/// Template of the timing links a family of journeys follows.
#[derive(Debug, Clone)]
pub struct JourneyPattern {
    /// Identifier of the pattern
    pub id: String,
    /// Identifiers of the journey pattern sections, in order
    pub section_refs: Vec<String>,
    /// `inbound`, `outbound`...
    pub direction: Option<String>,
    /// Identifier of the route
    pub route_ref: Option<String>,
    /// Destination displayed on the vehicle
    pub destination_display: Option<String>,
    /// Operating profile of the journeys following this pattern
    pub operating_profile: Option<OperatingProfile>,
}

impl JourneyPattern {
    /// Read a `JourneyPattern` element.
    pub fn from_element(
        pattern_element: &Element,
        serviced_organisations: &CollectionWithId<ServicedOrganisation>,
    ) -> Result<Self> {
        let id: String = pattern_element.try_attribute("id").map_err(|e| anyhow!("{}", e))?;
        let section_refs = pattern_element
            .children_named("JourneyPatternSectionRefs")
            .map(|section_ref| section_ref.text().trim().to_string())
            .filter(|section_ref| !section_ref.is_empty())
            .collect();
        Ok(JourneyPattern {
            id,
            section_refs,
            direction: pattern_element.child_text("Direction"),
            route_ref: pattern_element.child_text("RouteRef"),
            destination_display: pattern_element.child_text("DestinationDisplay"),
            operating_profile: pattern_element
                .only_child("OperatingProfile")
                .map(|profile| OperatingProfile::from_element(profile, serviced_organisations)),
        })
    }

    /// Iterates over the sections of the pattern. Unknown sections are
    /// skipped.
    pub fn sections<'a>(
        &'a self,
        transxchange: &'a TransXChange,
    ) -> impl Iterator<Item = &'a JourneyPatternSection> + Clone + 'a {
        self.section_refs
            .iter()
            .filter_map(move |section_ref| transxchange.journey_pattern_section(section_ref))
    }

    /// Iterates over every timing link of every section, in document order.
    /// The iterator can be cloned to walk the chain again.
    pub fn timing_links<'a>(
        &'a self,
        transxchange: &'a TransXChange,
    ) -> impl Iterator<Item = &'a JourneyPatternTimingLink> + Clone + 'a {
        self.sections(transxchange)
            .flat_map(|section| section.timing_links.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    mod journey_pattern_timing_link {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn with_wait_times() {
            let xml = r#"<JourneyPatternTimingLink id="JPTL1">
                    <From SequenceNumber="1">
                        <Activity>pickUp</Activity>
                        <StopPointRef>A</StopPointRef>
                        <TimingStatus>principalTimingPoint</TimingStatus>
                        <WaitTime>PT2M</WaitTime>
                    </From>
                    <To SequenceNumber="2">
                        <StopPointRef>B</StopPointRef>
                    </To>
                    <RouteLinkRef>RL1</RouteLinkRef>
                    <RunTime>PT5M</RunTime>
                </JourneyPatternTimingLink>"#;
            let root: Element = xml.parse().unwrap();
            let link = JourneyPatternTimingLink::try_from(&root).unwrap();
            assert_eq!(Some(String::from("JPTL1")), link.id);
            assert_eq!(Some(String::from("RL1")), link.route_link_ref);
            assert_eq!(Duration::minutes(5), link.run_time);
            assert_eq!(Some(Duration::minutes(2)), link.from_wait_time());
            assert_eq!(None, link.to_wait_time());
            assert_eq!(Some(1), link.from.sequence_number);
            assert_eq!(Some(String::from("pickUp")), link.from.activity);
            assert_eq!(Some(String::from("B")), link.to.stop_point_ref);
        }

        #[test]
        #[should_panic(expected = "malformed duration '5 minutes'")]
        fn malformed_run_time() {
            let xml = r#"<JourneyPatternTimingLink id="JPTL1">
                    <From><StopPointRef>A</StopPointRef></From>
                    <To><StopPointRef>B</StopPointRef></To>
                    <RunTime>5 minutes</RunTime>
                </JourneyPatternTimingLink>"#;
            let root: Element = xml.parse().unwrap();
            JourneyPatternTimingLink::try_from(&root).unwrap();
        }
    }

    mod journey_pattern_section {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn invalid_link_is_skipped() {
            let xml = r#"<JourneyPatternSection id="JPS1">
                    <JourneyPatternTimingLink id="JPTL1">
                        <From><StopPointRef>A</StopPointRef></From>
                        <To><StopPointRef>B</StopPointRef></To>
                        <RunTime>PT1M</RunTime>
                    </JourneyPatternTimingLink>
                    <JourneyPatternTimingLink id="JPTL2">
                        <From><StopPointRef>B</StopPointRef></From>
                        <RunTime>PT1M</RunTime>
                    </JourneyPatternTimingLink>
                    <JourneyPatternTimingLink id="JPTL3">
                        <From><StopPointRef>B</StopPointRef></From>
                        <To><StopPointRef>C</StopPointRef></To>
                        <RunTime>PT3M</RunTime>
                    </JourneyPatternTimingLink>
                </JourneyPatternSection>"#;
            let root: Element = xml.parse().unwrap();
            let section = JourneyPatternSection::try_from(&root).unwrap();
            let ids: Vec<_> = section
                .timing_links
                .iter()
                .map(|link| link.id.as_deref())
                .collect();
            assert_eq!(vec![Some("JPTL1"), Some("JPTL3")], ids);
        }
    }

    mod journey_pattern {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn section_refs() {
            let xml = r#"<JourneyPattern id="JP1">
                    <Direction>outbound</Direction>
                    <RouteRef>RT1</RouteRef>
                    <JourneyPatternSectionRefs>JPS1</JourneyPatternSectionRefs>
                    <JourneyPatternSectionRefs>JPS2</JourneyPatternSectionRefs>
                </JourneyPattern>"#;
            let root: Element = xml.parse().unwrap();
            let pattern = JourneyPattern::from_element(&root, &CollectionWithId::default()).unwrap();
            assert_eq!("JP1", pattern.id);
            assert_eq!(vec!["JPS1", "JPS2"], pattern.section_refs);
            assert_eq!(Some(String::from("outbound")), pattern.direction);
            assert!(pattern.operating_profile.is_none());
        }
    }
}
