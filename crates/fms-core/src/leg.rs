//! Flight plan legs and discontinuities.
//!
//! A leg is built from one of a few sources (a procedure leg, a synthesized
//! airport/runway leg, a synthesized extended centreline, or a manually
//! entered fix) and is not mutated once installed in a segment.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    Airport, Coordinates, DistanceOrTime, Fix, PathTerminator, ProcedureLeg, Runway,
    WaypointDescriptor,
};
use crate::segment::SegmentClass;
use crate::spatial::{offset_by_bearing, reciprocal, METERS_PER_NM};

/// Distance of the synthesized final approach fix from the runway threshold.
pub const EXTENDED_CENTERLINE_DISTANCE_NM: f64 = 5.0;

const EXTENDED_CENTERLINE_IDENT: &str = "CF";

/// A navigable flight plan leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlanLeg {
    /// Segment that owns this leg.
    pub segment: SegmentClass,
    pub ident: String,
    pub path_terminator: PathTerminator,
    pub waypoint_descriptor: WaypointDescriptor,
    pub fix: Option<Fix>,
    pub course_deg: Option<f64>,
    pub distance_or_time: Option<DistanceOrTime>,
    /// Procedure that contributed this leg; empty for manual and airport legs.
    pub procedure_ident: String,
    /// Free-form display text.
    pub annotation: String,
}

/// Identity used to decide whether two legs denote the same fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegKey<'a> {
    pub ident: &'a str,
    pub path_terminator: PathTerminator,
    pub procedure_ident: &'a str,
}

impl FlightPlanLeg {
    /// Convert a published procedure leg.
    ///
    /// Geometry missing from the database leg stays missing.
    pub fn from_procedure_leg(
        segment: SegmentClass,
        leg: &ProcedureLeg,
        procedure_ident: &str,
    ) -> Self {
        Self {
            segment,
            ident: procedure_leg_ident(leg),
            path_terminator: leg.path_terminator,
            waypoint_descriptor: leg.waypoint_descriptor,
            fix: leg.waypoint.clone(),
            course_deg: leg.course_deg,
            distance_or_time: leg.distance_or_time,
            procedure_ident: procedure_ident.to_string(),
            annotation: procedure_ident.to_string(),
        }
    }

    /// Synthesized leg to the runway threshold, or to the airport itself when
    /// no runway is selected.
    pub fn from_airport_and_runway(
        segment: SegmentClass,
        procedure_ident: &str,
        airport: &Airport,
        runway: Option<&Runway>,
    ) -> Self {
        match runway {
            Some(runway) => Self {
                segment,
                ident: runway.ident.clone(),
                path_terminator: PathTerminator::IF,
                waypoint_descriptor: WaypointDescriptor::Runway,
                fix: Some(
                    Fix::new(runway.ident.clone(), runway.threshold)
                        .with_descriptor(WaypointDescriptor::Runway),
                ),
                course_deg: Some(runway.landing_course_deg),
                distance_or_time: None,
                procedure_ident: procedure_ident.to_string(),
                annotation: airport.ident.clone(),
            },
            None => Self {
                segment,
                ident: airport.ident.clone(),
                path_terminator: PathTerminator::IF,
                waypoint_descriptor: WaypointDescriptor::Airport,
                fix: Some(
                    Fix::new(airport.ident.clone(), airport.location)
                        .with_descriptor(WaypointDescriptor::Airport),
                ),
                course_deg: None,
                distance_or_time: None,
                procedure_ident: procedure_ident.to_string(),
                annotation: String::new(),
            },
        }
    }

    /// Virtual course-to-fix leg on the runway's extended centreline.
    ///
    /// Used as the approach when the database has none for the runway.
    pub fn destination_extended_centerline(
        segment: SegmentClass,
        airport: &Airport,
        runway: &Runway,
    ) -> Self {
        let location = extended_centerline_point(runway, EXTENDED_CENTERLINE_DISTANCE_NM);

        Self {
            segment,
            ident: EXTENDED_CENTERLINE_IDENT.to_string(),
            path_terminator: PathTerminator::CF,
            waypoint_descriptor: WaypointDescriptor::Waypoint,
            fix: Some(Fix::new(EXTENDED_CENTERLINE_IDENT, location)),
            course_deg: Some(runway.landing_course_deg),
            distance_or_time: Some(DistanceOrTime::DistanceNm(EXTENDED_CENTERLINE_DISTANCE_NM)),
            procedure_ident: String::new(),
            annotation: format!("{} {}", airport.ident, runway.ident),
        }
    }

    /// Manually entered track-to-fix leg.
    pub fn from_fix(segment: SegmentClass, fix: Fix) -> Self {
        Self {
            segment,
            ident: fix.ident.clone(),
            path_terminator: PathTerminator::TF,
            waypoint_descriptor: fix.descriptor,
            fix: Some(fix),
            course_deg: None,
            distance_or_time: None,
            procedure_ident: String::new(),
            annotation: String::new(),
        }
    }

    pub fn key(&self) -> LegKey<'_> {
        LegKey {
            ident: &self.ident,
            path_terminator: self.path_terminator,
            procedure_ident: &self.procedure_ident,
        }
    }

    /// Whether both legs denote the same fix for continuity purposes.
    pub fn is_same_fix(&self, other: &FlightPlanLeg) -> bool {
        self.key() == other.key()
    }

    pub fn is_runway(&self) -> bool {
        self.waypoint_descriptor == WaypointDescriptor::Runway
    }
}

/// Legs that do not end at a fix get a label built from their geometry,
/// e.g. `CA283` for a course-to-altitude leg. A waypoint on such a leg is
/// only a reference navaid and never names it.
fn procedure_leg_ident(leg: &ProcedureLeg) -> String {
    if let Some(fix) = &leg.waypoint {
        if leg.path_terminator.terminates_at_fix() {
            return fix.ident.clone();
        }
    }
    match leg.course_deg {
        Some(course) => format!("{}{:03.0}", leg.path_terminator, course),
        None => leg.path_terminator.to_string(),
    }
}

fn extended_centerline_point(runway: &Runway, distance_nm: f64) -> Coordinates {
    offset_by_bearing(
        runway.threshold,
        distance_nm * METERS_PER_NM,
        reciprocal(runway.landing_course_deg),
    )
}

/// One element of a segment: a leg or a discontinuity marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlightPlanElement {
    Leg(FlightPlanLeg),
    /// No guaranteed path between the surrounding legs.
    Discontinuity,
}

impl FlightPlanElement {
    pub fn is_discontinuity(&self) -> bool {
        matches!(self, FlightPlanElement::Discontinuity)
    }

    pub fn as_leg(&self) -> Option<&FlightPlanLeg> {
        match self {
            FlightPlanElement::Leg(leg) => Some(leg),
            FlightPlanElement::Discontinuity => None,
        }
    }

    /// Whether this is a navigation leg terminating on a runway.
    pub fn is_runway_leg(&self) -> bool {
        self.as_leg().is_some_and(FlightPlanLeg::is_runway)
    }
}

impl From<FlightPlanLeg> for FlightPlanElement {
    fn from(leg: FlightPlanLeg) -> Self {
        FlightPlanElement::Leg(leg)
    }
}

impl fmt::Display for FlightPlanElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightPlanElement::Leg(leg) if leg.procedure_ident.is_empty() => {
                write!(f, "{} ({})", leg.ident, leg.path_terminator)
            }
            FlightPlanElement::Leg(leg) => {
                write!(f, "{} ({}, {})", leg.ident, leg.path_terminator, leg.procedure_ident)
            }
            FlightPlanElement::Discontinuity => f.write_str("F-PLN DISCONTINUITY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::haversine_distance;

    fn ksfo() -> Airport {
        Airport {
            ident: "KSFO".to_string(),
            location: Coordinates::new(37.6189, -122.3750),
            elevation_ft: 13.0,
        }
    }

    fn rw28l() -> Runway {
        Runway {
            ident: "RW28L".to_string(),
            airport_ident: "KSFO".to_string(),
            threshold: Coordinates::new(37.6117, -122.3576),
            landing_course_deg: 297.0,
            length_m: 3618.0,
        }
    }

    #[test]
    fn test_procedure_leg_keeps_missing_fix_absent() {
        let leg = ProcedureLeg {
            path_terminator: PathTerminator::VA,
            waypoint: None,
            waypoint_descriptor: WaypointDescriptor::Waypoint,
            course_deg: Some(283.0),
            distance_or_time: None,
        };

        let converted = FlightPlanLeg::from_procedure_leg(SegmentClass::Departure, &leg, "SSTIK5");
        assert!(converted.fix.is_none());
        assert!(converted.distance_or_time.is_none());
        assert_eq!(converted.ident, "VA283");
        assert_eq!(converted.procedure_ident, "SSTIK5");
    }

    #[test]
    fn test_reference_navaid_does_not_name_open_leg() {
        let leg = ProcedureLeg::to_fix(
            PathTerminator::VA,
            Fix::new("SFO", Coordinates::new(37.6194, -122.3739)),
        )
        .with_course(283.0);

        let converted = FlightPlanLeg::from_procedure_leg(SegmentClass::Departure, &leg, "SSTIK5");
        assert_eq!(converted.ident, "VA283");
        assert_eq!(converted.fix.as_ref().map(|f| f.ident.as_str()), Some("SFO"));

        let to_fix = ProcedureLeg::to_fix(
            PathTerminator::CF,
            Fix::new("PORTE", Coordinates::new(37.5, -122.5)),
        )
        .with_course(283.0);
        let converted =
            FlightPlanLeg::from_procedure_leg(SegmentClass::Departure, &to_fix, "SSTIK5");
        assert_eq!(converted.ident, "PORTE");
    }

    #[test]
    fn test_runway_leg_targets_threshold() {
        let runway = rw28l();
        let leg = FlightPlanLeg::from_airport_and_runway(
            SegmentClass::Approach,
            "I28L",
            &ksfo(),
            Some(&runway),
        );

        assert!(leg.is_runway());
        assert_eq!(leg.ident, "RW28L");
        assert_eq!(leg.fix.as_ref().map(|f| f.location), Some(runway.threshold));
        assert_eq!(leg.procedure_ident, "I28L");
    }

    #[test]
    fn test_airport_leg_without_runway() {
        let leg = FlightPlanLeg::from_airport_and_runway(SegmentClass::Origin, "", &ksfo(), None);
        assert_eq!(leg.ident, "KSFO");
        assert_eq!(leg.waypoint_descriptor, WaypointDescriptor::Airport);
    }

    #[test]
    fn test_extended_centerline_sits_before_threshold() {
        let runway = rw28l();
        let leg =
            FlightPlanLeg::destination_extended_centerline(SegmentClass::Approach, &ksfo(), &runway);

        assert_eq!(leg.path_terminator, PathTerminator::CF);
        assert_eq!(leg.course_deg, Some(297.0));
        let fix = leg.fix.expect("centerline fix");
        let dist = haversine_distance(fix.location, runway.threshold);
        assert!((dist - EXTENDED_CENTERLINE_DISTANCE_NM * METERS_PER_NM).abs() < 1.0);
    }

    #[test]
    fn test_same_fix_ignores_geometry_and_owner() {
        let fix = Fix::new("OAK", Coordinates::new(37.72, -122.22));
        let a = FlightPlanLeg::from_fix(SegmentClass::Enroute, fix.clone());
        let mut b = FlightPlanLeg::from_fix(SegmentClass::Arrival, fix);
        b.course_deg = Some(10.0);
        assert!(a.is_same_fix(&b));

        b.procedure_ident = "OAK1".to_string();
        assert!(!a.is_same_fix(&b));
    }
}
