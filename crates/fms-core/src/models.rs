//! Navigation data models consumed by the flight plan.
//!
//! These mirror what the navigation database hands back. The flight plan
//! treats them as published, read-only data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A named point a leg can terminate at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub ident: String,
    pub location: Coordinates,
    #[serde(default = "default_descriptor")]
    pub descriptor: WaypointDescriptor,
}

fn default_descriptor() -> WaypointDescriptor {
    WaypointDescriptor::Waypoint
}

impl Fix {
    pub fn new(ident: impl Into<String>, location: Coordinates) -> Self {
        Self {
            ident: ident.into(),
            location,
            descriptor: WaypointDescriptor::Waypoint,
        }
    }

    pub fn with_descriptor(mut self, descriptor: WaypointDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub ident: String,
    pub location: Coordinates,
    #[serde(default)]
    pub elevation_ft: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runway {
    /// Runway identifier including the `RW` prefix, e.g. `RW28L`.
    pub ident: String,
    pub airport_ident: String,
    /// Landing threshold.
    pub threshold: Coordinates,
    /// True course flown when landing on this runway.
    pub landing_course_deg: f64,
    #[serde(default)]
    pub length_m: f64,
}

/// ARINC 424 path terminator: how a leg is flown and where it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PathTerminator {
    /// Initial fix
    IF,
    /// Track to fix
    TF,
    /// Course to fix
    CF,
    /// Direct to fix
    DF,
    FA,
    FC,
    FD,
    FM,
    /// Course to altitude
    CA,
    CD,
    CI,
    CR,
    /// Constant radius arc
    RF,
    AF,
    /// Heading to altitude
    VA,
    VD,
    VI,
    VM,
    VR,
    /// Procedure turn
    PI,
    HA,
    HF,
    /// Hold to manual termination
    HM,
}

impl PathTerminator {
    /// Whether the leg ends at a published fix rather than an altitude,
    /// distance, intercept or manual termination.
    pub fn terminates_at_fix(self) -> bool {
        matches!(
            self,
            PathTerminator::IF
                | PathTerminator::TF
                | PathTerminator::CF
                | PathTerminator::DF
                | PathTerminator::RF
                | PathTerminator::AF
                | PathTerminator::HA
                | PathTerminator::HF
                | PathTerminator::HM
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PathTerminator::IF => "IF",
            PathTerminator::TF => "TF",
            PathTerminator::CF => "CF",
            PathTerminator::DF => "DF",
            PathTerminator::FA => "FA",
            PathTerminator::FC => "FC",
            PathTerminator::FD => "FD",
            PathTerminator::FM => "FM",
            PathTerminator::CA => "CA",
            PathTerminator::CD => "CD",
            PathTerminator::CI => "CI",
            PathTerminator::CR => "CR",
            PathTerminator::RF => "RF",
            PathTerminator::AF => "AF",
            PathTerminator::VA => "VA",
            PathTerminator::VD => "VD",
            PathTerminator::VI => "VI",
            PathTerminator::VM => "VM",
            PathTerminator::VR => "VR",
            PathTerminator::PI => "PI",
            PathTerminator::HA => "HA",
            PathTerminator::HF => "HF",
            PathTerminator::HM => "HM",
        }
    }
}

impl fmt::Display for PathTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointDescriptor {
    Airport,
    Runway,
    Waypoint,
    /// VOR, VOR/DME, VORTAC
    VhfNavaid,
    NdbNavaid,
    Localizer,
}

/// Leg length as published, either along-track distance or flying time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DistanceOrTime {
    DistanceNm(f64),
    TimeMin(f64),
}

/// One leg of a published procedure, as stored in the navigation database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureLeg {
    pub path_terminator: PathTerminator,
    #[serde(default)]
    pub waypoint: Option<Fix>,
    pub waypoint_descriptor: WaypointDescriptor,
    #[serde(default)]
    pub course_deg: Option<f64>,
    #[serde(default)]
    pub distance_or_time: Option<DistanceOrTime>,
}

impl ProcedureLeg {
    /// Leg terminating at `fix`.
    pub fn to_fix(path_terminator: PathTerminator, fix: Fix) -> Self {
        Self {
            path_terminator,
            waypoint_descriptor: fix.descriptor,
            waypoint: Some(fix),
            course_deg: None,
            distance_or_time: None,
        }
    }

    pub fn with_course(mut self, course_deg: f64) -> Self {
        self.course_deg = Some(course_deg);
        self
    }
}

/// Named alternative entry into a procedure (approach via, enroute transition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureTransition {
    pub ident: String,
    pub legs: Vec<ProcedureLeg>,
}

/// A published departure, arrival or approach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub ident: String,
    /// Runway the procedure is published for, if it is runway-specific.
    #[serde(default)]
    pub runway_ident: Option<String>,
    pub legs: Vec<ProcedureLeg>,
    #[serde(default)]
    pub missed_legs: Vec<ProcedureLeg>,
    #[serde(default)]
    pub transitions: Vec<ProcedureTransition>,
}

impl Procedure {
    pub fn new(ident: impl Into<String>, legs: Vec<ProcedureLeg>) -> Self {
        Self {
            ident: ident.into(),
            runway_ident: None,
            legs,
            missed_legs: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn for_runway(mut self, runway_ident: impl Into<String>) -> Self {
        self.runway_ident = Some(runway_ident.into());
        self
    }

    pub fn with_missed_legs(mut self, missed_legs: Vec<ProcedureLeg>) -> Self {
        self.missed_legs = missed_legs;
        self
    }

    pub fn with_transition(mut self, transition: ProcedureTransition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn transition(&self, ident: &str) -> Option<&ProcedureTransition> {
        self.transitions.iter().find(|t| t.ident == ident)
    }
}
