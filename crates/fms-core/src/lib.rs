pub mod error;
pub mod flight_plan;
pub mod leg;
pub mod models;
pub mod navdata;
pub mod segment;
pub mod spatial;
pub mod stringing;

pub use error::{FlightPlanError, NavdataError, Result};
pub use flight_plan::{FlightPlan, FlightPlanIndex};
pub use leg::{FlightPlanElement, FlightPlanLeg, LegKey, EXTENDED_CENTERLINE_DISTANCE_NM};
pub use models::{
    Airport, Coordinates, DistanceOrTime, Fix, PathTerminator, Procedure, ProcedureLeg,
    ProcedureTransition, Runway, WaypointDescriptor,
};
pub use navdata::{NavigationDatabase, StaticNavDatabase};
pub use segment::{EditPolicy, Segment, SegmentClass, SegmentState};
pub use spatial::haversine_distance;
pub use stringing::BoundaryState;
