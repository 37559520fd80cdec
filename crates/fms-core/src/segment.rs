//! Flight plan segments.
//!
//! Each route phase owns one [`Segment`]. Per-phase selection state lives in
//! the [`SegmentState`] variant, and whether a segment accepts positional
//! edits is decided by its class's [`EditPolicy`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::leg::FlightPlanElement;
use crate::models::{Procedure, ProcedureTransition};

pub const SEGMENT_COUNT: usize = 8;

/// Route phase. Declaration order is flight order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentClass {
    Origin,
    Departure,
    Enroute,
    Arrival,
    ApproachVia,
    Approach,
    Destination,
    MissedApproach,
}

/// How a segment may be edited once populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPolicy {
    /// Free-form legs; positional removal is honoured.
    RangeEditable,
    /// Backed by a procedure or airport selection; only replaced wholesale.
    ReplaceOnly,
}

impl SegmentClass {
    pub const ALL: [SegmentClass; SEGMENT_COUNT] = [
        SegmentClass::Origin,
        SegmentClass::Departure,
        SegmentClass::Enroute,
        SegmentClass::Arrival,
        SegmentClass::ApproachVia,
        SegmentClass::Approach,
        SegmentClass::Destination,
        SegmentClass::MissedApproach,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn edit_policy(self) -> EditPolicy {
        match self {
            SegmentClass::Enroute => EditPolicy::RangeEditable,
            _ => EditPolicy::ReplaceOnly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentClass::Origin => "origin",
            SegmentClass::Departure => "departure",
            SegmentClass::Enroute => "enroute",
            SegmentClass::Arrival => "arrival",
            SegmentClass::ApproachVia => "approach_via",
            SegmentClass::Approach => "approach",
            SegmentClass::Destination => "destination",
            SegmentClass::MissedApproach => "missed_approach",
        }
    }
}

impl fmt::Display for SegmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selection state carried by each phase.
///
/// Procedures are published data and shared by reference between clones.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentState {
    Origin,
    Departure { procedure: Option<Arc<Procedure>> },
    Enroute,
    Arrival { procedure: Option<Arc<Procedure>> },
    ApproachVia { transition: Option<Arc<ProcedureTransition>> },
    Approach { approach: Option<Arc<Procedure>> },
    Destination,
    MissedApproach,
}

impl SegmentState {
    fn empty(class: SegmentClass) -> Self {
        match class {
            SegmentClass::Origin => SegmentState::Origin,
            SegmentClass::Departure => SegmentState::Departure { procedure: None },
            SegmentClass::Enroute => SegmentState::Enroute,
            SegmentClass::Arrival => SegmentState::Arrival { procedure: None },
            SegmentClass::ApproachVia => SegmentState::ApproachVia { transition: None },
            SegmentClass::Approach => SegmentState::Approach { approach: None },
            SegmentClass::Destination => SegmentState::Destination,
            SegmentClass::MissedApproach => SegmentState::MissedApproach,
        }
    }

    pub fn class(&self) -> SegmentClass {
        match self {
            SegmentState::Origin => SegmentClass::Origin,
            SegmentState::Departure { .. } => SegmentClass::Departure,
            SegmentState::Enroute => SegmentClass::Enroute,
            SegmentState::Arrival { .. } => SegmentClass::Arrival,
            SegmentState::ApproachVia { .. } => SegmentClass::ApproachVia,
            SegmentState::Approach { .. } => SegmentClass::Approach,
            SegmentState::Destination => SegmentClass::Destination,
            SegmentState::MissedApproach => SegmentClass::MissedApproach,
        }
    }
}

/// Ordered legs of one route phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    state: SegmentState,
    all_legs: Vec<FlightPlanElement>,
    strung: bool,
    join: Option<Join>,
}

/// Record of a boundary merge: this segment's first leg duplicated the last
/// leg of `to` and was dropped.
#[derive(Debug, Clone, PartialEq)]
struct Join {
    to: SegmentClass,
    merged: FlightPlanElement,
}

impl Segment {
    pub fn new(class: SegmentClass) -> Self {
        Self {
            state: SegmentState::empty(class),
            all_legs: Vec::new(),
            strung: false,
            join: None,
        }
    }

    pub fn class(&self) -> SegmentClass {
        self.state.class()
    }

    pub fn state(&self) -> &SegmentState {
        &self.state
    }

    pub fn legs(&self) -> &[FlightPlanElement] {
        &self.all_legs
    }

    pub fn len(&self) -> usize {
        self.all_legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_legs.is_empty()
    }

    /// Whether the boundary legs were last confirmed connected to the neighbours.
    pub fn is_strung(&self) -> bool {
        self.strung
    }

    pub fn first(&self) -> Option<&FlightPlanElement> {
        self.all_legs.first()
    }

    pub fn last(&self) -> Option<&FlightPlanElement> {
        self.all_legs.last()
    }

    /// Selected departure, arrival or approach procedure.
    pub fn procedure(&self) -> Option<&Arc<Procedure>> {
        match &self.state {
            SegmentState::Departure { procedure } | SegmentState::Arrival { procedure } => {
                procedure.as_ref()
            }
            SegmentState::Approach { approach } => approach.as_ref(),
            _ => None,
        }
    }

    /// Selected approach via.
    pub fn transition(&self) -> Option<&Arc<ProcedureTransition>> {
        match &self.state {
            SegmentState::ApproachVia { transition } => transition.as_ref(),
            _ => None,
        }
    }

    /// Replace every leg; the segment must be re-strung afterwards.
    pub fn set_legs(&mut self, legs: Vec<FlightPlanElement>) {
        self.all_legs = legs;
        self.strung = false;
        self.join = None;
    }

    pub(crate) fn set_state(&mut self, state: SegmentState) {
        debug_assert_eq!(state.class(), self.class());
        self.state = state;
    }

    /// Remove `from..to`. Returns the number of removed elements.
    pub fn remove_range(&mut self, from: usize, to: usize) -> usize {
        if self.class().edit_policy() == EditPolicy::ReplaceOnly {
            return 0;
        }
        let to = to.min(self.all_legs.len());
        if from >= to {
            return 0;
        }
        self.all_legs.drain(from..to);
        self.strung = false;
        if from == 0 {
            self.join = None;
        }
        to - from
    }

    /// Remove every element before `index`.
    pub fn remove_before(&mut self, index: usize) -> usize {
        self.remove_range(0, index)
    }

    /// Remove every element after `index`.
    pub fn remove_after(&mut self, index: usize) -> usize {
        self.remove_range(index.saturating_add(1), self.all_legs.len())
    }

    /// Insert an element at `index` (clamped to the segment length).
    ///
    /// Only range-editable segments accept insertion; returns whether it happened.
    pub fn insert(&mut self, index: usize, element: FlightPlanElement) -> bool {
        if self.class().edit_policy() == EditPolicy::ReplaceOnly {
            return false;
        }
        let index = index.min(self.all_legs.len());
        self.all_legs.insert(index, element);
        self.strung = false;
        if index == 0 {
            self.join = None;
        }
        true
    }

    pub(crate) fn mark_strung(&mut self, strung: bool) {
        self.strung = strung;
    }

    /// Segment this one's leading boundary is merged into, if any.
    pub(crate) fn joined_to(&self) -> Option<SegmentClass> {
        self.join.as_ref().map(|join| join.to)
    }

    /// Drop the first element as a duplicate of `to`'s last leg.
    pub(crate) fn join_to(&mut self, to: SegmentClass) {
        if self.all_legs.is_empty() {
            return;
        }
        let merged = self.all_legs.remove(0);
        self.join = Some(Join { to, merged });
    }

    /// Undo a boundary merge, putting the dropped leg back in front.
    pub(crate) fn unjoin(&mut self) {
        if let Some(join) = self.join.take() {
            self.all_legs.insert(0, join.merged);
        }
        self.strung = false;
    }

    pub(crate) fn elements_mut(&mut self) -> &mut Vec<FlightPlanElement> {
        &mut self.all_legs
    }

    pub(crate) fn leading_discontinuities(&self) -> usize {
        self.all_legs
            .iter()
            .take_while(|e| e.is_discontinuity())
            .count()
    }

    pub(crate) fn trailing_discontinuities(&self) -> usize {
        self.all_legs
            .iter()
            .rev()
            .take_while(|e| e.is_discontinuity())
            .count()
    }

    /// Whether the segment holds nothing but discontinuities (and is not empty).
    pub(crate) fn is_only_discontinuities(&self) -> bool {
        !self.all_legs.is_empty() && self.all_legs.iter().all(FlightPlanElement::is_discontinuity)
    }
}
