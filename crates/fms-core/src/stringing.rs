//! Segment stringing and discontinuity placement.
//!
//! Two populated neighbours are strung when the last leg of the earlier one
//! and the first leg of the later one denote the same fix. The later copy is
//! dropped and remembered so it can be restored once either side changes.
//! Boundaries that stay unstrung get exactly one discontinuity, placed at the
//! end of the earlier segment.
//!
//! The boundary in front of the missed approach is the exception: it never
//! carries a discontinuity, strung or not, because the missed approach is
//! flown from wherever the approach ends.

use crate::flight_plan::FlightPlan;
use crate::leg::FlightPlanElement;
use crate::segment::SegmentClass;

/// Connection state of the boundary between two populated segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    Unstrung,
    Strung,
}

/// The missed approach is flown from the end of the approach, so a gap in
/// front of it is never a discontinuity.
fn continues_from_previous(class: SegmentClass) -> bool {
    class == SegmentClass::MissedApproach
}

impl FlightPlan {
    /// String every boundary between populated segments in `from..=to`.
    pub fn string_segments_forwards(&mut self, from: SegmentClass, to: SegmentClass) {
        let mut previous: Option<SegmentClass> = None;

        for class in SegmentClass::ALL {
            if class < from || class > to {
                continue;
            }
            self.clear_if_only_discontinuities(class);
            if self.segment(class).is_empty() {
                continue;
            }
            if let Some(prev) = previous {
                self.string_boundary(prev, class);
            }
            if !self.segment(class).is_empty() {
                previous = Some(class);
            }
        }
    }

    /// Current state of the boundary `prev -> next`.
    pub fn boundary_state(&self, prev: SegmentClass, next: SegmentClass) -> BoundaryState {
        if self.segment(next).joined_to() == Some(prev) {
            BoundaryState::Strung
        } else {
            BoundaryState::Unstrung
        }
    }

    fn string_boundary(&mut self, prev: SegmentClass, next: SegmentClass) -> BoundaryState {
        if self.boundary_state(prev, next) == BoundaryState::Strung {
            return BoundaryState::Strung;
        }

        self.segment_mut(next).unjoin();
        self.strip_boundary_discontinuities(prev, next);

        let same_fix = match (self.segment(prev).last(), self.segment(next).first()) {
            (Some(FlightPlanElement::Leg(a)), Some(FlightPlanElement::Leg(b))) => a.is_same_fix(b),
            _ => false,
        };

        if same_fix {
            tracing::debug!(%prev, %next, "Boundary strung, dropping duplicate leg");
            self.segment_mut(next).join_to(prev);
            self.segment_mut(prev).mark_strung(true);
            self.segment_mut(next).mark_strung(true);
            BoundaryState::Strung
        } else {
            tracing::debug!(%prev, %next, "Boundary left unstrung");
            self.segment_mut(prev).mark_strung(false);
            self.segment_mut(next).mark_strung(false);
            BoundaryState::Unstrung
        }
    }

    /// Make sure every unstrung boundary carries exactly one discontinuity
    /// and the plan neither starts nor ends with one. Running it twice
    /// changes nothing.
    pub fn insert_necessary_discontinuities(&mut self) {
        for class in SegmentClass::ALL {
            self.clear_if_only_discontinuities(class);
        }
        self.trim_plan_edges();

        let populated: Vec<SegmentClass> = self
            .segments
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.class())
            .collect();

        for pair in populated.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if self.boundary_state(prev, next) == BoundaryState::Strung {
                continue;
            }
            if continues_from_previous(next) {
                self.strip_boundary_discontinuities(prev, next);
                continue;
            }

            let present = self.segment(prev).trailing_discontinuities()
                + self.segment(next).leading_discontinuities();
            match present {
                1 => {}
                0 => {
                    tracing::debug!(%prev, %next, "Inserting discontinuity");
                    self.segment_mut(prev)
                        .elements_mut()
                        .push(FlightPlanElement::Discontinuity);
                }
                _ => {
                    self.strip_boundary_discontinuities(prev, next);
                    self.segment_mut(prev)
                        .elements_mut()
                        .push(FlightPlanElement::Discontinuity);
                }
            }
        }
    }

    fn strip_boundary_discontinuities(&mut self, prev: SegmentClass, next: SegmentClass) {
        let trailing = self.segment(prev).trailing_discontinuities();
        let prev_legs = self.segment_mut(prev).elements_mut();
        prev_legs.truncate(prev_legs.len() - trailing);

        let leading = self.segment(next).leading_discontinuities();
        self.segment_mut(next).elements_mut().drain(..leading);
    }

    fn trim_plan_edges(&mut self) {
        if let Some(first) = self.segments.iter().position(|s| !s.is_empty()) {
            let leading = self.segments[first].leading_discontinuities();
            self.segments[first].elements_mut().drain(..leading);
        }
        if let Some(last) = self.segments.iter().rposition(|s| !s.is_empty()) {
            let trailing = self.segments[last].trailing_discontinuities();
            let legs = self.segments[last].elements_mut();
            legs.truncate(legs.len() - trailing);
        }
    }

    fn clear_if_only_discontinuities(&mut self, class: SegmentClass) {
        if self.segment(class).is_only_discontinuities() {
            self.invalidate(class);
            self.segment_mut(class).set_legs(Vec::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_plan::FlightPlanIndex;
    use crate::leg::FlightPlanLeg;
    use crate::models::{Coordinates, Fix};
    use crate::navdata::StaticNavDatabase;
    use std::sync::Arc;

    fn plan() -> FlightPlan {
        FlightPlan::new(FlightPlanIndex::Active, Arc::new(StaticNavDatabase::new()))
    }

    fn leg(segment: SegmentClass, ident: &str) -> FlightPlanElement {
        FlightPlanLeg::from_fix(segment, Fix::new(ident, Coordinates::new(0.0, 0.0))).into()
    }

    fn fill(plan: &mut FlightPlan, class: SegmentClass, idents: &[&str]) {
        let legs = idents.iter().map(|i| leg(class, i)).collect();
        plan.segment_mut(class).set_legs(legs);
    }

    fn labels(plan: &FlightPlan) -> Vec<String> {
        plan.all_elements()
            .map(|e| match e {
                FlightPlanElement::Leg(l) => l.ident.clone(),
                FlightPlanElement::Discontinuity => "DISCO".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_matching_boundary_joins() {
        let mut plan = plan();
        fill(&mut plan, SegmentClass::Enroute, &["A", "B"]);
        fill(&mut plan, SegmentClass::Arrival, &["B", "C"]);

        plan.string_segments_forwards(SegmentClass::Enroute, SegmentClass::Arrival);
        plan.insert_necessary_discontinuities();

        assert_eq!(labels(&plan), vec!["A", "B", "C"]);
        assert_eq!(
            plan.boundary_state(SegmentClass::Enroute, SegmentClass::Arrival),
            BoundaryState::Strung
        );
        assert!(plan.is_segment_strung(SegmentClass::Enroute));
        assert!(plan.is_segment_strung(SegmentClass::Arrival));
    }

    #[test]
    fn test_mismatched_boundary_gets_one_discontinuity() {
        let mut plan = plan();
        fill(&mut plan, SegmentClass::Enroute, &["A", "B"]);
        fill(&mut plan, SegmentClass::Arrival, &["X", "C"]);

        plan.string_segments_forwards(SegmentClass::Enroute, SegmentClass::Arrival);
        plan.insert_necessary_discontinuities();
        plan.insert_necessary_discontinuities();

        assert_eq!(labels(&plan), vec!["A", "B", "DISCO", "X", "C"]);
        assert!(!plan.is_segment_strung(SegmentClass::Arrival));
    }

    #[test]
    fn test_restringing_joined_boundary_is_stable() {
        let mut plan = plan();
        fill(&mut plan, SegmentClass::Enroute, &["A", "B"]);
        fill(&mut plan, SegmentClass::Arrival, &["B", "C"]);

        plan.string_segments_forwards(SegmentClass::Enroute, SegmentClass::Arrival);
        plan.string_segments_forwards(SegmentClass::Enroute, SegmentClass::Arrival);

        assert_eq!(labels(&plan), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_invalidating_earlier_side_restores_dropped_leg() {
        let mut plan = plan();
        fill(&mut plan, SegmentClass::Enroute, &["A", "B"]);
        fill(&mut plan, SegmentClass::Arrival, &["B", "C"]);
        plan.string_segments_forwards(SegmentClass::Enroute, SegmentClass::Arrival);

        plan.invalidate(SegmentClass::Enroute);
        fill(&mut plan, SegmentClass::Enroute, &["A", "D"]);
        plan.string_segments_forwards(SegmentClass::Enroute, SegmentClass::Arrival);
        plan.insert_necessary_discontinuities();

        assert_eq!(labels(&plan), vec!["A", "D", "DISCO", "B", "C"]);
    }

    #[test]
    fn test_duplicate_discontinuities_collapse() {
        let mut plan = plan();
        plan.segment_mut(SegmentClass::Enroute).set_legs(vec![
            leg(SegmentClass::Enroute, "A"),
            FlightPlanElement::Discontinuity,
            FlightPlanElement::Discontinuity,
        ]);
        plan.segment_mut(SegmentClass::Arrival).set_legs(vec![
            FlightPlanElement::Discontinuity,
            leg(SegmentClass::Arrival, "C"),
        ]);

        plan.insert_necessary_discontinuities();
        assert_eq!(labels(&plan), vec!["A", "DISCO", "C"]);
        assert_eq!(plan.discontinuity_positions(), vec![1]);
    }

    #[test]
    fn test_plan_edges_never_hold_discontinuities() {
        let mut plan = plan();
        plan.segment_mut(SegmentClass::Departure)
            .set_legs(vec![FlightPlanElement::Discontinuity]);
        plan.segment_mut(SegmentClass::Enroute).set_legs(vec![
            FlightPlanElement::Discontinuity,
            leg(SegmentClass::Enroute, "A"),
            FlightPlanElement::Discontinuity,
        ]);

        plan.insert_necessary_discontinuities();

        assert_eq!(labels(&plan), vec!["A"]);
        assert!(plan.segment(SegmentClass::Departure).is_empty());
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let mut plan = plan();
        fill(&mut plan, SegmentClass::Departure, &["A", "B"]);
        fill(&mut plan, SegmentClass::Arrival, &["B", "C"]);

        plan.string_segments_forwards(SegmentClass::Origin, SegmentClass::MissedApproach);

        assert_eq!(plan.previous_segment(SegmentClass::Arrival), Some(SegmentClass::Departure));
        assert_eq!(labels(&plan), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_missed_approach_needs_no_discontinuity() {
        let mut plan = plan();
        fill(&mut plan, SegmentClass::Approach, &["FAF", "MAP"]);
        fill(&mut plan, SegmentClass::MissedApproach, &["HOLD"]);

        plan.string_segments_forwards(SegmentClass::Approach, SegmentClass::MissedApproach);
        plan.insert_necessary_discontinuities();

        assert_eq!(labels(&plan), vec!["FAF", "MAP", "HOLD"]);
        assert_eq!(
            plan.boundary_state(SegmentClass::Approach, SegmentClass::MissedApproach),
            BoundaryState::Unstrung
        );
    }

    #[test]
    fn test_missed_approach_drops_existing_discontinuity() {
        let mut plan = plan();
        plan.segment_mut(SegmentClass::Approach).set_legs(vec![
            leg(SegmentClass::Approach, "MAP"),
            FlightPlanElement::Discontinuity,
        ]);
        plan.segment_mut(SegmentClass::MissedApproach).set_legs(vec![
            FlightPlanElement::Discontinuity,
            leg(SegmentClass::MissedApproach, "HOLD"),
        ]);

        plan.insert_necessary_discontinuities();

        assert_eq!(labels(&plan), vec!["MAP", "HOLD"]);
        assert!(plan.discontinuity_positions().is_empty());
    }
}
