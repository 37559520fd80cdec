//! The flight plan: one segment per route phase plus plan-scoped selections.
//!
//! Every selection follows the same shape: resolve everything the edit needs
//! from the navigation database first, and only then write to the plan. A
//! failed lookup therefore leaves the plan untouched. After each commit the
//! edited segments are re-strung against their populated neighbours.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{FlightPlanError, Result};
use crate::leg::{FlightPlanElement, FlightPlanLeg};
use crate::models::{Airport, Fix, Procedure, ProcedureLeg, Runway, WaypointDescriptor};
use crate::navdata::NavigationDatabase;
use crate::segment::{EditPolicy, Segment, SegmentClass, SegmentState};

/// Slot a flight plan occupies in the flight management system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightPlanIndex {
    /// Plan being flown
    Active,
    /// Uncommitted edit preview
    Temporary,
    Secondary,
}

#[derive(Clone)]
pub struct FlightPlan {
    index: FlightPlanIndex,
    navdata: Arc<dyn NavigationDatabase>,
    pub(crate) segments: Vec<Segment>,
    origin_airport: Option<Airport>,
    origin_runway: Option<Runway>,
    destination_airport: Option<Airport>,
    destination_runway: Option<Runway>,
    available_approach_vias: Vec<String>,
}

impl fmt::Debug for FlightPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightPlan")
            .field("index", &self.index)
            .field("segments", &self.segments)
            .field("origin_airport", &self.origin_airport)
            .field("origin_runway", &self.origin_runway)
            .field("destination_airport", &self.destination_airport)
            .field("destination_runway", &self.destination_runway)
            .field("available_approach_vias", &self.available_approach_vias)
            .finish_non_exhaustive()
    }
}

impl FlightPlan {
    pub fn new(index: FlightPlanIndex, navdata: Arc<dyn NavigationDatabase>) -> Self {
        Self {
            index,
            navdata,
            segments: SegmentClass::ALL.iter().map(|c| Segment::new(*c)).collect(),
            origin_airport: None,
            origin_runway: None,
            destination_airport: None,
            destination_runway: None,
            available_approach_vias: Vec::new(),
        }
    }

    /// Independent copy of this plan placed in another slot.
    ///
    /// Legs are copied; selected procedures are shared published data.
    pub fn clone_for(&self, index: FlightPlanIndex) -> FlightPlan {
        let mut plan = self.clone();
        plan.index = index;
        plan
    }

    pub fn index(&self) -> FlightPlanIndex {
        self.index
    }

    pub fn segment(&self, class: SegmentClass) -> &Segment {
        &self.segments[class.index()]
    }

    pub(crate) fn segment_mut(&mut self, class: SegmentClass) -> &mut Segment {
        &mut self.segments[class.index()]
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn origin_airport(&self) -> Option<&Airport> {
        self.origin_airport.as_ref()
    }

    pub fn origin_runway(&self) -> Option<&Runway> {
        self.origin_runway.as_ref()
    }

    pub fn destination_airport(&self) -> Option<&Airport> {
        self.destination_airport.as_ref()
    }

    pub fn destination_runway(&self) -> Option<&Runway> {
        self.destination_runway.as_ref()
    }

    pub fn departure_procedure(&self) -> Option<&Arc<Procedure>> {
        self.segment(SegmentClass::Departure).procedure()
    }

    pub fn arrival_procedure(&self) -> Option<&Arc<Procedure>> {
        self.segment(SegmentClass::Arrival).procedure()
    }

    pub fn approach_procedure(&self) -> Option<&Arc<Procedure>> {
        self.segment(SegmentClass::Approach).procedure()
    }

    pub fn approach_via(&self) -> Option<&str> {
        self.segment(SegmentClass::ApproachVia)
            .transition()
            .map(|t| t.ident.as_str())
    }

    /// Transitions offered by the selected approach.
    pub fn available_approach_vias(&self) -> &[String] {
        &self.available_approach_vias
    }

    /// Every element of the plan in flight order.
    pub fn all_elements(&self) -> impl Iterator<Item = &FlightPlanElement> + '_ {
        self.segments.iter().flat_map(|s| s.legs().iter())
    }

    pub fn is_segment_strung(&self, class: SegmentClass) -> bool {
        self.segment(class).is_strung()
    }

    pub fn leg_count(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    pub fn element_at(&self, index: usize) -> Option<(SegmentClass, &FlightPlanElement)> {
        let mut offset = index;
        for segment in &self.segments {
            if offset < segment.len() {
                return Some((segment.class(), &segment.legs()[offset]));
            }
            offset -= segment.len();
        }
        None
    }

    /// Plan-wide positions of every discontinuity.
    pub fn discontinuity_positions(&self) -> Vec<usize> {
        self.all_elements()
            .enumerate()
            .filter(|(_, e)| e.is_discontinuity())
            .map(|(i, _)| i)
            .collect()
    }

    /// Plan-wide index of the first element of `class`.
    pub fn segment_start(&self, class: SegmentClass) -> usize {
        self.segments[..class.index()].iter().map(Segment::len).sum()
    }

    /// Nearest earlier segment holding at least one element.
    pub fn previous_segment(&self, class: SegmentClass) -> Option<SegmentClass> {
        self.segments[..class.index()]
            .iter()
            .rev()
            .find(|s| !s.is_empty())
            .map(Segment::class)
    }

    /// Nearest later segment holding at least one element.
    pub fn next_segment(&self, class: SegmentClass) -> Option<SegmentClass> {
        self.segments[class.index() + 1..]
            .iter()
            .find(|s| !s.is_empty())
            .map(Segment::class)
    }

    // ========== ORIGIN / DEPARTURE ==========

    /// Select the departure airport. Clears the runway and departure.
    pub async fn set_origin_airport(&mut self, ident: &str) -> Result<()> {
        let airport = self.lookup_airport(ident).await?;

        tracing::info!(plan = ?self.index, airport = %airport.ident, "Origin airport set");
        self.origin_airport = Some(airport);
        self.origin_runway = None;
        self.install(
            SegmentClass::Departure,
            Some(SegmentState::Departure { procedure: None }),
            Vec::new(),
        );
        self.refresh_origin_legs();
        self.restring_around(SegmentClass::Origin, SegmentClass::Departure);
        Ok(())
    }

    /// Select the departure runway.
    ///
    /// A departure published for another runway is removed; any other
    /// departure is rebuilt so it starts from the new runway.
    pub async fn set_origin_runway(&mut self, ident: &str) -> Result<()> {
        let airport = self
            .origin_airport
            .clone()
            .ok_or(FlightPlanError::MissingOrigin)?;
        let runway = self.lookup_runway(&airport, ident).await?;

        tracing::info!(plan = ?self.index, runway = %runway.ident, "Origin runway set");
        self.origin_runway = Some(runway);

        match self.departure_procedure().cloned() {
            Some(departure) if serves_other_runway(&departure, ident) => {
                tracing::info!(
                    departure = %departure.ident,
                    "Departure does not serve the new runway, removing it"
                );
                self.install(
                    SegmentClass::Departure,
                    Some(SegmentState::Departure { procedure: None }),
                    Vec::new(),
                );
            }
            Some(departure) => {
                let legs = self.create_departure_leg_set(&departure);
                self.install(SegmentClass::Departure, None, legs);
            }
            None => {}
        }

        self.refresh_origin_legs();
        self.restring_around(SegmentClass::Origin, SegmentClass::Departure);
        Ok(())
    }

    /// Select or clear (`None`) the departure procedure.
    pub async fn set_departure_procedure(&mut self, procedure_ident: Option<&str>) -> Result<()> {
        let Some(procedure_ident) = procedure_ident else {
            tracing::info!(plan = ?self.index, "Departure cleared");
            self.install(
                SegmentClass::Departure,
                Some(SegmentState::Departure { procedure: None }),
                Vec::new(),
            );
            self.restring_around(SegmentClass::Departure, SegmentClass::Departure);
            return Ok(());
        };

        let airport = self
            .origin_airport
            .clone()
            .ok_or(FlightPlanError::MissingOrigin)?;
        let departures = self.navdata.departures(&airport.ident).await.map_err(|e| {
            tracing::warn!(airport = %airport.ident, "Departure lookup failed: {}", e);
            e
        })?;
        let departure = find_procedure(departures, procedure_ident, &airport)?;
        let runway = self
            .resolve_procedure_runway(&airport, &departure, self.origin_runway.as_ref())
            .await?;

        tracing::info!(plan = ?self.index, departure = %departure.ident, "Departure procedure selected");
        self.origin_runway = runway;
        self.refresh_origin_legs();
        let legs = self.create_departure_leg_set(&departure);
        self.install(
            SegmentClass::Departure,
            Some(SegmentState::Departure {
                procedure: Some(departure),
            }),
            legs,
        );
        self.restring_around(SegmentClass::Origin, SegmentClass::Departure);
        Ok(())
    }

    /// Departure legs with a leading runway leg replaced by the origin's
    /// synthesized runway leg, so the procedure strings onto the origin.
    fn create_departure_leg_set(&self, departure: &Procedure) -> Vec<FlightPlanElement> {
        departure
            .legs
            .iter()
            .enumerate()
            .map(|(i, leg)| {
                let converted = match (&self.origin_airport, i == 0 && is_runway(leg)) {
                    (Some(airport), true) => FlightPlanLeg::from_airport_and_runway(
                        SegmentClass::Departure,
                        "",
                        airport,
                        self.origin_runway.as_ref(),
                    ),
                    _ => FlightPlanLeg::from_procedure_leg(
                        SegmentClass::Departure,
                        leg,
                        &departure.ident,
                    ),
                };
                converted.into()
            })
            .collect()
    }

    fn refresh_origin_legs(&mut self) {
        let legs = match &self.origin_airport {
            Some(airport) => vec![FlightPlanLeg::from_airport_and_runway(
                SegmentClass::Origin,
                "",
                airport,
                self.origin_runway.as_ref(),
            )
            .into()],
            None => Vec::new(),
        };
        self.install(SegmentClass::Origin, None, legs);
    }

    // ========== ENROUTE ==========

    /// Plan-wide `start..end` span of the enroute segment.
    pub fn enroute_range(&self) -> (usize, usize) {
        let start = self.segment_start(SegmentClass::Enroute);
        (start, start + self.segment(SegmentClass::Enroute).len())
    }

    /// Insert a manually entered fix at plan-wide position `index`.
    ///
    /// Only positions inside the enroute segment, or at either of its edges,
    /// are accepted. Positions past the boundary discontinuity closing the
    /// segment land in front of it; re-stringing decides whether it stays.
    pub fn insert_waypoint(&mut self, index: usize, fix: Fix) -> Result<()> {
        let (start, end) = self.enroute_range();
        if index < start || index > end {
            return Err(FlightPlanError::IndexOutOfRange { index, start, end });
        }

        let enroute = self.segment(SegmentClass::Enroute);
        let local = (index - start).min(enroute.len() - enroute.trailing_discontinuities());

        tracing::debug!(plan = ?self.index, fix = %fix.ident, index, "Inserting waypoint");
        let leg = FlightPlanLeg::from_fix(SegmentClass::Enroute, fix);
        self.invalidate(SegmentClass::Enroute);
        self.segment_mut(SegmentClass::Enroute)
            .insert(local, leg.into());
        self.restring_around(SegmentClass::Enroute, SegmentClass::Enroute);
        Ok(())
    }

    /// Delete plan-wide positions `from..to`.
    ///
    /// Elements owned by replace-only segments are left in place. Returns the
    /// number of removed elements.
    pub fn remove_elements(&mut self, from: usize, to: usize) -> usize {
        let mut edits = Vec::new();
        let mut offset = 0;
        for segment in &self.segments {
            let (start, end) = (offset, offset + segment.len());
            offset = end;
            if segment.class().edit_policy() == EditPolicy::ReplaceOnly {
                continue;
            }
            let (lo, hi) = (from.max(start), to.min(end));
            if lo < hi {
                edits.push((segment.class(), lo - start, hi - start));
            }
        }

        edits
            .into_iter()
            .rev()
            .map(|(class, lo, hi)| self.edit_segment(class, |s| s.remove_range(lo, hi)))
            .sum()
    }

    /// Remove `from..to` within one segment. No-op on replace-only segments.
    pub fn remove_segment_range(&mut self, class: SegmentClass, from: usize, to: usize) -> usize {
        self.edit_segment(class, |s| s.remove_range(from, to))
    }

    pub fn remove_segment_before(&mut self, class: SegmentClass, index: usize) -> usize {
        self.edit_segment(class, |s| s.remove_before(index))
    }

    pub fn remove_segment_after(&mut self, class: SegmentClass, index: usize) -> usize {
        self.edit_segment(class, |s| s.remove_after(index))
    }

    fn edit_segment<F>(&mut self, class: SegmentClass, edit: F) -> usize
    where
        F: FnOnce(&mut Segment) -> usize,
    {
        let removed = edit(self.segment_mut(class));
        if removed > 0 {
            tracing::debug!(plan = ?self.index, segment = %class, removed, "Removed legs");
            self.invalidate(class);
            self.restring_around(class, class);
        }
        removed
    }

    // ========== ARRIVAL ==========

    /// Select or clear (`None`) the arrival procedure.
    pub async fn set_arrival_procedure(&mut self, procedure_ident: Option<&str>) -> Result<()> {
        let Some(procedure_ident) = procedure_ident else {
            tracing::info!(plan = ?self.index, "Arrival cleared");
            self.install(
                SegmentClass::Arrival,
                Some(SegmentState::Arrival { procedure: None }),
                Vec::new(),
            );
            self.restring_around(SegmentClass::Arrival, SegmentClass::Arrival);
            return Ok(());
        };

        let airport = self
            .destination_airport
            .clone()
            .ok_or(FlightPlanError::MissingDestination)?;
        let arrivals = self.navdata.arrivals(&airport.ident).await.map_err(|e| {
            tracing::warn!(airport = %airport.ident, "Arrival lookup failed: {}", e);
            e
        })?;
        let arrival = find_procedure(arrivals, procedure_ident, &airport)?;

        tracing::info!(plan = ?self.index, arrival = %arrival.ident, "Arrival procedure selected");
        let legs = convert_legs(&arrival.legs, SegmentClass::Arrival, &arrival.ident);
        self.install(
            SegmentClass::Arrival,
            Some(SegmentState::Arrival {
                procedure: Some(arrival),
            }),
            legs,
        );
        self.restring_around(SegmentClass::Arrival, SegmentClass::Arrival);
        Ok(())
    }

    // ========== APPROACH ==========

    /// Select or clear (`None`) the approach via among the selected
    /// approach's transitions.
    pub fn set_approach_via(&mut self, transition_ident: Option<&str>) -> Result<()> {
        let Some(transition_ident) = transition_ident else {
            self.install(
                SegmentClass::ApproachVia,
                Some(SegmentState::ApproachVia { transition: None }),
                Vec::new(),
            );
            self.restring_around(SegmentClass::ApproachVia, SegmentClass::ApproachVia);
            return Ok(());
        };

        let approach = self
            .approach_procedure()
            .cloned()
            .ok_or(FlightPlanError::MissingApproach)?;
        let transition = approach
            .transition(transition_ident)
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| FlightPlanError::ProcedureNotFound {
                ident: transition_ident.to_string(),
                airport: self
                    .destination_airport
                    .as_ref()
                    .map(|a| a.ident.clone())
                    .unwrap_or_default(),
            })?;

        tracing::info!(plan = ?self.index, via = %transition.ident, "Approach via selected");
        let legs = convert_legs(&transition.legs, SegmentClass::ApproachVia, &approach.ident);
        self.install(
            SegmentClass::ApproachVia,
            Some(SegmentState::ApproachVia {
                transition: Some(transition),
            }),
            legs,
        );
        self.restring_around(SegmentClass::ApproachVia, SegmentClass::ApproachVia);
        Ok(())
    }

    /// Select or clear (`None`) the approach.
    ///
    /// Selecting replaces the approach legs, the missed approach legs and the
    /// available approach vias in one step. A previously selected via is
    /// dropped.
    pub async fn set_approach_procedure(&mut self, procedure_ident: Option<&str>) -> Result<()> {
        let Some(procedure_ident) = procedure_ident else {
            tracing::info!(plan = ?self.index, "Approach cleared");
            self.clear_approach();
            return Ok(());
        };

        let airport = self
            .destination_airport
            .clone()
            .ok_or(FlightPlanError::MissingDestination)?;
        let approaches = self.navdata.approaches(&airport.ident).await.map_err(|e| {
            tracing::warn!(airport = %airport.ident, "Approach lookup failed: {}", e);
            e
        })?;
        let approach = find_procedure(approaches, procedure_ident, &airport)?;
        let runway = self
            .resolve_procedure_runway(&airport, &approach, self.destination_runway.as_ref())
            .await?;

        tracing::info!(plan = ?self.index, approach = %approach.ident, "Approach procedure selected");
        self.destination_runway = runway;

        self.install(
            SegmentClass::ApproachVia,
            Some(SegmentState::ApproachVia { transition: None }),
            Vec::new(),
        );

        let approach_legs = convert_legs(&approach.legs, SegmentClass::Approach, &approach.ident);
        let legs = self.create_leg_set(approach_legs, &approach.ident);
        self.install(
            SegmentClass::Approach,
            Some(SegmentState::Approach {
                approach: Some(approach.clone()),
            }),
            legs,
        );

        let missed_legs = convert_legs(
            &approach.missed_legs,
            SegmentClass::MissedApproach,
            &approach.ident,
        );
        self.install(SegmentClass::MissedApproach, None, missed_legs);
        self.refresh_destination_legs();

        self.restring_around(SegmentClass::ApproachVia, SegmentClass::MissedApproach);

        self.available_approach_vias = approach
            .transitions
            .iter()
            .map(|t| t.ident.clone())
            .collect();
        Ok(())
    }

    /// Legs installed for an approach.
    ///
    /// With no approach legs and a known runway this synthesizes an extended
    /// centreline leg followed by the runway. Otherwise a runway leg at the
    /// end of the approach is swapped for one built from the selected
    /// destination runway.
    pub fn create_leg_set(
        &self,
        approach_legs: Vec<FlightPlanElement>,
        approach_ident: &str,
    ) -> Vec<FlightPlanElement> {
        let airport = self.destination_airport.as_ref();
        let runway = self.destination_runway.as_ref();

        if approach_legs.is_empty() {
            return match (airport, runway) {
                (Some(airport), Some(runway)) => vec![
                    FlightPlanLeg::destination_extended_centerline(
                        SegmentClass::Approach,
                        airport,
                        runway,
                    )
                    .into(),
                    FlightPlanLeg::from_airport_and_runway(
                        SegmentClass::Approach,
                        "",
                        airport,
                        Some(runway),
                    )
                    .into(),
                ],
                _ => Vec::new(),
            };
        }

        let mut legs = approach_legs;
        let ends_on_runway = legs.last().is_some_and(FlightPlanElement::is_runway_leg);
        if let (true, Some(airport)) = (ends_on_runway, airport) {
            legs.pop();
            legs.push(
                FlightPlanLeg::from_airport_and_runway(
                    SegmentClass::Approach,
                    approach_ident,
                    airport,
                    runway,
                )
                .into(),
            );
        }
        legs
    }

    /// Re-derive the synthesized approach after a runway change while no
    /// approach is selected. Does nothing when an approach is selected.
    pub fn on_runway_selected_without_approach(&mut self) {
        if self.approach_procedure().is_some() {
            return;
        }
        let legs = self.create_leg_set(Vec::new(), "");
        self.install(SegmentClass::Approach, None, legs);
        self.refresh_destination_legs();
        self.restring_around(SegmentClass::Approach, SegmentClass::MissedApproach);
    }

    fn clear_approach(&mut self) {
        self.install(
            SegmentClass::ApproachVia,
            Some(SegmentState::ApproachVia { transition: None }),
            Vec::new(),
        );
        let legs = self.create_leg_set(Vec::new(), "");
        self.install(
            SegmentClass::Approach,
            Some(SegmentState::Approach { approach: None }),
            legs,
        );
        self.install(SegmentClass::MissedApproach, None, Vec::new());
        self.refresh_destination_legs();
        self.available_approach_vias.clear();
        self.restring_around(SegmentClass::ApproachVia, SegmentClass::MissedApproach);
    }

    // ========== DESTINATION ==========

    /// Select the arrival airport. Clears the runway, arrival and approach.
    pub async fn set_destination_airport(&mut self, ident: &str) -> Result<()> {
        let airport = self.lookup_airport(ident).await?;

        tracing::info!(plan = ?self.index, airport = %airport.ident, "Destination airport set");
        self.destination_airport = Some(airport);
        self.destination_runway = None;
        self.install(
            SegmentClass::Arrival,
            Some(SegmentState::Arrival { procedure: None }),
            Vec::new(),
        );
        self.clear_approach();
        Ok(())
    }

    /// Select the landing runway.
    ///
    /// An approach published for a different runway is removed. Without an
    /// approach the synthesized centreline is rebuilt for the new runway.
    pub async fn set_destination_runway(&mut self, ident: &str) -> Result<()> {
        let airport = self
            .destination_airport
            .clone()
            .ok_or(FlightPlanError::MissingDestination)?;
        let runway = self.lookup_runway(&airport, ident).await?;

        tracing::info!(plan = ?self.index, runway = %runway.ident, "Destination runway set");
        self.destination_runway = Some(runway);

        match self.approach_procedure().cloned() {
            Some(approach) if serves_other_runway(&approach, ident) => {
                tracing::info!(
                    approach = %approach.ident,
                    "Approach does not serve the new runway, removing it"
                );
                self.clear_approach();
            }
            Some(_) => {
                self.refresh_destination_legs();
                self.restring_around(SegmentClass::Approach, SegmentClass::MissedApproach);
            }
            None => self.on_runway_selected_without_approach(),
        }
        Ok(())
    }

    /// The destination segment carries the airport (or runway) leg unless the
    /// approach already ends on the runway.
    fn refresh_destination_legs(&mut self) {
        let approach_ends_on_runway = self
            .segment(SegmentClass::Approach)
            .legs()
            .iter()
            .rev()
            .find(|e| !e.is_discontinuity())
            .is_some_and(FlightPlanElement::is_runway_leg);

        let legs = match (&self.destination_airport, approach_ends_on_runway) {
            (Some(airport), false) => vec![FlightPlanLeg::from_airport_and_runway(
                SegmentClass::Destination,
                "",
                airport,
                self.destination_runway.as_ref(),
            )
            .into()],
            _ => Vec::new(),
        };
        self.install(SegmentClass::Destination, None, legs);
    }

    // ========== HELPERS ==========

    /// Replace a segment's legs (and optionally its selection state).
    fn install(
        &mut self,
        class: SegmentClass,
        state: Option<SegmentState>,
        legs: Vec<FlightPlanElement>,
    ) {
        self.invalidate(class);
        let segment = self.segment_mut(class);
        if let Some(state) = state {
            segment.set_state(state);
        }
        segment.set_legs(legs);
    }

    /// Reset every boundary touching `class` to unstrung.
    pub(crate) fn invalidate(&mut self, class: SegmentClass) {
        for segment in &mut self.segments {
            if segment.joined_to() == Some(class) {
                segment.unjoin();
            }
        }
        self.segment_mut(class).mark_strung(false);
    }

    /// String the boundaries around `first..=last` and repair discontinuities.
    fn restring_around(&mut self, first: SegmentClass, last: SegmentClass) {
        let from = self.previous_segment(first).unwrap_or(first);
        let to = self.next_segment(last).unwrap_or(last);
        self.string_segments_forwards(from, to);
        self.insert_necessary_discontinuities();
    }

    async fn lookup_airport(&self, ident: &str) -> Result<Airport> {
        self.navdata
            .airport(ident)
            .await
            .map_err(|e| {
                tracing::warn!(airport = %ident, "Airport lookup failed: {}", e);
                e
            })?
            .ok_or_else(|| FlightPlanError::AirportNotFound {
                ident: ident.to_string(),
            })
    }

    async fn lookup_runway(&self, airport: &Airport, ident: &str) -> Result<Runway> {
        let runways = self.navdata.runways(&airport.ident).await.map_err(|e| {
            tracing::warn!(airport = %airport.ident, "Runway lookup failed: {}", e);
            e
        })?;
        runways
            .into_iter()
            .find(|r| r.ident == ident)
            .ok_or_else(|| FlightPlanError::RunwayNotFound {
                ident: ident.to_string(),
                airport: airport.ident.clone(),
            })
    }

    /// Runway a procedure selection implies: the procedure's own runway when
    /// it is runway-specific, otherwise the current selection.
    async fn resolve_procedure_runway(
        &self,
        airport: &Airport,
        procedure: &Procedure,
        current: Option<&Runway>,
    ) -> Result<Option<Runway>> {
        match procedure.runway_ident.as_deref() {
            None => Ok(current.cloned()),
            Some(wanted) if current.is_some_and(|r| r.ident == wanted) => Ok(current.cloned()),
            Some(wanted) => self.lookup_runway(airport, wanted).await.map(Some),
        }
    }
}

fn find_procedure(
    candidates: Vec<Procedure>,
    ident: &str,
    airport: &Airport,
) -> Result<Arc<Procedure>> {
    candidates
        .into_iter()
        .find(|p| p.ident == ident)
        .map(Arc::new)
        .ok_or_else(|| {
            tracing::warn!(airport = %airport.ident, procedure = %ident, "Procedure not found");
            FlightPlanError::ProcedureNotFound {
                ident: ident.to_string(),
                airport: airport.ident.clone(),
            }
        })
}

fn convert_legs(
    legs: &[ProcedureLeg],
    segment: SegmentClass,
    procedure_ident: &str,
) -> Vec<FlightPlanElement> {
    legs.iter()
        .map(|leg| FlightPlanLeg::from_procedure_leg(segment, leg, procedure_ident).into())
        .collect()
}

fn is_runway(leg: &ProcedureLeg) -> bool {
    leg.waypoint_descriptor == WaypointDescriptor::Runway
}

fn serves_other_runway(procedure: &Procedure, runway_ident: &str) -> bool {
    procedure
        .runway_ident
        .as_deref()
        .is_some_and(|r| r != runway_ident)
}
