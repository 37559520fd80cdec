//! Navigation database boundary.
//!
//! The flight plan resolves airports, runways and procedures through
//! [`NavigationDatabase`]. Lookups are asynchronous and may fail; the plan
//! never retries them.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::NavdataError;
use crate::models::{Airport, Procedure, Runway};

#[async_trait]
pub trait NavigationDatabase: Send + Sync {
    /// Look up an airport. `Ok(None)` when the identifier is unknown.
    async fn airport(&self, ident: &str) -> Result<Option<Airport>, NavdataError>;

    async fn runways(&self, airport_ident: &str) -> Result<Vec<Runway>, NavdataError>;

    async fn departures(&self, airport_ident: &str) -> Result<Vec<Procedure>, NavdataError>;

    async fn arrivals(&self, airport_ident: &str) -> Result<Vec<Procedure>, NavdataError>;

    async fn approaches(&self, airport_ident: &str) -> Result<Vec<Procedure>, NavdataError>;
}

#[derive(Debug, Clone)]
struct AirportRecord {
    airport: Airport,
    runways: Vec<Runway>,
    departures: Vec<Procedure>,
    arrivals: Vec<Procedure>,
    approaches: Vec<Procedure>,
}

impl AirportRecord {
    fn new(airport: Airport) -> Self {
        Self {
            airport,
            runways: Vec::new(),
            departures: Vec::new(),
            arrivals: Vec::new(),
            approaches: Vec::new(),
        }
    }
}

/// In-memory navigation database.
///
/// Procedures and runways attached to an airport that was never added are
/// silently dropped.
#[derive(Debug, Clone, Default)]
pub struct StaticNavDatabase {
    airports: HashMap<String, AirportRecord>,
}

impl StaticNavDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_airport(mut self, airport: Airport) -> Self {
        self.airports
            .entry(airport.ident.clone())
            .and_modify(|record| record.airport = airport.clone())
            .or_insert_with(|| AirportRecord::new(airport));
        self
    }

    pub fn with_runway(mut self, runway: Runway) -> Self {
        if let Some(record) = self.airports.get_mut(&runway.airport_ident) {
            record.runways.push(runway);
        }
        self
    }

    pub fn with_departure(mut self, airport_ident: &str, procedure: Procedure) -> Self {
        if let Some(record) = self.airports.get_mut(airport_ident) {
            record.departures.push(procedure);
        }
        self
    }

    pub fn with_arrival(mut self, airport_ident: &str, procedure: Procedure) -> Self {
        if let Some(record) = self.airports.get_mut(airport_ident) {
            record.arrivals.push(procedure);
        }
        self
    }

    pub fn with_approach(mut self, airport_ident: &str, procedure: Procedure) -> Self {
        if let Some(record) = self.airports.get_mut(airport_ident) {
            record.approaches.push(procedure);
        }
        self
    }

    fn record(&self, ident: &str) -> Option<&AirportRecord> {
        self.airports.get(ident)
    }
}

#[async_trait]
impl NavigationDatabase for StaticNavDatabase {
    async fn airport(&self, ident: &str) -> Result<Option<Airport>, NavdataError> {
        Ok(self.record(ident).map(|r| r.airport.clone()))
    }

    async fn runways(&self, airport_ident: &str) -> Result<Vec<Runway>, NavdataError> {
        Ok(self
            .record(airport_ident)
            .map(|r| r.runways.clone())
            .unwrap_or_default())
    }

    async fn departures(&self, airport_ident: &str) -> Result<Vec<Procedure>, NavdataError> {
        Ok(self
            .record(airport_ident)
            .map(|r| r.departures.clone())
            .unwrap_or_default())
    }

    async fn arrivals(&self, airport_ident: &str) -> Result<Vec<Procedure>, NavdataError> {
        Ok(self
            .record(airport_ident)
            .map(|r| r.arrivals.clone())
            .unwrap_or_default())
    }

    async fn approaches(&self, airport_ident: &str) -> Result<Vec<Procedure>, NavdataError> {
        Ok(self
            .record(airport_ident)
            .map(|r| r.approaches.clone())
            .unwrap_or_default())
    }
}
