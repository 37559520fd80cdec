//! FMS Navdata - navigation database over HTTP
//!
//! Resolves airports, runways and procedures from a JSON navdata backend for
//! the flight plan core.

pub mod backoff;
pub mod cache;
pub mod client;
pub mod config;

pub use client::NavdataClient;
pub use config::NavdataConfig;
