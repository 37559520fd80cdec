//! Navdata backend integration tests.
//!
//! Run with: cargo test -p fms-navdata --test client_test -- --ignored
//! Requires a running navdata backend at FMS_NAVDATA_URL serving KSFO.

use fms_core::navdata::NavigationDatabase;
use fms_core::{FlightPlan, FlightPlanIndex, SegmentClass};
use fms_navdata::NavdataClient;
use std::sync::Arc;

fn client() -> NavdataClient {
    NavdataClient::from_env().expect("client")
}

#[tokio::test]
#[ignore]
async fn test_known_airport_resolves() {
    let client = client();

    let airport = client.airport("KSFO").await.unwrap();
    assert_eq!(airport.map(|a| a.ident), Some("KSFO".to_string()));

    let runways = client.runways("KSFO").await.unwrap();
    assert!(!runways.is_empty());
    assert!(runways.iter().all(|r| r.airport_ident == "KSFO"));
}

#[tokio::test]
#[ignore]
async fn test_unknown_airport_is_none() {
    let client = client();
    assert!(client.airport("ZZZZ").await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_plan_selects_first_published_approach() {
    let client = Arc::new(client());
    let approaches = client.approaches("KSFO").await.unwrap();
    let Some(approach) = approaches.first() else {
        return;
    };

    let mut plan = FlightPlan::new(FlightPlanIndex::Active, client.clone());
    plan.set_destination_airport("KSFO").await.unwrap();
    plan.set_approach_procedure(Some(approach.ident.as_str()))
        .await
        .unwrap();

    assert_eq!(
        plan.approach_procedure().map(|a| a.ident.clone()),
        Some(approach.ident.clone())
    );
    assert!(!plan.segment(SegmentClass::Approach).is_empty());
    assert!(!plan.all_elements().last().is_some_and(|e| e.is_discontinuity()));
}
