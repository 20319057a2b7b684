use std::path::Path;

use career_compare::api::{build_cashflow_response, build_compare_response, compare_request};
use career_compare::core::{build_comparison, find_milestones, find_track, SNAPSHOT_AGES};
use career_compare::dataset::Catalog;

fn catalog() -> Catalog {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    Catalog::load_dir(&dir).expect("bundled datasets load")
}

fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

#[test]
fn bundled_healthcare_family_loads() {
    let catalog = catalog();
    let healthcare = catalog.get("healthcare").expect("healthcare family");
    assert_eq!(healthcare.family_name(), Some("Healthcare"));
    assert_eq!(healthcare.tracks.len(), 5);
    assert!(healthcare.scenario_profiles.contains_key("lifestyle-first"));
}

#[test]
fn net_worth_snapshots_for_bundled_tracks() {
    let catalog = catalog();
    let tracks = &catalog.get("healthcare").expect("family").tracks;
    let comparison = build_comparison(tracks, &keys(&["dermatology", "optometry"]), None);

    assert_eq!(comparison.net_worth.len(), SNAPSHOT_AGES.len());
    let at = |age: u32, key: &str| {
        comparison
            .net_worth
            .iter()
            .find(|p| p.age == age)
            .and_then(|p| p.values.get(key))
            .copied()
    };
    assert_eq!(at(33, "dermatology"), Some(900));
    assert_eq!(at(65, "dermatology"), Some(18344));
    assert_eq!(at(65, "optometry"), Some(1205));

    let lifetimes: Vec<(&str, i64)> = comparison
        .money
        .iter()
        .map(|row| (row.key.as_str(), row.lifetime))
        .collect();
    assert_eq!(lifetimes, vec![("dermatology", 18344), ("optometry", 1205)]);
}

#[test]
fn milestones_for_bundled_tracks() {
    let catalog = catalog();
    let tracks = &catalog.get("healthcare").expect("family").tracks;

    let ortho = find_track(tracks, "orthopedic-surgery")
        .and_then(|t| t.financial.as_ref())
        .expect("ortho financials");
    let milestones = find_milestones(ortho);
    assert_eq!(milestones.practice_start, 32.0);
    assert_eq!(milestones.break_even_age, Some(33));
    assert_eq!(milestones.million_age, Some(36));

    let optometry = find_track(tracks, "optometry")
        .and_then(|t| t.financial.as_ref())
        .expect("optometry financials");
    let milestones = find_milestones(optometry);
    assert_eq!(milestones.practice_start, 26.0);
    assert_eq!(milestones.break_even_age, Some(42));
    assert_eq!(milestones.million_age, Some(61));
}

#[test]
fn compare_response_applies_named_profile() {
    let catalog = catalog();
    let request = compare_request(
        None,
        keys(&["dermatology", "optometry"]),
        Some("lifestyle-first".to_string()),
        "healthcare",
    )
    .expect("valid request");
    let response = build_compare_response(&catalog, request).expect("response");
    let json = serde_json::to_value(&response).expect("serializes");

    assert_eq!(json["family"], "healthcare");
    assert_eq!(json["weighted"][0]["key"], "dermatology");
    assert_eq!(json["weighted"][0]["total"], 8.1);
    assert_eq!(json["weighted"][1]["total"], 6.8);
    assert_eq!(json["radar"][0]["dim"], "Money");
    assert_eq!(json["radar"][0]["dermatology"], 9.0);
    assert_eq!(json["radar"][3]["dermatology"], 4.7);
    assert_eq!(json["stress"]["scores"][1]["key"], "optometry");
    assert_eq!(json["stress"]["scores"][1]["match"], 8.0);
    assert_eq!(json["timeline"][0]["earnAge"], 29.0);
    assert!(json["timeline"][1]["residency"].is_null());
}

#[test]
fn cashflow_trace_ends_at_lifetime_value() {
    let catalog = catalog();
    let response =
        build_cashflow_response(&catalog, "healthcare", "general-dentistry").expect("cashflow");
    let json = serde_json::to_value(&response).expect("serializes");

    assert_eq!(json["lifetime"], 4299);
    assert_eq!(json["practiceStart"], 26.0);
    let years = json["years"].as_array().expect("years");
    assert_eq!(years.len(), 48);
    assert_eq!(years[0]["age"], 18);
    assert_eq!(years[47]["age"], 65);
}
