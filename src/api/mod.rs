use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::{
    CATEGORIES, CashflowYear, Comparison, END_AGE, MAX_PICKS, RawData, build_comparison,
    compute_net_worth_at_age, find_milestones, find_track, yearly_cashflow_trace,
};
use crate::dataset::{Catalog, DatasetError, FamilyDataset};

pub struct AppState {
    pub catalog: Catalog,
    pub default_family: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("unknown track `{key}` in family {family}")]
    UnknownTrack { family: String, key: String },

    #[error("track `{0}` has no financial record")]
    NoFinancial(String),

    #[error("unknown weight profile: {0}")]
    UnknownProfile(String),

    #[error("{0}")]
    Invalid(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Dataset(DatasetError::UnknownFamily(_)) | ApiError::UnknownTrack { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::Dataset(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NoFinancial(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UnknownProfile(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        error_response(status, &self.to_string())
    }
}

/// Selected keys, either a JSON array or a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyList {
    Many(Vec<String>),
    Joined(String),
}

impl KeyList {
    fn into_keys(self) -> Vec<String> {
        let raw = match self {
            KeyList::Many(keys) => keys,
            KeyList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    family: Option<String>,
    keys: Option<KeyList>,
    profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareRequest {
    pub family: String,
    pub keys: Vec<String>,
    pub profile: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    family: String,
    keys: Vec<String>,
    profile: Option<String>,
    #[serde(flatten)]
    comparison: Comparison,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FamilySummary {
    slug: String,
    family_name: Option<String>,
    track_count: usize,
    profiles: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackSummary<'a> {
    key: &'a str,
    name: &'a str,
    profession: &'a str,
    group: &'a str,
    raw_data: Option<&'a RawData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowResponse {
    family: String,
    key: String,
    practice_start: f64,
    break_even_age: Option<u32>,
    million_age: Option<u32>,
    lifetime: i64,
    years: Vec<CashflowYear>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(Arc::new(state));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "career comparison API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/families");

    axum::serve(listener, app).await
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/families", get(families_handler))
        .route("/api/families/:family/tracks", get(tracks_handler))
        .route(
            "/api/families/:family/tracks/:key/cashflow",
            get(cashflow_handler),
        )
        .route("/api/categories", get(categories_handler))
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn families_handler(State(state): State<Arc<AppState>>) -> Response {
    json_response(StatusCode::OK, family_summaries(&state.catalog))
}

async fn tracks_handler(
    State(state): State<Arc<AppState>>,
    Path(family): Path<String>,
) -> Response {
    match state.catalog.get(&family) {
        Ok(dataset) => json_response(StatusCode::OK, track_summaries(dataset)),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn cashflow_handler(
    State(state): State<Arc<AppState>>,
    Path((family, key)): Path<(String, String)>,
) -> Response {
    match build_cashflow_response(&state.catalog, &family, &key) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => err.into_response(),
    }
}

async fn categories_handler() -> Response {
    json_response(StatusCode::OK, CATEGORIES.as_slice())
}

async fn compare_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<ComparePayload>,
) -> Response {
    compare_handler_impl(&state, payload)
}

async fn compare_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ComparePayload>,
) -> Response {
    compare_handler_impl(&state, payload)
}

fn compare_handler_impl(state: &AppState, payload: ComparePayload) -> Response {
    let request = match compare_request_from_payload(payload, &state.default_family) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    tracing::debug!(family = %request.family, keys = ?request.keys, "compare");

    match build_compare_response(&state.catalog, request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => err.into_response(),
    }
}

fn with_cache_control(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)).into_response())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn compare_request_from_json(json: &str, default_family: &str) -> Result<CompareRequest, ApiError> {
    let payload = serde_json::from_str::<ComparePayload>(json)
        .map_err(|e| ApiError::Invalid(format!("Invalid API JSON payload: {e}")))?;
    compare_request_from_payload(payload, default_family)
}

fn compare_request_from_payload(
    payload: ComparePayload,
    default_family: &str,
) -> Result<CompareRequest, ApiError> {
    let keys = payload.keys.map(KeyList::into_keys).unwrap_or_default();
    compare_request(payload.family, keys, payload.profile, default_family)
}

/// Normalizes a selection into a request; the family falls back to `default_family`.
pub fn compare_request(
    family: Option<String>,
    keys: Vec<String>,
    profile: Option<String>,
    default_family: &str,
) -> Result<CompareRequest, ApiError> {
    if keys.len() > MAX_PICKS {
        return Err(ApiError::Invalid(format!(
            "keys must list at most {MAX_PICKS} tracks, got {}",
            keys.len()
        )));
    }

    let family = family
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| default_family.to_string());
    let profile = profile
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    Ok(CompareRequest {
        family,
        keys,
        profile,
    })
}

pub fn build_compare_response(
    catalog: &Catalog,
    request: CompareRequest,
) -> Result<CompareResponse, ApiError> {
    let dataset = catalog.get(&request.family)?;
    let weights = match &request.profile {
        Some(name) => Some(
            dataset
                .scenario_profiles
                .get(name)
                .ok_or_else(|| ApiError::UnknownProfile(name.clone()))?,
        ),
        None => None,
    };

    let comparison = build_comparison(&dataset.tracks, &request.keys, weights);
    Ok(CompareResponse {
        family: request.family,
        keys: request.keys,
        profile: request.profile,
        comparison,
    })
}

pub fn build_cashflow_response(
    catalog: &Catalog,
    family: &str,
    key: &str,
) -> Result<CashflowResponse, ApiError> {
    let dataset = catalog.get(family)?;
    let track = find_track(&dataset.tracks, key).ok_or_else(|| ApiError::UnknownTrack {
        family: family.to_string(),
        key: key.to_string(),
    })?;
    let financial = track
        .financial
        .as_ref()
        .ok_or_else(|| ApiError::NoFinancial(key.to_string()))?;

    let milestones = find_milestones(financial);
    Ok(CashflowResponse {
        family: family.to_string(),
        key: key.to_string(),
        practice_start: milestones.practice_start,
        break_even_age: milestones.break_even_age,
        million_age: milestones.million_age,
        lifetime: compute_net_worth_at_age(financial, END_AGE),
        years: yearly_cashflow_trace(financial),
    })
}

fn family_summaries(catalog: &Catalog) -> Vec<FamilySummary> {
    catalog
        .families()
        .map(|(slug, dataset)| FamilySummary {
            slug: slug.to_string(),
            family_name: dataset.family_name().map(str::to_string),
            track_count: dataset.tracks.len(),
            profiles: dataset.scenario_profiles.keys().cloned().collect(),
        })
        .collect()
}

fn track_summaries(dataset: &FamilyDataset) -> Vec<TrackSummary<'_>> {
    dataset
        .tracks
        .iter()
        .map(|t| TrackSummary {
            key: &t.key,
            name: &t.name,
            profession: &t.profession,
            group: &t.group,
            raw_data: t.raw_data.as_ref(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_family;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    const FAMILY_JSON: &str = r#"{
      "meta": {"family_name": "Healthcare"},
      "scenario_profiles": {"lifestyle": {"9": 100}},
      "tracks": [
        {
          "key": "derm",
          "name": "Dermatology",
          "profession": "MD/DO",
          "financial": {},
          "scores": {"category_5": 8, "category_7": 6, "category_9": 9},
          "stress": {"ai": 8, "pay": 6, "injury": 9, "match": 5},
          "timeline": {"college": [18, 22], "school": [22, 26], "residency": [26, 29],
                       "fellowship": null, "earnAge": 29, "startSalary": 300},
          "raw_data": {"startSalary": 300, "peakSalary": 600, "hoursWeek": 45}
        },
        {
          "key": "gp",
          "name": "General Practice",
          "profession": "MD/DO",
          "financial": {"starting_salary": 200, "peak_salary": 500, "residency_years": 0},
          "scores": {"category_9": 4}
        },
        {"key": "stub", "name": "Stub"}
      ]
    }"#;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.insert(
            "healthcare",
            parse_family("healthcare", FAMILY_JSON).expect("valid family"),
        );
        catalog
    }

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn compare_request_from_json_accepts_array_keys() {
        let request = compare_request_from_json(
            r#"{"family": "healthcare", "keys": ["derm", " gp ", ""], "profile": "lifestyle"}"#,
            "other",
        )
        .expect("valid payload");
        assert_eq!(request.family, "healthcare");
        assert_eq!(request.keys, keys(&["derm", "gp"]));
        assert_eq!(request.profile.as_deref(), Some("lifestyle"));
    }

    #[test]
    fn compare_request_from_json_accepts_comma_separated_keys() {
        let request = compare_request_from_json(r#"{"keys": "derm, gp,,stub"}"#, "healthcare")
            .expect("valid payload");
        assert_eq!(request.family, "healthcare");
        assert_eq!(request.keys, keys(&["derm", "gp", "stub"]));
        assert_eq!(request.profile, None);
    }

    #[test]
    fn compare_request_rejects_too_many_keys() {
        let err = compare_request(None, keys(&["a", "b", "c", "d", "e", "f", "g"]), None, "x")
            .expect_err("must reject");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("at most 6"));
    }

    #[test]
    fn compare_response_serialization_contains_expected_fields() {
        let request =
            compare_request(None, keys(&["derm", "gp"]), None, "healthcare").expect("request");
        let response = build_compare_response(&sample_catalog(), request).expect("response");
        let json = serde_json::to_value(&response).expect("serialize");

        for field in [
            "family",
            "keys",
            "netWorth",
            "radar",
            "stress",
            "money",
            "timeline",
            "milestones",
            "weighted",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["netWorth"][0]["age"], 18);
        assert_eq!(json["netWorth"][9]["derm"], 13813);
        assert_eq!(json["netWorth"][3]["gp"], 233);
        assert_eq!(json["money"][1]["lifetime"], 11562);
        assert_eq!(json["stress"]["scores"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["timeline"][0]["earnAge"], 29.0);
    }

    #[test]
    fn compare_response_is_empty_for_single_pick() {
        let request = compare_request(None, keys(&["derm"]), None, "healthcare").expect("request");
        let response = build_compare_response(&sample_catalog(), request).expect("response");
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["netWorth"], serde_json::json!([]));
        assert_eq!(json["stress"]["scenarios"], serde_json::json!([]));
    }

    #[test]
    fn compare_with_profile_uses_profile_weights() {
        let request = compare_request(
            Some("healthcare".to_string()),
            keys(&["derm", "gp"]),
            Some("lifestyle".to_string()),
            "healthcare",
        )
        .expect("request");
        let response = build_compare_response(&sample_catalog(), request).expect("response");
        let weighted = &response.comparison.weighted;
        assert_eq!(weighted.len(), 2);
        assert_approx(weighted[0].total, 9.0);
        assert_approx(weighted[1].total, 4.0);
    }

    #[test]
    fn compare_unknown_family_and_profile_map_to_statuses() {
        let catalog = sample_catalog();
        let request = compare_request(Some("law".into()), keys(&["a", "b"]), None, "healthcare")
            .expect("request");
        let err = build_compare_response(&catalog, request).expect_err("unknown family");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let request = compare_request(None, keys(&["derm", "gp"]), Some("nope".into()), "healthcare")
            .expect("request");
        let err = build_compare_response(&catalog, request).expect_err("unknown profile");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn cashflow_response_traces_every_year() {
        let response =
            build_cashflow_response(&sample_catalog(), "healthcare", "derm").expect("response");
        assert_eq!(response.years.len(), 48);
        assert_eq!(response.lifetime, 13813);
        assert_eq!(response.break_even_age, Some(33));
        assert_eq!(response.million_age, Some(37));
        assert_approx(response.practice_start, 29.0);

        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["years"][0]["phase"], "undergrad");
        assert_eq!(json["years"][4]["phase"], "profSchool");
    }

    #[test]
    fn cashflow_response_errors() {
        let catalog = sample_catalog();
        let err = build_cashflow_response(&catalog, "healthcare", "nobody").expect_err("unknown");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err = build_cashflow_response(&catalog, "healthcare", "stub").expect_err("no financial");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn summaries_list_families_and_tracks() {
        let catalog = sample_catalog();
        let families = family_summaries(&catalog);
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].slug, "healthcare");
        assert_eq!(families[0].family_name.as_deref(), Some("Healthcare"));
        assert_eq!(families[0].track_count, 3);
        assert_eq!(families[0].profiles, vec!["lifestyle".to_string()]);

        let dataset = catalog.get("healthcare").expect("family");
        let tracks = serde_json::to_value(track_summaries(dataset)).expect("serialize");
        assert_eq!(tracks[0]["key"], "derm");
        assert_eq!(tracks[0]["rawData"]["hoursWeek"], 45.0);
        assert!(tracks[2]["rawData"].is_null());
    }
}
