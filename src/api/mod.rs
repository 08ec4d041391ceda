mod payload;

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{
    PlanError, PlanParameters, ProjectionResult, ScenarioLedger, ScenarioSnapshot, YearRecord,
    calculate,
};

pub use payload::{PlanArgs, PlanPayload};

/// Scenario ledgers keyed by session name.
#[derive(Clone, Default)]
pub struct AppState {
    sessions: Arc<Mutex<HashMap<String, ScenarioLedger>>>,
}

impl AppState {
    fn with_ledger<T>(&self, session: &str, f: impl FnOnce(&mut ScenarioLedger) -> T) -> T {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        f(sessions.entry(session.to_string()).or_default())
    }

    fn remove_scenario(&self, session: &str, id: u64) -> Option<ScenarioSnapshot> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get_mut(session).and_then(|ledger| ledger.remove(id))
    }

    fn snapshots(&self, session: &str) -> Vec<ScenarioSnapshot> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(session)
            .map(|ledger| ledger.scenarios().to_vec())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub sustainability: &'static str,
    pub is_self_sustaining: bool,
    pub run_out_of_money_age: Option<u32>,
    pub retirement_age: u32,
    pub recommended_age: u32,
    pub total_amount_needed: f64,
    pub after_ret_income: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub summary: SummaryResponse,
    pub years: Vec<YearRecord>,
}

#[derive(Debug, Serialize)]
struct ScenarioListResponse {
    scenarios: Vec<ScenarioSnapshot>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

pub fn build_calculate_response(
    params: &PlanParameters,
    result: ProjectionResult,
) -> CalculateResponse {
    CalculateResponse {
        summary: SummaryResponse {
            sustainability: if result.is_self_sustaining {
                "Sustainable"
            } else {
                "Unsustainable"
            },
            is_self_sustaining: result.is_self_sustaining,
            run_out_of_money_age: result.run_out_of_money_age,
            retirement_age: params.retirement_age,
            recommended_age: result.recommended_age,
            total_amount_needed: result.total_amount_needed,
            after_ret_income: result.after_ret_income,
        },
        years: result.years,
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route(
            "/api/sessions/:session/scenarios",
            get(list_scenarios_handler).post(save_scenario_handler),
        )
        .route(
            "/api/sessions/:session/scenarios/:id",
            delete(delete_scenario_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState::default());

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "retirement projection API listening");
    println!("Nestegg HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/calculate");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    calculate_handler_impl(payload)
}

async fn calculate_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    calculate_handler_impl(payload)
}

fn calculate_handler_impl(payload: PlanPayload) -> Response {
    let params = match payload.into_inputs().into_params() {
        Ok(params) => params,
        Err(err) => return plan_error_response(&err.into()),
    };
    debug!(?params, "calculating projection");

    match calculate(&params) {
        Ok(result) => json_response(StatusCode::OK, build_calculate_response(&params, result)),
        Err(err) => plan_error_response(&err),
    }
}

async fn list_scenarios_handler(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Response {
    let scenarios = state.snapshots(&session);
    json_response(StatusCode::OK, ScenarioListResponse { scenarios })
}

async fn save_scenario_handler(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(payload): Json<PlanPayload>,
) -> Response {
    let params = match payload.into_inputs().into_params() {
        Ok(params) => params,
        Err(err) => return plan_error_response(&err.into()),
    };

    match state.with_ledger(&session, |ledger| ledger.save(&params).cloned()) {
        Ok(snapshot) => json_response(StatusCode::CREATED, snapshot),
        Err(err) => plan_error_response(&err.into()),
    }
}

async fn delete_scenario_handler(
    State(state): State<AppState>,
    Path((session, id)): Path<(String, u64)>,
) -> Response {
    match state.remove_scenario(&session, id) {
        Some(_) => with_cache_control(StatusCode::NO_CONTENT),
        None => error_response(StatusCode::NOT_FOUND, &format!("Scenario {id} not found")),
    }
}

fn plan_error_response(err: &PlanError) -> Response {
    match err {
        PlanError::Validation(validation) => json_response(
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: "Invalid plan parameters".to_string(),
                details: validation.violations().to_vec(),
            },
        ),
        PlanError::SearchExhausted { .. } => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string())
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            details: Vec::new(),
        },
    )
}
