use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use domain::{
    catalog::{self, Cart},
    estimates,
    wizard::{
        inputs::{CatalogQuery, SelectMedicationTypeInput},
        Address, CardDetails, Command, Dispatch, Prescription, Step, View, WizardService,
    },
    Error, Settings,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Clone)]
struct ServiceState {
    wizard: WizardService,
}

type Rejection = (StatusCode, Json<Value>);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    #[serde(flatten)]
    view: View,
    steps: Vec<Step>,
    calculating: bool,
}

impl From<View> for SessionResponse {
    fn from(view: View) -> Self {
        Self {
            steps: view.wizard.state.steps(),
            calculating: view.wizard.is_calculating(),
            view,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let settings = Settings::from_env();
    let estimator = estimates::provider(&settings)?;

    let state = ServiceState {
        wizard: WizardService::new(estimator),
    };

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("Listening on {}", settings.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: ServiceState) -> Router {
    Router::new()
        .route("/catalog", get(list_catalog))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/medication-type", post(select_medication_type))
        .route("/sessions/:id/address", post(submit_address))
        .route("/sessions/:id/card", post(submit_card))
        .route("/sessions/:id/prescription/draft", get(prescription_draft))
        .route("/sessions/:id/prescription", post(submit_prescription))
        .route("/sessions/:id/items", post(submit_items))
        .route("/sessions/:id/back", post(go_back))
        .route("/sessions/:id/reset", post(reset))
        .route("/sessions/:id/summary", get(get_summary))
        .with_state(state)
}

fn reject(err: Error) -> Rejection {
    let status = match &err {
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Uniqueness { .. }
        | Error::InvalidStateTransition { .. }
        | Error::EstimatePending => StatusCode::CONFLICT,
        Error::Store { .. } | Error::Calculation { .. } | Error::Configuration { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = match &err {
        Error::Validation { fields } => json!({ "error": err.to_string(), "fields": fields }),
        _ => json!({ "error": err.to_string() }),
    };

    (status, Json(body))
}

async fn dispatch(
    state: &ServiceState,
    id: &str,
    command: Command,
) -> Result<impl IntoResponse, Rejection> {
    let dispatch = state.wizard.execute(id, command).await.map_err(reject)?;

    // the calculation finishes in the background; clients poll the session
    let status = match dispatch {
        Dispatch::Applied(_) => StatusCode::OK,
        Dispatch::Calculating { .. } => StatusCode::ACCEPTED,
    };

    Ok((status, Json(SessionResponse::from(dispatch.into_view()))))
}

// Product catalog
async fn list_catalog(Query(query): Query<CatalogQuery>) -> impl IntoResponse {
    Json(json!({
        "categories": catalog::categories(),
        "products": catalog::by_category(query.category.as_deref()),
    }))
}

// Start session
async fn create_session(State(state): State<ServiceState>) -> Result<impl IntoResponse, Rejection> {
    let view = state.wizard.start().await.map_err(reject)?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(view))))
}

// Get session
async fn get_session(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, Rejection> {
    let view = state.wizard.load(&id).await.map_err(reject)?;

    Ok(Json(SessionResponse::from(view)))
}

async fn select_medication_type(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
    Json(input): Json<SelectMedicationTypeInput>,
) -> Result<impl IntoResponse, Rejection> {
    let command = Command::SelectMedicationType {
        medication_type: input.medication_type,
    };
    dispatch(&state, &id, command).await
}

async fn submit_address(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
    Json(address): Json<Address>,
) -> Result<impl IntoResponse, Rejection> {
    dispatch(&state, &id, Command::SubmitAddress { address }).await
}

async fn submit_card(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
    Json(card): Json<CardDetails>,
) -> Result<impl IntoResponse, Rejection> {
    dispatch(&state, &id, Command::SubmitCardDetails { card }).await
}

// Prescription screen initial data
async fn prescription_draft(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, Rejection> {
    let view = state.wizard.load(&id).await.map_err(reject)?;
    let wizard = view.wizard;

    let draft = match (wizard.state.prescription, wizard.card_details) {
        (Some(prescription), _) => prescription,
        (None, Some(card)) => card.draft_prescription(),
        (None, None) => Prescription::draft(),
    };

    Ok(Json(draft))
}

async fn submit_prescription(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
    Json(prescription): Json<Prescription>,
) -> Result<impl IntoResponse, Rejection> {
    dispatch(&state, &id, Command::SubmitPrescription { prescription }).await
}

async fn submit_items(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
    Json(cart): Json<Cart>,
) -> Result<impl IntoResponse, Rejection> {
    tracing::info!("Cart for {} holds {} units worth {:.2}", id, cart.count(), cart.total());
    let items = cart.into_items().map_err(reject)?;
    dispatch(&state, &id, Command::SubmitNonPrescription { items }).await
}

async fn go_back(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, Rejection> {
    dispatch(&state, &id, Command::GoBack).await
}

async fn reset(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, Rejection> {
    dispatch(&state, &id, Command::Reset).await
}

// Delivery comparison
async fn get_summary(
    Path(id): Path<String>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, Rejection> {
    let summary = state.wizard.summary(&id).await.map_err(reject)?;

    Ok(Json(summary))
}
