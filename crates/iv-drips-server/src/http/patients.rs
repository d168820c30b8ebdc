use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use iv_drips_core::models::{DemoPatient, NewPatient, PatientRecord, PatientUpdate};
use iv_drips_core::registry::{demo_patients, Registry, RegistryResult};
use iv_drips_core::store::PatientStore;

use super::{ApiError, AppState};

/// Run `work` against the registry on the blocking pool; stores do
/// synchronous file and SQLite I/O.
async fn with_registry<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Registry<Box<dyn PatientStore>>) -> RegistryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let mut registry = state.registry.clone().lock_owned().await;
    let outcome = tokio::task::spawn_blocking(move || work(&mut registry)).await?;
    Ok(outcome?)
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PatientRecord>>, ApiError> {
    let records = with_registry(&state, |registry| registry.list()).await?;
    Ok(Json(records))
}

pub async fn create(
    State(state): State<AppState>,
    Json(fields): Json<NewPatient>,
) -> Result<(StatusCode, Json<PatientRecord>), ApiError> {
    let record = with_registry(&state, move |registry| registry.create(fields)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Ids that are not integers cannot match any record.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<PatientUpdate>,
) -> Result<Json<PatientRecord>, ApiError> {
    let id: i64 = id.trim().parse().map_err(|_| ApiError::NotFound)?;
    let record = with_registry(&state, move |registry| registry.update(id, fields)).await?;
    Ok(Json(record))
}

/// Fixed sample data; never touches the store.
pub async fn demo_data() -> Json<Vec<DemoPatient>> {
    Json(demo_patients())
}
