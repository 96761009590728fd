//! Summary statistics endpoint

use axum::{extract::State, Json};

use crate::stats::{compute_stats, DatasetStats};
use crate::AppState;

/// GET /api/stats
///
/// JSON `null` when the dataset has no penetration data.
pub async fn get_stats(State(state): State<AppState>) -> Json<Option<DatasetStats>> {
    Json(compute_stats(&state.dataset))
}
