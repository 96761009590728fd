//! Dataset query endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::ApiResult;
use crate::query::{run_query, DataQuery, QueryOutput};
use crate::AppState;

/// GET /api/data
///
/// Filters and sorts the in-memory dataset. Unknown parameters are ignored
/// but echoed back in `filters`.
pub async fn get_data(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<serde_json::Value>> {
    let query = DataQuery::from_params(&params)?;
    let data = run_query(&state.dataset, &query);
    debug!(matched = data.len(), "Data query");

    let output = QueryOutput {
        total: data.len(),
        data,
        filters: params,
    };
    Ok(Json(serde_json::to_value(&output)?))
}
