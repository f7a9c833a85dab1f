use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::errors::ApiError;
use crate::handlers::common::{parse_period, success_response};
use crate::models::SalesReportRecord;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Aggregate sales for a category over an optional period. The aggregate is
/// also persisted (best-effort, relational backend only) for bookkeeping;
/// nothing ever reads it back.
async fn sales_report(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = parse_period(query.start_date.as_deref(), query.end_date.as_deref())?;
    let sales = state.storage.list_sales(&category, range).await?;

    let total_sales: f64 = sales.iter().map(|s| s.total).sum();
    let total_transactions = sales.len() as i64;

    let record = SalesReportRecord {
        report_type: "sales".to_string(),
        category: category.clone(),
        period_start: range.map(|(start, _)| start),
        period_end: range.map(|(_, end)| end),
        total_sales,
        total_transactions,
        data: serde_json::to_string(&sales).unwrap_or_default(),
    };
    if let Err(e) = state.storage.record_report(&record).await {
        warn!(error = %e, category = %category, "failed to persist sales report");
    }

    Ok(success_response(json!({
        "success": true,
        "report": {
            "period": {
                "start": query.start_date,
                "end": query.end_date,
            },
            "category": category,
            "total_sales": total_sales,
            "total_transactions": total_transactions,
            "sales": sales,
        },
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/sales/:category", get(sales_report))
}
