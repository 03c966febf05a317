//! Receipt picker and PDF download.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::views::SelectOption;
use super::{redirect_with_notice, AppError, AppState, NoticeQuery, Path};
use crate::error::Error;
use crate::model::Month;
use crate::receipt::Receipt;

#[derive(Serialize)]
struct PickerPage {
    tenants: Vec<SelectOption>,
    month: Month,
}

pub(super) async fn picker(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let tenants = state.with_storage(|s| s.list_active_tenants()).await?;
    let page = PickerPage {
        tenants: tenants
            .iter()
            .map(|t| SelectOption::new(t.id.to_string(), t.display_name(), ""))
            .collect(),
        month: Month::from_date(state.today()),
    };
    Ok(Html(state.views().page(
        "receipts",
        "Quittances",
        query.code(),
        &page,
    )?))
}

/// The picker's GET submission. Fields stay text so bad input can be reported
/// with a notice instead of a rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct GenerateQuery {
    tenant_id: String,
    month: String,
}

pub(super) async fn generate(Query(query): Query<GenerateQuery>) -> Response {
    let Ok(tenant_id) = query.tenant_id.trim().parse::<i64>() else {
        return redirect_with_notice("/receipts", "invalid_tenant");
    };
    let Ok(month) = query.month.parse::<Month>() else {
        return redirect_with_notice("/receipts", "invalid_month");
    };
    Redirect::to(&format!("/receipts/{tenant_id}/{month}")).into_response()
}

pub(super) async fn download(
    State(state): State<AppState>,
    Path((tenant_id, month)): Path<(i64, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Ok(month) = month.parse::<Month>() else {
        return Ok(redirect_with_notice("/receipts", "invalid_month"));
    };

    let (filename, pdf) = state
        .with_storage(move |s| {
            let receipt = Receipt::build(s, tenant_id, month)?;
            Ok((receipt.filename(), receipt.to_pdf()?))
        })
        .await?;

    let etag = format!("\"{}\"", blake3::hash(&pdf).to_hex());
    if headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|value| value.as_bytes() == etag.as_bytes())
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    info!("Generated receipt {} ({} bytes)", filename, pdf.len());
    let header_value =
        |text: String| HeaderValue::try_from(text).map_err(|e| Error::internal(e.to_string()));
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (
                header::CONTENT_DISPOSITION,
                header_value(format!("inline; filename=\"{filename}\""))?,
            ),
            (header::ETAG, header_value(etag)?),
        ],
        pdf,
    )
        .into_response())
}
