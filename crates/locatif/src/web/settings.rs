//! Landlord settings page.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Serialize;

use super::{redirect_with_notice, AppError, AppState, NoticeQuery};
use crate::forms::{FieldErrors, LandlordForm};

#[derive(Serialize)]
struct SettingsPage<'a> {
    form: &'a LandlordForm,
    errors: &'a FieldErrors,
    configured: bool,
}

fn render(
    state: &AppState,
    page: &SettingsPage<'_>,
    notice: Option<&str>,
) -> Result<Html<String>, AppError> {
    Ok(Html(state.views().page("settings", "Paramètres", notice, page)?))
}

pub(super) async fn show(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let landlord = state.with_storage(|s| s.get_landlord()).await?;
    let form = landlord.as_ref().map(LandlordForm::from).unwrap_or_default();
    let page = SettingsPage {
        form: &form,
        errors: &FieldErrors::default(),
        configured: landlord.is_some(),
    };
    render(&state, &page, query.code())
}

pub(super) async fn save(
    State(state): State<AppState>,
    Form(form): Form<LandlordForm>,
) -> Result<Response, AppError> {
    match form.validate() {
        Ok(landlord) => {
            state
                .with_storage(move |s| s.save_landlord(&landlord))
                .await?;
            Ok(redirect_with_notice("/settings", "settings_saved"))
        }
        Err(errors) => {
            let page = SettingsPage {
                form: &form,
                errors: &errors,
                configured: false,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&state, &page, None)?).into_response())
        }
    }
}
