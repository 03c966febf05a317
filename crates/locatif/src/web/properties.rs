//! Property pages.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Serialize;

use super::views::{kind_options, SelectOption};
use super::{redirect_with_notice, AppError, AppState, NoticeQuery, Path};
use crate::error::Error;
use crate::forms::{FieldErrors, PropertyForm};
use crate::model::{Property, PropertyKind, Tenant};

#[derive(Serialize)]
struct ListPage {
    properties: Vec<Property>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let properties = state.with_storage(|s| s.list_properties()).await?;
    Ok(Html(state.views().page(
        "properties",
        "Biens",
        query.code(),
        &ListPage { properties },
    )?))
}

#[derive(Serialize)]
struct DetailPage {
    property: Property,
    tenants: Vec<Tenant>,
}

pub(super) async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let page = state
        .with_storage(move |s| {
            let property = s
                .get_property(id)?
                .ok_or_else(|| Error::not_found("property", id))?;
            let tenants = s.list_tenants_for_property(id)?;
            Ok(DetailPage { property, tenants })
        })
        .await?;
    let title = page.property.name.clone();
    Ok(Html(state.views().page(
        "property",
        &title,
        query.code(),
        &page,
    )?))
}

#[derive(Serialize)]
struct FormPage<'a> {
    heading: &'a str,
    action: String,
    form: &'a PropertyForm,
    errors: &'a FieldErrors,
    kinds: Vec<SelectOption>,
}

fn render_form(
    state: &AppState,
    action: String,
    form: &PropertyForm,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let heading = if action.ends_with("/new") {
        "Nouveau bien"
    } else {
        "Modifier le bien"
    };
    let page = FormPage {
        heading,
        action,
        form,
        errors,
        kinds: kind_options(&form.kind),
    };
    let html = Html(state.views().page("property_form", heading, None, &page)?);
    if errors.is_empty() {
        Ok(html.into_response())
    } else {
        Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
    }
}

pub(super) async fn new_form(State(state): State<AppState>) -> Result<Response, AppError> {
    let form = PropertyForm {
        kind: PropertyKind::Apartment.as_str().to_string(),
        monthly_charges: "0".to_string(),
        ..PropertyForm::default()
    };
    render_form(
        &state,
        "/properties/new".to_string(),
        &form,
        &FieldErrors::default(),
    )
}

pub(super) async fn create(
    State(state): State<AppState>,
    Form(form): Form<PropertyForm>,
) -> Result<Response, AppError> {
    let property = match form.validate() {
        Ok(property) => property,
        Err(errors) => {
            return render_form(&state, "/properties/new".to_string(), &form, &errors);
        }
    };
    let id = state
        .with_storage(move |s| s.insert_property(&property))
        .await?;
    Ok(redirect_with_notice(
        &format!("/properties/{id}"),
        "property_created",
    ))
}

pub(super) async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let property = state
        .with_storage(move |s| {
            s.get_property(id)?
                .ok_or_else(|| Error::not_found("property", id))
        })
        .await?;
    render_form(
        &state,
        format!("/properties/{id}/edit"),
        &PropertyForm::from(&property),
        &FieldErrors::default(),
    )
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<PropertyForm>,
) -> Result<Response, AppError> {
    let rejected = state
        .with_storage(move |s| {
            s.get_property(id)?
                .ok_or_else(|| Error::not_found("property", id))?;
            match form.validate() {
                Ok(property) if s.update_property(id, &property)? => Ok(None),
                Ok(_) => Err(Error::not_found("property", id)),
                Err(errors) => Ok(Some((form, errors))),
            }
        })
        .await?;
    match rejected {
        None => Ok(redirect_with_notice(
            &format!("/properties/{id}"),
            "property_updated",
        )),
        Some((form, errors)) => {
            render_form(&state, format!("/properties/{id}/edit"), &form, &errors)
        }
    }
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deleted = state.with_storage(move |s| s.delete_property(id)).await?;
    if !deleted {
        return Err(Error::not_found("property", id).into());
    }
    Ok(redirect_with_notice("/properties", "property_deleted"))
}
