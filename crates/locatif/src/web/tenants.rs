//! Tenant pages.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Serialize;

use super::views::SelectOption;
use super::{redirect_with_notice, AppError, AppState, NoticeQuery, Path};
use crate::error::{Error, Result as StorageResult};
use crate::forms::{FieldErrors, TenantForm};
use crate::model::{Amount, Month, NewTenant, Payment, Property, Tenant};
use crate::storage::Storage;

#[derive(Serialize)]
struct TenantRow {
    #[serde(flatten)]
    tenant: Tenant,
    name: String,
    property_name: String,
}

#[derive(Serialize)]
struct ListPage {
    tenants: Vec<TenantRow>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let tenants = state
        .with_storage(|s| {
            let names: HashMap<i64, String> = s
                .list_properties()?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect();
            Ok(s.list_tenants()?
                .into_iter()
                .map(|tenant| TenantRow {
                    name: tenant.display_name(),
                    property_name: names.get(&tenant.property_id).cloned().unwrap_or_default(),
                    tenant,
                })
                .collect())
        })
        .await?;
    Ok(Html(state.views().page(
        "tenants",
        "Locataires",
        query.code(),
        &ListPage { tenants },
    )?))
}

#[derive(Serialize)]
struct DetailPage {
    name: String,
    tenant: Tenant,
    property: Property,
    monthly_due: Amount,
    payments: Vec<Payment>,
    receipt_months: Vec<Month>,
}

pub(super) async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let page = state
        .with_storage(move |s| {
            let tenant = s
                .get_tenant(id)?
                .ok_or_else(|| Error::not_found("tenant", id))?;
            let property = s
                .get_property(tenant.property_id)?
                .ok_or_else(|| Error::not_found("property", tenant.property_id))?;
            Ok(DetailPage {
                name: tenant.display_name(),
                monthly_due: tenant.monthly_due(&property),
                payments: s.list_payments_for_tenant(id)?,
                receipt_months: s.paid_periods_for_tenant(id)?,
                tenant,
                property,
            })
        })
        .await?;
    let title = page.name.clone();
    Ok(Html(state.views().page(
        "tenant",
        &title,
        query.code(),
        &page,
    )?))
}

#[derive(Serialize)]
struct FormPage<'a> {
    heading: &'a str,
    action: &'a str,
    form: &'a TenantForm,
    errors: &'a FieldErrors,
    properties: Vec<SelectOption>,
}

fn property_options(properties: &[Property], current: &str) -> Vec<SelectOption> {
    properties
        .iter()
        .map(|p| {
            SelectOption::new(
                p.id.to_string(),
                format!("{} ({})", p.name, p.kind.label()),
                current,
            )
        })
        .collect()
}

fn render_form(
    state: &AppState,
    action: &str,
    form: &TenantForm,
    errors: &FieldErrors,
    properties: &[Property],
) -> Result<Response, AppError> {
    let heading = if action.ends_with("/new") {
        "Nouveau locataire"
    } else {
        "Modifier le locataire"
    };
    let page = FormPage {
        heading,
        action,
        form,
        errors,
        properties: property_options(properties, &form.property_id),
    };
    let html = Html(state.views().page("tenant_form", heading, None, &page)?);
    if errors.is_empty() {
        Ok(html.into_response())
    } else {
        Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
    }
}

/// A submission that failed validation, with what is needed to show it again.
struct Rejected {
    form: TenantForm,
    errors: FieldErrors,
    properties: Vec<Property>,
}

/// Validate against the stored properties and run `save` on success.
///
/// Validation and write use the same connection. When `editing` names a
/// tenant, a missing record is reported before the form is looked at.
async fn validate_and_save<F>(
    state: &AppState,
    editing: Option<i64>,
    form: TenantForm,
    save: F,
) -> Result<Result<i64, Rejected>, AppError>
where
    F: FnOnce(&Storage, &NewTenant) -> StorageResult<i64> + Send + 'static,
{
    state
        .with_storage(move |s| {
            if let Some(id) = editing {
                s.get_tenant(id)?
                    .ok_or_else(|| Error::not_found("tenant", id))?;
            }
            let properties = s.list_properties()?;
            Ok(match form.validate(&properties) {
                Ok(tenant) => Ok(save(s, &tenant)?),
                Err(errors) => Err(Rejected {
                    form,
                    errors,
                    properties,
                }),
            })
        })
        .await
}

impl Rejected {
    fn render(&self, state: &AppState, action: &str) -> Result<Response, AppError> {
        render_form(state, action, &self.form, &self.errors, &self.properties)
    }
}

pub(super) async fn new_form(State(state): State<AppState>) -> Result<Response, AppError> {
    let properties = state.with_storage(|s| s.list_properties()).await?;
    render_form(
        &state,
        "/tenants/new",
        &TenantForm::blank(),
        &FieldErrors::default(),
        &properties,
    )
}

pub(super) async fn create(
    State(state): State<AppState>,
    Form(form): Form<TenantForm>,
) -> Result<Response, AppError> {
    match validate_and_save(&state, None, form, |s, tenant| s.insert_tenant(tenant)).await? {
        Ok(id) => Ok(redirect_with_notice(
            &format!("/tenants/{id}"),
            "tenant_created",
        )),
        Err(rejected) => rejected.render(&state, "/tenants/new"),
    }
}

pub(super) async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let (tenant, properties) = state
        .with_storage(move |s| {
            let tenant = s
                .get_tenant(id)?
                .ok_or_else(|| Error::not_found("tenant", id))?;
            Ok((tenant, s.list_properties()?))
        })
        .await?;
    render_form(
        &state,
        &format!("/tenants/{id}/edit"),
        &TenantForm::from(&tenant),
        &FieldErrors::default(),
        &properties,
    )
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<TenantForm>,
) -> Result<Response, AppError> {
    let saved = validate_and_save(&state, Some(id), form, move |s, tenant| {
        if s.update_tenant(id, tenant)? {
            Ok(id)
        } else {
            Err(Error::not_found("tenant", id))
        }
    })
    .await?;
    match saved {
        Ok(id) => Ok(redirect_with_notice(
            &format!("/tenants/{id}"),
            "tenant_updated",
        )),
        Err(rejected) => rejected.render(&state, &format!("/tenants/{id}/edit")),
    }
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deleted = state.with_storage(move |s| s.delete_tenant(id)).await?;
    if !deleted {
        return Err(Error::not_found("tenant", id).into());
    }
    Ok(redirect_with_notice("/tenants", "tenant_deleted"))
}
