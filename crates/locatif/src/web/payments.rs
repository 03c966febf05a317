//! Payment pages.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Serialize;

use super::views::{category_options, SelectOption};
use super::{redirect_with_notice, AppError, AppState, NoticeQuery, Path};
use crate::error::{Error, Result as StorageResult};
use crate::forms::{FieldErrors, PaymentForm};
use crate::model::{NewPayment, Payment, Tenant};
use crate::storage::Storage;

#[derive(Serialize)]
struct PaymentRow {
    #[serde(flatten)]
    payment: Payment,
    tenant_name: String,
}

#[derive(Serialize)]
struct ListPage {
    payments: Vec<PaymentRow>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let payments = state
        .with_storage(|s| {
            let names: HashMap<i64, String> = s
                .list_tenants()?
                .iter()
                .map(|t| (t.id, t.display_name()))
                .collect();
            Ok(s.list_payments()?
                .into_iter()
                .map(|payment| PaymentRow {
                    tenant_name: names.get(&payment.tenant_id).cloned().unwrap_or_default(),
                    payment,
                })
                .collect())
        })
        .await?;
    Ok(Html(state.views().page(
        "payments",
        "Paiements",
        query.code(),
        &ListPage { payments },
    )?))
}

#[derive(Serialize)]
struct FormPage<'a> {
    heading: &'a str,
    action: &'a str,
    form: &'a PaymentForm,
    errors: &'a FieldErrors,
    tenants: Vec<SelectOption>,
    categories: Vec<SelectOption>,
}

fn render_form(
    state: &AppState,
    action: &str,
    form: &PaymentForm,
    errors: &FieldErrors,
    tenants: &[Tenant],
) -> Result<Response, AppError> {
    let heading = if action.ends_with("/new") {
        "Enregistrer un paiement"
    } else {
        "Modifier le paiement"
    };
    let page = FormPage {
        heading,
        action,
        form,
        errors,
        tenants: tenants
            .iter()
            .map(|t| SelectOption::new(t.id.to_string(), t.display_name(), &form.tenant_id))
            .collect(),
        categories: category_options(&form.category),
    };
    let html = Html(state.views().page("payment_form", heading, None, &page)?);
    if errors.is_empty() {
        Ok(html.into_response())
    } else {
        Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
    }
}

/// Which tenants a payment may be recorded for.
#[derive(Debug, Clone, Copy)]
enum Payers {
    /// New payments: running leases only.
    Active,
    /// Edits: any tenant, so past payments of ended leases stay editable.
    All,
}

impl Payers {
    fn load(self, storage: &Storage) -> StorageResult<Vec<Tenant>> {
        match self {
            Self::Active => storage.list_active_tenants(),
            Self::All => storage.list_tenants(),
        }
    }
}

struct Rejected {
    form: PaymentForm,
    errors: FieldErrors,
    tenants: Vec<Tenant>,
}

impl Rejected {
    fn render(&self, state: &AppState, action: &str) -> Result<Response, AppError> {
        render_form(state, action, &self.form, &self.errors, &self.tenants)
    }
}

/// Validate `form` and hand the draft to `save`.
///
/// When `editing` names a payment, a missing record is reported before the
/// form is looked at.
async fn validate_and_save<F>(
    state: &AppState,
    payers: Payers,
    editing: Option<i64>,
    form: PaymentForm,
    save: F,
) -> Result<Result<i64, Rejected>, AppError>
where
    F: FnOnce(&Storage, &NewPayment) -> StorageResult<i64> + Send + 'static,
{
    state
        .with_storage(move |s| {
            if let Some(id) = editing {
                s.get_payment(id)?
                    .ok_or_else(|| Error::not_found("payment", id))?;
            }
            let tenants = payers.load(s)?;
            Ok(match form.validate(&tenants) {
                Ok(payment) => Ok(save(s, &payment)?),
                Err(errors) => Err(Rejected {
                    form,
                    errors,
                    tenants,
                }),
            })
        })
        .await
}

pub(super) async fn new_form(State(state): State<AppState>) -> Result<Response, AppError> {
    let tenants = state.with_storage(|s| Payers::Active.load(s)).await?;
    let mut form = PaymentForm::blank(state.today());
    if let [only] = tenants.as_slice() {
        form.tenant_id = only.id.to_string();
        form.amount = only.monthly_rent.to_input_string();
    }
    render_form(
        &state,
        "/payments/new",
        &form,
        &FieldErrors::default(),
        &tenants,
    )
}

pub(super) async fn create(
    State(state): State<AppState>,
    Form(form): Form<PaymentForm>,
) -> Result<Response, AppError> {
    let saved = validate_and_save(&state, Payers::Active, None, form, |s, payment| {
        s.insert_payment(payment)
    })
    .await?;
    match saved {
        Ok(_) => Ok(redirect_with_notice("/payments", "payment_created")),
        Err(rejected) => rejected.render(&state, "/payments/new"),
    }
}

pub(super) async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let (payment, tenants) = state
        .with_storage(move |s| {
            let payment = s
                .get_payment(id)?
                .ok_or_else(|| Error::not_found("payment", id))?;
            Ok((payment, Payers::All.load(s)?))
        })
        .await?;
    render_form(
        &state,
        &format!("/payments/{id}/edit"),
        &PaymentForm::from(&payment),
        &FieldErrors::default(),
        &tenants,
    )
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<PaymentForm>,
) -> Result<Response, AppError> {
    let saved = validate_and_save(&state, Payers::All, Some(id), form, move |s, payment| {
        if s.update_payment(id, payment)? {
            Ok(id)
        } else {
            Err(Error::not_found("payment", id))
        }
    })
    .await?;
    match saved {
        Ok(_) => Ok(redirect_with_notice("/payments", "payment_updated")),
        Err(rejected) => rejected.render(&state, &format!("/payments/{id}/edit")),
    }
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deleted = state.with_storage(move |s| s.delete_payment(id)).await?;
    if !deleted {
        return Err(Error::not_found("payment", id).into());
    }
    Ok(redirect_with_notice("/payments", "payment_deleted"))
}
