//! Page templates.
//!
//! Templates are compiled into the binary. Each page renders its own body,
//! which is then placed into the shared layout.

use std::fmt;

use chrono::NaiveDate;
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use serde_json::json;

use crate::error::Result;
use crate::model::{Amount, Month, PaymentCategory, PropertyKind};

const LAYOUT: &str = "layout";

const TEMPLATES: &[(&str, &str)] = &[
    (LAYOUT, include_str!("../../templates/layout.hbs")),
    ("dashboard", include_str!("../../templates/dashboard.hbs")),
    ("properties", include_str!("../../templates/properties.hbs")),
    ("property", include_str!("../../templates/property.hbs")),
    ("property_form", include_str!("../../templates/property_form.hbs")),
    ("tenants", include_str!("../../templates/tenants.hbs")),
    ("tenant", include_str!("../../templates/tenant.hbs")),
    ("tenant_form", include_str!("../../templates/tenant_form.hbs")),
    ("payments", include_str!("../../templates/payments.hbs")),
    ("payment_form", include_str!("../../templates/payment_form.hbs")),
    ("receipts", include_str!("../../templates/receipts.hbs")),
    ("settings", include_str!("../../templates/settings.hbs")),
    ("statistics", include_str!("../../templates/statistics.hbs")),
];

handlebars_helper!(money: |cents: i64| Amount::from_cents(cents).unwrap_or_default().to_string());
handlebars_helper!(date_fr: |value: str| NaiveDate::parse_from_str(value, "%Y-%m-%d")
    .map_or_else(|_| value.to_string(), |d| d.format("%d/%m/%Y").to_string()));
handlebars_helper!(month_label: |value: str| value
    .parse::<Month>()
    .map_or_else(|_| value.to_string(), Month::label));
handlebars_helper!(kind_label: |value: str| value
    .parse::<PropertyKind>()
    .map_or("", PropertyKind::label));
handlebars_helper!(category_label: |value: str| value
    .parse::<PaymentCategory>()
    .map_or("", PaymentCategory::label));

/// Banner text for a `?notice=` code. Unknown codes show nothing.
#[must_use]
pub fn notice_message(code: &str) -> Option<&'static str> {
    Some(match code {
        "property_created" => "Le bien a été créé.",
        "property_updated" => "Le bien a été mis à jour.",
        "property_deleted" => "Le bien et ses locataires ont été supprimés.",
        "tenant_created" => "Le locataire a été ajouté.",
        "tenant_updated" => "Le locataire a été mis à jour.",
        "tenant_deleted" => "Le locataire et ses paiements ont été supprimés.",
        "payment_created" => "Le paiement a été enregistré.",
        "payment_updated" => "Le paiement a été mis à jour.",
        "payment_deleted" => "Le paiement a été supprimé.",
        "settings_saved" => "Les paramètres ont été enregistrés.",
        "invalid_month" => "Mois invalide, format attendu AAAA-MM.",
        "invalid_tenant" => "Veuillez sélectionner un locataire.",
        _ => return None,
    })
}

/// The compiled templates.
pub struct Views {
    registry: Handlebars<'static>,
}

impl fmt::Debug for Views {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Views")
            .field("templates", &TEMPLATES.len())
            .finish_non_exhaustive()
    }
}

impl Views {
    /// Compile every template and register the formatting helpers.
    ///
    /// # Errors
    ///
    /// Returns an error if a template does not compile.
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_helper("money", Box::new(money));
        registry.register_helper("date_fr", Box::new(date_fr));
        registry.register_helper("month_label", Box::new(month_label));
        registry.register_helper("kind_label", Box::new(kind_label));
        registry.register_helper("category_label", Box::new(category_label));
        for (name, source) in TEMPLATES {
            registry.register_template_string(name, *source)?;
        }
        Ok(Self { registry })
    }

    /// Render the page template `name` with `data` inside the layout.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn page(
        &self,
        name: &str,
        title: &str,
        notice: Option<&str>,
        data: &impl Serialize,
    ) -> Result<String> {
        let body = self.registry.render(name, data)?;
        let layout = json!({
            "title": title,
            "section": section(name),
            "notice": notice.and_then(notice_message),
            "body": body,
        });
        Ok(self.registry.render(LAYOUT, &layout)?)
    }
}

/// Navigation entry a page belongs to.
fn section(page: &str) -> &str {
    match page {
        "property" | "property_form" => "properties",
        "tenant" | "tenant_form" => "tenants",
        "payment_form" => "payments",
        other => other,
    }
}

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Displayed text.
    pub label: String,
    /// Whether the option is pre-selected.
    pub selected: bool,
}

impl SelectOption {
    /// Build an option, selected when `value` equals `current`.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        let selected = value == current;
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

/// Options for the property kind select box.
#[must_use]
pub fn kind_options(current: &str) -> Vec<SelectOption> {
    PropertyKind::ALL
        .iter()
        .map(|k| SelectOption::new(k.as_str(), k.label(), current))
        .collect()
}

/// Options for the payment category select box.
#[must_use]
pub fn category_options(current: &str) -> Vec<SelectOption> {
    PaymentCategory::ALL
        .iter()
        .map(|c| SelectOption::new(c.as_str(), c.label(), current))
        .collect()
}
