use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{optional_text, required_date, selected_id, FieldErrors};
use crate::model::{Amount, AmountError, Month, NewPayment, Payment, PaymentCategory, Tenant};

const AMOUNT_MESSAGE: &str = "Le montant doit être un nombre positif.";

/// The payment create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    /// Id of the paying tenant.
    pub tenant_id: String,
    /// One of the payment category identifiers.
    pub category: String,
    /// Amount in euros.
    pub amount: String,
    /// Date received, `YYYY-MM-DD`.
    pub paid_on: String,
    /// Month covered, `YYYY-MM`.
    pub period: String,
    /// Payment method.
    pub method: String,
    /// Comment.
    pub note: String,
}

impl PaymentForm {
    /// A blank form dated `today`, covering the current month's rent.
    #[must_use]
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            category: PaymentCategory::Rent.as_str().to_string(),
            paid_on: today.to_string(),
            period: Month::from_date(today).to_string(),
            ..Self::default()
        }
    }

    /// Check the submission against the known tenants and build the draft.
    ///
    /// Amounts must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns the rejected fields.
    pub fn validate(&self, tenants: &[Tenant]) -> Result<NewPayment, FieldErrors> {
        let mut errors = FieldErrors::default();

        let tenant_id = match selected_id(&self.tenant_id) {
            None => {
                errors.add("tenant_id", "Veuillez sélectionner un locataire.");
                None
            }
            Some(id) if !tenants.iter().any(|t| t.id == id) => {
                errors.add("tenant_id", "Le locataire sélectionné est introuvable.");
                None
            }
            Some(id) => Some(id),
        };

        let category = match self.category.parse::<PaymentCategory>() {
            Ok(category) => Some(category),
            Err(_) => {
                errors.add("category", "Catégorie de paiement inconnue.");
                None
            }
        };

        let amount = match Amount::parse(&self.amount) {
            Ok(amount) if !amount.is_zero() => Some(amount),
            Err(AmountError::TooPrecise) => {
                errors.add("amount", "Deux décimales au maximum.");
                None
            }
            Err(AmountError::Overflow) => {
                errors.add("amount", "Montant trop élevé.");
                None
            }
            _ => {
                errors.add("amount", AMOUNT_MESSAGE);
                None
            }
        };

        let paid_on = required_date(
            &mut errors,
            "paid_on",
            &self.paid_on,
            "La date de paiement est obligatoire.",
        );

        let period = if self.period.trim().is_empty() {
            errors.add("period", "Le mois concerné est obligatoire.");
            None
        } else if let Ok(month) = self.period.parse::<Month>() {
            Some(month)
        } else {
            errors.add("period", "Mois invalide, format attendu AAAA-MM.");
            None
        };

        match (tenant_id, category, amount, paid_on, period) {
            (Some(tenant_id), Some(category), Some(amount), Some(paid_on), Some(period)) => {
                Ok(NewPayment {
                    tenant_id,
                    category,
                    amount,
                    paid_on,
                    period,
                    method: optional_text(&self.method),
                    note: optional_text(&self.note),
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&Payment> for PaymentForm {
    fn from(payment: &Payment) -> Self {
        Self {
            tenant_id: payment.tenant_id.to_string(),
            category: payment.category.as_str().to_string(),
            amount: payment.amount.to_input_string(),
            paid_on: payment.paid_on.to_string(),
            period: payment.period.to_string(),
            method: payment.method.clone().unwrap_or_default(),
            note: payment.note.clone().unwrap_or_default(),
        }
    }
}
