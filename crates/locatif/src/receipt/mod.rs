//! Rent receipts ("quittances").
//!
//! A [`Receipt`] gathers everything a tenant paid for one month, summed by
//! category, together with the landlord, tenant and property identities. It is
//! derived from stored data only: the issue date is the latest payment date,
//! so building the same receipt twice gives the same document.

mod pdf;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Amount, Landlord, Month, PaymentCategory, Property, Tenant};
use crate::storage::Storage;

pub use pdf::encode_win_ansi;

/// Placeholder printed when the landlord settings were never filled in.
pub const LANDLORD_PLACEHOLDER: &str = "Bailleur non configuré";

/// One category total on a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    /// What was paid for.
    pub category: PaymentCategory,
    /// Sum of the payments in that category.
    pub amount: Amount,
}

impl ReceiptLine {
    /// `Loyer: 650,00 €`.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{}: {}", self.category.label(), self.amount)
    }
}

/// A receipt for one tenant and one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    /// Landlord identity, `None` when not configured.
    pub landlord: Option<Landlord>,
    /// The paying tenant.
    pub tenant: Tenant,
    /// The leased property.
    pub property: Property,
    /// Month covered.
    pub month: Month,
    /// Category totals in receipt order, categories without payments omitted.
    pub lines: Vec<ReceiptLine>,
    /// Sum of all lines.
    pub total: Amount,
    /// Latest payment date among the month's payments.
    pub issued_on: NaiveDate,
}

impl Receipt {
    /// Gather a tenant's payments for `month`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown tenant,
    /// [`Error::NoPayments`] when nothing was paid for that month, or a
    /// storage error.
    pub fn build(storage: &Storage, tenant_id: i64, month: Month) -> Result<Self> {
        let tenant = storage
            .get_tenant(tenant_id)?
            .ok_or_else(|| Error::not_found("tenant", tenant_id))?;
        let property = storage
            .get_property(tenant.property_id)?
            .ok_or_else(|| Error::not_found("property", tenant.property_id))?;

        let payments = storage.payments_for_period(tenant_id, month)?;
        let issued_on = payments
            .iter()
            .map(|p| p.paid_on)
            .max()
            .ok_or(Error::NoPayments { tenant_id, month })?;

        let mut by_category: BTreeMap<PaymentCategory, Amount> = BTreeMap::new();
        for payment in &payments {
            let entry = by_category.entry(payment.category).or_default();
            *entry = entry.saturating_add(payment.amount);
        }
        let lines: Vec<ReceiptLine> = by_category
            .into_iter()
            .map(|(category, amount)| ReceiptLine { category, amount })
            .collect();
        let total = lines.iter().map(|line| line.amount).sum();

        debug!(
            "Built receipt for tenant {} in {} from {} payments",
            tenant_id,
            month,
            payments.len()
        );

        Ok(Self {
            landlord: storage.get_landlord()?,
            tenant,
            property,
            month,
            lines,
            total,
            issued_on,
        })
    }

    /// `Total: 650,00 €`.
    #[must_use]
    pub fn total_text(&self) -> String {
        format!("Total: {}", self.total)
    }

    /// Download name, e.g. `quittance-3-2024-03.pdf`.
    #[must_use]
    pub fn filename(&self) -> String {
        format!("quittance-{}-{}.pdf", self.tenant.id, self.month)
    }

    /// Landlord name, or the placeholder.
    #[must_use]
    pub fn landlord_name(&self) -> &str {
        self.landlord
            .as_ref()
            .map_or(LANDLORD_PLACEHOLDER, |l| l.name.as_str())
    }

    /// The receipt body, one entry per printed line. Empty entries are blank lines.
    #[must_use]
    pub fn text_lines(&self) -> Vec<String> {
        let mut out = vec![
            "QUITTANCE DE LOYER".to_string(),
            format!("Période : {}", self.month.label()),
            String::new(),
            "Bailleur".to_string(),
        ];
        match &self.landlord {
            Some(landlord) => {
                out.push(landlord.name.clone());
                out.push(landlord.full_address());
                if let Some(siret) = &landlord.siret {
                    out.push(format!("SIRET : {siret}"));
                }
            }
            None => out.push(LANDLORD_PLACEHOLDER.to_string()),
        }

        out.push(String::new());
        out.push("Locataire".to_string());
        out.push(self.tenant.display_name());
        if self.tenant.is_business() {
            if let Some(siret) = &self.tenant.siret {
                out.push(format!("SIRET : {siret}"));
            }
            if let Some(director) = &self.tenant.company_director {
                out.push(format!("Représentée par : {director}"));
            }
        }

        out.push(String::new());
        out.push(format!("Bien loué : {}", self.property.name));
        out.push(self.property.address.clone());

        out.push(String::new());
        out.push("Détail des paiements".to_string());
        out.extend(self.lines.iter().map(ReceiptLine::text));
        out.push(self.total_text());

        out.push(String::new());
        out.extend(wrap(
            &format!(
                "Je soussigné(e) {}, bailleur, déclare avoir reçu de {} la somme de {} \
                 au titre des paiements du mois de {}, pour le bien situé {}, \
                 et lui en donne quittance, sous réserve de tous mes droits.",
                self.landlord_name(),
                self.tenant.display_name(),
                self.total,
                self.month.label(),
                self.property.address,
            ),
            WRAP_WIDTH,
        ));
        out.push(String::new());
        out.push(format!("Fait le {}", self.issued_on.format("%d/%m/%Y")));
        out
    }

    /// Render the receipt as a single-page A4 PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        pdf::render(&self.text_lines())
    }
}

/// Characters per line for the attestation paragraph.
const WRAP_WIDTH: usize = 90;

/// Greedy word wrap on whitespace.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewProperty, PropertyKind};
    use crate::storage::test_support::*;

    fn scenario() -> (Storage, i64) {
        let storage = storage();
        let property_id = storage
            .insert_property(&NewProperty {
                kind: PropertyKind::Apartment,
                ..new_property("12 Rue A")
            })
            .unwrap();
        let tenant_id = storage
            .insert_tenant(&new_tenant(property_id, "Dupont"))
            .unwrap();
        storage
            .insert_payment(&new_payment(
                tenant_id,
                PaymentCategory::Rent,
                650,
                month(2024, 3),
            ))
            .unwrap();
        (storage, tenant_id)
    }

    #[test]
    fn test_end_to_end_rent_receipt() {
        let (storage, tenant_id) = scenario();

        let receipt = Receipt::build(&storage, tenant_id, month(2024, 3)).unwrap();

        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.total, euros(650));
        let text = receipt.text_lines();
        assert!(text.iter().any(|l| l.starts_with("Loyer: 650")));
        assert!(text.iter().any(|l| l == "Total: 650,00 €"));
        assert!(text.iter().any(|l| l == "Bien loué : 12 Rue A"));
        assert!(text.iter().any(|l| l == LANDLORD_PLACEHOLDER));
        assert_eq!(receipt.issued_on, date(2024, 3, 3));
        assert_eq!(receipt.filename(), format!("quittance-{tenant_id}-2024-03.pdf"));
    }

    #[test]
    fn test_lines_summed_in_category_order() {
        let (storage, tenant_id) = scenario();
        for (category, amount) in [
            (PaymentCategory::PropertyTax, 80),
            (PaymentCategory::Water, 20),
            (PaymentCategory::Water, 15),
        ] {
            storage
                .insert_payment(&new_payment(tenant_id, category, amount, month(2024, 3)))
                .unwrap();
        }

        let receipt = Receipt::build(&storage, tenant_id, month(2024, 3)).unwrap();

        let categories: Vec<_> = receipt.lines.iter().map(|l| l.category).collect();
        assert_eq!(
            categories,
            [
                PaymentCategory::Rent,
                PaymentCategory::Water,
                PaymentCategory::PropertyTax
            ]
        );
        assert_eq!(receipt.lines[1].amount, euros(35));
        assert_eq!(receipt.total, euros(765));
    }

    #[test]
    fn test_landlord_and_business_identity() {
        let storage = storage();
        let property_id = storage
            .insert_property(&NewProperty {
                kind: PropertyKind::CommercialUnit,
                ..new_property("Local")
            })
            .unwrap();
        let mut tenant = new_tenant(property_id, "");
        tenant.company_name = Some("Boulangerie SARL".to_string());
        tenant.siret = Some("12345678901234".to_string());
        tenant.company_director = Some("Marie Martin".to_string());
        let tenant_id = storage.insert_tenant(&tenant).unwrap();
        storage
            .insert_payment(&new_payment(
                tenant_id,
                PaymentCategory::Rent,
                1200,
                month(2024, 5),
            ))
            .unwrap();
        storage
            .save_landlord(&Landlord {
                name: "SCI Martin".to_string(),
                address: "8 quai Saint-Antoine".to_string(),
                postal_code: Some("69002".to_string()),
                city: Some("Lyon".to_string()),
                ..Landlord::default()
            })
            .unwrap();

        let receipt = Receipt::build(&storage, tenant_id, month(2024, 5)).unwrap();
        let text = receipt.text_lines();

        assert_eq!(receipt.landlord_name(), "SCI Martin");
        assert!(text.iter().any(|l| l == "8 quai Saint-Antoine, 69002 Lyon"));
        assert!(text.iter().any(|l| l == "Boulangerie SARL"));
        assert!(text.iter().any(|l| l == "SIRET : 12345678901234"));
        assert!(text.iter().any(|l| l == "Représentée par : Marie Martin"));
    }

    #[test]
    fn test_unknown_tenant_is_not_found() {
        let err = Receipt::build(&storage(), 42, month(2024, 3)).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "tenant", id: 42 }));
    }

    #[test]
    fn test_month_without_payments_is_not_found() {
        let (storage, tenant_id) = scenario();
        let err = Receipt::build(&storage, tenant_id, month(2024, 4)).unwrap_err();
        assert!(matches!(err, Error::NoPayments { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_pdf_is_byte_identical_across_calls() {
        let (storage, tenant_id) = scenario();

        let first = Receipt::build(&storage, tenant_id, month(2024, 3))
            .unwrap()
            .to_pdf()
            .unwrap();
        let second = Receipt::build(&storage, tenant_id, month(2024, 3))
            .unwrap()
            .to_pdf()
            .unwrap();

        assert!(first.starts_with(b"%PDF-"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrap() {
        let lines = wrap("un deux trois quatre", 9);
        assert_eq!(lines, ["un deux", "trois", "quatre"]);
        assert!(wrap("   ", 10).is_empty());
    }
}
