use serde::{Deserialize, Serialize};

use super::{amount_or, optional_date, optional_text, required_text, FieldErrors};
use crate::model::{Amount, NewProperty, Property, PropertyKind};

/// The property create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyForm {
    /// Display name.
    pub name: String,
    /// `apartment` or `commercial_unit`.
    pub kind: String,
    /// Street address.
    pub address: String,
    /// Surface in square meters, comma or dot decimals.
    pub area_m2: String,
    /// Free-form description.
    pub description: String,
    /// Monthly charges in euros.
    pub monthly_charges: String,
    /// Acquisition date, `YYYY-MM-DD`.
    pub acquired_on: String,
}

impl PropertyForm {
    /// Check the submission and build the record draft.
    ///
    /// # Errors
    ///
    /// Returns the rejected fields.
    pub fn validate(&self) -> Result<NewProperty, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = required_text(
            &mut errors,
            "name",
            &self.name,
            "Le nom du bien est obligatoire.",
        );
        let address = required_text(
            &mut errors,
            "address",
            &self.address,
            "L'adresse est obligatoire.",
        );
        let kind = self.kind.parse::<PropertyKind>().unwrap_or_else(|_| {
            errors.add("kind", "Type de bien inconnu.");
            PropertyKind::Apartment
        });

        let area_m2 = match self.area_m2.trim().replace(',', ".") {
            blank if blank.is_empty() => None,
            text => match text.parse::<f64>() {
                Ok(area) if area.is_finite() && area >= 0.0 => Some(area),
                _ => {
                    errors.add("area_m2", "La surface doit être un nombre positif.");
                    None
                }
            },
        };

        let monthly_charges = amount_or(
            &mut errors,
            "monthly_charges",
            &self.monthly_charges,
            Amount::ZERO,
            "Les charges mensuelles ne peuvent pas être négatives.",
        );
        let acquired_on = optional_date(&mut errors, "acquired_on", &self.acquired_on);

        errors.into_result(NewProperty {
            name,
            kind,
            address,
            area_m2,
            description: optional_text(&self.description),
            monthly_charges,
            acquired_on,
        })
    }
}

impl From<&Property> for PropertyForm {
    fn from(property: &Property) -> Self {
        Self {
            name: property.name.clone(),
            kind: property.kind.as_str().to_string(),
            address: property.address.clone(),
            area_m2: property.area_m2.map(|a| a.to_string()).unwrap_or_default(),
            description: property.description.clone().unwrap_or_default(),
            monthly_charges: property.monthly_charges.to_input_string(),
            acquired_on: property
                .acquired_on
                .map(|d| d.to_string())
                .unwrap_or_default(),
        }
    }
}
