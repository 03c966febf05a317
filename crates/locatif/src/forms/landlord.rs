use serde::{Deserialize, Serialize};

use super::{is_valid_email, is_valid_siret, optional_text, required_text, FieldErrors};
use crate::model::Landlord;

/// The landlord settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandlordForm {
    /// Person or company name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Postal code.
    pub postal_code: String,
    /// City.
    pub city: String,
    /// Phone.
    pub phone: String,
    /// Email.
    pub email: String,
    /// SIRET number.
    pub siret: String,
}

impl LandlordForm {
    /// Check the submission and build the settings.
    ///
    /// # Errors
    ///
    /// Returns the rejected fields.
    pub fn validate(&self) -> Result<Landlord, FieldErrors> {
        let mut errors = FieldErrors::default();
        let message = "Le nom et l'adresse sont obligatoires.";
        let name = required_text(&mut errors, "name", &self.name, message);
        let address = required_text(&mut errors, "address", &self.address, message);

        let email = optional_text(&self.email);
        if email.as_deref().is_some_and(|e| !is_valid_email(e)) {
            errors.add("email", "Adresse email invalide.");
        }
        let siret = optional_text(&self.siret);
        if siret.as_deref().is_some_and(|s| !is_valid_siret(s)) {
            errors.add(
                "siret",
                "Le numéro SIRET doit contenir exactement 14 chiffres.",
            );
        }

        errors.into_result(Landlord {
            name,
            address,
            postal_code: optional_text(&self.postal_code),
            city: optional_text(&self.city),
            phone: optional_text(&self.phone),
            email,
            siret,
        })
    }
}

impl From<&Landlord> for LandlordForm {
    fn from(landlord: &Landlord) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            name: landlord.name.clone(),
            address: landlord.address.clone(),
            postal_code: text(&landlord.postal_code),
            city: text(&landlord.city),
            phone: text(&landlord.phone),
            email: text(&landlord.email),
            siret: text(&landlord.siret),
        }
    }
}
