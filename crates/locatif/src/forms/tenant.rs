use serde::{Deserialize, Serialize};

use super::{
    amount_or, is_valid_email, is_valid_siret, optional_date, optional_text, required_amount,
    required_date, selected_id, FieldErrors,
};
use crate::model::{Amount, NewTenant, Property, Tenant};

/// The tenant create/edit form.
///
/// Which identity fields are required depends on the chosen property: a
/// commercial unit is leased to a company, an apartment to a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantForm {
    /// Family name.
    pub last_name: String,
    /// Given name.
    pub first_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Birth date, `YYYY-MM-DD`.
    pub birth_date: String,
    /// Company name.
    pub company_name: String,
    /// SIRET number.
    pub siret: String,
    /// Company director.
    pub company_director: String,
    /// Id of the leased property.
    pub property_id: String,
    /// Lease start, `YYYY-MM-DD`.
    pub lease_start: String,
    /// Lease end, `YYYY-MM-DD`.
    pub lease_end: String,
    /// Monthly rent in euros.
    pub monthly_rent: String,
    /// Security deposit in euros.
    pub deposit: String,
    /// Day of the month the rent is due.
    pub payment_day: String,
    /// Present (as `on`) when the active checkbox is ticked.
    pub active: Option<String>,
}

impl TenantForm {
    /// A blank form for a new lease: active, due on the 1st.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            payment_day: "1".to_string(),
            active: Some("on".to_string()),
            ..Self::default()
        }
    }

    /// Check the submission against the known properties and build the draft.
    ///
    /// # Errors
    ///
    /// Returns the rejected fields.
    pub fn validate(&self, properties: &[Property]) -> Result<NewTenant, FieldErrors> {
        let mut errors = FieldErrors::default();

        let property = match selected_id(&self.property_id) {
            None => {
                errors.add("property_id", "Veuillez sélectionner un bien.");
                None
            }
            Some(id) => {
                let found = properties.iter().find(|p| p.id == id);
                if found.is_none() {
                    errors.add("property_id", "Le bien sélectionné est introuvable.");
                }
                found
            }
        };

        let last_name = self.last_name.trim().to_string();
        let first_name = optional_text(&self.first_name);
        let company_name = optional_text(&self.company_name);
        let siret = optional_text(&self.siret);

        match property {
            Some(p) if p.is_commercial() => {
                if company_name.is_none() {
                    errors.add(
                        "company_name",
                        "La raison sociale est obligatoire pour un local commercial.",
                    );
                }
                if siret.is_none() {
                    errors.add(
                        "siret",
                        "Le numéro SIRET est obligatoire pour un local commercial.",
                    );
                }
            }
            Some(_) => {
                if last_name.is_empty() {
                    errors.add("last_name", "Le nom et le prénom sont obligatoires.");
                }
                if first_name.is_none() {
                    errors.add("first_name", "Le nom et le prénom sont obligatoires.");
                }
            }
            None => {}
        }
        if let Some(s) = &siret {
            if !is_valid_siret(s) {
                errors.add(
                    "siret",
                    "Le numéro SIRET doit contenir exactement 14 chiffres.",
                );
            }
        }

        let email = optional_text(&self.email);
        if let Some(e) = &email {
            if !is_valid_email(e) {
                errors.add("email", "Adresse email invalide.");
            }
        }

        let birth_date = optional_date(&mut errors, "birth_date", &self.birth_date);
        let lease_start = required_date(
            &mut errors,
            "lease_start",
            &self.lease_start,
            "La date de début de bail est obligatoire.",
        );
        let lease_end = optional_date(&mut errors, "lease_end", &self.lease_end);
        if let (Some(start), Some(end)) = (lease_start, lease_end) {
            if end < start {
                errors.add(
                    "lease_end",
                    "La date de fin de bail doit être postérieure à la date de début.",
                );
            }
        }

        let monthly_rent = required_amount(
            &mut errors,
            "monthly_rent",
            &self.monthly_rent,
            "Le loyer mensuel doit être un nombre positif.",
        );
        let deposit = amount_or(
            &mut errors,
            "deposit",
            &self.deposit,
            Amount::ZERO,
            "Le dépôt de garantie ne peut pas être négatif.",
        );

        let payment_day = match self.payment_day.trim() {
            "" => 1,
            text => match text.parse::<u8>() {
                Ok(day) if (1..=28).contains(&day) => day,
                _ => {
                    errors.add(
                        "payment_day",
                        "Le jour de paiement doit être entre 1 et 28.",
                    );
                    1
                }
            },
        };

        match (property, lease_start, monthly_rent) {
            (Some(property), Some(lease_start), Some(monthly_rent)) if errors.is_empty() => {
                Ok(NewTenant {
                    last_name,
                    first_name,
                    email,
                    phone: optional_text(&self.phone),
                    birth_date,
                    company_name,
                    siret,
                    company_director: optional_text(&self.company_director),
                    property_id: property.id,
                    lease_start,
                    lease_end,
                    monthly_rent,
                    deposit,
                    payment_day,
                    active: self.active.is_some(),
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&Tenant> for TenantForm {
    fn from(tenant: &Tenant) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            last_name: tenant.last_name.clone(),
            first_name: text(&tenant.first_name),
            email: text(&tenant.email),
            phone: text(&tenant.phone),
            birth_date: tenant.birth_date.map(|d| d.to_string()).unwrap_or_default(),
            company_name: text(&tenant.company_name),
            siret: text(&tenant.siret),
            company_director: text(&tenant.company_director),
            property_id: tenant.property_id.to_string(),
            lease_start: tenant.lease_start.to_string(),
            lease_end: tenant.lease_end.map(|d| d.to_string()).unwrap_or_default(),
            monthly_rent: tenant.monthly_rent.to_input_string(),
            deposit: tenant.deposit.to_input_string(),
            payment_day: tenant.payment_day.to_string(),
            active: tenant.active.then(|| "on".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyKind;

    fn properties() -> Vec<Property> {
        let property = |id, kind| Property {
            id,
            name: format!("Bien {id}"),
            kind,
            address: "12 Rue A".to_string(),
            area_m2: None,
            description: None,
            monthly_charges: Amount::ZERO,
            acquired_on: None,
        };
        vec![
            property(1, PropertyKind::Apartment),
            property(2, PropertyKind::CommercialUnit),
        ]
    }

    fn person_form() -> TenantForm {
        TenantForm {
            last_name: "Dupont".to_string(),
            first_name: "Jean".to_string(),
            property_id: "1".to_string(),
            lease_start: "2024-01-01".to_string(),
            monthly_rent: "650".to_string(),
            ..TenantForm::blank()
        }
    }

    fn business_form() -> TenantForm {
        TenantForm {
            company_name: "Boulangerie SARL".to_string(),
            siret: "12345678901234".to_string(),
            property_id: "2".to_string(),
            lease_start: "2024-01-01".to_string(),
            monthly_rent: "1200".to_string(),
            ..TenantForm::blank()
        }
    }

    #[test]
    fn test_valid_person() {
        let draft = person_form().validate(&properties()).unwrap();
        assert_eq!(draft.property_id, 1);
        assert_eq!(draft.payment_day, 1);
        assert!(draft.active);
        assert_eq!(draft.deposit, Amount::ZERO);
    }

    #[test]
    fn test_person_requires_both_names() {
        let mut form = person_form();
        form.first_name = " ".to_string();
        let errors = form.validate(&properties()).unwrap_err();
        assert!(errors.get("first_name").is_some());
    }

    #[test]
    fn test_valid_business_without_person_names() {
        let draft = business_form().validate(&properties()).unwrap();
        assert_eq!(draft.company_name.as_deref(), Some("Boulangerie SARL"));
        assert_eq!(draft.last_name, "");
    }

    #[test]
    fn test_business_requires_company_and_siret() {
        let mut form = business_form();
        form.company_name = String::new();
        form.siret = String::new();
        let errors = form.validate(&properties()).unwrap_err();
        assert!(errors.get("company_name").is_some());
        assert_eq!(
            errors.get("siret"),
            Some("Le numéro SIRET est obligatoire pour un local commercial.")
        );
    }

    #[test]
    fn test_siret_must_have_14_digits() {
        let mut form = business_form();
        form.siret = "1234".to_string();
        let errors = form.validate(&properties()).unwrap_err();
        assert_eq!(
            errors.get("siret"),
            Some("Le numéro SIRET doit contenir exactement 14 chiffres.")
        );
    }

    #[test]
    fn test_unknown_or_missing_property() {
        let mut form = person_form();
        form.property_id = "99".to_string();
        assert!(form
            .validate(&properties())
            .unwrap_err()
            .get("property_id")
            .is_some());

        form.property_id = String::new();
        assert_eq!(
            form.validate(&properties()).unwrap_err().get("property_id"),
            Some("Veuillez sélectionner un bien.")
        );
    }

    #[test]
    fn test_lease_and_money_rules() {
        let mut form = person_form();
        form.lease_end = "2023-12-31".to_string();
        form.monthly_rent = "-1".to_string();
        form.deposit = "-1".to_string();
        form.payment_day = "31".to_string();
        form.active = None;
        let errors = form.validate(&properties()).unwrap_err();
        for field in ["lease_end", "monthly_rent", "deposit", "payment_day"] {
            assert!(errors.get(field).is_some(), "{field} accepted");
        }
    }

    #[test]
    fn test_missing_lease_start_and_rent() {
        let mut form = person_form();
        form.lease_start = String::new();
        form.monthly_rent = String::new();
        let errors = form.validate(&properties()).unwrap_err();
        assert!(errors.get("lease_start").is_some());
        assert!(errors.get("monthly_rent").is_some());
    }

    #[test]
    fn test_unchecked_active_means_inactive() {
        let mut form = person_form();
        form.active = None;
        assert!(!form.validate(&properties()).unwrap().active);
    }

    #[test]
    fn test_prefill_roundtrip() {
        let tenant = business_form()
            .validate(&properties())
            .unwrap()
            .with_id(9);
        let refilled = TenantForm::from(&tenant);
        assert_eq!(refilled.validate(&properties()).unwrap().with_id(9), tenant);
    }
}
