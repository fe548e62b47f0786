//! Customer details and the field rules checked before an order is sent.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use silvers_core::ValidationProfile;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email regex"));

/// 15-character tax identifier: state code, PAN, entity number, `Z`, checksum.
static TAX_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("valid tax id regex")
});

const NO_ADDRESS: &str = "Address not provided";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// `"{street}, {city}"` with dangling separators trimmed, or
    /// `"Address not provided"` when both parts are blank.
    #[must_use]
    pub fn format_line(address: Option<&Address>) -> String {
        let Some(address) = address else {
            return NO_ADDRESS.to_string();
        };
        let line = [address.street.trim(), address.city.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if line.is_empty() {
            NO_ADDRESS.to_string()
        } else {
            line
        }
    }
}

/// What the customer entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub shipping_address: Option<Address>,
    /// Falls back to the shipping address when absent.
    pub billing_address: Option<Address>,
    pub tax_id: Option<String>,
}

impl CustomerDetails {
    #[must_use]
    pub fn shipping_line(&self) -> String {
        Address::format_line(self.shipping_address.as_ref())
    }

    #[must_use]
    pub fn billing_line(&self) -> String {
        Address::format_line(
            self.billing_address
                .as_ref()
                .or(self.shipping_address.as_ref()),
        )
    }

    /// Uppercased tax identifier, if one was entered.
    #[must_use]
    pub fn normalized_tax_id(&self) -> Option<String> {
        self.tax_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_uppercase)
    }

    /// Checks the details against `profile`, collecting every failing field.
    ///
    /// # Errors
    ///
    /// Returns the field → message map when any rule fails.
    pub fn validate(&self, profile: ValidationProfile) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email", "Email is required");
        }

        if profile == ValidationProfile::Strict {
            self.validate_strict(email, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_strict(&self, email: &str, errors: &mut ValidationErrors) {
        if !email.is_empty() && !EMAIL_RE.is_match(email) {
            errors.insert("email", "Email is invalid");
        }

        let phone = self.phone.as_deref().unwrap_or_default().trim();
        if phone.is_empty() {
            errors.insert("phone", "Phone number is required");
        } else if phone.chars().filter(char::is_ascii_digit).count() != 10 {
            errors.insert("phone", "Phone number must be 10 digits");
        }

        let shipping = self.shipping_address.clone().unwrap_or_default();
        if shipping.street.trim().is_empty() {
            errors.insert("address", "Address is required");
        }
        if shipping.city.trim().is_empty() {
            errors.insert("location", "Location is required");
        }

        match self.normalized_tax_id() {
            None => errors.insert("tax_id", "Tax ID is required"),
            Some(id) if id.chars().count() != 15 => {
                errors.insert("tax_id", "Tax ID must be 15 characters");
            }
            Some(id) if !TAX_ID_RE.is_match(&id) => {
                errors.insert("tax_id", "Tax ID format is invalid");
            }
            Some(_) => {}
        }
    }
}

/// Field name → message for every rule that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    fn insert(&mut self, field: &'static str, message: &str) {
        self.0.insert(field, message.to_string());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
