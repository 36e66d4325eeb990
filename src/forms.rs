use serde::{Deserialize, Serialize};

use crate::structs::InvoiceStatus;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;
/// Largest amount one invoice may carry, in dollars. Keeps dashboard sums well inside i64 cents.
pub const MAX_INVOICE_DOLLARS: f64 = 10_000_000.0;

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl Login {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Per-field validation messages. Empty vectors mean the field is fine.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupErrors {
    pub name: Vec<String>,
    pub email: Vec<String>,
    pub password: Vec<String>,
}

impl SignupErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.password.is_empty()
    }
}

/// Sign-up input after validation, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Signup {
    pub fn validate(&self) -> Result<ValidSignup, SignupErrors> {
        let mut errors = SignupErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.name.push("Name is required".to_owned());
        }

        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            errors.email.push("Email is required".to_owned());
        } else if !is_plausible_email(&email) {
            errors.email.push("Invalid email address".to_owned());
        }

        let password_len = self.password.chars().count();
        if password_len == 0 {
            errors.password.push("Password is required".to_owned());
        } else if password_len < MIN_PASSWORD_LEN {
            errors.password.push(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            ));
        } else if password_len > MAX_PASSWORD_LEN {
            errors.password.push(format!(
                "Password must be at most {} characters long",
                MAX_PASSWORD_LEN
            ));
        }

        if errors.is_empty() {
            Ok(ValidSignup {
                name: name.to_owned(),
                email,
                password: self.password.clone(),
            })
        } else {
            Err(errors)
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Raw invoice form. `amount` is in dollars as typed by the user.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct InvoiceForm {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceErrors {
    pub customer_id: Vec<String>,
    pub amount: Vec<String>,
    pub status: Vec<String>,
}

impl InvoiceErrors {
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_empty() && self.amount.is_empty() && self.status.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInvoice {
    pub customer_id: String,
    /// Minor units (cents).
    pub amount: i64,
    pub status: InvoiceStatus,
}

impl InvoiceForm {
    pub fn validate(&self) -> Result<ValidInvoice, InvoiceErrors> {
        let mut errors = InvoiceErrors::default();

        let customer_id = self.customer_id.trim();
        if customer_id.is_empty() {
            errors.customer_id.push("Please select a customer.".to_owned());
        }

        let amount = match self.amount.trim().parse::<f64>() {
            Ok(dollars) if dollars.is_finite() && dollars > MAX_INVOICE_DOLLARS => {
                errors
                    .amount
                    .push("Please enter an amount no greater than $10,000,000.".to_owned());
                None
            }
            Ok(dollars) if dollars.is_finite() && dollars > 0.0 => Some((dollars * 100.0).round() as i64),
            _ => {
                errors
                    .amount
                    .push("Please enter an amount greater than $0.".to_owned());
                None
            }
        };

        let status = InvoiceStatus::parse(self.status.trim());
        if status.is_none() {
            errors
                .status
                .push("Please select an invoice status.".to_owned());
        }

        match (amount, status) {
            (Some(amount), Some(status)) if errors.is_empty() => Ok(ValidInvoice {
                customer_id: customer_id.to_owned(),
                amount,
                status,
            }),
            _ => Err(errors),
        }
    }
}
