use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user as stored. `password` holds the argon2 PHC string, never plaintext.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Customer row with aggregated invoice figures, as listed on the customers page.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    pub total_pending: i64,
    pub total_paid: i64,
}

/// Customer id and name, for the invoice form's select box.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct CustomerField {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: String,
    pub date: String,
}

/// Invoice joined with its customer for listings.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct InvoiceListing {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: String,
    pub date: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Revenue {
    pub month: String,
    pub revenue: i64,
}

/// Stock with the conversion rate of its trading currency.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct StockListing {
    pub ticker: String,
    pub company_name: String,
    pub market: String,
    pub stock_type: String,
    pub currency_code: String,
    pub currency_name: String,
    pub conversion_rate: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Currency {
    pub currency_code: String,
    pub currency_name: String,
    pub conversion_rate: f64,
    pub last_updated: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 2] = [InvoiceStatus::Pending, InvoiceStatus::Paid];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline figures for the dashboard overview.
#[derive(Serialize, Debug, Clone, Default)]
pub struct CardData {
    pub number_of_customers: i64,
    pub number_of_invoices: i64,
    pub total_paid_invoices: String,
    pub total_pending_invoices: String,
}
