//! Quote ledger types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::{is_whole_cents, round_money, to_cents};
use crate::errors::{FflBroError, Result};

/// Surrogate quote key
pub type QuoteId = i64;

/// Quote lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Sent,
    Approved,
    Expired,
    Rejected,
}

crate::impl_domain_status_conversions!(QuoteStatus {
    Pending => "pending",
    Sent => "sent",
    Approved => "approved",
    Expired => "expired",
    Rejected => "rejected",
});

impl QuoteStatus {
    /// Whether `self -> next` is a legal transition.
    ///
    /// `overdue` is true once the quote's `expires_at` has passed; it unlocks
    /// `-> expired` from every status that is not already expired.
    pub fn can_transition_to(self, next: Self, overdue: bool) -> bool {
        use QuoteStatus::{Approved, Expired, Pending, Rejected, Sent};
        match (self, next) {
            (Pending, Sent | Rejected) => true,
            (Sent, Approved | Rejected | Expired) => true,
            (Expired, Expired) => false,
            (_, Expired) => overdue,
            _ => false,
        }
    }

    /// Statuses that flip to `expired` on read once overdue.
    pub fn expires_lazily(self) -> bool {
        matches!(self, Self::Pending | Self::Sent)
    }
}

/// Customer contact details captured on a quote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CustomerInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// One priced line on a quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(description: impl Into<String>, unit_price: Decimal, quantity: u32) -> Self {
        Self { description: description.into(), unit_price, quantity }
    }

    /// `unit_price * quantity`, `InvalidPrice` on overflow.
    pub fn line_total(&self) -> Result<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity)).ok_or_else(|| {
            FflBroError::InvalidPrice(format!(
                "{} x {} overflows",
                self.unit_price, self.quantity
            ))
        })
    }
}

/// Frozen monetary totals of a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl QuoteTotals {
    /// Validate `items` and derive subtotal, flat-rate tax and total.
    pub fn compute(items: &[LineItem], tax_rate: Decimal) -> Result<Self> {
        if items.is_empty() {
            return Err(FflBroError::EmptyLineItems);
        }
        if tax_rate.is_sign_negative() && !tax_rate.is_zero() {
            return Err(FflBroError::InvalidInput(format!("tax rate must not be negative: {tax_rate}")));
        }
        for (index, item) in items.iter().enumerate() {
            if item.unit_price.is_sign_negative() && !item.unit_price.is_zero() {
                return Err(FflBroError::InvalidPrice(format!(
                    "line {}: unit price must not be negative: {}",
                    index + 1,
                    item.unit_price
                )));
            }
            if !is_whole_cents(item.unit_price) {
                return Err(FflBroError::InvalidPrice(format!(
                    "line {}: {} has fractional cents",
                    index + 1,
                    item.unit_price
                )));
            }
            if item.quantity == 0 {
                return Err(FflBroError::InvalidInput(format!("line {}: quantity must be at least 1", index + 1)));
            }
            if item.description.trim().is_empty() {
                return Err(FflBroError::InvalidInput(format!("line {}: description is required", index + 1)));
            }
        }

        let mut subtotal = Decimal::ZERO;
        for item in items {
            subtotal = subtotal.checked_add(item.line_total()?).ok_or_else(|| overflow("subtotal"))?;
        }
        let tax = round_money(subtotal.checked_mul(tax_rate).ok_or_else(|| overflow("tax"))?);
        let total = subtotal.checked_add(tax).ok_or_else(|| overflow("total"))?;

        // Totals are stored as integer cents
        for amount in [subtotal, tax, total] {
            to_cents(amount)?;
        }
        Ok(Self { subtotal, tax, total })
    }
}

fn overflow(what: &str) -> FflBroError {
    FflBroError::InvalidPrice(format!("quote {what} overflows"))
}

/// Quote ready to be stored, before a surrogate id is assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuote {
    pub quote_number: String,
    pub customer: CustomerInfo,
    pub line_items: Vec<LineItem>,
    pub totals: QuoteTotals,
    pub tax_rate: Decimal,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Priced offer presented to a customer
///
/// Totals are derived once at creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub quote_number: String,
    pub customer: CustomerInfo,
    pub line_items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn from_new(id: QuoteId, quote: NewQuote) -> Self {
        Self {
            id,
            quote_number: quote.quote_number,
            customer: quote.customer,
            line_items: quote.line_items,
            subtotal: quote.totals.subtotal,
            tax_rate: quote.tax_rate,
            tax: quote.totals.tax,
            total: quote.totals.total,
            status: quote.status,
            created_at: quote.created_at,
            expires_at: quote.expires_at,
            updated_at: quote.created_at,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Filters for listing quotes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFilter {
    pub status: Option<QuoteStatus>,
    /// Case-insensitive exact match on the customer email.
    pub customer_email: Option<String>,
}

impl QuoteFilter {
    pub fn status(mut self, status: QuoteStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        if let Some(status) = self.status {
            if quote.status != status {
                return false;
            }
        }
        match (&self.customer_email, &quote.customer.email) {
            (None, _) => true,
            (Some(wanted), Some(email)) => wanted.eq_ignore_ascii_case(email),
            (Some(_), None) => false,
        }
    }
}
