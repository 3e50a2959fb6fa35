//! Checkout models: line items, computed totals, receipts

use serde::{Deserialize, Serialize};

/// Maximum stored length of a line-item description
pub const MAX_DESCRIPTION_LEN: usize = 300;

/// Bookable line-item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutItemCategory {
    Flight,
    Hotel,
    Car,
}

/// One line item of a checkout request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub category: CheckoutItemCategory,
    pub description: String,
    pub unit_price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CheckoutItem {
    /// Normalize a caller-supplied item: quantity at least 1, unit price a
    /// finite non-negative number, description capped at
    /// [`MAX_DESCRIPTION_LEN`] characters.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let unit_price = if self.unit_price.is_finite() && self.unit_price >= 0.0 {
            self.unit_price
        } else {
            0.0
        };
        Self {
            category: self.category,
            description: self
                .description
                .chars()
                .take(MAX_DESCRIPTION_LEN)
                .collect(),
            unit_price,
            quantity: self.quantity.max(1),
        }
    }
}

/// Deterministic charge breakdown for a set of line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub subtotal: f64,
    pub service_fee: f64,
    pub taxes: f64,
    pub total: f64,
}

/// Inbound checkout request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
}

/// Report from the mailer capability after a dispatch attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDispatch {
    pub success: bool,
    /// Transport that handled the message ("smtp" or "file")
    pub transport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl EmailDispatch {
    /// A dispatch report for a failed send attempt
    #[must_use]
    pub fn failed(transport: &str) -> Self {
        Self {
            success: false,
            transport: transport.to_string(),
            id: None,
            file_path: None,
        }
    }
}

/// Outcome of a successful checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub payment_id: String,
    pub status: String,
    pub charges: CheckoutTotals,
    pub email_dispatch: EmailDispatch,
}
