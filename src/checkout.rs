//! Checkout processing: deterministic totals, payment confirmation, receipt
//! dispatch
//!
//! Totals are pure arithmetic over normalized line items; everything with a
//! side effect (payment id, receipt email) happens in
//! [`process_checkout`] after validation has passed.

use crate::email::Mailer;
use crate::error::TripFlowError;
use crate::models::{
    CheckoutItem, CheckoutReceipt, CheckoutRequest, CheckoutTotals, EmailDispatch,
};
use rand::RngExt;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

/// Service fee charged on the subtotal
const SERVICE_FEE_RATE: f64 = 0.025;
/// Tax rate applied to the subtotal
const TAX_RATE: f64 = 0.08;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Round to two decimals, half away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether the string is a plausible email address
#[must_use]
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

/// Compute the deterministic charge breakdown for a set of line items.
///
/// Items are normalized first (quantity at least 1, non-finite or negative
/// prices treated as 0). Pure function, no I/O.
#[must_use]
pub fn compute_totals(items: &[CheckoutItem]) -> CheckoutTotals {
    let subtotal = round2(
        items
            .iter()
            .map(CheckoutItem::normalized)
            .map(|item| item.unit_price * f64::from(item.quantity))
            .sum(),
    );
    let service_fee = round2(subtotal * SERVICE_FEE_RATE);
    let taxes = round2(subtotal * TAX_RATE);
    let total = round2(subtotal + service_fee + taxes);

    CheckoutTotals {
        subtotal,
        service_fee,
        taxes,
        total,
    }
}

const ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn payment_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..12)
        .map(|_| ID_CHARS[rng.random_range(0..ID_CHARS.len())] as char)
        .collect();
    format!("pay_{suffix}")
}

fn receipt_text(request: &CheckoutRequest, totals: &CheckoutTotals) -> String {
    let mut lines = vec![format!(
        "Hi {},\n\nThanks for booking with TripFlow. Your charges:",
        request.name.as_deref().unwrap_or("traveler")
    )];
    for item in &request.items {
        let item = item.normalized();
        lines.push(format!(
            "  {} x{} — ${:.2}",
            item.description,
            item.quantity,
            item.unit_price * f64::from(item.quantity)
        ));
    }
    lines.push(format!(
        "\nSubtotal: ${:.2}\nService fee: ${:.2}\nTaxes: ${:.2}\nTotal: ${:.2}",
        totals.subtotal, totals.service_fee, totals.taxes, totals.total
    ));
    lines.join("\n")
}

fn receipt_html(request: &CheckoutRequest, totals: &CheckoutTotals) -> String {
    let rows: String = request
        .items
        .iter()
        .map(CheckoutItem::normalized)
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>${:.2}</td></tr>",
                item.description,
                item.quantity,
                item.unit_price * f64::from(item.quantity)
            )
        })
        .collect();
    format!(
        "<h2>Your TripFlow receipt</h2>\
         <table>{rows}</table>\
         <p>Subtotal: ${:.2}<br>Service fee: ${:.2}<br>Taxes: ${:.2}<br>\
         <strong>Total: ${:.2}</strong></p>",
        totals.subtotal, totals.service_fee, totals.taxes, totals.total
    )
}

/// Validate a checkout request, compute totals, confirm the payment and hand
/// the receipt to the mailer capability.
///
/// Validation failures are returned immediately as structured errors and are
/// never retried. A failed receipt dispatch does not fail the checkout; it
/// is reported through `email_dispatch.success`.
pub async fn process_checkout(
    request: &CheckoutRequest,
    mailer: &dyn Mailer,
) -> crate::Result<CheckoutReceipt> {
    if !validate_email(&request.email) {
        return Err(TripFlowError::validation(format!(
            "'{}' is not a valid email address",
            request.email
        )));
    }
    if request.items.is_empty() {
        return Err(TripFlowError::validation(
            "checkout requires at least one line item",
        ));
    }

    let charges = compute_totals(&request.items);
    let payment_id = payment_id();
    info!(
        "Confirmed payment {} for {} item(s), total ${:.2}",
        payment_id,
        request.items.len(),
        charges.total
    );

    let email_dispatch = match mailer
        .send(
            &request.email,
            "Your TripFlow receipt",
            &receipt_html(request, &charges),
            &receipt_text(request, &charges),
        )
        .await
    {
        Ok(dispatch) => dispatch,
        Err(err) => {
            warn!("Receipt dispatch failed for {}: {:#}", payment_id, err);
            EmailDispatch::failed("smtp")
        }
    };

    Ok(CheckoutReceipt {
        payment_id,
        status: "confirmed".to_string(),
        charges,
        email_dispatch,
    })
}
