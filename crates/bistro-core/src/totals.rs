//! # Order Total Calculator
//!
//! Turns a list of line items and a [`RateConfig`] into [`OrderTotals`].
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Σ(unit_price × quantity) ───────────────────────────► subtotal         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  subtotal × discount_rate ───────────────────────────► discount_amount  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  subtotal − discount_amount ─────────────────────────► discounted       │
//! │        │                                                                │
//! │        ├──► discounted × vat_rate ───────────────────► vat_amount       │
//! │        │                                                                │
//! │        └──► pickup OR discounted ≥ threshold ? 0 : fee ► delivery       │
//! │                                                                         │
//! │  discounted + vat_amount + delivery ─────────────────► final_total      │
//! │                                                                         │
//! │  VAT is charged on the DISCOUNTED subtotal. Do not reorder.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No rounding happens here. Results are the exact f64 arithmetic the web
//! client performs, so an audit compares like with like.

use crate::types::{LineItem, LineTotal, OrderTotals, RateConfig, RawLineItem};

/// Computes the totals for an order.
///
/// Pure and deterministic: identical input gives bit-identical output.
/// Rates are sanitised first, so out-of-range or non-finite values can never
/// produce NaN or a negative total.
///
/// ## Edge Case
/// An empty delivery order still owes the delivery fee: its total is the fee
/// alone.
///
/// ## Example
/// ```rust
/// use bistro_core::totals::calculate_order_totals;
/// use bistro_core::{LineItem, PaymentMethod, RateConfig};
///
/// let rates = RateConfig {
///     discount_rate: 0.15,
///     payment_method: PaymentMethod::Pickup,
///     ..RateConfig::default()
/// };
/// let totals = calculate_order_totals(&[LineItem::new(100.0, 2)], &rates);
///
/// assert_eq!(totals.delivery_amount, 0.0);
/// assert_eq!(totals.final_total, 178.5);
/// ```
pub fn calculate_order_totals(items: &[LineItem], rates: &RateConfig) -> OrderTotals {
    let rates = rates.sanitized();

    let breakdown: Vec<LineTotal> = items
        .iter()
        .map(|item| {
            // LineItem fields are public; re-coerce in case they were set directly
            let item = LineItem::new(item.unit_price, item.quantity);
            let line_total = item.line_total();
            LineTotal {
                unit_price: item.unit_price,
                quantity: item.quantity,
                line_total: if line_total.is_finite() { line_total } else { 0.0 },
            }
        })
        .collect();

    let subtotal: f64 = breakdown.iter().map(|line| line.line_total).sum();
    let subtotal = if subtotal.is_finite() { subtotal } else { 0.0 };

    let discount_amount = subtotal * rates.discount_rate;
    let discounted_subtotal = (subtotal - discount_amount).max(0.0);
    let vat_amount = discounted_subtotal * rates.vat_rate;

    let is_free_delivery = discounted_subtotal >= rates.free_delivery_threshold;
    let delivery_amount = if !rates.payment_method.is_delivered() || is_free_delivery {
        0.0
    } else {
        rates.delivery_fee
    };

    let final_total = discounted_subtotal + vat_amount + delivery_amount;

    OrderTotals {
        subtotal,
        discount_amount,
        discounted_subtotal,
        vat_amount,
        delivery_amount,
        final_total,
        is_free_delivery,
        breakdown,
    }
}

/// Computes totals straight from boundary input.
///
/// Missing or garbage prices and quantities count as zero. When `rates` is
/// `None` the defaults apply (5% VAT, fee 5, free delivery from 875).
pub fn calculate_from_raw(items: &[RawLineItem], rates: Option<&RateConfig>) -> OrderTotals {
    let items: Vec<LineItem> = items.iter().map(LineItem::from).collect();
    let defaults = RateConfig::default();
    calculate_order_totals(&items, rates.unwrap_or(&defaults))
}

// =============================================================================
// Unit Tests
// =============================================================================
