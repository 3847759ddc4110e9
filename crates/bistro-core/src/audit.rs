//! # Order Calculation Audit
//!
//! Compares the totals persisted on an order row with a fresh recalculation.
//!
//! ## Where It Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order card render / admin review / audit-orders CLI                    │
//! │                                                                         │
//! │  orders row ──► StoredTotals { subtotal, total, discount }             │
//! │                        │                                                │
//! │  order_items rows ──► calculate_order_totals ──► OrderTotals           │
//! │                        │                              │                 │
//! │                        └──────────┬───────────────────┘                 │
//! │                                   ▼                                     │
//! │                    validate_order_calculation ← THIS MODULE             │
//! │                                   │                                     │
//! │                ┌──────────────────┴──────────────────┐                  │
//! │                ▼                                     ▼                  │
//! │           is_valid = true                   errors = ["Total ..."]      │
//! │           (render normally)                 (show discrepancy banner)  │
//! │                                                                         │
//! │  READ-ONLY: nothing here ever corrects persisted data.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::money::safe_num;
use crate::totals::calculate_order_totals;
use crate::types::{LineItem, Order, OrderItem, OrderTotals, RateConfig, StoredTotals};
use crate::CALCULATION_TOLERANCE;

/// Outcome of comparing stored totals with recalculated ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculationAudit {
    pub is_valid: bool,
    /// One human-readable message per mismatched field.
    pub errors: Vec<String>,
}

/// Full audit of one persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderAudit {
    pub order_id: String,
    pub totals: OrderTotals,
    pub audit: CalculationAudit,
}

/// Checks persisted totals against a recalculation.
///
/// Compares `subtotal`, `total` (against `final_total`) and `discount`
/// (against `discount_amount`). Values more than one cent apart are
/// reported. Missing stored values count as zero.
///
/// ## Example
/// ```rust
/// use bistro_core::audit::validate_order_calculation;
/// use bistro_core::totals::calculate_order_totals;
/// use bistro_core::{LineItem, RateConfig, StoredTotals};
///
/// let rates = RateConfig { discount_rate: 0.15, ..RateConfig::default() };
/// let fresh = calculate_order_totals(&[LineItem::new(100.0, 2)], &rates);
///
/// let audit = validate_order_calculation(&StoredTotals::new(200.0, 183.5, 30.0), &fresh);
/// assert!(audit.is_valid);
///
/// let audit = validate_order_calculation(&StoredTotals::new(200.0, 190.0, 30.0), &fresh);
/// assert!(!audit.is_valid);
/// assert_eq!(audit.errors.len(), 1);
/// ```
pub fn validate_order_calculation(
    stored: &StoredTotals,
    recalculated: &OrderTotals,
) -> CalculationAudit {
    let checks = [
        ("Subtotal", stored.subtotal, recalculated.subtotal),
        ("Total", stored.total, recalculated.final_total),
        ("Discount", stored.discount, recalculated.discount_amount),
    ];

    let errors: Vec<String> = checks
        .iter()
        .filter_map(|&(field, stored_value, calculated)| {
            let stored_value = safe_num(stored_value);
            let calculated = safe_num(Some(calculated));
            if (stored_value - calculated).abs() > CALCULATION_TOLERANCE {
                Some(format!(
                    "{} mismatch: stored {:.2}, calculated {:.2}",
                    field, stored_value, calculated
                ))
            } else {
                None
            }
        })
        .collect();

    CalculationAudit {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Recalculates a persisted order from its items and audits the stored totals.
///
/// The order's own payment method overrides the one in `rates`, since that is
/// what decided the delivery fee at checkout.
pub fn audit_order(order: &Order, items: &[OrderItem], rates: &RateConfig) -> OrderAudit {
    let line_items: Vec<LineItem> = items
        .iter()
        .filter(|item| item.order_id == order.id)
        .map(OrderItem::line_item)
        .collect();

    let rates = rates.with_payment_method(order.payment_method);
    let totals = calculate_order_totals(&line_items, &rates);
    let audit = validate_order_calculation(&order.stored_totals(), &totals);

    if audit.is_valid {
        debug!(order_id = %order.id, total = totals.final_total, "Order totals verified");
    } else {
        warn!(
            order_id = %order.id,
            mismatches = audit.errors.len(),
            errors = ?audit.errors,
            "Order totals do not match recalculation"
        );
    }

    OrderAudit {
        order_id: order.id.clone(),
        totals,
        audit,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, PaymentMethod};
    use chrono::Utc;

    fn discounted_rates() -> RateConfig {
        RateConfig {
            discount_rate: 0.15,
            ..RateConfig::default()
        }
    }

    fn recalculated() -> OrderTotals {
        calculate_order_totals(&[LineItem::new(100.0, 2)], &discounted_rates())
    }

    fn order(payment_method: PaymentMethod, total: f64) -> Order {
        Order {
            id: "order-1".to_string(),
            user_id: Some("user-1".to_string()),
            status: OrderStatus::Confirmed,
            payment_method,
            subtotal: Some(200.0),
            discount: Some(30.0),
            total: Some(total),
            delivery_address: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn item(order_id: &str, price: f64, quantity: f64) -> OrderItem {
        OrderItem {
            id: format!("{}-{}", order_id, price),
            order_id: order_id.to_string(),
            menu_item_id: None,
            name: "Chicken Roast".to_string(),
            price: Some(price),
            quantity: Some(quantity),
        }
    }

    #[test]
    fn test_matching_totals_are_valid() {
        let audit = validate_order_calculation(&StoredTotals::new(200.0, 183.5, 30.0), &recalculated());
        assert!(audit.is_valid);
        assert!(audit.errors.is_empty());
    }

    #[test]
    fn test_total_mismatch_reported_once() {
        let audit = validate_order_calculation(&StoredTotals::new(200.0, 190.0, 30.0), &recalculated());
        assert!(!audit.is_valid);
        assert_eq!(audit.errors.len(), 1);
        assert_eq!(audit.errors[0], "Total mismatch: stored 190.00, calculated 183.50");
    }

    #[test]
    fn test_within_one_cent_is_tolerated() {
        let audit =
            validate_order_calculation(&StoredTotals::new(200.005, 183.495, 30.0), &recalculated());
        assert!(audit.is_valid);

        let audit = validate_order_calculation(&StoredTotals::new(200.02, 183.5, 30.0), &recalculated());
        assert!(!audit.is_valid);
        assert!(audit.errors[0].starts_with("Subtotal mismatch"));
    }

    #[test]
    fn test_every_field_checked() {
        let audit = validate_order_calculation(&StoredTotals::new(1.0, 2.0, 3.0), &recalculated());
        assert_eq!(audit.errors.len(), 3);
        assert!(audit.errors[2].starts_with("Discount mismatch"));
    }

    #[test]
    fn test_missing_stored_fields_count_as_zero() {
        let audit = validate_order_calculation(&StoredTotals::default(), &recalculated());
        assert_eq!(audit.errors.len(), 3);

        let empty = calculate_order_totals(
            &[],
            &RateConfig::default().with_payment_method(PaymentMethod::Pickup),
        );
        let audit = validate_order_calculation(&StoredTotals::default(), &empty);
        assert!(audit.is_valid);
    }

    #[test]
    fn test_inputs_untouched() {
        let stored = StoredTotals::new(200.0, 190.0, 30.0);
        let fresh = recalculated();
        let _ = validate_order_calculation(&stored, &fresh);
        assert_eq!(stored, StoredTotals::new(200.0, 190.0, 30.0));
        assert_eq!(fresh, recalculated());
    }

    #[test]
    fn test_audit_order_uses_order_payment_method() {
        let items = [item("order-1", 100.0, 2.0)];

        // Stored as pickup: 178.5 with no fee
        let audit = audit_order(&order(PaymentMethod::Pickup, 178.5), &items, &discounted_rates());
        assert!(audit.audit.is_valid);
        assert_eq!(audit.totals.delivery_amount, 0.0);

        // Same stored total on a delivery order is missing the fee
        let audit = audit_order(&order(PaymentMethod::Cash, 178.5), &items, &discounted_rates());
        assert!(!audit.audit.is_valid);
        assert_eq!(audit.order_id, "order-1");
    }

    #[test]
    fn test_audit_order_ignores_foreign_items() {
        let items = [item("order-1", 100.0, 2.0), item("order-2", 999.0, 5.0)];
        let audit = audit_order(&order(PaymentMethod::Delivery, 183.5), &items, &discounted_rates());
        assert!(audit.audit.is_valid);
        assert_eq!(audit.totals.breakdown.len(), 1);
    }
}
