//! # Batch Order Audit
//!
//! Recalculates a batch of persisted orders and reports which stored totals
//! disagree with the calculator. Backs the `audit-orders` binary.
//!
//! ```text
//! orders.json ──► [OrderWithItems] ──► audit_order (each) ──► AuditReport
//!                                                                 │
//!                                              render() ◄─────────┘
//!                                              OK       o-1  total ৳183.50
//!                                              MISMATCH o-2  Total mismatch: ...
//! ```

use bistro_core::{audit_order, Order, OrderAudit, OrderItem, RateConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BistroConfig;

/// One exported order with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Audit results for a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub audits: Vec<OrderAudit>,
}

impl AuditReport {
    pub fn mismatch_count(&self) -> usize {
        self.audits.iter().filter(|a| !a.audit.is_valid).count()
    }

    pub fn is_clean(&self) -> bool {
        self.mismatch_count() == 0
    }

    /// One line per order.
    pub fn render(&self, config: &BistroConfig) -> String {
        let mut out = String::new();

        for audit in &self.audits {
            if audit.audit.is_valid {
                out.push_str(&format!(
                    "OK       {}  total {}\n",
                    audit.order_id,
                    config.format_currency(audit.totals.final_total)
                ));
            } else {
                out.push_str(&format!(
                    "MISMATCH {}  {}\n",
                    audit.order_id,
                    audit.audit.errors.join("; ")
                ));
            }
        }

        out.push_str(&format!(
            "{} orders audited, {} mismatched\n",
            self.audits.len(),
            self.mismatch_count()
        ));
        out
    }
}

/// Audits every order in the batch against `rates`.
pub fn audit_batch(batch: &[OrderWithItems], rates: &RateConfig) -> AuditReport {
    let audits: Vec<OrderAudit> = batch
        .iter()
        .map(|entry| audit_order(&entry.order, &entry.items, rates))
        .collect();

    let report = AuditReport { audits };
    info!(
        orders = report.audits.len(),
        mismatched = report.mismatch_count(),
        "Batch audit finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"[
        {
            "order": {
                "id": "o-1",
                "payment_method": "delivery",
                "subtotal": 200,
                "discount": 30,
                "total": 183.5,
                "created_at": "2024-03-01T12:00:00Z"
            },
            "items": [
                { "id": "i-1", "order_id": "o-1", "name": "Chicken Tikka", "price": 100, "quantity": 2 }
            ]
        },
        {
            "order": {
                "id": "o-2",
                "payment_method": "pickup",
                "subtotal": 200,
                "discount": 30,
                "total_price": 190,
                "created_at": "2024-03-01T12:05:00Z"
            },
            "items": [
                { "id": "i-2", "order_id": "o-2", "name": "Chicken Tikka", "price": 100, "quantity": 2 }
            ]
        }
    ]"#;

    fn rates() -> RateConfig {
        RateConfig {
            discount_rate: 0.15,
            ..RateConfig::default()
        }
    }

    #[test]
    fn test_audit_batch() {
        let batch: Vec<OrderWithItems> = serde_json::from_str(BATCH).unwrap();
        let report = audit_batch(&batch, &rates());

        assert_eq!(report.audits.len(), 2);
        assert!(report.audits[0].audit.is_valid);
        assert_eq!(report.audits[1].totals.final_total, 178.5);
        assert_eq!(report.mismatch_count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_render() {
        let batch: Vec<OrderWithItems> = serde_json::from_str(BATCH).unwrap();
        let report = audit_batch(&batch, &rates());
        let rendered = report.render(&BistroConfig::default());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "OK       o-1  total ৳183.50");
        assert_eq!(
            lines[1],
            "MISMATCH o-2  Total mismatch: stored 190.00, calculated 178.50"
        );
        assert_eq!(lines[2], "2 orders audited, 1 mismatched");
    }

    #[test]
    fn test_empty_batch_is_clean() {
        let report = audit_batch(&[], &RateConfig::default());
        assert!(report.is_clean());
        assert_eq!(report.render(&BistroConfig::default()), "0 orders audited, 0 mismatched\n");
    }
}
