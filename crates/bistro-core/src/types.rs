//! # Domain Types
//!
//! Core domain types used throughout Bistro.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  CALCULATION INPUTS           CALCULATION OUTPUTS                      │
//! │  ┌─────────────────┐          ┌─────────────────┐                       │
//! │  │  RawLineItem    │─sanitise►│   LineItem      │                       │
//! │  │  price?  qty?   │          │  unit_price     │──┐                    │
//! │  └─────────────────┘          │  quantity       │  │                    │
//! │  ┌─────────────────┐          └─────────────────┘  ▼                    │
//! │  │  RateConfig     │──────────────────────► OrderTotals                 │
//! │  │  discount, VAT  │                         subtotal … final_total    │
//! │  │  fee, threshold │                              │                     │
//! │  │  PaymentMethod  │                              ▼                     │
//! │  └─────────────────┘          StoredTotals ──► CalculationAudit         │
//! │                                                                         │
//! │  PERSISTED ROWS (hosted database, read-only here)                      │
//! │  Order ─┬─ OrderItem        Reservation        MenuItem                 │
//! │         └─ OrderStatus      ReservationStatus                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{self, Money};

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays and receives the order.
///
/// Only `Pickup` skips the delivery fee; cash and mobile-wallet orders are
/// delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Customer collects at the counter.
    Pickup,
    /// Delivered, paid online.
    #[default]
    Delivery,
    /// Delivered, cash on delivery.
    Cash,
    /// Delivered, paid through a mobile wallet.
    #[serde(alias = "mobile_wallet")]
    MobileWallet,
}

impl PaymentMethod {
    /// Returns true if the order leaves the restaurant.
    #[inline]
    pub const fn is_delivered(&self) -> bool {
        !matches!(self, PaymentMethod::Pickup)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Pickup => write!(f, "pickup"),
            PaymentMethod::Delivery => write!(f, "delivery"),
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::MobileWallet => write!(f, "mobile-wallet"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pickup" => Ok(PaymentMethod::Pickup),
            "delivery" => Ok(PaymentMethod::Delivery),
            "cash" => Ok(PaymentMethod::Cash),
            "mobile-wallet" | "mobile_wallet" => Ok(PaymentMethod::MobileWallet),
            other => Err(ValidationError::InvalidFormat {
                field: "payment_method".to_string(),
                reason: format!(
                    "unknown payment method '{}', expected pickup, delivery, cash or mobile-wallet",
                    other
                ),
            }),
        }
    }
}

// =============================================================================
// Rate Configuration
// =============================================================================

/// Rates applied to an order.
///
/// Deserialises from partial input: every missing field takes its default.
///
/// ## Defaults
/// - discount: 0%
/// - VAT: 5%
/// - delivery fee: 5
/// - free delivery from a discounted subtotal of 875
/// - payment method: delivery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct RateConfig {
    /// Fraction of the subtotal taken off (0.15 = 15%).
    #[serde(alias = "discount_rate")]
    pub discount_rate: f64,

    /// VAT fraction charged on the discounted subtotal.
    #[serde(alias = "vat_rate")]
    pub vat_rate: f64,

    /// Flat delivery charge.
    #[serde(alias = "delivery_fee")]
    pub delivery_fee: f64,

    /// Discounted subtotal at which delivery becomes free.
    #[serde(alias = "free_delivery_threshold")]
    pub free_delivery_threshold: f64,

    #[serde(alias = "payment_method")]
    pub payment_method: PaymentMethod,
}

impl Default for RateConfig {
    fn default() -> Self {
        RateConfig {
            discount_rate: 0.0,
            vat_rate: 0.05,
            delivery_fee: 5.0,
            free_delivery_threshold: 875.0,
            payment_method: PaymentMethod::Delivery,
        }
    }
}

impl RateConfig {
    /// Returns a copy with every field coerced into its legal range.
    ///
    /// Rates are clamped to `[0, 1]`; fees and thresholds become finite and
    /// non-negative.
    pub fn sanitized(&self) -> RateConfig {
        RateConfig {
            discount_rate: money::rate(Some(self.discount_rate)),
            vat_rate: money::rate(Some(self.vat_rate)),
            delivery_fee: money::money(Some(self.delivery_fee)),
            free_delivery_threshold: money::money(Some(self.free_delivery_threshold)),
            payment_method: self.payment_method,
        }
    }

    /// Same rates, different payment method.
    pub fn with_payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// A line item exactly as it arrives from the cart store or an
/// `order_items` row. Either field may be missing or garbage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RawLineItem {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
}

/// A sanitised line item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Finite, non-negative unit price.
    pub unit_price: f64,
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item, coercing the price the same way raw input is.
    pub fn new(unit_price: f64, quantity: u32) -> Self {
        LineItem {
            unit_price: money::money(Some(unit_price)),
            quantity,
        }
    }

    /// `unit_price × quantity`.
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

impl From<&RawLineItem> for LineItem {
    fn from(raw: &RawLineItem) -> Self {
        LineItem {
            unit_price: money::money(raw.price),
            quantity: money::quantity(raw.quantity),
        }
    }
}

/// One row of [`OrderTotals::breakdown`], consumed by invoice rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineTotal {
    pub unit_price: f64,
    pub quantity: u32,
    pub line_total: f64,
}

impl LineTotal {
    /// The line total rounded to the cent, for printing.
    pub fn line_total_money(&self) -> Money {
        Money::from_amount(self.line_total)
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Result of [`crate::totals::calculate_order_totals`].
///
/// Derived and immutable; the persisted order row stays the source of truth
/// and this struct is only used to display or audit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub discounted_subtotal: f64,
    pub vat_amount: f64,
    pub delivery_amount: f64,
    pub final_total: f64,
    pub is_free_delivery: bool,
    pub breakdown: Vec<LineTotal>,
}

/// The total fields of a persisted order, as read back from the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoredTotals {
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default, alias = "total_price")]
    pub total: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
}

impl StoredTotals {
    /// Convenience constructor for fully populated rows.
    pub fn new(subtotal: f64, total: f64, discount: f64) -> Self {
        StoredTotals {
            subtotal: Some(subtotal),
            total: Some(total),
            discount: Some(discount),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// Lifecycle of an order as the kitchen and riders move it along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Returns true once nothing more will happen to the order.
    pub const fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// A row of the `orders` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default, alias = "total_price")]
    pub total: Option<f64>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// The persisted totals of this order.
    pub fn stored_totals(&self) -> StoredTotals {
        StoredTotals {
            subtotal: self.subtotal,
            total: self.total,
            discount: self.discount,
        }
    }
}

/// A row of the `order_items` table.
///
/// Price and quantity are frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    #[serde(default)]
    pub menu_item_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
}

impl OrderItem {
    /// Sanitised line item for the calculator.
    pub fn line_item(&self) -> LineItem {
        LineItem::from(&RawLineItem {
            price: self.price,
            quantity: self.quantity,
        })
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// Lifecycle of a table booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Seated,
    Completed,
    Cancelled,
}

/// A row of the `reservations` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reservation {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub party_size: u32,
    #[ts(as = "String")]
    pub reserved_for: DateTime<Utc>,
    #[serde(default)]
    pub status: ReservationStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Menu Item
// =============================================================================

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_available() -> bool {
    true
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::MobileWallet).unwrap();
        assert_eq!(json, "\"mobile-wallet\"");

        let parsed: PaymentMethod = serde_json::from_str("\"mobile_wallet\"").unwrap();
        assert_eq!(parsed, PaymentMethod::MobileWallet);

        assert_eq!("Pickup".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pickup);
        assert!("card".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_only_pickup_is_not_delivered() {
        assert!(!PaymentMethod::Pickup.is_delivered());
        assert!(PaymentMethod::Delivery.is_delivered());
        assert!(PaymentMethod::Cash.is_delivered());
        assert!(PaymentMethod::MobileWallet.is_delivered());
    }

    #[test]
    fn test_rate_config_partial_json_takes_defaults() {
        let rates: RateConfig =
            serde_json::from_str(r#"{"discountRate": 0.1, "paymentMethod": "pickup"}"#).unwrap();
        assert_eq!(rates.discount_rate, 0.1);
        assert_eq!(rates.vat_rate, 0.05);
        assert_eq!(rates.delivery_fee, 5.0);
        assert_eq!(rates.free_delivery_threshold, 875.0);
        assert_eq!(rates.payment_method, PaymentMethod::Pickup);
    }

    #[test]
    fn test_rate_config_sanitized() {
        let rates = RateConfig {
            discount_rate: 2.0,
            vat_rate: f64::NAN,
            delivery_fee: -5.0,
            free_delivery_threshold: f64::INFINITY,
            payment_method: PaymentMethod::Cash,
        }
        .sanitized();

        assert_eq!(rates.discount_rate, 1.0);
        assert_eq!(rates.vat_rate, 0.0);
        assert_eq!(rates.delivery_fee, 0.0);
        assert_eq!(rates.free_delivery_threshold, 0.0);
        assert_eq!(rates.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_raw_line_item_sanitises() {
        let raw: RawLineItem = serde_json::from_str(r#"{"price": null, "quantity": 2}"#).unwrap();
        let item = LineItem::from(&raw);
        assert_eq!(item.unit_price, 0.0);
        assert_eq!(item.quantity, 2);

        let raw: RawLineItem = serde_json::from_str(r#"{"price": 120.5}"#).unwrap();
        let item = LineItem::from(&raw);
        assert_eq!(item.unit_price, 120.5);
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn test_order_reads_total_price_column() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": "o-1",
                "status": "out_for_delivery",
                "payment_method": "cash",
                "subtotal": 200,
                "discount": 30,
                "total_price": 183.5,
                "created_at": "2026-10-01T12:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.payment_method, PaymentMethod::Cash);
        assert_eq!(order.stored_totals(), StoredTotals::new(200.0, 183.5, 30.0));
    }

    #[test]
    fn test_order_status_final() {
        assert!(OrderStatus::Delivered.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(!OrderStatus::Preparing.is_final());
    }

    #[test]
    fn test_menu_item_available_by_default() {
        let item: MenuItem =
            serde_json::from_str(r#"{"id": "m-1", "name": "Borhani", "price": 60}"#).unwrap();
        assert!(item.is_available);
        assert_eq!(item.price, 60.0);
    }
}
