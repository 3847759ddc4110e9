//! # bistro-core: Pure Order Math for Bistro
//!
//! This crate holds the restaurant's business logic as pure functions with
//! zero I/O dependencies. Orders, reservations and menu rows live in the
//! hosted database; this crate only computes and audits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Bistro Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Web UI (React)                             │   │
//! │  │   Menu ──► Cart ──► Checkout ──► Order History ──► Admin       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │  totals   │  │   audit   │  │   cart    │  │   │
//! │  │   │ safe_num  │  │ subtotal  │  │  stored   │  │ CartItem  │  │   │
//! │  │   │   Money   │  │ VAT, fee  │  │  vs fresh │  │  totals   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            bistro-live (config, realtime lists, limits)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, RateConfig, Order, Reservation, ...)
//! - [`money`] - Numeric coercion helpers and the `Money` cents type
//! - [`totals`] - The order total calculator
//! - [`audit`] - Persisted-total validation
//! - [`cart`] - The customer's cart
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, bit for bit
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Sanitise at the boundary**: missing or non-finite numbers become 0,
//!    the calculator never panics
//! 4. **Discount before VAT**: VAT is charged on the discounted subtotal
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::totals::calculate_order_totals;
//! use bistro_core::{LineItem, PaymentMethod, RateConfig};
//!
//! let items = [LineItem::new(100.0, 2)];
//! let rates = RateConfig {
//!     discount_rate: 0.15,
//!     ..RateConfig::default()
//! };
//!
//! let totals = calculate_order_totals(&items, &rates);
//! assert_eq!(totals.subtotal, 200.0);
//! assert_eq!(totals.discount_amount, 30.0);
//! assert_eq!(totals.final_total, 183.5);
//! assert_eq!(rates.payment_method, PaymentMethod::Delivery);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod cart;
pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use audit::{audit_order, validate_order_calculation, CalculationAudit, OrderAudit};
pub use cart::{Cart, CartItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use totals::{calculate_from_raw, calculate_order_totals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Absolute tolerance used when comparing persisted totals to a recalculation.
///
/// One cent absorbs floating-point noise from the web client's own math.
pub const CALCULATION_TOLERANCE: f64 = 0.01;

/// Maximum distinct menu items allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single menu item in the cart.
///
/// ## Business Reason
/// A kitchen ticket for 100+ of one dish is almost always a typo.
pub const MAX_ITEM_QUANTITY: u32 = 99;

/// Largest party a single table booking may cover.
pub const MAX_PARTY_SIZE: u32 = 20;
