//! # Validation Module
//!
//! Input validation for menu management, cart edits and table bookings.
//!
//! ## Validation vs. Sanitisation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SANITISE (money.rs)                  VALIDATE (this module)            │
//! │  ───────────────────                  ──────────────────────            │
//! │  Used when READING numbers            Used when WRITING user input      │
//! │  Garbage → 0, never fails             Garbage → ValidationError         │
//! │  calculate_order_totals, audits       cart edits, admin menu form,      │
//! │                                       reservation form                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::validation::{validate_party_size, validate_rate};
//!
//! validate_party_size(4).unwrap();
//! assert!(validate_rate("vat_rate", 1.2).is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_PARTY_SIZE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a menu item name.
///
/// ## Rules
/// - Must not be empty
/// - At most 120 characters
pub fn validate_menu_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 120 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 120,
        });
    }

    Ok(())
}

/// Validates a UUID string (row ids from the hosted database).
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed MAX_ITEM_QUANTITY (99)
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1.0,
            max: f64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(())
}

/// Validates a menu price entered in the admin dashboard.
///
/// Zero is allowed (complimentary items); negative and non-finite are not.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0.0,
            max: f64::MAX,
        });
    }

    Ok(())
}

/// Validates a fraction such as a discount or VAT rate.
pub fn validate_rate(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 1.0,
        });
    }

    Ok(())
}

/// Validates the number of guests on a booking (1..=20).
pub fn validate_party_size(size: u32) -> ValidationResult<()> {
    if size == 0 {
        return Err(ValidationError::MustBePositive {
            field: "party_size".to_string(),
        });
    }

    if size > MAX_PARTY_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "party_size".to_string(),
            min: 1.0,
            max: f64::from(MAX_PARTY_SIZE),
        });
    }

    Ok(())
}

// =============================================================================
// Time Validators
// =============================================================================

/// Validates that a booking is for a future slot.
///
/// `now` is passed in so this stays a pure function.
pub fn validate_reservation_time(
    reserved_for: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ValidationResult<()> {
    if reserved_for <= now {
        return Err(ValidationError::InPast {
            field: "reserved_for".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
