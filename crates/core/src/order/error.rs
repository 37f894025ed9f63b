//! Order error types.
//!
//! Every variant aborts the enclosing transaction. None is retried here;
//! `LockConflict` is the only one a caller may reasonably retry.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::types::OrderStatus;

/// Kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A purchase or sale.
    Order,
    /// A catalog product.
    Product,
    /// A purchase counterparty.
    Provider,
    /// A sale counterparty.
    Customer,
}

impl ResourceKind {
    /// Returns the string representation of the resource.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Product => "product",
            Self::Provider => "provider",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur while creating, editing or transitioning an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed or out-of-range input.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Field path, e.g. `lines[2].quantity`.
        field: String,
        /// Line number the field belongs to, if any.
        line_no: Option<i32>,
        /// Human-readable reason.
        message: String,
    },

    /// A referenced entity belongs to another Local.
    #[error("{resource} {id} belongs to another local")]
    CrossTenant {
        /// What was referenced.
        resource: ResourceKind,
        /// The offending id.
        id: Uuid,
    },

    /// The requested operation is not allowed from the current status.
    #[error("Order is {current}, expected {expected}")]
    InvalidState {
        /// Status the order is in.
        current: OrderStatus,
        /// Status the operation requires.
        expected: OrderStatus,
    },

    /// A sale requests more units than are on hand.
    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        /// The product that is short.
        product_id: Uuid,
        /// Units on hand.
        available: Decimal,
        /// Units requested by the order (summed over its lines).
        requested: Decimal,
        /// `requested - available`.
        shortfall: Decimal,
    },

    /// An id does not resolve.
    #[error("{resource} {id} not found")]
    NotFound {
        /// What was looked up.
        resource: ResourceKind,
        /// The missing id.
        id: Uuid,
    },

    /// A row lock could not be acquired in time, or the database broke a deadlock.
    #[error("Lock conflict: {0}")]
    LockConflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl OrderError {
    /// Builds a field-scoped validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            line_no: None,
            message: message.into(),
        }
    }

    /// Builds a validation error for a field of a specific line.
    pub fn line_validation(
        index: usize,
        line_no: Option<i32>,
        field: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: format!("lines[{index}].{field}"),
            line_no,
            message: message.into(),
        }
    }

    /// Builds a not-found error.
    #[must_use]
    pub fn not_found(resource: ResourceKind, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Builds a cross-tenant error.
    #[must_use]
    pub fn cross_tenant(resource: ResourceKind, id: impl Into<Uuid>) -> Self {
        Self::CrossTenant {
            resource,
            id: id.into(),
        }
    }

    /// Returns the field this error is scoped to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::CrossTenant { resource, .. } | Self::NotFound { resource, .. } => {
                Some(resource.as_str())
            }
            Self::InvalidState { .. } => Some("status"),
            Self::InsufficientStock { .. } => Some("stock"),
            Self::LockConflict(_) | Self::Database(_) => None,
        }
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockConflict(_))
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::InvalidState { .. } | Self::LockConflict(_) => 409,
            Self::CrossTenant { .. } | Self::InsufficientStock { .. } => 422,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::CrossTenant { .. } => "CROSS_TENANT",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::LockConflict(_) => "LOCK_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
