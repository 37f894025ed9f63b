//! Purchase and sale orders.
//!
//! This module implements the order lifecycle state machine shared by
//! purchases and sales, the totals calculator, and line validation.
//!
//! # Modules
//!
//! - `types` - Order domain types (OrderKind, OrderStatus, OrderLine)
//! - `error` - Order-specific error types
//! - `totals` - Totals calculator
//! - `validation` - Line item business rules
//! - `service` - State transition planning

pub mod error;
pub mod service;
pub mod totals;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod totals_props;

pub use error::{OrderError, ResourceKind};
pub use service::{CostEntry, OrderService, ProductInfo, TransitionPlan};
pub use totals::calculate_totals;
pub use types::{LineInput, OrderKind, OrderLine, OrderSnapshot, OrderStatus, OrderTotals};
pub use validation::validate_lines;
