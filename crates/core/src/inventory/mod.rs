//! Inventory ledger.
//!
//! Per-product stock on hand and weighted-average cost, mutated only by
//! confirmed purchase and sale transitions.
//!
//! # Modules
//!
//! - `stock` - Locked product state and stock movements
//! - `costing` - Moving weighted-average cost

pub mod costing;
pub mod stock;

pub use costing::weighted_average_cost;
pub use stock::ProductStock;
