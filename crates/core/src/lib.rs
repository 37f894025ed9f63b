//! Core business logic for Almacen.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `order` - Purchase/sale lifecycle, totals and line validation
//! - `inventory` - Stock on hand and weighted-average cost

pub mod inventory;
pub mod order;
