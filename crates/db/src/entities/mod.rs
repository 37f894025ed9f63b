//! `SeaORM` entity definitions.

pub mod cost_history;
pub mod customers;
pub mod locals;
pub mod order_lines;
pub mod orders;
pub mod products;
pub mod providers;
pub mod sea_orm_active_enums;
