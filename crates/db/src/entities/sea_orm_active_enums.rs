//! `SeaORM` mappings for `PostgreSQL` enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use almacen_core::order;

/// `order_kind` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_kind")]
pub enum OrderKind {
    /// Purchase from a provider.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Sale to a customer.
    #[sea_orm(string_value = "sale")]
    Sale,
}

/// `order_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
pub enum OrderStatus {
    /// Editable.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Inventory effect applied.
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Inventory effect reversed.
    #[sea_orm(string_value = "annulled")]
    Annulled,
}

impl From<order::OrderKind> for OrderKind {
    fn from(kind: order::OrderKind) -> Self {
        match kind {
            order::OrderKind::Purchase => Self::Purchase,
            order::OrderKind::Sale => Self::Sale,
        }
    }
}

impl From<OrderKind> for order::OrderKind {
    fn from(kind: OrderKind) -> Self {
        match kind {
            OrderKind::Purchase => Self::Purchase,
            OrderKind::Sale => Self::Sale,
        }
    }
}

impl From<order::OrderStatus> for OrderStatus {
    fn from(status: order::OrderStatus) -> Self {
        match status {
            order::OrderStatus::Draft => Self::Draft,
            order::OrderStatus::Confirmed => Self::Confirmed,
            order::OrderStatus::Annulled => Self::Annulled,
        }
    }
}

impl From<OrderStatus> for order::OrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Draft => Self::Draft,
            OrderStatus::Confirmed => Self::Confirmed,
            OrderStatus::Annulled => Self::Annulled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversions_round_trip() {
        for status in [
            order::OrderStatus::Draft,
            order::OrderStatus::Confirmed,
            order::OrderStatus::Annulled,
        ] {
            let db: OrderStatus = status.into();
            assert_eq!(order::OrderStatus::from(db), status);
        }
    }

    #[test]
    fn test_string_values_match_domain() {
        assert_eq!(OrderStatus::Annulled.to_value(), "annulled");
        assert_eq!(OrderKind::Purchase.to_value(), order::OrderKind::Purchase.as_str());
    }
}
