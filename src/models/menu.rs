use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sellable menu entry as served by the POS backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    /// Base price, used when no variant is selected.
    pub price: Decimal,
    pub is_available: bool,
    pub stock_quantity: i32,
    /// Per-size/per-style variations. A selected variant's price overrides
    /// the base price.
    #[serde(default)]
    pub variants: Vec<MenuItemVariant>,
}

/// A variation of a menu item (size, style) with its own price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemVariant {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub is_available: bool,
}
