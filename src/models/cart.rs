use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MenuItem, MenuItemVariant};

/// Identity of a cart line: at most one line exists per (item, variant)
/// pair.
///
/// The variant id is a true optional, so a variant with id 0 is distinct
/// from "no variant selected".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub item_id: i64,
    pub variant_id: Option<i64>,
}

/// One line of the cart: an item, an optional variant, and a quantity.
///
/// Quantity is always at least 1 in a stored line; a would-be zero
/// quantity removes the line instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item: MenuItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<MenuItemVariant>,
    pub quantity: u32,
}

impl CartLine {
    pub fn key(&self) -> LineKey {
        LineKey {
            item_id: self.item.id,
            variant_id: self.variant.as_ref().map(|v| v.id),
        }
    }

    /// Price for a single unit: the variant's price whenever a variant is
    /// attached (zero included), the item's base price otherwise.
    pub fn unit_price(&self) -> Decimal {
        match self.variant {
            Some(ref variant) => variant.price,
            None => self.item.price,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, price: Decimal) -> MenuItem {
        MenuItem {
            id,
            name: format!("Item {}", id),
            price,
            is_available: true,
            stock_quantity: 10,
            variants: Vec::new(),
        }
    }

    fn variant(id: i64, price: Decimal) -> MenuItemVariant {
        MenuItemVariant {
            id,
            name: format!("Variant {}", id),
            price,
            is_available: true,
        }
    }

    #[test]
    fn test_variant_id_zero_distinct_from_no_variant() {
        let plain = CartLine {
            item: item(1, Decimal::new(500, 2)),
            variant: None,
            quantity: 1,
        };
        let with_zero = CartLine {
            item: item(1, Decimal::new(500, 2)),
            variant: Some(variant(0, Decimal::new(600, 2))),
            quantity: 1,
        };
        assert_ne!(plain.key(), with_zero.key());
        assert_eq!(plain.key().variant_id, None);
        assert_eq!(with_zero.key().variant_id, Some(0));
    }

    #[test]
    fn test_zero_priced_variant_overrides_base_price() {
        let line = CartLine {
            item: item(1, Decimal::new(350, 2)),
            variant: Some(variant(2, Decimal::ZERO)),
            quantity: 3,
        };
        assert_eq!(line.unit_price(), Decimal::ZERO);
        assert_eq!(line.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_uses_base_price_without_variant() {
        let line = CartLine {
            item: item(1, Decimal::new(350, 2)),
            variant: None,
            quantity: 4,
        };
        assert_eq!(line.line_total(), Decimal::new(1400, 2));
    }
}
