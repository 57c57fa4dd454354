//! Cart state management for the POS client.
//!
//! `CartStore` owns the ordered list of cart lines plus the optional table
//! designator, and mirrors every change straight into the durable
//! key-value store (write-through, no batching).

use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::{CartLine, LineKey, MenuItem, MenuItemVariant};
use crate::storage::KvStore;

/// Storage key for the JSON-encoded line sequence.
pub const CART_KEY: &str = "cart";

/// Storage key for the table designator.
pub const TABLE_NUMBER_KEY: &str = "tableNumber";

#[derive(Default)]
struct CartState {
    lines: Vec<CartLine>,
    table_number: Option<String>,
}

/// Client-side cart store.
///
/// Cheap to clone; clones share the same underlying state. Lines are
/// unique per (item, variant) identity: repeated adds merge quantities
/// instead of duplicating lines, and insertion order is preserved for
/// display.
#[derive(Clone)]
pub struct CartStore {
    kv: Arc<dyn KvStore>,
    state: Arc<Mutex<CartState>>,
}

impl CartStore {
    /// Create the store and hydrate it from persisted state.
    ///
    /// A corrupt persisted cart is discarded and purged from storage so it
    /// cannot fail parsing again on the next start.
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        let store = Self {
            kv,
            state: Arc::new(Mutex::new(CartState::default())),
        };
        store.hydrate();
        store
    }

    fn hydrate(&self) {
        let lines = match self.fetch(CART_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<CartLine>>(&raw) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt persisted cart");
                    self.discard(CART_KEY);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        let table_number = self.fetch(TABLE_NUMBER_KEY);

        let mut state = self.lock();
        debug!(lines = lines.len(), "Cart hydrated");
        state.lines = lines;
        state.table_number = table_number;
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    /// Snapshot of the cart lines in insertion order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines.clone()
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u32 {
        self.lock().lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of per-line totals.
    ///
    /// A line with a variant is priced at the variant's price even when
    /// that price is zero.
    pub fn total_amount(&self) -> Decimal {
        self.lock().lines.iter().map(CartLine::line_total).sum()
    }

    /// Quantity of the line matching the identity key, 0 when absent.
    pub fn item_quantity(&self, item_id: i64, variant_id: Option<i64>) -> u32 {
        let key = LineKey {
            item_id,
            variant_id,
        };
        self.lock()
            .lines
            .iter()
            .find(|line| line.key() == key)
            .map(|line| line.quantity)
            .unwrap_or(0)
    }

    /// The table designator, if one is set.
    pub fn table_number(&self) -> Option<String> {
        self.lock().table_number.clone()
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Add `quantity` of an item to the cart.
    ///
    /// If a line with the same (item, variant) identity exists its quantity
    /// grows by `quantity`; otherwise a new line is appended. Adding zero
    /// is a no-op.
    pub fn add_item(&self, item: MenuItem, variant: Option<MenuItemVariant>, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let key = LineKey {
            item_id: item.id,
            variant_id: variant.as_ref().map(|v| v.id),
        };
        {
            let mut state = self.lock();
            match state.lines.iter_mut().find(|line| line.key() == key) {
                Some(line) => line.quantity += quantity,
                None => state.lines.push(CartLine {
                    item,
                    variant,
                    quantity,
                }),
            }
        }
        self.persist_lines();
    }

    /// Remove the line matching the identity key. No-op when absent.
    pub fn remove_item(&self, item_id: i64, variant_id: Option<i64>) {
        let key = LineKey {
            item_id,
            variant_id,
        };
        let removed = {
            let mut state = self.lock();
            let before = state.lines.len();
            state.lines.retain(|line| line.key() != key);
            state.lines.len() != before
        };
        if removed {
            self.persist_lines();
        }
    }

    /// Overwrite the quantity of the matching line in place, preserving
    /// its position.
    ///
    /// A quantity of zero behaves exactly like `remove_item`. No-op when
    /// the key is absent.
    pub fn update_quantity(&self, item_id: i64, variant_id: Option<i64>, quantity: u32) {
        if quantity == 0 {
            self.remove_item(item_id, variant_id);
            return;
        }
        let key = LineKey {
            item_id,
            variant_id,
        };
        let updated = {
            let mut state = self.lock();
            match state.lines.iter_mut().find(|line| line.key() == key) {
                Some(line) => {
                    line.quantity = quantity;
                    true
                }
                None => false,
            }
        };
        if updated {
            self.persist_lines();
        }
    }

    /// Empty the cart and drop the persisted blob entirely (distinct from
    /// persisting an empty sequence).
    pub fn clear(&self) {
        self.lock().lines.clear();
        self.discard(CART_KEY);
    }

    /// Set or clear the table designator, mirroring it into storage.
    pub fn set_table_number(&self, table_number: Option<String>) {
        match &table_number {
            Some(value) => self.persist(TABLE_NUMBER_KEY, value),
            None => self.discard(TABLE_NUMBER_KEY),
        }
        self.lock().table_number = table_number;
    }

    // =========================================================================
    // Storage helpers
    // =========================================================================

    fn persist_lines(&self) {
        let json = {
            let state = self.lock();
            serde_json::to_string(&state.lines)
        };
        match json {
            Ok(json) => self.persist(CART_KEY, &json),
            Err(e) => warn!(error = %e, "Failed to encode cart for storage"),
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.kv.set(key, value) {
            warn!(key, error = %e, "Failed to persist value");
        }
    }

    fn fetch(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted value");
                None
            }
        }
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.kv.remove(key) {
            warn!(key, error = %e, "Failed to remove persisted value");
        }
    }

    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::storage::MemoryKv;

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

    fn store() -> (CartStore, Arc<MemoryKv>) {
        let kv = Arc::new(MemoryKv::new());
        (CartStore::new(kv.clone()), kv)
    }

    #[test]
    fn test_repeated_adds_merge_into_one_line() {
        let (cart, _kv) = store();
        let price = Decimal::new(350, 2);

        cart.add_item(item(1, price), None, 1);
        cart.add_item(item(1, price), None, 2);

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(cart.item_quantity(1, None), 3);
    }

    #[test]
    fn test_variant_forms_a_separate_line() {
        let (cart, _kv) = store();
        let price = Decimal::new(350, 2);

        cart.add_item(item(1, price), None, 1);
        cart.add_item(item(1, price), None, 2);
        cart.add_item(item(1, price), Some(variant(10, Decimal::new(400, 2))), 1);

        let lines = cart.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].variant, None);
        assert_eq!(lines[1].quantity, 1);
        assert_eq!(cart.total_items(), 4);
    }

    #[test]
    fn test_variant_id_zero_is_not_no_variant() {
        let (cart, _kv) = store();
        let price = Decimal::new(500, 2);

        cart.add_item(item(1, price), None, 1);
        cart.add_item(item(1, price), Some(variant(0, price)), 1);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_quantity(1, None), 1);
        assert_eq!(cart.item_quantity(1, Some(0)), 1);
    }

    #[test]
    fn test_update_quantity_zero_equals_remove() {
        let price = Decimal::new(350, 2);

        let (updated, _kv1) = store();
        updated.add_item(item(1, price), None, 2);
        updated.add_item(item(2, price), None, 1);
        updated.update_quantity(1, None, 0);

        let (removed, _kv2) = store();
        removed.add_item(item(1, price), None, 2);
        removed.add_item(item(2, price), None, 1);
        removed.remove_item(1, None);

        assert_eq!(updated.lines(), removed.lines());
        assert_eq!(updated.item_quantity(1, None), 0);
    }

    #[test]
    fn test_update_quantity_preserves_position() {
        let (cart, _kv) = store();
        let price = Decimal::new(100, 2);

        cart.add_item(item(1, price), None, 1);
        cart.add_item(item(2, price), None, 1);
        cart.update_quantity(1, None, 5);

        let lines = cart.lines();
        assert_eq!(lines[0].item.id, 1);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(lines[1].item.id, 2);
    }

    #[test]
    fn test_update_quantity_absent_key_is_noop() {
        let (cart, kv) = store();
        cart.update_quantity(99, None, 5);
        assert!(cart.lines().is_empty());
        // No-op mutations do not create a persisted blob
        assert_eq!(kv.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let (cart, _kv) = store();
        cart.add_item(item(1, Decimal::ONE), None, 1);
        cart.remove_item(1, Some(3));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let (cart, kv) = store();
        cart.add_item(item(1, Decimal::ONE), None, 0);
        assert!(cart.lines().is_empty());
        assert_eq!(kv.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_total_amount_uses_variant_price_even_when_zero() {
        let (cart, _kv) = store();

        cart.add_item(item(1, Decimal::new(350, 2)), None, 2);
        cart.add_item(
            item(2, Decimal::new(500, 2)),
            Some(variant(7, Decimal::new(650, 2))),
            1,
        );
        // Comped variant: priced at zero, not at the base price
        cart.add_item(item(3, Decimal::new(400, 2)), Some(variant(8, Decimal::ZERO)), 3);

        // 2 * 3.50 + 1 * 6.50 + 3 * 0 = 13.50
        assert_eq!(cart.total_amount(), Decimal::new(1350, 2));
        assert_eq!(cart.total_items(), 6);
    }

    #[test]
    fn test_mutations_write_through_to_storage() {
        let (cart, kv) = store();
        let price = Decimal::new(350, 2);

        cart.add_item(item(1, price), None, 2);
        cart.set_table_number(Some("12".to_string()));

        // A fresh store over the same storage sees the same state
        let rehydrated = CartStore::new(kv.clone());
        assert_eq!(rehydrated.lines(), cart.lines());
        assert_eq!(rehydrated.table_number().as_deref(), Some("12"));
    }

    #[test]
    fn test_removing_last_line_persists_empty_sequence() {
        let (cart, kv) = store();
        cart.add_item(item(1, Decimal::ONE), None, 1);
        cart.remove_item(1, None);

        // Removal persists [] - only clear() drops the key
        assert_eq!(kv.get(CART_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_clear_drops_persisted_blob() {
        let (cart, kv) = store();
        cart.add_item(item(1, Decimal::ONE), None, 2);
        assert!(kv.get(CART_KEY).unwrap().is_some());

        cart.clear();

        assert!(cart.lines().is_empty());
        assert_eq!(kv.get(CART_KEY).unwrap(), None);

        // A fresh hydration yields an empty cart, not stale lines
        let rehydrated = CartStore::new(kv.clone());
        assert!(rehydrated.lines().is_empty());
    }

    #[test]
    fn test_corrupt_persisted_cart_is_purged() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(CART_KEY, "{definitely not a cart").unwrap();

        let cart = CartStore::new(kv.clone());

        assert!(cart.lines().is_empty());
        assert_eq!(kv.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_table_number_set_and_clear() {
        let (cart, kv) = store();

        cart.set_table_number(Some("7A".to_string()));
        assert_eq!(cart.table_number().as_deref(), Some("7A"));
        assert_eq!(kv.get(TABLE_NUMBER_KEY).unwrap().as_deref(), Some("7A"));

        cart.set_table_number(None);
        assert_eq!(cart.table_number(), None);
        assert_eq!(kv.get(TABLE_NUMBER_KEY).unwrap(), None);
    }
}
