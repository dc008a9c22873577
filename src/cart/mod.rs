//! Shopping cart types and the cart API client.

mod api;

pub use api::CartApi;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub title: String,
    pub price: f64,
    pub size: f64,
    pub quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_price: f64,
    pub total_count: i64,
}

impl Cart {
    /// Predict the cart after changing one item's quantity by `delta`.
    ///
    /// Totals are recomputed from the items and the price is rounded to
    /// cents. Returns `false`, leaving the cart untouched, if the item is
    /// not in this cart.
    pub fn apply_quantity_delta(&mut self, item_id: &str, delta: i64) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) else {
            return false;
        };
        item.quantity += delta;
        self.recalculate_totals();
        true
    }

    pub fn recalculate_totals(&mut self) {
        self.total_count = self.items.iter().map(|i| i.quantity).sum();
        let total: f64 = self
            .items
            .iter()
            .map(|i| i.quantity as f64 * i.price)
            .sum();
        self.total_price = (total * 100.0).round() / 100.0;
    }
}

/// Arguments of the cart listing query; also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartQuery {
    pub page: u32,
    pub search: String,
}

impl Default for CartQuery {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToCart {
    pub product_id: String,
    pub size: f64,
    pub quantity: i64,
}

/// Quantity change request; `quantity` is a signed delta, not the new total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeQuantity {
    pub product_id: String,
    pub size: f64,
    pub quantity: i64,
}

#[cfg(test)]
pub(crate) fn sample_item(id: &str, price: f64, quantity: i64) -> CartItem {
    CartItem {
        id: id.to_string(),
        user_id: "u1".to_string(),
        product_id: format!("p-{id}"),
        title: format!("Shoe {id}"),
        price,
        size: 42.0,
        quantity,
        image_url: None,
        created_at: "2025-01-01T00:00:00".to_string(),
        updated_at: "2025-01-01T00:00:00".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        let mut cart = Cart {
            items: vec![sample_item("a", 19.99, 1), sample_item("b", 0.1, 3)],
            total_price: 0.0,
            total_count: 0,
        };
        cart.recalculate_totals();
        cart
    }

    #[test]
    fn totals_are_rounded_to_cents() {
        let cart = cart();
        assert_eq!(cart.total_count, 4);
        assert_eq!(cart.total_price, 20.29);
    }

    #[test]
    fn quantity_delta_updates_item_and_totals() {
        let mut cart = cart();
        assert!(cart.apply_quantity_delta("a", 2));
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.total_count, 6);
        assert_eq!(cart.total_price, 60.27);

        assert!(cart.apply_quantity_delta("b", -1));
        assert_eq!(cart.items[1].quantity, 2);
        assert_eq!(cart.total_count, 5);
        assert_eq!(cart.total_price, 60.17);
    }

    #[test]
    fn unknown_item_leaves_cart_untouched() {
        let mut cart = cart();
        let before = cart.clone();
        assert!(!cart.apply_quantity_delta("zzz", 1));
        assert_eq!(cart, before);
    }

    #[test]
    fn default_query_is_first_page_without_search() {
        assert_eq!(
            CartQuery::default(),
            CartQuery {
                page: 1,
                search: String::new()
            }
        );
    }
}
