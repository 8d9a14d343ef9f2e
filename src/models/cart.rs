use serde::{Deserialize, Serialize};

use super::{ProductId, UserId, MAX_QUANTITY};

/// A product and how many units of it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A user's shopping cart
///
/// Each user owns at most one cart; it is emptied when an order is placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart for the given user
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    /// Adds units of a product, merging with an existing line for the same product
    ///
    /// Fails without changing the cart if the line would exceed `MAX_QUANTITY`.
    pub fn add_item(&mut self, product_id: ProductId, quantity: u32) -> Result<(), String> {
        let existing = self.items.iter_mut().find(|i| i.product_id == product_id);
        let current = existing.as_ref().map_or(0, |line| line.quantity);
        let total = current
            .checked_add(quantity)
            .filter(|total| *total <= MAX_QUANTITY)
            .ok_or_else(|| format!("Quantity must be at most {}", MAX_QUANTITY))?;

        match existing {
            Some(line) => line.quantity = total,
            None => self.items.push(LineItem {
                product_id,
                quantity: total,
            }),
        }
        Ok(())
    }

    /// Removes every unit of a product, returning whether it was in the cart
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_merges_quantities() {
        let mut cart = Cart::new(UserId::new());
        let product_id = ProductId::new();
        cart.add_item(product_id, 1).unwrap();
        cart.add_item(product_id, 2).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[test]
    fn test_add_item_rejects_oversized_line() {
        let mut cart = Cart::new(UserId::new());
        let product_id = ProductId::new();
        cart.add_item(product_id, MAX_QUANTITY - 1).unwrap();

        assert!(cart.add_item(product_id, 2).is_err());
        assert_eq!(cart.items[0].quantity, MAX_QUANTITY - 1);

        assert!(cart.add_item(ProductId::new(), MAX_QUANTITY + 1).is_err());
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new(UserId::new());
        let keep = ProductId::new();
        let drop = ProductId::new();
        cart.add_item(keep, 1).unwrap();
        cart.add_item(drop, 4).unwrap();

        assert!(cart.remove_item(drop));
        assert!(!cart.remove_item(drop)); // Already gone
        assert_eq!(cart.items, vec![LineItem { product_id: keep, quantity: 1 }]);
    }
}
