use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::store::{ActivityStore, CartStore, OrderStore, ProductStore, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        ActivityRecord, Cart, Order, OrderId, OrderStatus, Product, ProductId, Review, User,
        UserId,
    },
};

/// Process-local store backing every collaborator trait
///
/// Used for tests and for running the API without a database.
#[derive(Default)]
pub struct InMemoryStore {
    products: RwLock<Vec<Product>>,
    activities: RwLock<Vec<ActivityRecord>>,
    users: RwLock<Vec<User>>,
    carts: RwLock<HashMap<UserId, Cart>>,
    orders: RwLock<Vec<Order>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> AppResult<Vec<Product>> {
        // Catalog order, not request order
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, product: &Product) -> AppResult<()> {
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> AppResult<bool> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                let reviews = std::mem::take(&mut existing.reviews);
                *existing = Product {
                    reviews,
                    ..product.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ProductId) -> AppResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }

    async fn add_review(&self, id: ProductId, review: &Review) -> AppResult<bool> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.reviews.push(review.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ActivityStore for InMemoryStore {
    async fn record(&self, activity: &ActivityRecord) -> AppResult<()> {
        self.activities.write().await.push(activity.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<ActivityRecord>> {
        let activities = self.activities.read().await;
        Ok(activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<bool> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn get(&self, user_id: UserId) -> AppResult<Option<Cart>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn save(&self, cart: &Cart) -> AppResult<()> {
        self.carts.write().await.insert(cart.user_id, cart.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn list(&self, user_id: Option<UserId>) -> AppResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .iter()
            .filter(|o| user_id.map_or(true, |id| o.user_id == id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn insert(&self, order: &Order) -> AppResult<()> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }

    async fn place_from_cart(&self, user_id: UserId) -> AppResult<Option<Order>> {
        // Cart lock is held until the order is stored
        let mut carts = self.carts.write().await;
        let Some(cart) = carts.remove(&user_id).filter(|cart| !cart.is_empty()) else {
            return Ok(None);
        };

        let order = Order::new(user_id, cart.items);
        self.orders.write().await.push(order.clone());
        Ok(Some(order))
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        Ok(orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.status = status;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn delete(&self, id: OrderId) -> AppResult<bool> {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|o| o.id != id);
        Ok(orders.len() != before)
    }
}
