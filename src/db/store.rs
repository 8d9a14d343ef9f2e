//! Storage collaborators
//!
//! Each document kind is reached through its own trait so handlers and the
//! recommendation scorer only see the capabilities they use. Both the Postgres
//! and in-memory backends implement every trait.
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    error::AppResult,
    models::{
        ActivityRecord, Cart, Order, OrderId, OrderStatus, Product, ProductId, Review, User,
        UserId,
    },
};

/// Catalog store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, oldest first
    async fn list(&self) -> AppResult<Vec<Product>>;

    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>>;

    /// Products whose ID is in `ids`
    ///
    /// Missing IDs are skipped and no ordering is guaranteed.
    async fn find_by_ids(&self, ids: &[ProductId]) -> AppResult<Vec<Product>>;

    async fn insert(&self, product: &Product) -> AppResult<()>;

    /// Replaces a product's fields (not its reviews); returns false if it doesn't exist
    async fn update(&self, product: &Product) -> AppResult<bool>;

    /// Returns false if the product doesn't exist
    async fn delete(&self, id: ProductId) -> AppResult<bool>;

    /// Appends a review; returns false if the product doesn't exist
    async fn add_review(&self, id: ProductId, review: &Review) -> AppResult<bool>;
}

/// Append-only log of user activity
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn record(&self, activity: &ActivityRecord) -> AppResult<()>;

    /// Every activity logged for a user, in no particular order
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<ActivityRecord>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<User>>;

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Looks up a user by normalized email
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Fails with `AppError::Conflict` when the email is taken
    async fn insert(&self, user: &User) -> AppResult<()>;

    /// Returns false if the user doesn't exist; fails with `AppError::Conflict` on a taken email
    async fn update(&self, user: &User) -> AppResult<bool>;

    async fn delete(&self, id: UserId) -> AppResult<bool>;
}

/// One cart per user
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get(&self, user_id: UserId) -> AppResult<Option<Cart>>;

    async fn save(&self, cart: &Cart) -> AppResult<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Orders of one user, or every order when `user_id` is `None`; newest first
    async fn list(&self, user_id: Option<UserId>) -> AppResult<Vec<Order>>;

    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>>;

    async fn insert(&self, order: &Order) -> AppResult<()>;

    /// Empties the user's cart into a new pending order in one atomic step
    ///
    /// Returns `None` when the cart is missing or empty, so of two concurrent
    /// checkouts of the same cart only one produces an order.
    async fn place_from_cart(&self, user_id: UserId) -> AppResult<Option<Order>>;

    /// Returns the updated order, or `None` if it doesn't exist
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Option<Order>>;

    async fn delete(&self, id: OrderId) -> AppResult<bool>;
}
