use std::sync::Arc;

use crate::{
    db::{ActivityStore, CartStore, InMemoryStore, OrderStore, ProductStore, UserStore},
    services::auth::TokenSigner,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductStore>,
    pub activities: Arc<dyn ActivityStore>,
    pub users: Arc<dyn UserStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub tokens: Arc<TokenSigner>,
    /// Registrations with this email become admins
    pub admin_email: Option<String>,
}

impl AppState {
    /// Builds state where a single backend serves every store
    pub fn new<S>(store: Arc<S>, tokens: TokenSigner) -> Self
    where
        S: ProductStore + ActivityStore + UserStore + CartStore + OrderStore + 'static,
    {
        Self {
            products: store.clone(),
            activities: store.clone(),
            users: store.clone(),
            carts: store.clone(),
            orders: store,
            tokens: Arc::new(tokens),
            admin_email: None,
        }
    }

    /// Builds state over a fresh in-memory store
    pub fn in_memory(tokens: TokenSigner) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), tokens)
    }

    /// Replaces the catalog store, e.g. with a cached wrapper
    pub fn with_products(mut self, products: Arc<dyn ProductStore>) -> Self {
        self.products = products;
        self
    }

    pub fn with_admin_email(mut self, email: Option<String>) -> Self {
        self.admin_email = email.map(|e| crate::models::user::normalize_email(&e));
        self
    }
}
