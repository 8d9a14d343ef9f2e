pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod recommendations;
pub mod reviews;
pub mod users;

use serde::Serialize;

/// Body returned by delete endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
