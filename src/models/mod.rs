pub mod activity;
pub mod cart;
pub mod ids;
pub mod order;
pub mod product;
pub mod user;

/// Largest unit count a product or cart line may carry; quantities are stored as `INTEGER`
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

pub use activity::{ActivityKind, ActivityRecord};
pub use cart::{Cart, LineItem};
pub use ids::{ActivityId, OrderId, ProductId, UserId};
pub use order::{Order, OrderStatus};
pub use product::{NewProduct, Product, ProductPatch, Review};
pub use user::{NewUser, User, UserPatch};
