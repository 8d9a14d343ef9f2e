use crate::{
    db::{ActivityStore, OrderStore},
    error::{AppError, AppResult},
    models::{ActivityKind, Order, UserId},
    services::activity::record_activity,
};

/// Turns the user's cart into a pending order
///
/// The store empties the cart and stores the order together, so a retried or
/// concurrent submit of the same cart fails with "Cart is empty" instead of
/// producing a second order. Every line is logged as a purchase for the
/// recommendation scorer.
pub async fn place_order(
    orders: &dyn OrderStore,
    activities: &dyn ActivityStore,
    user_id: UserId,
) -> AppResult<Order> {
    let order = orders
        .place_from_cart(user_id)
        .await?
        .ok_or_else(|| AppError::InvalidInput("Cart is empty".to_string()))?;

    for item in &order.items {
        record_activity(activities, user_id, item.product_id, ActivityKind::Purchased).await;
    }

    tracing::info!(
        order_id = %order.id,
        user_id = %user_id,
        item_count = order.items.len(),
        "Order placed"
    );

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CartStore, InMemoryStore};
    use crate::models::{Cart, OrderStatus, ProductId};

    async fn store_with_cart(user: UserId) -> (InMemoryStore, Cart) {
        let store = InMemoryStore::new();
        let mut cart = Cart::new(user);
        cart.add_item(ProductId::new(), 2).unwrap();
        cart.add_item(ProductId::new(), 1).unwrap();
        store.save(&cart).await.unwrap();
        (store, cart)
    }

    #[tokio::test]
    async fn test_place_order_empties_cart_and_logs_purchases() {
        let user = UserId::new();
        let (store, cart) = store_with_cart(user).await;

        let order = place_order(&store, &store, user).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items, cart.items);

        assert!(store.get(user).await.unwrap().is_none());

        let log = store.find_by_user(user).await.unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|a| a.action == ActivityKind::Purchased));
    }

    #[tokio::test]
    async fn test_empty_cart_cannot_be_ordered() {
        let store = InMemoryStore::new();
        let err = place_order(&store, &store, UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_resubmitting_a_cart_creates_one_order() {
        let user = UserId::new();
        let (store, _) = store_with_cart(user).await;

        place_order(&store, &store, user).await.unwrap();
        let err = place_order(&store, &store, user).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        assert_eq!(OrderStore::list(&store, Some(user)).await.unwrap().len(), 1);
        assert_eq!(store.find_by_user(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_submits_create_one_order() {
        let user = UserId::new();
        let (store, _) = store_with_cart(user).await;

        let (first, second) = tokio::join!(
            place_order(&store, &store, user),
            place_order(&store, &store, user)
        );
        assert_eq!(u8::from(first.is_ok()) + u8::from(second.is_ok()), 1);
        assert_eq!(OrderStore::list(&store, Some(user)).await.unwrap().len(), 1);
    }
}
