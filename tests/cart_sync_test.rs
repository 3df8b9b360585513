mod common;

use cartsync::application::{CartState, CartSync};
use cartsync::config::StorefrontSettings;
use cartsync::domain::checkout::{FieldError, LineItem, VariantId};
use cartsync::domain::ports::{CHECKOUT_ID_KEY, CommerceGateway, SessionStore};
use cartsync::error::{ErrorKind, SyncError};
use cartsync::infrastructure::in_memory::{InjectedFailure, InMemorySessionStore};
use common::{GIFT_CARD, KURTA, SCARF};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn variant(id: &str) -> VariantId {
    VariantId::new(id)
}

fn line_for<'a>(state: &'a CartState, variant_id: &str) -> &'a LineItem {
    state
        .items
        .iter()
        .find(|l| l.variant.id.as_str() == variant_id)
        .unwrap()
}

#[tokio::test]
async fn test_first_add_opens_session_with_expected_totals() {
    let gateway = common::stocked_gateway().await;
    let store = InMemorySessionStore::new();
    let mut cart = common::cart(&gateway, &store);

    cart.add_item(variant(KURTA), 2).await.unwrap();

    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.total_amount(), dec!(1000));
    assert_eq!(cart.state().aggregate.currency.as_deref(), Some("INR"));
    let persisted = store.get(CHECKOUT_ID_KEY).await.unwrap();
    assert_eq!(persisted.as_deref(), cart.checkout_id().map(|id| id.as_str()));
    assert_eq!(gateway.calls("checkoutCreate").await, 1);
}

#[tokio::test]
async fn test_aggregate_follows_last_gateway_lines() {
    let gateway = common::stocked_gateway().await;
    let store = InMemorySessionStore::new();
    let mut cart = common::cart(&gateway, &store);

    cart.add_item(variant(KURTA), 2).await.unwrap();
    cart.add_item(variant(SCARF), 1).await.unwrap();
    cart.add_item(variant(KURTA), 1).await.unwrap();
    assert_eq!(gateway.calls("checkoutLinesAdd").await, 2);
    assert_eq!(line_for(cart.state(), KURTA).quantity, 3);

    let scarf = line_for(cart.state(), SCARF).id.clone();
    cart.update_item(&scarf, 3).await.unwrap();
    let kurta = line_for(cart.state(), KURTA).id.clone();
    cart.remove_item(&kurta).await.unwrap();

    let id = cart.checkout_id().cloned().unwrap();
    let authoritative = gateway.get_checkout(&id).await.unwrap().unwrap();
    let count: u64 = authoritative.lines.iter().map(|l| u64::from(l.quantity)).sum();
    let total: Decimal = authoritative.lines.iter().map(LineItem::line_total).sum();

    assert_eq!(cart.items(), authoritative.lines.as_slice());
    assert_eq!(cart.item_count(), count);
    assert_eq!(cart.total_amount(), total);
    assert_eq!(cart.total_amount(), dec!(748.50));
}

#[tokio::test]
async fn test_unpriced_lines_count_but_add_nothing_to_total() {
    let gateway = common::stocked_gateway().await;
    let mut cart = common::cart(&gateway, &InMemorySessionStore::new());

    cart.add_item(variant(GIFT_CARD), 3).await.unwrap();
    cart.add_item(variant(KURTA), 1).await.unwrap();

    assert_eq!(cart.item_count(), 4);
    assert_eq!(cart.total_amount(), dec!(500));
}

#[tokio::test]
async fn test_load_checkout_is_idempotent() {
    let gateway = common::stocked_gateway().await;
    let mut cart = common::cart(&gateway, &InMemorySessionStore::new());
    cart.add_item(variant(KURTA), 1).await.unwrap();
    cart.add_item(variant(SCARF), 2).await.unwrap();

    let first_snapshot = cart.load_checkout().await.unwrap();
    let first = cart.state().clone();
    let second_snapshot = cart.load_checkout().await.unwrap();

    assert_eq!(&first, cart.state());
    assert_eq!(first_snapshot, second_snapshot);
}

#[tokio::test]
async fn test_clear_cart_always_resets() {
    let gateway = common::stocked_gateway().await;
    let store = InMemorySessionStore::new();
    let mut cart = common::cart(&gateway, &store);

    cart.clear_cart().await.unwrap();
    assert_eq!(cart.state(), &CartState::default());

    cart.add_item(variant(KURTA), 2).await.unwrap();
    cart.clear_cart().await.unwrap();

    assert_eq!(cart.state(), &CartState::default());
    assert_eq!(cart.item_count(), 0);
    assert_eq!(cart.total_amount(), Decimal::ZERO);
    assert!(store.get(CHECKOUT_ID_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_field_errors_leave_state_untouched() {
    let gateway = common::stocked_gateway().await;
    gateway.set_stock(&variant(SCARF), 1).await;
    let mut cart = common::cart(&gateway, &InMemorySessionStore::new());
    cart.add_item(variant(KURTA), 2).await.unwrap();
    let before = cart.state().clone();

    let err = cart.add_item(variant(SCARF), 5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Field);
    assert_eq!(cart.state(), &before);

    gateway
        .fail_next(
            "checkoutLinesUpdate",
            InjectedFailure::Reject(vec![FieldError::new(Some("quantity"), "Too many")]),
        )
        .await;
    let kurta = before.items[0].id.clone();
    let err = cart.update_item(&kurta, 10).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Rejected {
            operation: "checkoutLinesUpdate",
            ..
        }
    ));
    assert_eq!(cart.state(), &before);
    assert_eq!(gateway.calls("checkout").await, 0);
}

#[tokio::test]
async fn test_transport_failure_leaves_state_untouched() {
    let gateway = common::stocked_gateway().await;
    let mut cart = common::cart(&gateway, &InMemorySessionStore::new());
    cart.add_item(variant(KURTA), 1).await.unwrap();
    let before = cart.state().clone();

    gateway
        .fail_next("checkoutLinesAdd", InjectedFailure::Unavailable)
        .await;
    let err = cart.add_item(variant(SCARF), 1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(cart.state(), &before);
}

#[tokio::test]
async fn test_rejected_create_opens_no_session() {
    let gateway = common::stocked_gateway().await;
    let store = InMemorySessionStore::new();
    let mut cart = common::cart(&gateway, &store);

    let err = cart.add_item(variant("no-such-variant"), 1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Field);
    assert_eq!(cart.state(), &CartState::default());
    assert!(store.get(CHECKOUT_ID_KEY).await.unwrap().is_none());
    assert_eq!(gateway.checkout_count().await, 0);
}

#[tokio::test]
async fn test_operations_without_session_send_nothing() {
    let gateway = common::stocked_gateway().await;
    let mut cart = common::cart(&gateway, &InMemorySessionStore::new());
    let line = cartsync::domain::checkout::LineId::new("line-1");

    assert!(matches!(cart.update_item(&line, 2).await, Err(SyncError::NoSession)));
    assert!(matches!(cart.remove_item(&line).await, Err(SyncError::NoSession)));
    assert!(matches!(cart.load_checkout().await, Err(SyncError::NoSession)));
    assert_eq!(gateway.calls("checkoutLinesUpdate").await, 0);
    assert_eq!(gateway.calls("checkoutLineDelete").await, 0);
    assert_eq!(gateway.calls("checkout").await, 0);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let gateway = common::stocked_gateway().await;
    let store = InMemorySessionStore::new();
    let mut cart = common::cart(&gateway, &store);
    cart.add_item(variant(KURTA), 2).await.unwrap();
    let id = cart.checkout_id().cloned();
    drop(cart);

    let mut reopened = CartSync::open(
        Arc::new(gateway.clone()),
        Arc::new(store.clone()),
        StorefrontSettings::default(),
    )
    .await
    .unwrap();
    assert_eq!(reopened.checkout_id().cloned(), id);
    assert!(reopened.items().is_empty());

    reopened.load_checkout().await.unwrap();
    assert_eq!(reopened.item_count(), 2);

    reopened.add_item(variant(SCARF), 1).await.unwrap();
    assert_eq!(gateway.calls("checkoutCreate").await, 1);
}

#[tokio::test]
async fn test_expired_session_is_reported_and_kept() {
    let gateway = common::stocked_gateway().await;
    let store = InMemorySessionStore::new();
    let mut cart = common::cart(&gateway, &store);
    cart.add_item(variant(KURTA), 1).await.unwrap();
    let id = cart.checkout_id().cloned().unwrap();
    let before = cart.state().clone();

    gateway.expire(&id).await;
    let err = cart.load_checkout().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(cart.state(), &before);

    cart.clear_cart().await.unwrap();
    cart.add_item(variant(KURTA), 1).await.unwrap();
    assert_ne!(cart.checkout_id(), Some(&id));
    assert_eq!(gateway.calls("checkoutCreate").await, 2);
}
