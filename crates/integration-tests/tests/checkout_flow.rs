//! End-to-end checkout: import products, sign up, fill the cart, place an order.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use flawless_core::OrderStatus;
use flawless_storefront::StorefrontError;
use flawless_storefront::catalog::Catalog;
use flawless_storefront::orders::OrderStore;
use flawless_storefront::services::auth::IdentityProvider;
use flawless_storefront::services::checkout::CheckoutError;
use flawless_storefront::services::import::import_products;
use flawless_integration_tests::{PRODUCTS_CSV, TestContext, sign_up_request};

#[tokio::test]
async fn test_full_checkout_flow() {
    let ctx = TestContext::new();
    let csv = ctx.write_file("products.csv", PRODUCTS_CSV);
    let storefront = ctx.open().await.unwrap();

    let summary = import_products(storefront.catalog(), &csv).await.unwrap();
    assert_eq!(summary.products_created, 2);

    let user = storefront
        .identity()
        .sign_up(sign_up_request("ama@example.com"))
        .await
        .unwrap();

    for product in storefront.catalog().list_products().await.unwrap() {
        storefront.cart().add_item(product.to_cart_candidate());
        if product.name == "Kente Shirt" {
            storefront.cart().add_item(product.to_cart_candidate());
        }
    }
    assert_eq!(storefront.cart().total_price(), Decimal::new(55, 0));

    let receipt = storefront
        .checkout()
        .place_order(&user, "12 Oxford St, Osu", "Call on arrival")
        .await
        .unwrap();

    assert!(storefront.cart().is_empty());
    assert!(
        receipt
            .handoff_url
            .starts_with("https://wa.me/233200591693?text=")
    );
    assert!(receipt.message.contains("Kente Shirt x2 - GHS 40.00"));
    assert!(receipt.message.contains("Bucket Hat x1 - GHS 15.00"));
    assert!(receipt.message.contains("Name: Ama Mensah"));
    assert!(receipt.message.contains("Phone: +233241234567"));

    let stored = storefront.orders().get_order(&receipt.order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.total, Decimal::new(55, 0));
    assert_eq!(stored.user_id, user.uid);
    assert_eq!(stored.delivery_address, "12 Oxford St, Osu");
    assert_eq!(stored.additional_notes, "Call on arrival");
    assert_eq!(stored.items.len(), 2);

    let history = storefront
        .orders()
        .list_orders_for_user(&user.uid)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);

    drop(storefront);
    let reopened = ctx.open().await.unwrap();
    assert!(reopened.cart().is_empty());
}

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let ctx = TestContext::new();
    let storefront = ctx.open().await.unwrap();

    let err = storefront.require_user().unwrap_err();
    assert!(matches!(err, StorefrontError::NotSignedIn));
    assert_eq!(err.user_message(), "Please sign in to continue.");
}

#[tokio::test]
async fn test_empty_cart_writes_no_order() {
    let ctx = TestContext::new();
    let storefront = ctx.open().await.unwrap();
    let user = storefront
        .identity()
        .sign_up(sign_up_request("kofi@example.com"))
        .await
        .unwrap();

    let err = storefront
        .checkout()
        .place_order(&user, "Osu", "")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));

    let history = storefront
        .orders()
        .list_orders_for_user(&user.uid)
        .await
        .unwrap();
    assert!(history.is_empty());
}
