//! Payment gateway checkout flows.

use axum::http::StatusCode;
use slash_integration_tests::{ORDER_ID, TestContext, VALID_SIGNATURE};

async fn signed_in_with_cart() -> TestContext {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;
    ctx.htmx_post("/cart/add", &[("experience_id", "e1"), ("quantity", "2")])
        .await;
    ctx
}

fn completion(signature: &str) -> [(&'static str, &str); 3] {
    [
        ("razorpay_payment_id", "pay_test_1"),
        ("razorpay_order_id", ORDER_ID),
        ("razorpay_signature", signature),
    ]
}

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let mut ctx = TestContext::new();
    ctx.htmx_post("/cart/add", &[("experience_id", "e1")]).await;

    let resp = ctx.post("/checkout", &[]).await;

    assert_eq!(resp.location(), Some("/auth/sign-in"));
    assert!(ctx.gateway_orders().is_empty());
}

#[tokio::test]
async fn test_empty_cart_does_not_create_order() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;

    let resp = ctx.post("/checkout", &[]).await;

    assert_eq!(resp.location(), Some("/cart"));
    assert!(ctx.gateway_orders().is_empty());
}

#[tokio::test]
async fn test_begin_creates_order_in_minor_units() {
    let mut ctx = signed_in_with_cart().await;

    let resp = ctx.post("/checkout", &[]).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(ORDER_ID));
    assert!(resp.body.contains("checkout.razorpay.com"));

    let orders = ctx.gateway_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders.first().map(|o| o.amount), Some(10_000));
}

#[tokio::test]
async fn test_successful_payment_clears_cart() {
    let mut ctx = signed_in_with_cart().await;
    ctx.post("/checkout", &[]).await;

    let resp = ctx
        .post("/checkout/complete", &completion(VALID_SIGNATURE))
        .await;
    assert_eq!(resp.location(), Some("/"));

    let home = ctx.get("/").await;
    assert!(home.body.contains("Booking confirmed successfully!"));

    let cart = ctx.get("/cart").await;
    assert!(cart.body.contains("Your Cart is Empty"));
}

#[tokio::test]
async fn test_bad_signature_keeps_cart() {
    let mut ctx = signed_in_with_cart().await;
    ctx.post("/checkout", &[]).await;

    let resp = ctx
        .post("/checkout/complete", &completion("forged"))
        .await;
    assert_eq!(resp.location(), Some("/cart"));

    let cart = ctx.get("/cart").await;
    assert!(cart.body.contains("Failed to process booking"));
    assert!(cart.body.contains("Spa Day"));
}

#[tokio::test]
async fn test_completion_without_pending_order_is_rejected() {
    let mut ctx = signed_in_with_cart().await;

    let resp = ctx
        .post("/checkout/complete", &completion(VALID_SIGNATURE))
        .await;
    assert_eq!(resp.location(), Some("/cart"));

    let cart = ctx.get("/cart").await;
    assert!(cart.body.contains("Spa Day"));
}

#[tokio::test]
async fn test_cart_change_after_order_fails_completion() {
    let mut ctx = signed_in_with_cart().await;
    ctx.post("/checkout", &[]).await;
    ctx.htmx_post("/cart/add", &[("experience_id", "e2")]).await;

    let resp = ctx
        .post("/checkout/complete", &completion(VALID_SIGNATURE))
        .await;

    assert_eq!(resp.location(), Some("/cart"));
    let cart = ctx.get("/cart").await;
    assert!(cart.body.contains("Hot Air Balloon Ride"));
}

#[tokio::test]
async fn test_gateway_failure_reports_description() {
    let mut ctx = signed_in_with_cart().await;
    ctx.post("/checkout", &[]).await;

    let resp = ctx
        .post(
            "/checkout/failed",
            &[
                ("order_id", ORDER_ID),
                ("error_description", "Card declined by issuer"),
            ],
        )
        .await;
    assert_eq!(resp.location(), Some("/cart"));

    let cart = ctx.get("/cart").await;
    assert!(cart.body.contains("Failed to process booking"));
    assert!(cart.body.contains("Card declined by issuer"));
    assert!(cart.body.contains("Spa Day"));
}

#[tokio::test]
async fn test_second_checkout_reuses_open_order() {
    let mut ctx = signed_in_with_cart().await;

    let first = ctx.post("/checkout", &[]).await;
    let second = ctx.post("/checkout", &[]).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert!(second.body.contains(ORDER_ID));
    assert_eq!(ctx.gateway_orders().len(), 1);

    let resp = ctx
        .post("/checkout/complete", &completion(VALID_SIGNATURE))
        .await;
    assert_eq!(resp.location(), Some("/"));
}

#[tokio::test]
async fn test_checkout_with_open_order_for_other_amount_conflicts() {
    let mut ctx = signed_in_with_cart().await;
    ctx.post("/checkout", &[]).await;
    ctx.htmx_post("/cart/add", &[("experience_id", "e2")]).await;

    let resp = ctx.post("/checkout", &[]).await;

    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(ctx.gateway_orders().len(), 1);
}

#[tokio::test]
async fn test_cancelled_order_allows_new_checkout() {
    let mut ctx = signed_in_with_cart().await;
    ctx.post("/checkout", &[]).await;
    ctx.post(
        "/checkout/failed",
        &[("order_id", ORDER_ID), ("error_description", "Payment cancelled")],
    )
    .await;
    ctx.htmx_post("/cart/add", &[("experience_id", "e2")]).await;

    let resp = ctx.post("/checkout", &[]).await;

    assert_eq!(resp.status, StatusCode::OK);
    let orders = ctx.gateway_orders();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders.last().map(|o| o.amount), Some(22_000));
}

#[tokio::test]
async fn test_failure_for_other_order_keeps_open_order() {
    let mut ctx = signed_in_with_cart().await;
    ctx.post("/checkout", &[]).await;

    let resp = ctx
        .post(
            "/checkout/failed",
            &[("order_id", "order_stale"), ("error_description", "Card declined")],
        )
        .await;
    assert_eq!(resp.location(), Some("/cart"));

    let resp = ctx
        .post("/checkout/complete", &completion(VALID_SIGNATURE))
        .await;
    assert_eq!(resp.location(), Some("/"));

    let cart = ctx.get("/cart").await;
    assert!(cart.body.contains("Your Cart is Empty"));
}

#[tokio::test]
async fn test_failure_report_requires_sign_in() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .post("/checkout/failed", &[("order_id", ORDER_ID)])
        .await;

    assert_eq!(resp.location(), Some("/auth/sign-in"));
}
