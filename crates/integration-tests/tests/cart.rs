//! Cart store and cart view flows.

use axum::http::StatusCode;
use slash_integration_tests::TestContext;

#[tokio::test]
async fn test_htmx_add_returns_badge_and_trigger() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .htmx_post("/cart/add", &[("experience_id", "e1"), ("quantity", "2")])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-trigger"), Some("cart-updated"));
    assert!(resp.body.contains("id=\"cart-count\""));
    assert!(resp.body.contains(">2</span>"));
}

#[tokio::test]
async fn test_adding_same_experience_merges_quantity() {
    let mut ctx = TestContext::new();

    ctx.htmx_post("/cart/add", &[("experience_id", "e2")]).await;
    let resp = ctx
        .htmx_post("/cart/add", &[("experience_id", "e2"), ("quantity", "2")])
        .await;

    assert!(resp.body.contains(">3</span>"));
}

#[tokio::test]
async fn test_unknown_experience_leaves_cart_untouched() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .htmx_post("/cart/add", &[("experience_id", "does-not-exist")])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("\"></span>"), "badge should be empty");
}

#[tokio::test]
async fn test_plain_form_add_redirects_to_cart() {
    let mut ctx = TestContext::new();

    let resp = ctx.post("/cart/add", &[("experience_id", "e1")]).await;

    assert!(resp.status.is_redirection());
    assert_eq!(resp.location(), Some("/cart"));
}

#[tokio::test]
async fn test_anonymous_cart_page_prompts_sign_in() {
    let mut ctx = TestContext::new();
    ctx.htmx_post("/cart/add", &[("experience_id", "e1")]).await;

    let resp = ctx.get("/cart").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Please sign in to view your cart"));
    assert!(!resp.body.contains("Order Summary"));
}

#[tokio::test]
async fn test_signed_in_cart_shows_lines_and_total() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;
    ctx.htmx_post("/cart/add", &[("experience_id", "e1"), ("quantity", "2")])
        .await;
    ctx.htmx_post("/cart/add", &[("experience_id", "e3")]).await;

    let resp = ctx.get("/cart").await;

    assert!(resp.body.contains("Spa Day"));
    assert!(resp.body.contains("Sunset Yacht Cruise"));
    assert!(resp.body.contains("₹100.00"));
    assert!(resp.body.contains("₹185.00"), "total of 2×50 + 85");
    assert!(resp.body.contains("Confirm Bookings"));
}

#[tokio::test]
async fn test_cart_survives_sign_in() {
    let mut ctx = TestContext::new();
    ctx.htmx_post("/cart/add", &[("experience_id", "e4")]).await;

    ctx.sign_in().await;
    let resp = ctx.get("/cart").await;

    assert!(resp.body.contains("Private Dining"));
}

#[tokio::test]
async fn test_remove_returns_items_fragment() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;
    ctx.htmx_post("/cart/add", &[("experience_id", "e1")]).await;

    let resp = ctx
        .htmx_post("/cart/remove", &[("experience_id", "e1")])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-trigger"), Some("cart-updated"));
    assert!(resp.body.contains("Your Cart is Empty"));
    assert!(!resp.body.contains("<html"), "fragment, not a full page");
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let mut ctx = TestContext::new();
    ctx.sign_in().await;
    ctx.htmx_post("/cart/add", &[("experience_id", "e1")]).await;
    ctx.htmx_post("/cart/add", &[("experience_id", "e2")]).await;

    let resp = ctx.htmx_post("/cart/clear", &[]).await;
    assert!(resp.body.contains("Browse Experiences"));

    let count = ctx.htmx_get("/cart/count").await;
    assert!(count.body.contains("\"></span>"));
}
