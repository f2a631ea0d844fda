//! Navigation shell, content pages and response headers.

use axum::http::StatusCode;
use slash_integration_tests::TestContext;

#[tokio::test]
async fn test_health() {
    let mut ctx = TestContext::new();

    let resp = ctx.get("/health").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
}

#[tokio::test]
async fn test_home_lists_catalog_and_menus() {
    let mut ctx = TestContext::new();

    let resp = ctx.get("/").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Spa Day"));
    assert!(resp.body.contains("All Experiences"));
    assert!(resp.body.contains("Gifting Guide"));
    assert!(resp.body.contains("Host an Experience"));
}

#[tokio::test]
async fn test_pages_carry_security_headers_and_nonce() {
    let mut ctx = TestContext::new();

    let resp = ctx.get("/").await;

    let csp = resp.header("content-security-policy").unwrap_or_default();
    assert!(csp.contains("'nonce-"));
    assert!(csp.contains("https://checkout.razorpay.com"));
    assert_eq!(resp.header("x-frame-options"), Some("DENY"));
    assert!(resp.header("x-request-id").is_some());
}

#[tokio::test]
async fn test_dropdowns_are_exclusive() {
    let mut ctx = TestContext::new();

    let company = ctx.htmx_post("/nav/dropdown/company", &[]).await;
    assert!(company.body.contains("About Us"));
    assert!(!company.body.contains("Gift Rules"));

    let support = ctx.htmx_post("/nav/dropdown/support", &[]).await;
    assert!(support.body.contains("Gift Rules"));
    assert!(!support.body.contains("About Us"));

    let closed = ctx.htmx_post("/nav/dropdown/support", &[]).await;
    assert!(!closed.body.contains("dropdown-panel"));
}

#[tokio::test]
async fn test_unknown_dropdown_is_not_found() {
    let mut ctx = TestContext::new();

    let resp = ctx.htmx_post("/nav/dropdown/wishlist", &[]).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_cart_dropdown_prompts_sign_in() {
    let mut ctx = TestContext::new();

    let resp = ctx.htmx_post("/nav/dropdown/cart", &[]).await;

    assert!(resp.body.contains("Please sign in to view your cart"));
}

#[tokio::test]
async fn test_mobile_menu_toggles() {
    let mut ctx = TestContext::new();

    let open = ctx.htmx_post("/nav/mobile", &[]).await;
    assert!(open.body.contains("mobile-menu"));

    let closed = ctx.htmx_post("/nav/mobile", &[]).await;
    assert!(!closed.body.contains("class=\"mobile-menu\""));
}

#[tokio::test]
async fn test_content_page_renders_markdown() {
    let mut ctx = TestContext::new();

    let resp = ctx.get("/how-it-works").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("<strong>Pick an experience.</strong>"));
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let mut ctx = TestContext::new();

    let resp = ctx.get("/wishlist").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_experience_is_not_found() {
    let mut ctx = TestContext::new();

    let resp = ctx.get("/experience/e99").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
