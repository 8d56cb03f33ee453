//! Product listing and detail pages.

use eshop_integration_tests::TestContext;
use reqwest::StatusCode;

fn position(body: &str, text: &str) -> usize {
    body.find(text)
        .unwrap_or_else(|| panic!("{text} not found in page"))
}

#[tokio::test]
async fn test_listing_shows_all_products_and_categories() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/products").await;

    assert_eq!(page.status, StatusCode::OK);
    for name in ["Desk Lamp", "Smart Phone", "Linen Shirt"] {
        assert!(page.shows(name), "missing {name}");
    }
    for category in ["Apparel", "Electronics", "Furniture"] {
        assert!(page.shows(&format!("/products?category={category}")));
    }
    assert!(page.shows("/static/images/placeholder.svg"));
    assert!(page.shows("https://img.example/lamp.png"));
}

#[tokio::test]
async fn test_listing_filters_by_category() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/products?category=Electronics").await;

    assert!(page.shows("Smart Phone"));
    assert!(!page.shows("Desk Lamp"));
}

#[tokio::test]
async fn test_unknown_category_shows_everything() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/products?category=Garden").await;

    assert!(page.shows("Smart Phone"));
    assert!(page.shows("Desk Lamp"));
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_kept_in_header() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/products?q=LAMP").await;

    assert!(page.shows("Desk Lamp"));
    assert!(!page.shows("Linen Shirt"));
    assert!(page.shows("value=\"LAMP\""));

    let page = ctx.get("/products?q=nothing-matches").await;
    assert!(page.shows("No products found."));
}

#[tokio::test]
async fn test_sort_by_price() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/products?sort=priceLowToHigh").await;
    assert!(position(&page.body, "Linen Shirt") < position(&page.body, "Desk Lamp"));
    assert!(position(&page.body, "Desk Lamp") < position(&page.body, "Smart Phone"));

    let page = ctx.get("/products?sort=priceHighToLow").await;
    assert!(position(&page.body, "Smart Phone") < position(&page.body, "Linen Shirt"));
}

#[tokio::test]
async fn test_newest_reverses_server_order() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/products?sort=newest").await;

    assert!(position(&page.body, "Linen Shirt") < position(&page.body, "Desk Lamp"));
}

#[tokio::test]
async fn test_product_detail() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/products/p-phone").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.shows("Smart Phone"));
    assert!(page.shows("Available Quantity: 3"));
    assert!(page.shows("Read More"));
    assert!(page.shows("action=\"/orders/start\""));
}

#[tokio::test]
async fn test_missing_product_shows_notice() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/products/p-missing").await;

    assert!(page.shows("Product not found."));
    assert!(!page.shows("PLACE ORDER"));
}
