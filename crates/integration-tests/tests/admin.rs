//! Admin product editor.

use eshop_integration_tests::TestContext;
use eshop_integration_tests::fake_api::{ADMIN_EMAIL, ADMIN_PASSWORD, USER_EMAIL, USER_PASSWORD};
use serde_json::Value;

fn product_form<'a>(name: &'a str, price: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", name),
        ("category", "Books"),
        ("manufacturer", "Penguin"),
        ("available_items", "7"),
        ("price", price),
        ("image_url", ""),
        ("description", "A paperback."),
    ]
}

async fn admin() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    ctx
}

#[tokio::test]
async fn test_editor_requires_admin() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/add-product").await;
    assert_eq!(page.path, "/");

    ctx.login(USER_EMAIL, USER_PASSWORD).await;
    let page = ctx.get("/add-product").await;
    assert_eq!(page.path, "/");

    let page = ctx.post("/products/p-lamp/delete", &[]).await;
    assert_eq!(page.path, "/");
    assert_eq!(ctx.api.products().await.len(), 3);
}

#[tokio::test]
async fn test_add_product() {
    let ctx = admin().await;

    let page = ctx.get("/add-product").await;
    assert!(page.shows("Add Product"));
    assert!(page.shows("<datalist id=\"category-suggestions\">"));

    let page = ctx.post("/add-product", &product_form("Rust Book", "499.5")).await;

    assert_eq!(page.path, "/products");
    assert!(page.shows("Product added successfully!"));
    assert!(page.shows("Rust Book"));

    let products = ctx.api.products().await;
    let created = products
        .iter()
        .find(|p| p.get("name").and_then(Value::as_str) == Some("Rust Book"))
        .expect("product stored");
    assert_eq!(created.get("availableItems").and_then(Value::as_u64), Some(7));
    assert_eq!(created.get("price").and_then(Value::as_f64), Some(499.5));
    assert!(created.get("imageUrl").is_none_or(Value::is_null));
}

#[tokio::test]
async fn test_add_product_validation() {
    let ctx = admin().await;

    let page = ctx.post("/add-product", &product_form("", "10")).await;
    assert_eq!(page.path, "/add-product");
    assert!(page.shows("Please fill in all required fields"));

    let page = ctx.post("/add-product", &product_form("Rust Book", "-3")).await;
    assert!(page.shows("Price must be a number of 0 or more"));
    assert!(page.shows("value=\"Rust Book\""));

    assert_eq!(ctx.api.products().await.len(), 3);
}

#[tokio::test]
async fn test_modify_product() {
    let ctx = admin().await;

    let page = ctx.get("/edit-product/p-lamp").await;
    assert!(page.shows("Edit Product"));
    assert!(page.shows("UPDATE PRODUCT"));
    assert!(!page.shows("Modify Product"));
    assert!(page.shows("value=\"Desk Lamp\""));
    assert!(page.shows("value=\"1250\""));

    let page = ctx
        .post("/edit-product/p-lamp", &product_form("Reading Lamp", "1300"))
        .await;

    assert_eq!(page.path, "/products");
    assert!(page.shows("Product updated successfully!"));
    assert!(page.shows("Reading Lamp"));
    assert!(!page.shows("Desk Lamp"));
}

#[tokio::test]
async fn test_edit_missing_product_redirects() {
    let ctx = admin().await;

    let page = ctx.get("/edit-product/p-missing").await;

    assert_eq!(page.path, "/products");
    assert!(page.shows("Failed to load product details"));
}

#[tokio::test]
async fn test_delete_product_with_confirmation() {
    let ctx = admin().await;

    let page = ctx.get("/products/p-shirt/delete").await;
    assert!(page.shows("Are you sure you want to delete the product"));
    assert!(page.shows("action=\"/products/p-shirt/delete\""));

    let page = ctx.post("/products/p-shirt/delete", &[]).await;

    assert_eq!(page.path, "/products");
    assert!(page.shows("Product deleted successfully"));
    assert!(!page.shows("Linen Shirt"));
    assert_eq!(ctx.api.products().await.len(), 2);
}

#[tokio::test]
async fn test_revoked_admin_token_prompts_relogin() {
    let ctx = admin().await;
    ctx.api.revoke_tokens().await;

    let page = ctx.post("/add-product", &product_form("Rust Book", "10")).await;

    assert_eq!(page.path, "/login");
    assert!(page.shows("Your session may have expired. Please login again."));
}
