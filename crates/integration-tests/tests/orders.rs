//! Order wizard and address book.

use eshop_integration_tests::TestContext;
use eshop_integration_tests::fake_api::{USER_EMAIL, USER_PASSWORD};
use serde_json::Value;

fn address_form<'a>(name: &'a str, zipcode: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", name),
        ("contact_number", "9876543210"),
        ("street", "1 MG Road"),
        ("city", "Pune"),
        ("state", "MH"),
        ("landmark", ""),
        ("zipcode", zipcode),
    ]
}

/// Signed-in shopper with a draft for two desk lamps.
async fn shopper_with_draft() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.login(USER_EMAIL, USER_PASSWORD).await;

    let page = ctx
        .post("/orders/start", &[("product_id", "p-lamp"), ("quantity", "2")])
        .await;
    assert_eq!(page.path, "/orders");
    ctx
}

fn first_address_id(addresses: &[Value]) -> String {
    addresses
        .first()
        .and_then(|a| a.get("id"))
        .and_then(Value::as_str)
        .expect("address stored")
        .to_string()
}

#[tokio::test]
async fn test_orders_require_login() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/orders").await;
    assert_eq!(page.path, "/login");

    let page = ctx
        .post("/orders/start", &[("product_id", "p-lamp"), ("quantity", "1")])
        .await;
    assert_eq!(page.path, "/login");
}

#[tokio::test]
async fn test_orders_without_draft_go_to_products() {
    let ctx = TestContext::new().await;
    ctx.login(USER_EMAIL, USER_PASSWORD).await;

    let page = ctx.get("/orders").await;

    assert_eq!(page.path, "/products");
    assert!(page.shows("Please choose a product to order first."));
}

#[tokio::test]
async fn test_start_rejects_bad_quantity() {
    let ctx = TestContext::new().await;
    ctx.login(USER_EMAIL, USER_PASSWORD).await;

    let page = ctx
        .post("/orders/start", &[("product_id", "p-lamp"), ("quantity", "0")])
        .await;

    assert_eq!(page.path, "/products/p-lamp");
    assert!(page.shows("Quantity must be between 1 and 99"));
}

#[tokio::test]
async fn test_next_requires_address() {
    let ctx = shopper_with_draft().await;

    let page = ctx.post("/orders/next", &[]).await;

    assert_eq!(page.path, "/orders");
    assert!(page.shows("Please select an address!"));
    assert!(page.shows("SAVE ADDRESS"));
}

#[tokio::test]
async fn test_full_order_flow() {
    let ctx = shopper_with_draft().await;

    let page = ctx.post("/orders/addresses", &address_form("Home", "411001")).await;
    assert_eq!(page.path, "/orders");
    assert!(page.shows("Address saved successfully!"));
    assert!(page.shows("Selected Address"));
    assert!(page.shows("Home - 1 MG Road, Pune"));

    let page = ctx.post("/orders/next", &[]).await;
    assert!(page.shows("PLACE ORDER"));
    assert!(page.shows("Desk Lamp"));
    assert!(page.shows("Quantity: <strong>2</strong>"));
    assert!(page.shows("₹2500"));
    assert!(page.shows("1 MG Road, Pune, MH - 411001"));

    let page = ctx.post("/orders/place", &[]).await;
    assert_eq!(page.path, "/products");
    assert!(page.shows("Order placed successfully!"));

    let orders = ctx.api.orders().await;
    let order = orders.first().expect("order stored");
    assert_eq!(order.get("product").and_then(Value::as_str), Some("p-lamp"));
    assert_eq!(order.get("quantity").and_then(Value::as_u64), Some(2));
    assert_eq!(order.get("user").and_then(Value::as_str), Some("u-user"));
    let address = first_address_id(&ctx.api.addresses().await);
    assert_eq!(order.get("address").and_then(Value::as_str), Some(address.as_str()));

    // Draft is gone
    let page = ctx.get("/orders").await;
    assert_eq!(page.path, "/products");
}

#[tokio::test]
async fn test_back_steps() {
    let ctx = shopper_with_draft().await;
    ctx.post("/orders/addresses", &address_form("Home", "411001")).await;
    ctx.post("/orders/next", &[]).await;

    let page = ctx.post("/orders/back", &[]).await;
    assert_eq!(page.path, "/orders");
    assert!(page.shows("SAVE ADDRESS"));

    let page = ctx.post("/orders/back", &[]).await;
    assert_eq!(page.path, "/products/p-lamp");
}

#[tokio::test]
async fn test_select_existing_address() {
    let ctx = shopper_with_draft().await;
    ctx.post("/orders/addresses", &address_form("Home", "411001")).await;
    ctx.post("/orders/addresses", &address_form("Office", "411002")).await;
    let home = first_address_id(&ctx.api.addresses().await);

    let page = ctx.post("/orders/address", &[("address_id", home.as_str())]).await;

    assert!(page.shows(&format!("<option value=\"{home}\" selected>")));

    let page = ctx.post("/orders/address", &[("address_id", "")]).await;
    assert!(!page.shows("Selected Address"));
}

#[tokio::test]
async fn test_address_validation_keeps_values() {
    let ctx = shopper_with_draft().await;

    let page = ctx.post("/orders/addresses", &address_form("Home", "")).await;

    assert!(page.shows("Please fill in all required fields."));
    assert!(page.shows("value=\"1 MG Road\""));
    assert!(ctx.api.addresses().await.is_empty());
}

#[tokio::test]
async fn test_address_rejected_by_api() {
    let ctx = shopper_with_draft().await;

    let page = ctx.post("/orders/addresses", &address_form("Home", "000000")).await;

    assert!(page.shows("Failed to save address: Invalid zipcode"));
}

#[tokio::test]
async fn test_edit_and_delete_address() {
    let ctx = shopper_with_draft().await;
    ctx.post("/orders/addresses", &address_form("Home", "411001")).await;
    let id = first_address_id(&ctx.api.addresses().await);

    let page = ctx.get(&format!("/orders/addresses/{id}/edit")).await;
    assert!(page.shows("Edit Address"));
    assert!(page.shows("value=\"Home\""));

    let page = ctx
        .post(&format!("/orders/addresses/{id}"), &address_form("Cottage", "411001"))
        .await;
    assert!(page.shows("Address updated successfully!"));
    assert!(page.shows("Cottage - 1 MG Road, Pune"));

    let page = ctx.get(&format!("/orders/addresses/{id}/delete")).await;
    assert!(page.shows("Are you sure you want to delete this address?"));

    let page = ctx.post(&format!("/orders/addresses/{id}/delete"), &[]).await;
    assert_eq!(page.path, "/orders");
    assert!(page.shows("Address deleted successfully!"));
    assert!(!page.shows("Selected Address"));
    assert!(ctx.api.addresses().await.is_empty());
}

#[tokio::test]
async fn test_revoked_token_prompts_relogin() {
    let ctx = shopper_with_draft().await;
    ctx.api.revoke_tokens().await;

    let page = ctx.get("/orders").await;

    assert_eq!(page.path, "/login");
    assert!(page.shows("Your session may have expired. Please login again."));
}
