//! Admin product editor.
//!
//! Every handler here takes [`RequireAdmin`], so anyone who is not a signed-in
//! admin is sent to the home page before the handler runs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use eshop_core::{Product, ProductId, ProductInput};

use super::{ConfirmTemplate, prompt_relogin};
use crate::api::ApiError;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin};
use crate::models::{Flash, push_flash};
use crate::state::AppState;

/// Category suggestions offered by the form. Free text is also accepted.
pub const CATEGORY_SUGGESTIONS: [&str; 8] = [
    "Apparel",
    "Electronics",
    "Furniture",
    "Footwear",
    "Personal Care",
    "Books",
    "Toys",
    "Clothes",
];

/// Notice for a form with an empty required field.
const REQUIRED_FIELDS_NOTICE: &str = "Please fill in all required fields";

// =============================================================================
// Form
// =============================================================================

/// Product form data. Numbers arrive as text and are parsed on submit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub available_items: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
}

/// Problems with a submitted product form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFormErrors {
    /// Form-level notice.
    pub notice: Option<String>,
    pub available_items: Option<String>,
    pub price: Option<String>,
}

impl ProductForm {
    /// Prefill from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            manufacturer: product.manufacturer.clone(),
            available_items: product.available_items.to_string(),
            price: product.price.normalize().to_string(),
            image_url: product.image_url.clone().unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
        }
    }

    /// Check required fields and parse the numbers.
    ///
    /// # Errors
    ///
    /// Returns the notice for missing fields, or per-field messages for
    /// numbers that do not parse or are negative.
    pub fn validate(&self) -> Result<ProductInput, ProductFormErrors> {
        let required = [
            &self.name,
            &self.category,
            &self.manufacturer,
            &self.available_items,
            &self.price,
        ];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(ProductFormErrors {
                notice: Some(REQUIRED_FIELDS_NOTICE.to_string()),
                ..ProductFormErrors::default()
            });
        }

        let available_items = self.available_items.trim().parse::<u32>().map_err(|_| {
            "Available items must be a whole number of 0 or more".to_string()
        });
        let price = self
            .price
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|p| !p.is_sign_negative())
            .ok_or_else(|| "Price must be a number of 0 or more".to_string());

        match (available_items, price) {
            (Ok(available_items), Ok(price)) => Ok(ProductInput {
                id: None,
                name: self.name.trim().to_owned(),
                category: self.category.trim().to_owned(),
                manufacturer: self.manufacturer.trim().to_owned(),
                available_items,
                price,
                image_url: non_empty(&self.image_url),
                description: non_empty(&self.description),
            }),
            (available_items, price) => Err(ProductFormErrors {
                notice: None,
                available_items: available_items.err(),
                price: price.err(),
            }),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

// =============================================================================
// Templates
// =============================================================================

/// Add/modify product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub ctx: PageContext,
    /// `Some` when editing.
    pub product_id: Option<String>,
    pub form: ProductForm,
    pub errors: ProductFormErrors,
    pub suggestions: &'static [&'static str],
}

impl ProductFormTemplate {
    fn new(ctx: PageContext, product_id: Option<&ProductId>, form: ProductForm) -> Self {
        Self {
            ctx,
            product_id: product_id.map(ToString::to_string),
            form,
            errors: ProductFormErrors::default(),
            suggestions: &CATEGORY_SUGGESTIONS,
        }
    }

    fn with_errors(mut self, errors: ProductFormErrors) -> Self {
        if let Some(notice) = &errors.notice {
            self.ctx = self.ctx.with_flash(Flash::error(notice.clone()));
        }
        self.errors = errors;
        self
    }

    fn action(&self) -> String {
        self.product_id
            .as_ref()
            .map_or_else(|| "/add-product".to_string(), |id| format!("/edit-product/{id}"))
    }

    fn heading(&self) -> &'static str {
        if self.product_id.is_some() {
            "Edit Product"
        } else {
            "Add Product"
        }
    }
}

// =============================================================================
// Create
// =============================================================================

/// Display the empty product form.
pub async fn new_product(RequireAdmin(_admin): RequireAdmin, ctx: PageContext) -> impl IntoResponse {
    ProductFormTemplate::new(ctx, None, ProductForm::default())
}

/// Handle the add product form.
#[instrument(skip(state, session, admin, ctx, form), fields(name = %form.name))]
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Form(form): Form<ProductForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return ProductFormTemplate::new(ctx, None, form)
                .with_errors(errors)
                .into_response();
        }
    };

    match state.api().create_product(&admin.access_token(), &input).await {
        Ok(()) => {
            tracing::info!("Product added");
            push_flash(&session, Flash::success("Product added successfully!")).await;
            Redirect::to("/products").into_response()
        }
        Err(ApiError::Unauthorized) => prompt_relogin(&session).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add product");
            let notice = e.server_message().unwrap_or("Failed to add product").to_owned();
            ProductFormTemplate::new(ctx.with_flash(Flash::error(notice)), None, form)
                .into_response()
        }
    }
}

// =============================================================================
// Modify
// =============================================================================

/// Display the product form prefilled with the stored product.
#[instrument(skip(state, session, ctx))]
pub async fn edit_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    ctx: PageContext,
    Path(id): Path<String>,
) -> Response {
    let id = ProductId::new(id);

    match state.api().get_product(&id).await {
        Ok(product) => {
            ProductFormTemplate::new(ctx, Some(&id), ProductForm::from_product(&product))
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Failed to load product for editing");
            push_flash(&session, Flash::error("Failed to load product details")).await;
            Redirect::to("/products").into_response()
        }
    }
}

/// Handle the modify product form.
#[instrument(skip(state, session, admin, ctx, form))]
pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Response {
    let id = ProductId::new(id);

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return ProductFormTemplate::new(ctx, Some(&id), form)
                .with_errors(errors)
                .into_response();
        }
    };

    match state
        .api()
        .update_product(&admin.access_token(), &id, &input)
        .await
    {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product updated");
            push_flash(&session, Flash::success("Product updated successfully!")).await;
            Redirect::to("/products").into_response()
        }
        Err(ApiError::Unauthorized) => prompt_relogin(&session).await,
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Failed to update product");
            let notice = e
                .server_message()
                .unwrap_or("Failed to update product")
                .to_owned();
            ProductFormTemplate::new(ctx.with_flash(Flash::error(notice)), Some(&id), form)
                .into_response()
        }
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Ask for confirmation before deleting a product.
#[instrument(skip(state, session, ctx))]
pub async fn confirm_delete_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    ctx: PageContext,
    Path(id): Path<String>,
) -> Response {
    let id = ProductId::new(id);

    match state.api().get_product(&id).await {
        Ok(product) => ConfirmTemplate {
            ctx,
            title: "Confirm deletion of product!".to_string(),
            message: format!(
                "Are you sure you want to delete the product \"{}\"?",
                product.name
            ),
            action: format!("/products/{}/delete", product.id),
            cancel_href: "/products".to_string(),
        }
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Failed to load product for deletion");
            push_flash(&session, Flash::error("Failed to load product details")).await;
            Redirect::to("/products").into_response()
        }
    }
}

/// Delete a product.
#[instrument(skip(state, session, admin))]
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Response {
    let id = ProductId::new(id);

    match state.api().delete_product(&admin.access_token(), &id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product deleted");
            add_breadcrumb("admin", "Deleted product", Some(&[("product_id", id.as_str())]));
            push_flash(&session, Flash::success("Product deleted successfully")).await;
        }
        Err(ApiError::Unauthorized) => return prompt_relogin(&session).await,
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Failed to delete product");
            push_flash(
                &session,
                Flash::error("Failed to delete product. Check authentication."),
            )
            .await;
        }
    }

    Redirect::to("/products").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: " Desk Lamp ".to_string(),
            category: "Furniture".to_string(),
            manufacturer: "Acme".to_string(),
            available_items: "12".to_string(),
            price: "1999.50".to_string(),
            image_url: String::new(),
            description: "  ".to_string(),
        }
    }

    #[test]
    fn test_validate_builds_input() {
        let input = form().validate().unwrap();
        assert_eq!(input.name, "Desk Lamp");
        assert_eq!(input.available_items, 12);
        assert_eq!(input.price, Decimal::new(199_950, 2));
        assert!(input.image_url.is_none());
        assert!(input.description.is_none());
    }

    #[test]
    fn test_validate_requires_fields() {
        let errors = ProductForm {
            manufacturer: String::new(),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.notice.as_deref(), Some(REQUIRED_FIELDS_NOTICE));
    }

    #[test]
    fn test_validate_reports_bad_numbers_per_field() {
        let errors = ProductForm {
            available_items: "-1".to_string(),
            price: "cheap".to_string(),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert!(errors.notice.is_none());
        assert!(errors.available_items.is_some());
        assert!(errors.price.is_some());

        let errors = ProductForm {
            price: "-5".to_string(),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert!(errors.available_items.is_none());
        assert!(errors.price.is_some());
    }

    #[test]
    fn test_form_prefills_from_product() {
        let product = Product {
            id: ProductId::new("p9"),
            name: "Chair".to_string(),
            category: "Furniture".to_string(),
            manufacturer: "Acme".to_string(),
            price: Decimal::new(50000, 2),
            available_items: 0,
            image_url: None,
            description: Some("Oak".to_string()),
        };
        let form = ProductForm::from_product(&product);
        assert_eq!(form.price, "500");
        assert_eq!(form.available_items, "0");
        assert_eq!(form.description, "Oak");
    }
}
