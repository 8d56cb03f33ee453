//! Order wizard route handlers.
//!
//! The draft lives in the session under `order_draft`. Every handler
//! redirects back to `GET /orders`, which re-reads the saved addresses from the
//! API and renders the current step. Upstream failures become flash notices;
//! a session store that cannot hold the draft ends the request with
//! [`AppError`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use eshop_core::{Address, AddressId, AddressInput, OrderItem, Price, ProductId};

use super::{ConfirmTemplate, prompt_relogin};
use crate::api::ApiError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{PageContext, RequireAuth};
use crate::models::{CurrentUser, Flash, push_flash, session_keys};
use crate::services::checkout::{BackOutcome, OrderDraft, WizardStep};
use crate::state::AppState;

const NO_DRAFT_NOTICE: &str = "Please choose a product to order first.";

// =============================================================================
// Draft storage
// =============================================================================

async fn load_draft(session: &Session) -> Option<OrderDraft> {
    match session.get::<OrderDraft>(session_keys::ORDER_DRAFT).await {
        Ok(draft) => draft,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read order draft");
            None
        }
    }
}

async fn save_draft(session: &Session, draft: &OrderDraft) -> Result<()> {
    session
        .insert(session_keys::ORDER_DRAFT, draft)
        .await
        .map_err(AppError::Session)
}

async fn clear_draft(session: &Session) -> Result<()> {
    session
        .remove_value(session_keys::ORDER_DRAFT)
        .await
        .map(|_| ())
        .map_err(AppError::Session)
}

/// Redirect used when a wizard action arrives without a draft.
async fn no_draft(session: &Session) -> Response {
    push_flash(session, Flash::info(NO_DRAFT_NOTICE)).await;
    Redirect::to("/products").into_response()
}

// =============================================================================
// Forms
// =============================================================================

/// "PLACE ORDER" form on the product detail page.
#[derive(Debug, Deserialize)]
pub struct StartForm {
    pub product_id: String,
    #[serde(default)]
    pub quantity: String,
}

/// Address dropdown.
#[derive(Debug, Deserialize)]
pub struct SelectAddressForm {
    #[serde(default)]
    pub address_id: String,
}

/// Add/edit address form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub zipcode: String,
}

impl AddressForm {
    fn from_address(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            contact_number: address.contact_number.clone(),
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            landmark: address.landmark.clone().unwrap_or_default(),
            zipcode: address.zipcode.clone(),
        }
    }

    fn to_input(&self) -> AddressInput {
        AddressInput {
            id: None,
            name: self.name.clone(),
            contact_number: self.contact_number.clone(),
            street: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            landmark: Some(self.landmark.clone()),
            zipcode: self.zipcode.clone(),
        }
        .normalized()
    }
}

// =============================================================================
// Views
// =============================================================================

/// Stepper entry.
pub struct StepView {
    pub number: usize,
    pub label: &'static str,
    pub active: bool,
    pub completed: bool,
}

/// Order line on the confirmation step. `price` is the line total.
pub struct ItemView {
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub description: String,
    pub price: String,
}

impl From<&OrderItem> for ItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            category: item.category.clone(),
            description: item.description.clone().unwrap_or_default(),
            price: Price::store(item.line_total()).display(),
        }
    }
}

/// Dropdown entry.
pub struct AddressOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

/// Selected address card.
pub struct AddressView {
    pub id: String,
    pub name: String,
    pub contact_number: String,
    pub location: String,
    pub landmark: Option<String>,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            name: address.name.clone(),
            contact_number: address.contact_number.clone(),
            location: address.location_line(),
            landmark: address.landmark().map(str::to_owned),
        }
    }
}

/// Which address the form edits, if any.
#[derive(Default)]
pub struct AddressFormView {
    /// `Some` when editing an existing address.
    pub editing: Option<String>,
    pub values: AddressForm,
}

impl AddressFormView {
    fn editing(id: &AddressId, values: AddressForm) -> Self {
        Self {
            editing: Some(id.to_string()),
            values,
        }
    }

    fn action(&self) -> String {
        self.editing.as_ref().map_or_else(
            || "/orders/addresses".to_string(),
            |id| format!("/orders/addresses/{id}"),
        )
    }
}

/// Order wizard page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/wizard.html")]
pub struct WizardTemplate {
    pub ctx: PageContext,
    pub steps: Vec<StepView>,
    pub confirming: bool,
    pub items: Vec<ItemView>,
    pub total: String,
    pub addresses: Vec<AddressOption>,
    pub selected: Option<AddressView>,
    pub form: AddressFormView,
}

/// Fetch addresses and render the draft's current step.
async fn render_wizard(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    mut ctx: PageContext,
    mut draft: OrderDraft,
    form: AddressFormView,
) -> Result<Response> {
    let addresses = match state.api().list_addresses(&user.access_token()).await {
        Ok(addresses) => {
            let before = draft.selected_address.clone();
            draft.retain_existing(&addresses);
            if draft.selected_address != before {
                save_draft(session, &draft).await?;
            }
            addresses
        }
        Err(ApiError::Unauthorized) => return Ok(prompt_relogin(session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch addresses");
            ctx = ctx.with_flash(Flash::error("Failed to fetch addresses. Please try again."));
            Vec::new()
        }
    };

    let selected_id = draft.selected_address.as_ref();
    Ok(WizardTemplate {
        steps: WizardStep::ALL
            .iter()
            .map(|&step| StepView {
                number: step.index() + 1,
                label: step.label(),
                active: step == draft.step,
                completed: step < draft.step,
            })
            .collect(),
        confirming: draft.step == WizardStep::Confirm,
        items: draft.items.iter().map(ItemView::from).collect(),
        total: Price::store(draft.total()).display(),
        addresses: addresses
            .iter()
            .map(|a| AddressOption {
                id: a.id.to_string(),
                label: a.summary(),
                selected: Some(&a.id) == selected_id,
            })
            .collect(),
        selected: draft.selected(&addresses).map(AddressView::from),
        form,
        ctx,
    }
    .into_response())
}

// =============================================================================
// Wizard
// =============================================================================

/// Start a draft from the product detail page.
#[instrument(skip(state, session, _user))]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Form(form): Form<StartForm>,
) -> Result<Response> {
    let id = ProductId::new(form.product_id);
    let detail = format!("/products/{id}");

    let Ok(quantity) = form.quantity.trim().parse::<u32>() else {
        push_flash(&session, Flash::error("Quantity must be between 1 and 99")).await;
        return Ok(Redirect::to(&detail).into_response());
    };

    let product = match state.api().get_product(&id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Failed to load product for order");
            push_flash(
                &session,
                Flash::error("Failed to load product details. Please try again later."),
            )
            .await;
            return Ok(Redirect::to(&detail).into_response());
        }
    };

    match OrderDraft::start(OrderItem::from_product(&product, quantity)) {
        Ok(draft) => {
            add_breadcrumb("order", "Started order", Some(&[("product_id", id.as_str())]));
            save_draft(&session, &draft).await?;
            Ok(Redirect::to("/orders").into_response())
        }
        Err(e) => {
            push_flash(&session, Flash::error(e.to_string())).await;
            Ok(Redirect::to(&detail).into_response())
        }
    }
}

/// Render the current wizard step.
#[instrument(skip(state, session, user, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<Response> {
    let Some(draft) = load_draft(&session).await else {
        return Ok(no_draft(&session).await);
    };

    render_wizard(&state, &session, &user, ctx, draft, AddressFormView::default()).await
}

/// Pick an address from the dropdown. An empty choice clears the selection.
#[instrument(skip(session, _user))]
pub async fn select_address(
    session: Session,
    RequireAuth(_user): RequireAuth,
    Form(form): Form<SelectAddressForm>,
) -> Result<Response> {
    let Some(mut draft) = load_draft(&session).await else {
        return Ok(no_draft(&session).await);
    };

    let id = form.address_id.trim();
    if id.is_empty() {
        draft.selected_address = None;
    } else {
        add_breadcrumb("order", "Selected address", Some(&[("address_id", id)]));
        draft.select_address(AddressId::new(id));
    }
    save_draft(&session, &draft).await?;

    Ok(Redirect::to("/orders").into_response())
}

/// Advance to the next step.
#[instrument(skip(session, _user))]
pub async fn next(session: Session, RequireAuth(_user): RequireAuth) -> Result<Response> {
    let Some(mut draft) = load_draft(&session).await else {
        return Ok(no_draft(&session).await);
    };

    match draft.next() {
        Ok(step) => {
            add_breadcrumb("order", step.label(), None);
            save_draft(&session, &draft).await?;
        }
        Err(e) => push_flash(&session, Flash::error(e.to_string())).await,
    }

    Ok(Redirect::to("/orders").into_response())
}

/// Go back a step, or leave the wizard for the product page.
#[instrument(skip(session, _user))]
pub async fn back(session: Session, RequireAuth(_user): RequireAuth) -> Result<Response> {
    let Some(mut draft) = load_draft(&session).await else {
        return Ok(no_draft(&session).await);
    };

    match draft.back() {
        BackOutcome::Leave { to } => Ok(Redirect::to(&to).into_response()),
        BackOutcome::Moved(_) => {
            save_draft(&session, &draft).await?;
            Ok(Redirect::to("/orders").into_response())
        }
    }
}

/// Submit the draft, one order per item.
///
/// Lines accepted before a failure are dropped from the draft, so a retry
/// only sends what is still outstanding.
#[instrument(skip(state, session, user))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let Some(mut draft) = load_draft(&session).await else {
        return Ok(no_draft(&session).await);
    };

    let requests = match draft.order_requests(user.user.id.as_ref()) {
        Ok(requests) => requests,
        Err(e) => {
            push_flash(&session, Flash::error(e.to_string())).await;
            return Ok(Redirect::to("/orders").into_response());
        }
    };

    let token = user.access_token();
    let mut placed = 0;
    let mut failure = None;
    for request in &requests {
        match state.api().place_order(&token, request).await {
            Ok(()) => placed += 1,
            Err(e) => {
                failure = Some((e, request.product.clone()));
                break;
            }
        }
    }

    let Some((error, product)) = failure else {
        tracing::info!(items = placed, "Order placed");
        add_breadcrumb("order", "Placed order", None);
        clear_draft(&session).await?;
        push_flash(&session, Flash::success("Order placed successfully!")).await;
        return Ok(Redirect::to("/products").into_response());
    };

    if placed > 0 {
        tracing::info!(items = placed, "Partially placed order");
        draft.mark_placed(placed);
        save_draft(&session, &draft).await?;
    }

    if matches!(error, ApiError::Unauthorized) {
        return Ok(prompt_relogin(&session).await);
    }

    tracing::warn!(error = %error, product = %product, "Failed to place order");
    push_flash(
        &session,
        Flash::error("Failed to place order. Please try again."),
    )
    .await;
    Ok(Redirect::to("/orders").into_response())
}

// =============================================================================
// Addresses
// =============================================================================

/// Save a new address and select it.
#[instrument(skip(state, session, user, ctx, form))]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let Some(mut draft) = load_draft(&session).await else {
        return Ok(no_draft(&session).await);
    };

    let input = form.to_input();
    if let Err(e) = input.validate() {
        let form = AddressFormView {
            editing: None,
            values: form,
        };
        let ctx = ctx.with_flash(Flash::error(e.to_string()));
        return render_wizard(&state, &session, &user, ctx, draft, form).await;
    }

    match state.api().create_address(&user.access_token(), &input).await {
        Ok(id) => {
            tracing::info!(address_id = %id, "Address saved");
            draft.select_address(id);
            save_draft(&session, &draft).await?;
            push_flash(&session, Flash::success("Address saved successfully!")).await;
            Ok(Redirect::to("/orders").into_response())
        }
        Err(ApiError::Unauthorized) => Ok(prompt_relogin(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save address");
            let ctx = ctx.with_flash(Flash::error(format!(
                "Failed to save address: {}",
                e.reason()
            )));
            let form = AddressFormView {
                editing: None,
                values: form,
            };
            render_wizard(&state, &session, &user, ctx, draft, form).await
        }
    }
}

/// Render the wizard with the address form prefilled for editing.
#[instrument(skip(state, session, user, ctx))]
pub async fn edit_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    Path(id): Path<String>,
) -> Result<Response> {
    let Some(draft) = load_draft(&session).await else {
        return Ok(no_draft(&session).await);
    };
    let id = AddressId::new(id);

    let address = match state.api().list_addresses(&user.access_token()).await {
        Ok(addresses) => addresses.into_iter().find(|a| a.id == id),
        Err(ApiError::Unauthorized) => return Ok(prompt_relogin(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch addresses");
            push_flash(
                &session,
                Flash::error("Failed to fetch addresses. Please try again."),
            )
            .await;
            return Ok(Redirect::to("/orders").into_response());
        }
    };

    let Some(address) = address else {
        push_flash(&session, Flash::error("Address not found.")).await;
        return Ok(Redirect::to("/orders").into_response());
    };

    let form = AddressFormView::editing(&id, AddressForm::from_address(&address));
    render_wizard(&state, &session, &user, ctx, draft, form).await
}

/// Save changes to an address.
#[instrument(skip(state, session, user, ctx, form))]
pub async fn update_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    Path(id): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let Some(draft) = load_draft(&session).await else {
        return Ok(no_draft(&session).await);
    };
    let id = AddressId::new(id);

    let input = form.to_input();
    if let Err(e) = input.validate() {
        let ctx = ctx.with_flash(Flash::error(e.to_string()));
        let form = AddressFormView::editing(&id, form);
        return render_wizard(&state, &session, &user, ctx, draft, form).await;
    }

    match state
        .api()
        .update_address(&user.access_token(), &id, &input)
        .await
    {
        Ok(()) => {
            tracing::info!(address_id = %id, "Address updated");
            push_flash(&session, Flash::success("Address updated successfully!")).await;
            Ok(Redirect::to("/orders").into_response())
        }
        Err(ApiError::Unauthorized) => Ok(prompt_relogin(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, address_id = %id, "Failed to update address");
            let ctx = ctx.with_flash(Flash::error(format!(
                "Failed to update address: {}",
                e.reason()
            )));
            let form = AddressFormView::editing(&id, form);
            render_wizard(&state, &session, &user, ctx, draft, form).await
        }
    }
}

/// Ask for confirmation before deleting an address.
pub async fn confirm_delete_address(
    RequireAuth(_user): RequireAuth,
    ctx: PageContext,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = AddressId::new(id);

    ConfirmTemplate {
        ctx,
        title: "Confirm Delete".to_string(),
        message: "Are you sure you want to delete this address? This action cannot be undone."
            .to_string(),
        action: format!("/orders/addresses/{id}/delete"),
        cancel_href: "/orders".to_string(),
    }
}

/// Delete an address, clearing the selection if it was selected.
#[instrument(skip(state, session, user))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = AddressId::new(id);

    match state.api().delete_address(&user.access_token(), &id).await {
        Ok(()) => {
            tracing::info!(address_id = %id, "Address deleted");
            if let Some(mut draft) = load_draft(&session).await
                && draft.clear_address_if(&id)
            {
                save_draft(&session, &draft).await?;
            }
            push_flash(&session, Flash::success("Address deleted successfully!")).await;
        }
        Err(ApiError::Unauthorized) => return Ok(prompt_relogin(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, address_id = %id, "Failed to delete address");
            push_flash(
                &session,
                Flash::error(format!("Failed to delete address: {}", e.reason())),
            )
            .await;
        }
    }

    Ok(Redirect::to("/orders").into_response())
}
