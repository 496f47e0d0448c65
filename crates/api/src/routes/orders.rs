//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::{Choice, DomainError, Operation, Order, OrderFilters, Page, PageRequest, User};
use serde::{Deserialize, Serialize};
use store::Store;

use crate::auth::CurrentCaller;
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

/// Query parameters accepted by every listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub status: Option<String>,
    pub size: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn filters(&self) -> OrderFilters {
        OrderFilters::new(
            self.status.as_deref(),
            self.size.as_deref(),
            self.search.as_deref(),
        )
    }

    pub fn page_request(&self) -> Result<PageRequest, ApiError> {
        PageRequest::from_params(self.page.as_deref(), self.page_size.as_deref())
            .ok_or(ApiError::Domain(DomainError::InvalidPage))
    }
}

// -- Response types --

/// An order as clients see it: enumerated fields carry their labels.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub size: &'static str,
    pub order_status: &'static str,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            size: order.size.label(),
            order_status: order.status.label(),
            quantity: order.quantity.get(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// Staff view of a single order, including its owner.
#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub customer: CustomerSummary,
}

/// Page envelope. `next` and `previous` are page numbers.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub count: u64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl From<Page<Order>> for PageResponse<OrderResponse> {
    fn from(page: Page<Order>) -> Self {
        let next = page.next();
        let previous = page.previous();
        Self {
            count: page.count,
            next,
            previous,
            results: page.results.into_iter().map(OrderResponse::from).collect(),
        }
    }
}

/// Parses an id path segment. Anything that is not an integer names no
/// resource.
pub(crate) fn parse_id<T: From<i64>>(raw: &str) -> Result<T, ApiError> {
    raw.parse::<i64>()
        .map(T::from)
        .map_err(|_| ApiError::NotFound("Not found.".to_string()))
}

// -- Handlers --

/// GET /orders: list every order, newest first.
#[tracing::instrument(skip(state, current))]
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse<OrderResponse>>, ApiError> {
    state.guard(Operation::ListOrders, &current)?;

    let page = state
        .orders
        .list_orders(&params.filters(), params.page_request()?)
        .await?;
    Ok(Json(page.into()))
}

/// POST /orders: create an order owned by the caller.
#[tracing::instrument(skip(state, current, body))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    body: Bytes,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    state.guard(Operation::CreateOrder, &current)?;
    let customer = current.caller.require_user()?;

    let order = state.orders.create_order(customer, &body).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/{order_id}: staff view of one order.
#[tracing::instrument(skip(state, current))]
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    Path(order_id): Path<String>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    state.guard(Operation::RetrieveOrder, &current)?;

    let (order, owner): (Order, User) = state
        .orders
        .get_order_with_owner(parse_id(&order_id)?)
        .await?;

    Ok(Json(OrderDetailResponse {
        order: order.into(),
        customer: CustomerSummary {
            id: owner.id,
            username: owner.username,
            email: owner.email,
        },
    }))
}

/// DELETE /orders/{order_id}: remove an order.
#[tracing::instrument(skip(state, current))]
pub async fn delete<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    Path(order_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.guard(Operation::DeleteOrder, &current)?;

    state.orders.delete_order(parse_id(&order_id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /orders/{order_id}/status: set an order's status.
#[tracing::instrument(skip(state, current, body))]
pub async fn update_status<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    Path(order_id): Path<String>,
    body: Bytes,
) -> Result<Json<OrderResponse>, ApiError> {
    state.guard(Operation::UpdateOrderStatus, &current)?;

    let order = state
        .orders
        .update_status(parse_id(&order_id)?, &body)
        .await?;
    Ok(Json(order.into()))
}

/// PUT /orders/{order_id}/update: replace size, status and quantity.
#[tracing::instrument(skip(state, current, body))]
pub async fn update<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    Path(order_id): Path<String>,
    body: Bytes,
) -> Result<Json<OrderResponse>, ApiError> {
    state.guard(Operation::UpdateOrder, &current)?;

    let order = state
        .orders
        .update_order(&current.caller, parse_id(&order_id)?, &body)
        .await?;
    Ok(Json(order.into()))
}
