//! User-scoped order endpoints.
//!
//! `/my/...` always means the caller; `/user/{user_id}/...` names a user,
//! which non-staff callers may only do for themselves.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{OrderId, UserId};
use domain::Operation;
use store::Store;

use super::orders::{ListParams, OrderResponse, PageResponse, parse_id};
use crate::auth::CurrentCaller;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /my/orders
#[tracing::instrument(skip(state, current))]
pub async fn my_orders<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse<OrderResponse>>, ApiError> {
    state.guard(Operation::ListUserOrders, &current)?;
    list_for(&state, &current, None, &params).await
}

/// GET /my/orders/{order_id}
#[tracing::instrument(skip(state, current))]
pub async fn my_order<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    state.guard(Operation::RetrieveUserOrder, &current)?;
    get_for(&state, &current, None, &order_id).await
}

/// GET /user/{user_id}/orders
#[tracing::instrument(skip(state, current))]
pub async fn user_orders<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse<OrderResponse>>, ApiError> {
    state.guard(Operation::ListUserOrders, &current)?;
    let user_id: UserId = parse_id(&user_id)?;
    list_for(&state, &current, Some(user_id), &params).await
}

/// GET /user/{user_id}/orders/{order_id}
#[tracing::instrument(skip(state, current))]
pub async fn user_order<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    current: CurrentCaller,
    Path((user_id, order_id)): Path<(String, String)>,
) -> Result<Json<OrderResponse>, ApiError> {
    state.guard(Operation::RetrieveUserOrder, &current)?;
    let user_id: UserId = parse_id(&user_id)?;
    get_for(&state, &current, Some(user_id), &order_id).await
}

async fn list_for<S: Store>(
    state: &AppState<S>,
    current: &CurrentCaller,
    user_id: Option<UserId>,
    params: &ListParams,
) -> Result<Json<PageResponse<OrderResponse>>, ApiError> {
    let page = state
        .orders
        .list_user_orders(
            &current.caller,
            user_id,
            state.foreign_user_policy,
            &params.filters(),
            params.page_request()?,
        )
        .await?;
    Ok(Json(page.into()))
}

async fn get_for<S: Store>(
    state: &AppState<S>,
    current: &CurrentCaller,
    user_id: Option<UserId>,
    order_id: &str,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id: OrderId = parse_id(order_id)?;

    let order = state
        .orders
        .get_user_order(&current.caller, user_id, order_id, state.foreign_user_policy)
        .await?;
    Ok(Json(order.into()))
}
