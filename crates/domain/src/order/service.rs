//! Order service providing the API for order operations.

use common::{OrderId, UserId};
use store::{NewOrderRecord, OrderChanges, OrderQuery, SearchScope, Store};

use crate::choices::Choice;
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest};
use crate::policy::{
    Caller, Denial, ForeignUserPolicy, Target, authorize_order_update, resolve_target_user,
};
use crate::user::User;
use crate::validation::parse_fields;

use super::{CreateOrder, Order, OrderFilters, OrderStatus, UpdateOrder, UpdateOrderStatus};

/// Service for managing orders.
///
/// Role gates and throttling happen before these methods are called; the
/// service performs the checks that need loaded data (ownership, the edit
/// lock, user-scoped visibility) and then validates the body.
pub struct OrderService<S: Store> {
    store: S,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an order owned by `customer`. The order always starts as
    /// `Pending`.
    #[tracing::instrument(skip(self, body))]
    pub async fn create_order(&self, customer: UserId, body: &[u8]) -> Result<Order, DomainError> {
        let cmd = CreateOrder::from_fields(&parse_fields(body)?)?;

        let record = self
            .store
            .insert_order(NewOrderRecord {
                customer_id: customer,
                size: cmd.size.code().to_string(),
                order_status: OrderStatus::Pending.code().to_string(),
                quantity: cmd.quantity.as_i32(),
            })
            .await?;
        let order = Order::try_from(record)?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, "order created");

        Ok(order)
    }

    /// Gets an order by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, DomainError> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(DomainError::order_not_found)
            .and_then(Order::try_from)
    }

    /// Gets an order together with the account that owns it.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_with_owner(&self, id: OrderId) -> Result<(Order, User), DomainError> {
        let order = self.get_order(id).await?;
        let owner = self
            .store
            .get_user(order.customer_id)
            .await?
            .ok_or_else(|| DomainError::DataCorruption {
                entity: "Order",
                reason: format!("owner {} of order {} is missing", order.customer_id, order.id),
            })?;

        Ok((order, owner.into()))
    }

    /// Deletes an order.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), DomainError> {
        if !self.store.delete_order(id).await? {
            return Err(DomainError::order_not_found());
        }

        metrics::counter!("orders_deleted_total").increment(1);
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    /// Sets an order's status. Any status may follow any other.
    #[tracing::instrument(skip(self, body))]
    pub async fn update_status(&self, id: OrderId, body: &[u8]) -> Result<Order, DomainError> {
        self.get_order(id).await?;
        let cmd = UpdateOrderStatus::from_fields(&parse_fields(body)?)?;

        let order = self
            .apply(id, OrderChanges::status(cmd.status.code()))
            .await?;
        tracing::info!(order_id = %id, status = %order.status, "order status updated");
        Ok(order)
    }

    /// Replaces size, status and quantity.
    ///
    /// Staff may update any order. Other callers may only update their own
    /// orders, and only while they are `Pending`.
    #[tracing::instrument(skip(self, body))]
    pub async fn update_order(
        &self,
        caller: &Caller,
        id: OrderId,
        body: &[u8],
    ) -> Result<Order, DomainError> {
        let current = self.get_order(id).await?;
        if let Err(err) = authorize_order_update(caller, &current) {
            tracing::warn!(order_id = %id, error = %err, "order update refused");
            return Err(err);
        }

        let cmd = UpdateOrder::from_fields(&parse_fields(body)?)?;
        // a customer's write only lands if the status they were allowed on still holds
        let expected_status = (!caller.is_staff()).then(|| current.status.code().to_string());
        let changes = OrderChanges {
            size: Some(cmd.size.code().to_string()),
            order_status: Some(cmd.status.code().to_string()),
            quantity: Some(cmd.quantity.as_i32()),
            expected_status,
        };

        let Some(record) = self.store.update_order(id, changes).await? else {
            // either deleted or moved on since the read
            self.get_order(id).await?;
            tracing::warn!(order_id = %id, "order changed status before update");
            return Err(DomainError::EditLocked);
        };

        metrics::counter!("orders_updated_total").increment(1);
        tracing::info!(order_id = %id, "order updated");
        Order::try_from(record)
    }

    /// Lists every order. `search` matches the order id or the owner's
    /// username.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filters: &OrderFilters,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        let query = filters.apply(OrderQuery::new(), SearchScope::OrderIdOrUsername);
        self.page(query, page).await
    }

    /// Lists one user's orders. `search` matches the order id only.
    ///
    /// `requested` is the user id from the path, or `None` for the caller's
    /// own orders.
    #[tracing::instrument(skip(self))]
    pub async fn list_user_orders(
        &self,
        caller: &Caller,
        requested: Option<UserId>,
        policy: ForeignUserPolicy,
        filters: &OrderFilters,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        let owner = self
            .resolve_owner(caller, requested, policy, Denial::ForeignUserOrders)
            .await?;
        let query = filters.apply(OrderQuery::for_customer(owner), SearchScope::OrderId);
        self.page(query, page).await
    }

    /// Gets one of a user's orders. An order that exists but belongs to
    /// someone else is reported as not found.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_order(
        &self,
        caller: &Caller,
        requested: Option<UserId>,
        order_id: OrderId,
        policy: ForeignUserPolicy,
    ) -> Result<Order, DomainError> {
        let owner = self
            .resolve_owner(caller, requested, policy, Denial::ForeignUserOrder)
            .await?;

        match self.get_order(order_id).await {
            Ok(order) if order.is_owned_by(owner) => Ok(order),
            Ok(_) => Err(DomainError::order_not_found()),
            Err(err) => Err(err),
        }
    }

    async fn resolve_owner(
        &self,
        caller: &Caller,
        requested: Option<UserId>,
        policy: ForeignUserPolicy,
        denial: Denial,
    ) -> Result<UserId, DomainError> {
        let requested = match requested {
            Some(id) => id,
            None => caller.require_user()?,
        };

        let target = match resolve_target_user(caller, requested, policy, denial) {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!(requested = %requested, error = %err, "user-scoped access refused");
                return Err(err);
            }
        };

        if let Target::Lookup(id) = target
            && self.store.get_user(id).await?.is_none()
        {
            return Err(DomainError::user_not_found());
        }
        Ok(target.id())
    }

    async fn apply(&self, id: OrderId, changes: OrderChanges) -> Result<Order, DomainError> {
        let record = self
            .store
            .update_order(id, changes)
            .await?
            .ok_or_else(DomainError::order_not_found)?;

        metrics::counter!("orders_updated_total").increment(1);
        Order::try_from(record)
    }

    async fn page(&self, query: OrderQuery, page: PageRequest) -> Result<Page<Order>, DomainError> {
        let query = query
            .offset(page.offset() as usize)
            .limit(page.limit() as usize);
        let slice = self.store.query_orders(&query).await?;

        if !page.is_within(slice.total) {
            return Err(DomainError::InvalidPage);
        }

        let results = slice
            .records
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            count: slice.total,
            page: page.page(),
            page_size: page.page_size(),
            results,
        })
    }
}
