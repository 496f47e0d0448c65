use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    NewOrderRecord, NewUserRecord, OrderChanges, OrderId, OrderQuery, OrderRecord, OrderSlice,
    Result, SearchScope, StoreError, UserId, UserRecord, store::Store,
};

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, UserRecord>,
    orders: BTreeMap<OrderId, OrderRecord>,
    tokens: HashMap<String, UserId>,
    last_user_id: i64,
    last_order_id: i64,
}

impl MemoryState {
    fn matches(&self, order: &OrderRecord, query: &OrderQuery) -> bool {
        if let Some(customer_id) = query.customer_id
            && order.customer_id != customer_id
        {
            return false;
        }
        if let Some(ref status) = query.order_status
            && &order.order_status != status
        {
            return false;
        }
        if let Some(ref size) = query.size
            && &order.size != size
        {
            return false;
        }
        if let Some(ref search) = query.search {
            let in_id = order.id.to_string().contains(search.as_str());
            let in_username = query.search_scope == SearchScope::OrderIdOrUsername
                && self.users.get(&order.customer_id).is_some_and(|user| {
                    user.username
                        .to_lowercase()
                        .contains(&search.to_lowercase())
                });
            if !in_id && !in_username {
                return false;
            }
        }
        true
    }
}

/// In-memory store implementation.
///
/// Backs the test suites and the binary when no database is configured.
/// Enforces the same uniqueness and cascade rules as the PostgreSQL schema.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_user(&self, user: NewUserRecord) -> Result<UserRecord> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict { field: "email" });
        }
        if state
            .users
            .values()
            .any(|u| u.phone_number == user.phone_number)
        {
            return Err(StoreError::Conflict {
                field: "phone_number",
            });
        }

        state.last_user_id += 1;
        let record = UserRecord {
            id: UserId::new(state.last_user_id),
            email: user.email,
            username: user.username,
            phone_number: user.phone_number,
            password_hash: user.password_hash,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            date_joined: Utc::now(),
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.orders.retain(|_, order| order.customer_id != id);
        state.tokens.retain(|_, owner| *owner != id);
        Ok(true)
    }

    async fn insert_token(&self, token: &str, user_id: UserId) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::UnknownUser(user_id));
        }
        state.tokens.insert(token.to_string(), user_id);
        Ok(())
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRecord>> {
        let state = self.state.read().await;
        Ok(state
            .tokens
            .get(token)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn insert_order(&self, order: NewOrderRecord) -> Result<OrderRecord> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&order.customer_id) {
            return Err(StoreError::UnknownUser(order.customer_id));
        }

        state.last_order_id += 1;
        let now = Utc::now();
        let record = OrderRecord {
            id: OrderId::new(state.last_order_id),
            customer_id: order.customer_id,
            size: order.size,
            order_status: order.order_status,
            quantity: order.quantity,
            created_at: now,
            updated_at: now,
        };
        state.orders.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn update_order(
        &self,
        id: OrderId,
        changes: OrderChanges,
    ) -> Result<Option<OrderRecord>> {
        let mut state = self.state.write().await;
        let Some(order) = state.orders.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(expected) = changes.expected_status
            && order.order_status != expected
        {
            return Ok(None);
        }

        if let Some(size) = changes.size {
            order.size = size;
        }
        if let Some(order_status) = changes.order_status {
            order.order_status = order_status;
        }
        if let Some(quantity) = changes.quantity {
            order.quantity = quantity;
        }
        order.updated_at = Utc::now();

        Ok(Some(order.clone()))
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        Ok(self.state.write().await.orders.remove(&id).is_some())
    }

    async fn query_orders(&self, query: &OrderQuery) -> Result<OrderSlice> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|order| state.matches(order, query))
            .cloned()
            .collect();

        // Newest first; id breaks ties between equal timestamps
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = orders.len() as u64;
        let offset = query.offset.unwrap_or(0);
        let records = orders
            .into_iter()
            .skip(offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(OrderSlice { total, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, username: &str, phone: &str) -> NewUserRecord {
        NewUserRecord {
            email: email.to_string(),
            username: username.to_string(),
            phone_number: phone.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            is_staff: false,
            is_superuser: false,
            is_active: true,
        }
    }

    fn new_order(customer_id: UserId, size: &str, status: &str) -> NewOrderRecord {
        NewOrderRecord {
            customer_id,
            size: size.to_string(),
            order_status: status.to_string(),
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn insert_user_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let a = store
            .insert_user(new_user("a@x.io", "alice", "+111111111"))
            .await
            .unwrap();
        let b = store
            .insert_user(new_user("b@x.io", "bob", "+222222222"))
            .await
            .unwrap();

        assert_eq!(a.id, UserId::new(1));
        assert_eq!(b.id, UserId::new(2));
    }

    #[tokio::test]
    async fn duplicate_email_and_phone_conflict() {
        let store = InMemoryStore::new();
        store
            .insert_user(new_user("a@x.io", "alice", "+111111111"))
            .await
            .unwrap();

        let email = store
            .insert_user(new_user("a@x.io", "other", "+333333333"))
            .await;
        assert!(matches!(email, Err(StoreError::Conflict { field: "email" })));

        let phone = store
            .insert_user(new_user("c@x.io", "other", "+111111111"))
            .await;
        assert!(matches!(
            phone,
            Err(StoreError::Conflict {
                field: "phone_number"
            })
        ));
    }

    #[tokio::test]
    async fn order_for_unknown_user_is_rejected() {
        let store = InMemoryStore::new();
        let result = store
            .insert_order(new_order(UserId::new(99), "SMALL", "PENDING"))
            .await;
        assert!(matches!(result, Err(StoreError::UnknownUser(_))));
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let store = InMemoryStore::new();
        let user = store
            .insert_user(new_user("a@x.io", "alice", "+111111111"))
            .await
            .unwrap();
        let order = store
            .insert_order(new_order(user.id, "SMALL", "PENDING"))
            .await
            .unwrap();

        let updated = store
            .update_order(order.id, OrderChanges::status("DELIVERED"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.order_status, "DELIVERED");
        assert_eq!(updated.size, "SMALL");
        assert_eq!(updated.created_at, order.created_at);
        assert!(updated.updated_at >= order.updated_at);
    }

    #[tokio::test]
    async fn expected_status_guards_the_write() {
        let store = InMemoryStore::new();
        let user = store
            .insert_user(new_user("a@x.io", "alice", "+111111111"))
            .await
            .unwrap();
        let order = store
            .insert_order(new_order(user.id, "SMALL", "IN_TRANSIT"))
            .await
            .unwrap();

        let changes = OrderChanges {
            size: Some("LARGE".to_string()),
            expected_status: Some("PENDING".to_string()),
            ..Default::default()
        };
        assert!(store.update_order(order.id, changes).await.unwrap().is_none());
        assert_eq!(store.get_order(order.id).await.unwrap().unwrap(), order);

        let changes = OrderChanges {
            size: Some("LARGE".to_string()),
            expected_status: Some("IN_TRANSIT".to_string()),
            ..Default::default()
        };
        let updated = store.update_order(order.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.size, "LARGE");
    }

    #[tokio::test]
    async fn update_and_delete_missing_order() {
        let store = InMemoryStore::new();
        let updated = store
            .update_order(OrderId::new(5), OrderChanges::status("DELIVERED"))
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(!store.delete_order(OrderId::new(5)).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_orders_and_tokens() {
        let store = InMemoryStore::new();
        let alice = store
            .insert_user(new_user("a@x.io", "alice", "+111111111"))
            .await
            .unwrap();
        let bob = store
            .insert_user(new_user("b@x.io", "bob", "+222222222"))
            .await
            .unwrap();
        store
            .insert_order(new_order(alice.id, "SMALL", "PENDING"))
            .await
            .unwrap();
        store
            .insert_order(new_order(bob.id, "SMALL", "PENDING"))
            .await
            .unwrap();
        store.insert_token("tok", alice.id).await.unwrap();

        assert!(store.delete_user(alice.id).await.unwrap());

        assert_eq!(store.order_count().await, 1);
        assert!(store.get_user_by_token("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_filters_combine_with_and() {
        let store = InMemoryStore::new();
        let user = store
            .insert_user(new_user("a@x.io", "alice", "+111111111"))
            .await
            .unwrap();
        store
            .insert_order(new_order(user.id, "LARGE", "PENDING"))
            .await
            .unwrap();
        store
            .insert_order(new_order(user.id, "LARGE", "DELIVERED"))
            .await
            .unwrap();
        store
            .insert_order(new_order(user.id, "SMALL", "PENDING"))
            .await
            .unwrap();

        let slice = store
            .query_orders(&OrderQuery::new().size("LARGE").order_status("PENDING"))
            .await
            .unwrap();

        assert_eq!(slice.total, 1);
        assert_eq!(slice.records[0].size, "LARGE");
        assert_eq!(slice.records[0].order_status, "PENDING");
    }

    #[tokio::test]
    async fn query_orders_newest_first_with_window() {
        let store = InMemoryStore::new();
        let user = store
            .insert_user(new_user("a@x.io", "alice", "+111111111"))
            .await
            .unwrap();
        for _ in 0..5 {
            store
                .insert_order(new_order(user.id, "SMALL", "PENDING"))
                .await
                .unwrap();
        }

        let slice = store
            .query_orders(&OrderQuery::new().limit(2).offset(1))
            .await
            .unwrap();

        assert_eq!(slice.total, 5);
        let ids: Vec<i64> = slice.records.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[tokio::test]
    async fn search_scope_controls_username_matching() {
        let store = InMemoryStore::new();
        let alice = store
            .insert_user(new_user("a@x.io", "Alice", "+111111111"))
            .await
            .unwrap();
        let bob = store
            .insert_user(new_user("b@x.io", "bob", "+222222222"))
            .await
            .unwrap();
        store
            .insert_order(new_order(alice.id, "SMALL", "PENDING"))
            .await
            .unwrap();
        store
            .insert_order(new_order(bob.id, "SMALL", "PENDING"))
            .await
            .unwrap();

        let by_username = store
            .query_orders(&OrderQuery::new().search("ali", SearchScope::OrderIdOrUsername))
            .await
            .unwrap();
        assert_eq!(by_username.total, 1);
        assert_eq!(by_username.records[0].customer_id, alice.id);

        let id_only = store
            .query_orders(&OrderQuery::new().search("ali", SearchScope::OrderId))
            .await
            .unwrap();
        assert_eq!(id_only.total, 0);

        let by_id = store
            .query_orders(&OrderQuery::new().search("2", SearchScope::OrderId))
            .await
            .unwrap();
        assert_eq!(by_id.total, 1);
        assert_eq!(by_id.records[0].customer_id, bob.id);
    }
}
