use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    NewOrderRecord, NewUserRecord, OrderChanges, OrderId, OrderQuery, OrderRecord, OrderSlice,
    Result, SearchScope, StoreError, UserId, UserRecord, query::like_pattern, store::Store,
};

const USER_COLUMNS: &str = "u.id, u.email, u.username, u.phone_number, u.password_hash, \
     u.is_staff, u.is_superuser, u.is_active, u.date_joined";

const ORDER_COLUMNS: &str =
    "o.id, o.customer_id, o.size, o.order_status, o.quantity, o.created_at, o.updated_at";

/// A bind parameter collected while composing a dynamic query.
enum Param {
    Int(i64),
    Text(String),
}

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_user(row: PgRow) -> Result<UserRecord> {
        Ok(UserRecord {
            id: UserId::new(row.try_get("id")?),
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            phone_number: row.try_get("phone_number")?,
            password_hash: row.try_get("password_hash")?,
            is_staff: row.try_get("is_staff")?,
            is_superuser: row.try_get("is_superuser")?,
            is_active: row.try_get("is_active")?,
            date_joined: row.try_get("date_joined")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<OrderRecord> {
        Ok(OrderRecord {
            id: OrderId::new(row.try_get("id")?),
            customer_id: UserId::new(row.try_get("customer_id")?),
            size: row.try_get("size")?,
            order_status: row.try_get("order_status")?,
            quantity: row.try_get("quantity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Maps constraint violations from the schema to store errors.
    fn map_constraint(err: sqlx::Error, user_id: Option<UserId>) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.constraint() {
                Some("users_email_key") => return StoreError::Conflict { field: "email" },
                Some("users_phone_number_key") => {
                    return StoreError::Conflict {
                        field: "phone_number",
                    };
                }
                Some("orders_customer_id_fkey" | "auth_tokens_user_id_fkey") => {
                    if let Some(id) = user_id {
                        return StoreError::UnknownUser(id);
                    }
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }

    /// Builds the shared `FROM ... WHERE ...` clause for a listing.
    fn filter_clause(query: &OrderQuery) -> (String, Vec<Param>) {
        let mut sql = String::from(" FROM orders o JOIN users u ON u.id = o.customer_id WHERE 1=1");
        let mut params = Vec::new();

        if let Some(customer_id) = query.customer_id {
            params.push(Param::Int(customer_id.as_i64()));
            sql.push_str(&format!(" AND o.customer_id = ${}", params.len()));
        }
        if let Some(ref status) = query.order_status {
            params.push(Param::Text(status.clone()));
            sql.push_str(&format!(" AND o.order_status = ${}", params.len()));
        }
        if let Some(ref size) = query.size {
            params.push(Param::Text(size.clone()));
            sql.push_str(&format!(" AND o.size = ${}", params.len()));
        }
        if let Some(ref search) = query.search {
            params.push(Param::Text(like_pattern(search)));
            let n = params.len();
            match query.search_scope {
                SearchScope::OrderId => {
                    sql.push_str(&format!(" AND CAST(o.id AS TEXT) LIKE ${n} ESCAPE '\\'"));
                }
                SearchScope::OrderIdOrUsername => {
                    sql.push_str(&format!(
                        " AND (CAST(o.id AS TEXT) LIKE ${n} ESCAPE '\\' \
                         OR u.username ILIKE ${n} ESCAPE '\\')"
                    ));
                }
            }
        }

        (sql, params)
    }

    fn bind_params<'q>(
        mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
        params: &'q [Param],
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        for param in params {
            query = match param {
                Param::Int(value) => query.bind(*value),
                Param::Text(value) => query.bind(value.as_str()),
            };
        }
        query
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert_user(&self, user: NewUserRecord) -> Result<UserRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO users
                (email, username, phone_number, password_hash, is_staff, is_superuser, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, username, phone_number, password_hash,
                is_staff, is_superuser, is_active, date_joined
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.phone_number)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_constraint(e, None))?;

        Self::row_to_user(row)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        // orders and auth_tokens cascade through their foreign keys
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_token(&self, token: &str, user_id: UserId) -> Result<()> {
        sqlx::query("INSERT INTO auth_tokens (token, user_id) VALUES ($1, $2)")
            .bind(token)
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_constraint(e, Some(user_id)))?;

        Ok(())
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM auth_tokens t \
             JOIN users u ON u.id = t.user_id WHERE t.token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn insert_order(&self, order: NewOrderRecord) -> Result<OrderRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (customer_id, size, order_status, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, customer_id, size, order_status, quantity, created_at, updated_at
            "#,
        )
        .bind(order.customer_id.as_i64())
        .bind(&order.size)
        .bind(&order.order_status)
        .bind(order.quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_constraint(e, Some(order.customer_id)))?;

        Self::row_to_order(row)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn update_order(
        &self,
        id: OrderId,
        changes: OrderChanges,
    ) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(
            r#"
            UPDATE orders SET
                size = COALESCE($2, size),
                order_status = COALESCE($3, order_status),
                quantity = COALESCE($4, quantity),
                updated_at = NOW()
            WHERE id = $1 AND ($5::TEXT IS NULL OR order_status = $5)
            RETURNING id, customer_id, size, order_status, quantity, created_at, updated_at
            "#,
        )
        .bind(id.as_i64())
        .bind(changes.size)
        .bind(changes.order_status)
        .bind(changes.quantity)
        .bind(changes.expected_status)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query_orders(&self, query: &OrderQuery) -> Result<OrderSlice> {
        let (filter, params) = Self::filter_clause(query);

        let count_sql = format!("SELECT COUNT(*) AS total{filter}");
        let total: i64 = Self::bind_params(sqlx::query(&count_sql), &params)
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;

        let mut list_sql =
            format!("SELECT {ORDER_COLUMNS}{filter} ORDER BY o.created_at DESC, o.id DESC");
        let mut window = Vec::new();
        if let Some(limit) = query.limit {
            window.push(limit as i64);
            list_sql.push_str(&format!(" LIMIT ${}", params.len() + window.len()));
        }
        if let Some(offset) = query.offset {
            window.push(offset as i64);
            list_sql.push_str(&format!(" OFFSET ${}", params.len() + window.len()));
        }

        let mut list_query = Self::bind_params(sqlx::query(&list_sql), &params);
        for value in window {
            list_query = list_query.bind(value);
        }
        let rows = list_query.fetch_all(&self.pool).await?;

        Ok(OrderSlice {
            total: total.max(0) as u64,
            records: rows
                .into_iter()
                .map(Self::row_to_order)
                .collect::<Result<_>>()?,
        })
    }
}
