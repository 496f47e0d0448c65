//! Shared application state.

use domain::{AccountService, ForeignUserPolicy, Operation, OrderService};
use store::Store;

use crate::auth::CurrentCaller;
use crate::config::Config;
use crate::error::ApiError;
use crate::throttle::Throttle;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub orders: OrderService<S>,
    pub accounts: AccountService<S>,
    pub throttle: Throttle,
    pub foreign_user_policy: ForeignUserPolicy,
}

impl<S: Store + Clone> AppState<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            orders: OrderService::new(store.clone()),
            accounts: AccountService::new(store),
            throttle: Throttle::new(&config.throttle),
            foreign_user_policy: config.foreign_user_policy,
        }
    }
}

impl<S: Store> AppState<S> {
    /// Runs the role gate for `op`, then charges the request to the scope
    /// the operation selects for this caller.
    pub fn guard(&self, op: Operation, current: &CurrentCaller) -> Result<(), ApiError> {
        if let Err(err) = op.authorize(&current.caller) {
            tracing::warn!(
                operation = ?op,
                caller = ?current.caller,
                error = %err,
                "access denied"
            );
            return Err(err.into());
        }

        self.throttle
            .check(op.throttle_scope(&current.caller), &current.key)
    }
}
