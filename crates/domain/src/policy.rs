//! Authorization and throttle-scope decisions.
//!
//! Each endpoint maps to an [`Operation`]. Before anything is loaded the
//! operation is checked against the [`Caller`] with [`Operation::authorize`],
//! and [`Operation::throttle_scope`] names the rate-limit bucket the request
//! is charged to. Checks that need the loaded order or a user id from the
//! path come afterwards: [`authorize_order_update`] and
//! [`resolve_target_user`].

use std::str::FromStr;

use common::UserId;

use crate::error::DomainError;
use crate::order::Order;

/// The identity a request runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User { id: UserId, is_staff: bool },
}

impl Caller {
    pub fn user(id: UserId) -> Self {
        Caller::User {
            id,
            is_staff: false,
        }
    }

    pub fn staff(id: UserId) -> Self {
        Caller::User { id, is_staff: true }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Caller::Anonymous => None,
            Caller::User { id, .. } => Some(*id),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Caller::User { is_staff: true, .. })
    }

    /// Returns the caller's user id, or `Unauthenticated`.
    pub fn require_user(&self) -> Result<UserId, DomainError> {
        self.user_id().ok_or(DomainError::Unauthenticated)
    }
}

/// Why an authenticated caller was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    StaffOnly,
    NotOrderOwner,
    ForeignUserOrders,
    ForeignUserOrder,
}

impl Denial {
    pub fn message(self) -> &'static str {
        match self {
            Denial::StaffOnly => "You do not have permission to perform this action.",
            Denial::NotOrderOwner => "You do not have permission to update this order.",
            Denial::ForeignUserOrders => "You do not have permission to view this user's orders.",
            Denial::ForeignUserOrder => "You do not have permission to view this user's order.",
        }
    }
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A named rate-limit bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrottleScope {
    OrderCreate,
    UserOrders,
    AdminOrderRead,
    AdminOrderWrite,
    AdminDeleteOrder,
}

impl ThrottleScope {
    pub const ALL: [ThrottleScope; 5] = [
        ThrottleScope::OrderCreate,
        ThrottleScope::UserOrders,
        ThrottleScope::AdminOrderRead,
        ThrottleScope::AdminOrderWrite,
        ThrottleScope::AdminDeleteOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThrottleScope::OrderCreate => "order_create",
            ThrottleScope::UserOrders => "user_orders",
            ThrottleScope::AdminOrderRead => "admin_order_read",
            ThrottleScope::AdminOrderWrite => "admin_order_write",
            ThrottleScope::AdminDeleteOrder => "admin_delete_order",
        }
    }
}

impl std::fmt::Display for ThrottleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every order endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListOrders,
    CreateOrder,
    RetrieveOrder,
    DeleteOrder,
    UpdateOrderStatus,
    UpdateOrder,
    ListUserOrders,
    RetrieveUserOrder,
}

impl Operation {
    /// Role gate, evaluated before any lookup.
    pub fn authorize(self, caller: &Caller) -> Result<(), DomainError> {
        match self {
            Operation::ListOrders => Ok(()),
            Operation::CreateOrder
            | Operation::UpdateOrder
            | Operation::ListUserOrders
            | Operation::RetrieveUserOrder => caller.require_user().map(|_| ()),
            Operation::RetrieveOrder | Operation::DeleteOrder | Operation::UpdateOrderStatus => {
                caller.require_user()?;
                if caller.is_staff() {
                    Ok(())
                } else {
                    Err(Denial::StaffOnly.into())
                }
            }
        }
    }

    /// Rate-limit bucket this request is charged to.
    pub fn throttle_scope(self, caller: &Caller) -> ThrottleScope {
        let staff = caller.is_staff();
        match self {
            Operation::ListOrders if staff => ThrottleScope::AdminOrderRead,
            Operation::ListOrders => ThrottleScope::UserOrders,
            Operation::CreateOrder => ThrottleScope::OrderCreate,
            Operation::RetrieveOrder => ThrottleScope::AdminOrderRead,
            Operation::DeleteOrder => ThrottleScope::AdminDeleteOrder,
            Operation::UpdateOrderStatus => ThrottleScope::AdminOrderWrite,
            Operation::UpdateOrder if staff => ThrottleScope::AdminOrderWrite,
            // self-service edits share the read bucket
            Operation::UpdateOrder => ThrottleScope::UserOrders,
            Operation::ListUserOrders | Operation::RetrieveUserOrder => ThrottleScope::UserOrders,
        }
    }
}

/// Decides whether `caller` may fully update `order`.
///
/// Ownership is checked before the edit lock, so a non-owner is refused
/// without learning the order's status.
pub fn authorize_order_update(caller: &Caller, order: &Order) -> Result<(), DomainError> {
    match *caller {
        Caller::Anonymous => Err(DomainError::Unauthenticated),
        Caller::User { is_staff: true, .. } => Ok(()),
        Caller::User { id, .. } if !order.is_owned_by(id) => Err(Denial::NotOrderOwner.into()),
        Caller::User { .. } if order.is_locked_for_customer() => Err(DomainError::EditLocked),
        Caller::User { .. } => Ok(()),
    }
}

/// How a non-staff caller naming another user's id is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignUserPolicy {
    /// 403 with a permission message.
    #[default]
    Forbid,
    /// 404, as if the user did not exist.
    Conceal,
}

impl FromStr for ForeignUserPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forbid" => Ok(ForeignUserPolicy::Forbid),
            "conceal" => Ok(ForeignUserPolicy::Conceal),
            other => Err(format!(
                "unknown foreign user policy '{other}' (expected forbid or conceal)"
            )),
        }
    }
}

/// The user a user-scoped request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The caller's own id; known to exist.
    Caller(UserId),
    /// An id named by staff; must still be looked up.
    Lookup(UserId),
}

impl Target {
    pub fn id(&self) -> UserId {
        match self {
            Target::Caller(id) | Target::Lookup(id) => *id,
        }
    }
}

/// Resolves the user id in a `/user/{user_id}/...` path against the caller.
pub fn resolve_target_user(
    caller: &Caller,
    requested: UserId,
    policy: ForeignUserPolicy,
    denial: Denial,
) -> Result<Target, DomainError> {
    match *caller {
        Caller::Anonymous => Err(DomainError::Unauthenticated),
        Caller::User { is_staff: true, .. } => Ok(Target::Lookup(requested)),
        Caller::User { id, .. } if id == requested => Ok(Target::Caller(id)),
        Caller::User { .. } => match policy {
            ForeignUserPolicy::Forbid => Err(denial.into()),
            ForeignUserPolicy::Conceal => Err(DomainError::user_not_found()),
        },
    }
}
