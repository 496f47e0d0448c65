//! Bearer token authentication.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domain::Caller;
use store::Store;

use crate::error::ApiError;
use crate::state::AppState;
use crate::throttle::ThrottleKey;

/// The resolved caller of a request and the key its throttling is charged to.
///
/// A request without an `Authorization` header, or with a scheme other than
/// `Bearer`/`Token`, runs as [`Caller::Anonymous`].
#[derive(Debug, Clone)]
pub struct CurrentCaller {
    pub caller: Caller,
    pub key: ThrottleKey,
}

impl<S: Store + 'static> FromRequestParts<Arc<AppState<S>>> for CurrentCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let anonymous = || ThrottleKey::Anonymous(client_address(&parts.headers, peer));

        let Some(token) = bearer_token(&parts.headers)? else {
            return Ok(Self {
                caller: Caller::Anonymous,
                key: anonymous(),
            });
        };

        let caller = state.accounts.authenticate(&token).await?;
        let key = match caller.user_id() {
            Some(id) => ThrottleKey::User(id),
            None => anonymous(),
        };

        Ok(Self { caller, key })
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| {
        ApiError::Unauthorized(
            "Invalid token header. Token string should not contain invalid characters."
                .to_string(),
        )
    })?;

    let mut parts = value.split_whitespace();
    let Some(scheme) = parts.next() else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("bearer") && !scheme.eq_ignore_ascii_case("token") {
        return Ok(None);
    }

    match (parts.next(), parts.next()) {
        (Some(token), None) => Ok(Some(token.to_string())),
        (None, _) => Err(ApiError::Unauthorized(
            "Invalid token header. No credentials provided.".to_string(),
        )),
        (Some(_), Some(_)) => Err(ApiError::Unauthorized(
            "Invalid token header. Token string should not contain spaces.".to_string(),
        )),
    }
}

/// Client address for keying anonymous throttling.
///
/// Proxy headers are honoured only when they hold an IP address; anything
/// else falls through to the socket peer. Without either, every caller
/// shares the unspecified address.
fn client_address(headers: &HeaderMap, peer: Option<IpAddr>) -> IpAddr {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    forwarded
        .or_else(real_ip)
        .or(peer)
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
