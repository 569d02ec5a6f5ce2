// API layer - HTTP endpoints
pub mod health;
pub mod safety;

use poem::Request;

pub use health::HealthApi;
pub use safety::SafetyApi;

use crate::errors::api::SafetyError;
use crate::types::internal::{Actor, ClientMeta};

/// Build the actor from the gateway-supplied identity headers
///
/// Authentication happens upstream; the gateway forwards the verified
/// identity as headers. No identity header means no actor.
pub fn actor_from_request(req: &Request) -> Option<Actor> {
    let user_id = req.header("X-User-Id")?.trim();
    if user_id.is_empty() {
        return None;
    }

    let is_admin = req
        .header("X-User-Role")
        .map(|r| r.trim().eq_ignore_ascii_case("admin"))
        .unwrap_or(false);

    let mut actor = Actor::new(user_id, is_admin);
    if let Some(name) = req.header("X-User-Name").map(str::trim).filter(|n| !n.is_empty()) {
        actor = actor.with_display_name(name);
    }

    Some(actor)
}

/// Like [`actor_from_request`], but a missing identity is an access error
pub fn require_actor(req: &Request) -> Result<Actor, SafetyError> {
    actor_from_request(req).ok_or_else(SafetyError::access_denied)
}

/// Capture client metadata for the audit trail
pub fn client_meta(req: &Request) -> ClientMeta {
    let ip_address = extract_ip_address(req);
    let user_agent = req
        .header("User-Agent")
        .map(|ua| ua.trim().to_string())
        .filter(|ua| !ua.is_empty());

    ClientMeta::new(ip_address, user_agent)
}

fn extract_ip_address(req: &Request) -> Option<String> {
    // X-Forwarded-For first (proxy/load balancer), then X-Real-IP (nginx),
    // then the socket address
    if let Some(forwarded) = req.header("X-Forwarded-For") {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    if let Some(real_ip) = req.header("X-Real-IP") {
        let ip = real_ip.trim();
        if !ip.is_empty() {
            return Some(ip.to_string());
        }
    }

    req.remote_addr()
        .as_socket_addr()
        .map(|addr| addr.ip().to_string())
}
