//! # Atelier (studio website front door)
//!
//! `atelier` serves the studio's public site and admin back-office and decides,
//! for every request, whether it may reach its handler.
//!
//! ## Route Gate
//!
//! A single middleware classifies each path and then:
//!
//! - **Maintenance:** while the maintenance flag is up, public pages are
//!   rewritten to the maintenance page. The URL in the browser does not change.
//!   The admin area, the auth API, static assets and `/health` are never
//!   rewritten, so the back-office stays reachable.
//! - **Protected area:** requests under `/admin` need a session cookie that the
//!   identity provider accepts (revocation included). Anything else is
//!   redirected to the login page. A signed-in visitor hitting the login page
//!   is sent to `/admin` instead.
//!
//! ## Sessions
//!
//! The session token lives in the `__session` cookie (`HttpOnly`,
//! `SameSite=Lax`, `Secure` over HTTPS). It is verified on every protected
//! request and never cached: a missing cookie, a refused cookie, and an
//! unreachable provider all look the same to the visitor.

pub mod api;
pub mod cli;
pub mod gate;
pub mod maintenance;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
