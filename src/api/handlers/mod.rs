//! Route handlers that sit behind the gate.

pub mod auth;
pub mod health;
pub mod maintenance;
