//! Request authentication and route authorization.
//!
//! `access` must wrap `policy`: identity is attached first, then the route rule decides.

pub mod access;
pub mod policy;
