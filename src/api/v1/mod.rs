/*
 * Responsibility
 * - v1 public surface (routes() re-export, URL prefix shared with the policy table)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;

pub const PREFIX: &str = "/api/v1";
