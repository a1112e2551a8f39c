/*
 * Responsibility
 * - public interface of the middleware layers
 * - auth::access (identity gateway), auth::policy (route rules), cors, http, security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
