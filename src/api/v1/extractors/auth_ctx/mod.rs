/*!
 * Authentication context extractors
 *
 * Responsibility:
 * - hand the principal attached by the access gateway to handlers
 * - `AuthCtx` requires it (401 otherwise), `MaybeAuthCtx` makes it optional
 */

mod core;

pub use core::{AuthCtx, MaybeAuthCtx};
