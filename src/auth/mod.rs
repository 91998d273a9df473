//! Identity resolution and role checks
//!
//! The lifecycle engine never authenticates anyone. Callers resolve a bearer
//! credential through an [`IdentityGuard`] and pass the resulting
//! [`Identity`] along.

mod guard;
mod identity;

pub use guard::{IdentityGuard, StaticTokenGuard};
pub use identity::{Identity, Role};
