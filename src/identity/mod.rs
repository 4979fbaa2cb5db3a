pub mod bootstrap;
pub mod firebase;
pub mod interface;
pub mod state;

#[cfg(test)]
mod tests;

pub use bootstrap::{bootstrap, UserIdCell};
pub use firebase::FirebaseIdentity;
pub use interface::{AuthUser, IdentityError, IdentityProvider};
pub use state::{AuthState, Subscription};
