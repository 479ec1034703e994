//! Session management for the cloud-vault client.
//!
//! The [`SessionManager`] owns the process-wide identity slot and is the
//! only writer to it. It resolves the identity provider's startup report
//! into exactly one `Unknown -> settled` transition, then mirrors any
//! provider-initiated transitions (external sign-out, revocation) for as
//! long as it lives. Observers subscribe through a `watch` channel and
//! release the subscription by dropping the receiver.

pub mod provider;
pub mod rest;
pub mod session;
pub mod testing;

pub use provider::{IdentityProvider, ProviderEvent};
pub use rest::RestIdentityProvider;
pub use session::SessionManager;
