//! Auth-domain principal, credential, and secret models.

pub mod credential;
pub mod principal;
pub mod secret;

pub use credential::*;
pub use principal::*;
pub use secret::*;
