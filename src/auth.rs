//! Auth-domain user identifiers, access tokens, and token grants.

pub mod grant;
pub mod id;
pub mod token;

pub use grant::*;
pub use id::*;
pub use token::*;
