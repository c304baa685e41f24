//! Authentication: password hashing, signed access tokens, and request extractors.

mod extractor;
pub mod password;
pub mod token;

pub use extractor::{ACCESS_TOKEN_COOKIE, CurrentUser, RequireAuth};
pub use password::{hash_password, verify_password};
pub use token::{AccessClaims, TOKEN_ISSUER, TokenService};
