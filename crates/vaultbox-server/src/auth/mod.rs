//! Bearer-token authentication.
//!
//! Sessions are issued by the external identity service; this server only
//! validates the HS256 tokens it hands out.

pub mod claims;
pub mod jwt;

pub use claims::{Claims, TokenType};
pub use jwt::{AuthError, JwtManager};
