//! Authentication
//!
//! Argon2 password hashing lives on the user model; this module owns the
//! JWT token service handed out at login.

pub mod jwt;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
