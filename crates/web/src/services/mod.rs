//! Business logic services.
//!
//! - `auth` - Password registration and sign-in

pub mod auth;
