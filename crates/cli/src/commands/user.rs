//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! plooma user create -e admin@example.com -n "Admin Name" -r admin -p secret123
//! plooma user list
//! ```

use plooma_core::Role;
use plooma_web::db::{RepositoryError, UserRepository};
use plooma_web::services::auth::{AuthError, AuthService};
use thiserror::Error;

use super::{CommandError, connect};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, member")]
    InvalidRole(String),

    #[error("Could not create user: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create a user with a password.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if the role is unknown, any field fails validation, the
/// email is taken or the database is unreachable.
pub async fn create(
    email: &str,
    full_name: &str,
    role: &str,
    password: &str,
) -> Result<i32, UserError> {
    let role: Role = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;

    let pool = connect().await?;

    tracing::info!("Creating user: {} ({})", email, role);
    let user = AuthService::new(&pool)
        .register(full_name, email, password, role)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user.id.as_i32())
}

/// Log every user, sorted by name.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), UserError> {
    let pool = connect().await?;
    let users = UserRepository::new(&pool).list().await?;

    tracing::info!("{} user(s)", users.len());
    for user in &users {
        tracing::info!(
            id = %user.id,
            role = %user.role,
            "{} <{}>",
            user.full_name,
            user.email
        );
    }
    Ok(())
}
