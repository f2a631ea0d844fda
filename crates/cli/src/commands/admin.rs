//! Admin credential commands.
//!
//! The admin login is configured entirely through `ADMIN_ID` and
//! `ADMIN_PASSWORD_HASH`; this command produces the hash.

use std::io::BufRead;

use thiserror::Error;

use slash_storefront::services::auth::AuthError;

/// Shortest password accepted for the admin login.
const MIN_PASSWORD_LEN: usize = 12;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Could not read password: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    #[error("Hashing failed: {0}")]
    Hash(#[from] AuthError),
}

/// Print the Argon2 PHC string for `password`, or for one line of stdin.
///
/// # Errors
///
/// Returns an error if stdin cannot be read, the password is too short,
/// or hashing fails.
pub fn hash_password(password: Option<String>) -> Result<(), AdminError> {
    let password = match password {
        Some(password) => password,
        None => {
            tracing::info!("Enter the admin password, then press Enter:");
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_owned()
        }
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AdminError::PasswordTooShort);
    }

    let hash = slash_storefront::services::auth::hash_password(&password)?;

    #[allow(clippy::print_stdout)]
    {
        println!("ADMIN_PASSWORD_HASH='{hash}'");
    }
    Ok(())
}
