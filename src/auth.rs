use anyhow::{anyhow, bail, Result};
use log::info;

use crate::db::{models::User, Database};

/// Create an account. The password arrives already confirmed by the caller;
/// only the bcrypt hash is stored.
pub async fn register_user(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User> {
    let username = username.trim();
    let email = email.trim().to_lowercase();
    let password = password.trim();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        bail!("username, email and password must not be empty");
    }

    if db.find_user_by_username(username).await?.is_some() {
        bail!("username '{username}' is already taken");
    }
    if db.find_user_by_email(&email).await?.is_some() {
        bail!("email '{email}' is already in use");
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;

    let user = db
        .insert_user(username.to_string(), email, password_hash)
        .await?;
    info!("registered user '{}'", user.username);
    Ok(user)
}

pub async fn login_user(db: &Database, username: &str, password: &str) -> Result<User> {
    let user = db
        .find_user_by_username(username.trim())
        .await?
        .ok_or_else(|| anyhow!("no such user '{}'", username.trim()))?;

    let matches = bcrypt::verify(password, &user.password_hash)
        .map_err(|err| anyhow!("failed to verify password: {err}"))?;
    if !matches {
        bail!("wrong password for '{}'", user.username);
    }

    info!("user '{}' logged in", user.username);
    Ok(user)
}
