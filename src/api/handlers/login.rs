use crate::{
    api::{
        error::{ApiError, ErrorBody},
        handlers::types::{Credentials, UserView},
    },
    cli::globals::GlobalArgs,
    store::UserStore,
    user::{Hashed, Plaintext, User, Username},
};
use axum::{extract::Extension, Json};
use std::sync::{Arc, OnceLock};
use tokio::task;
use tracing::{debug, info, instrument, warn};
use ulid::Ulid;

// Checked against when the username is unknown so both paths pay for one
// bcrypt verification.
pub(super) static DECOY_HASH: OnceLock<Option<Hashed>> = OnceLock::new();

#[utoipa::path(
    post,
    path = "/login",
    request_body = Credentials,
    responses (
        (status = 200, description = "Credentials are valid", body = UserView, content_type = "application/json"),
        (status = 400, description = "Missing payload", body = ErrorBody),
        (status = 401, description = "Unknown user or wrong password", body = ErrorBody),
    ),
    tag = "users"
)]
/// Check a username and password. A digest hashed with a different cost than
/// the configured one is replaced after a successful check.
#[instrument(skip(store, globals, payload))]
pub async fn login(
    store: Extension<Arc<dyn UserStore>>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<Credentials>>,
) -> Result<Json<UserView>, ApiError> {
    let Some(Json(credentials)) = payload else {
        return Err(ApiError::MissingPayload);
    };

    debug!("login: {:?}", credentials);

    let user = match Username::parse(&credentials.username) {
        Ok(username) => store.find_by_username(&username).await?,
        Err(_) => None,
    };

    let Some(user) = user else {
        verify_decoy(globals.bcrypt_cost, credentials.password).await;
        return Err(ApiError::InvalidCredentials);
    };

    if !user.validate_password(&credentials.password).await? {
        return Err(ApiError::InvalidCredentials);
    }

    if user.password().cost() != globals.bcrypt_cost {
        upgrade_cost(
            store.0.as_ref(),
            user.username().clone(),
            credentials.password,
            globals.bcrypt_cost,
        )
        .await;
    }

    Ok(Json(UserView::from(user.username())))
}

/// Spend one bcrypt verification without a stored user.
pub(crate) async fn verify_decoy(cost: u32, candidate: String) {
    let _ = task::spawn_blocking(move || {
        let decoy =
            DECOY_HASH.get_or_init(|| Plaintext::new(Ulid::new().to_string()).hash(cost).ok());
        if let Some(hashed) = decoy {
            let _ = hashed.verify(&candidate);
        }
    })
    .await;
}

// Login still succeeds when the new digest can't be stored.
async fn upgrade_cost(store: &dyn UserStore, username: Username, password: String, cost: u32) {
    match User::new(username, Plaintext::new(password))
        .hash_password(cost)
        .await
    {
        Ok(upgraded) => match store.update_password(&upgraded).await {
            Ok(()) => info!("Rehashed password of {} at cost {}", upgraded.username(), cost),
            Err(err) => warn!("Failed to store rehashed password: {}", err),
        },
        Err(err) => warn!("Failed to rehash password: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cli::globals::Environment, store::MemoryUserStore};
    use anyhow::{Context, Result};

    #[tokio::test]
    async fn login_moves_digest_to_configured_cost() -> Result<()> {
        let store = Arc::new(MemoryUserStore::new());
        let user = User::new(Username::parse("alice")?, Plaintext::new("secret123"))
            .hash_password(4)
            .await?;
        store.create(&user).await?;

        let globals = GlobalArgs::new(3000, Environment::Development).with_bcrypt_cost(5);
        let shared: Arc<dyn UserStore> = store.clone();
        let credentials = Credentials {
            username: "alice".to_string(),
            password: "secret123".to_string(),
        };

        let view = login(Extension(shared), Extension(globals), Some(Json(credentials)))
            .await
            .map_err(|err| anyhow::anyhow!("login failed: {err:?}"))?;
        assert_eq!(view.0.username, "alice");

        let stored = store
            .find_by_username(&Username::parse("alice")?)
            .await?
            .context("alice disappeared")?;
        assert_eq!(stored.password().cost(), 5);
        assert!(stored.validate_password("secret123").await?);
        Ok(())
    }

    #[tokio::test]
    async fn matching_cost_keeps_digest() -> Result<()> {
        let store = Arc::new(MemoryUserStore::new());
        let user = User::new(Username::parse("alice")?, Plaintext::new("secret123"))
            .hash_password(4)
            .await?;
        let before = user.password().clone();
        store.create(&user).await?;

        let globals = GlobalArgs::new(3000, Environment::Development).with_bcrypt_cost(4);
        let shared: Arc<dyn UserStore> = store.clone();
        let credentials = Credentials {
            username: "alice".to_string(),
            password: "secret123".to_string(),
        };

        login(Extension(shared), Extension(globals), Some(Json(credentials)))
            .await
            .map_err(|err| anyhow::anyhow!("login failed: {err:?}"))?;

        let stored = store
            .find_by_username(&Username::parse("alice")?)
            .await?
            .context("alice disappeared")?;
        assert_eq!(stored.password(), &before);
        Ok(())
    }
}
