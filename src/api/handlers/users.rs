use crate::{
    api::{
        error::{ApiError, ErrorBody},
        handlers::{
            login::verify_decoy,
            types::{new_password, Credentials, PasswordChange, UserView},
        },
    },
    cli::globals::GlobalArgs,
    store::UserStore,
    user::{User, Username},
};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[utoipa::path(
    post,
    path = "/users",
    request_body = Credentials,
    responses (
        (status = 201, description = "User created", body = UserView, content_type = "application/json"),
        (status = 400, description = "Missing or invalid username or password", body = ErrorBody),
        (status = 409, description = "User with the specified username already exists", body = ErrorBody),
    ),
    tag = "users"
)]
/// Create a user; the password is hashed before anything is stored.
#[instrument(skip(store, globals, payload))]
pub async fn register(
    store: Extension<Arc<dyn UserStore>>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<Credentials>>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let Some(Json(credentials)) = payload else {
        return Err(ApiError::MissingPayload);
    };

    debug!("register: {:?}", credentials);

    let username = Username::parse(&credentials.username)?;
    let password = new_password(credentials.password)?;

    let user = User::new(username, password)
        .hash_password(globals.bcrypt_cost)
        .await?;

    store.create(&user).await?;

    info!("User created: {}", user.username());

    Ok((StatusCode::CREATED, Json(UserView::from(user.username()))))
}

#[utoipa::path(
    put,
    path = "/users/{username}/password",
    params(
        ("username" = String, Path, description = "Account whose password changes")
    ),
    request_body = PasswordChange,
    responses (
        (status = 204, description = "Password changed"),
        (status = 400, description = "Missing payload or invalid new password", body = ErrorBody),
        (status = 401, description = "Unknown user or wrong current password", body = ErrorBody),
    ),
    tag = "users"
)]
/// Replace a password after checking the current one.
#[instrument(skip(store, globals, payload))]
pub async fn change_password(
    store: Extension<Arc<dyn UserStore>>,
    globals: Extension<GlobalArgs>,
    Path(username): Path<String>,
    payload: Option<Json<PasswordChange>>,
) -> Result<StatusCode, ApiError> {
    let Some(Json(change)) = payload else {
        return Err(ApiError::MissingPayload);
    };

    let new_password = new_password(change.new_password)?;

    let current = match Username::parse(&username) {
        Ok(username) => store.find_by_username(&username).await?,
        Err(_) => None,
    };

    let Some(current) = current else {
        verify_decoy(globals.bcrypt_cost, change.password).await;
        return Err(ApiError::InvalidCredentials);
    };

    if !current.validate_password(&change.password).await? {
        return Err(ApiError::InvalidCredentials);
    }

    let updated = User::new(current.username().clone(), new_password)
        .hash_password(globals.bcrypt_cost)
        .await?;

    store.update_password(&updated).await?;

    info!("Password changed: {}", updated.username());

    Ok(StatusCode::NO_CONTENT)
}
