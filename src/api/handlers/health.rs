use crate::{store::UserStore, GIT_COMMIT_HASH};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

const HEALTH_STORE_TIMEOUT_SECONDS: u64 = 2;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    pub commit: String,
    pub name: String,
    pub version: String,
    pub store: String,
    pub store_kind: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses (
        (status = 200, description = "User store is reachable", body = Health),
        (status = 503, description = "User store is unreachable", body = Health)
    ),
    tag = "health",
)]
// axum handler for health
pub async fn health(method: Method, store: Extension<Arc<dyn UserStore>>) -> impl IntoResponse {
    let store_healthy = probe_store(store.0.as_ref()).await;

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if store_healthy {
            "ok".to_string()
        } else {
            "error".to_string()
        },
        store_kind: store.kind().to_string(),
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = health.commit.get(..7).unwrap_or_default();

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);

            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .map_err(|err| {
            debug!("Failed to parse X-App header: {}", err);
        })
        .unwrap_or_else(|()| HeaderMap::new());

    if store_healthy {
        (StatusCode::OK, headers, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}

async fn probe_store(store: &dyn UserStore) -> bool {
    match timeout(Duration::from_secs(HEALTH_STORE_TIMEOUT_SECONDS), store.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            error!("User store ping failed: {}", err);
            false
        }
        Err(_) => {
            warn!("User store health check timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{self, MemoryUserStore};
    use crate::user::{User, Username};
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::to_bytes;

    #[derive(Debug)]
    struct DownStore;

    #[async_trait]
    impl UserStore for DownStore {
        fn kind(&self) -> &'static str {
            "down"
        }

        async fn create(&self, _user: &User) -> Result<(), store::Error> {
            Err(store::Error::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_by_username(&self, _username: &Username) -> Result<Option<User>, store::Error> {
            Err(store::Error::Database(sqlx::Error::PoolTimedOut))
        }

        async fn update_password(&self, _user: &User) -> Result<(), store::Error> {
            Err(store::Error::Database(sqlx::Error::PoolTimedOut))
        }

        async fn ping(&self) -> Result<(), store::Error> {
            Err(store::Error::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn healthy_store_returns_ok() -> Result<()> {
        let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let response = health(Method::GET, Extension(store)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-App"));

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let health: Health = serde_json::from_slice(&body)?;
        assert_eq!(health.name, env!("CARGO_PKG_NAME"));
        assert_eq!(health.store, "ok");
        assert_eq!(health.store_kind, "memory");
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_store_returns_503() -> Result<()> {
        let store: Arc<dyn UserStore> = Arc::new(DownStore);
        let response = health(Method::GET, Extension(store)).await.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let health: Health = serde_json::from_slice(&body)?;
        assert_eq!(health.store, "error");
        assert_eq!(health.store_kind, "down");
        Ok(())
    }

    #[tokio::test]
    async fn options_has_empty_body() -> Result<()> {
        let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let response = health(Method::OPTIONS, Extension(store)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert!(body.is_empty());
        Ok(())
    }
}
