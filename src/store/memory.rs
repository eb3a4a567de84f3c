use super::{Error, UserStore};
use crate::user::{Hashed, User, Username};
use async_trait::async_trait;
use std::collections::{hash_map::Entry, HashMap};
use tokio::sync::RwLock;

/// Process-local store used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Username, Hashed>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, user: &User) -> Result<(), Error> {
        match self.users.write().await.entry(user.username().clone()) {
            Entry::Occupied(_) => Err(Error::Duplicate(user.username().to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.password().clone());
                Ok(())
            }
        }
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .read()
            .await
            .get(username)
            .map(|hashed| User::from_parts(username.clone(), hashed.clone())))
    }

    async fn update_password(&self, user: &User) -> Result<(), Error> {
        match self.users.write().await.get_mut(user.username()) {
            Some(stored) => {
                *stored = user.password().clone();
                Ok(())
            }
            None => Err(Error::NotFound(user.username().to_string())),
        }
    }

    async fn ping(&self) -> Result<(), Error> {
        Ok(())
    }
}
