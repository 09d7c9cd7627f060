//! Explicit application state: the signed-in user, persisted through the platform.

use std::sync::Arc;

use tokio::sync::watch;

use assess_core::model::{UserId, UserRecord};

use crate::error::AppStateError;
use crate::platform::Platform;

pub const USER_KEY: &str = "auth_user";
pub const TOKEN_KEY: &str = "auth_token";

pub struct AppState {
    platform: Arc<dyn Platform>,
    user: watch::Sender<Option<UserRecord>>,
}

impl AppState {
    /// Restore state from the platform's persisted items.
    ///
    /// An unreadable `auth_user` entry is treated as signed out.
    ///
    /// # Errors
    ///
    /// Returns `AppStateError::Storage` if the store cannot be read.
    pub async fn load(platform: Arc<dyn Platform>) -> Result<Self, AppStateError> {
        let stored = platform.get_item(USER_KEY).await?;
        let user = match stored.as_deref().map(serde_json::from_str::<UserRecord>) {
            Some(Ok(user)) => Some(user),
            Some(Err(err)) => {
                tracing::warn!(error = %err, "ignoring unreadable stored user");
                None
            }
            None => None,
        };
        let (user, _) = watch::channel(user);
        Ok(Self { platform, user })
    }

    #[must_use]
    pub fn platform(&self) -> Arc<dyn Platform> {
        Arc::clone(&self.platform)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserRecord> {
        self.user.borrow().clone()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user.borrow().as_ref().map(|user| user.id.clone())
    }

    /// Observable stream of user changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<UserRecord>> {
        self.user.subscribe()
    }

    /// # Errors
    ///
    /// Returns `AppStateError` if the token or user cannot be persisted.
    pub async fn sign_in(&self, token: &str, user: UserRecord) -> Result<(), AppStateError> {
        self.platform.set_item(TOKEN_KEY, token).await?;
        self.set_user(user).await
    }

    /// # Errors
    ///
    /// Returns `AppStateError` if the user cannot be persisted.
    pub async fn set_user(&self, user: UserRecord) -> Result<(), AppStateError> {
        let encoded = serde_json::to_string(&user)?;
        self.platform.set_item(USER_KEY, &encoded).await?;
        tracing::info!(user_id = %user.id, "user stored");
        self.user.send_replace(Some(user));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppStateError::Storage` if persisted items cannot be removed.
    pub async fn logout(&self) -> Result<(), AppStateError> {
        self.platform.remove_item(TOKEN_KEY).await?;
        self.platform.remove_item(USER_KEY).await?;
        self.user.send_replace(None);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppStateError::Storage` if the store cannot be read.
    pub async fn token(&self) -> Result<Option<String>, AppStateError> {
        Ok(self.platform.get_item(TOKEN_KEY).await?)
    }
}
