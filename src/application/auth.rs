use super::cart::{accepted, log_failure};
use crate::domain::ports::{AUTH_TOKEN_KEY, AccountRef, SessionStoreRef};
use crate::error::{Result, SyncError};
use tracing::info;

/// Obtains and forgets the login token the gateway client sends with each request.
pub struct Authenticator {
    account: AccountRef,
    store: SessionStoreRef,
}

impl Authenticator {
    pub fn new(account: AccountRef, store: SessionStoreRef) -> Self {
        Self { account, store }
    }

    /// Exchanges credentials for a token and persists it. Returns the email
    /// the gateway confirmed, falling back to the one supplied.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let reply = self
            .account
            .create_token(email, password)
            .await
            .inspect_err(log_failure("tokenCreate"))?;
        let grant = accepted("tokenCreate", reply)?;
        let token = grant
            .token
            .ok_or_else(|| SyncError::Unauthenticated("no token issued".to_string()))?;

        self.store.set(AUTH_TOKEN_KEY, &token).await?;
        let email = grant.email.unwrap_or_else(|| email.to_string());
        info!(%email, "logged in");
        Ok(email)
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.delete(AUTH_TOKEN_KEY).await?;
        info!("logged out");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.store.get(AUTH_TOKEN_KEY).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::FieldError;
    use crate::domain::ports::{AccountGateway, SessionStore, TokenGrant};
    use crate::infrastructure::in_memory::InMemorySessionStore;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedAccount(TokenGrant);

    #[async_trait]
    impl AccountGateway for FixedAccount {
        async fn create_token(&self, _email: &str, _password: &str) -> Result<TokenGrant> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let store = InMemorySessionStore::new();
        let auth = Authenticator::new(
            Arc::new(FixedAccount(TokenGrant {
                token: Some("jwt-abc".into()),
                email: Some("asha@example.com".into()),
                errors: vec![],
            })),
            Arc::new(store.clone()),
        );

        let email = auth.login("asha@example.com", "secret").await.unwrap();
        assert_eq!(email, "asha@example.com");
        assert_eq!(
            store.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(),
            Some("jwt-abc")
        );
        assert!(auth.is_authenticated().await.unwrap());

        auth.logout().await.unwrap();
        assert!(!auth.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_rejected_credentials_store_nothing() {
        let store = InMemorySessionStore::new();
        let auth = Authenticator::new(
            Arc::new(FixedAccount(TokenGrant {
                token: None,
                email: None,
                errors: vec![FieldError::new(Some("email"), "Please, enter valid credentials")],
            })),
            Arc::new(store.clone()),
        );

        let err = auth.login("asha@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, SyncError::Rejected { operation: "tokenCreate", .. }));
        assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_none());
    }
}
