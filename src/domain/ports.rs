use super::address::Address;
use super::catalog::{ProductDetail, ProductPage, ProductQuery};
use super::checkout::{
    CheckoutCreated, CheckoutDraft, CheckoutId, CheckoutSnapshot, CompletionResult, FieldError,
    GatewayReply, LineId, LineInput, LineUpdate, LinesUpdated, MutationAck, PaymentInput,
    ShippingMethodId,
};
use crate::error::Result;
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;

/// Key under which the active checkout id is persisted.
pub const CHECKOUT_ID_KEY: &str = "checkout-id";
/// Key under which the login token is persisted.
pub const AUTH_TOKEN_KEY: &str = "auth-token";

/// Remote checkout operations.
///
/// Field errors are data, not `Err`: they come back inside the reply so the
/// caller decides what a rejection means. `Err` is reserved for transport
/// and protocol failures, after any retries the implementation performs.
#[automock]
#[async_trait]
pub trait CommerceGateway: Send + Sync {
    async fn create_checkout(&self, draft: &CheckoutDraft) -> Result<CheckoutCreated>;

    async fn add_lines(&self, checkout: &CheckoutId, lines: &[LineInput]) -> Result<LinesUpdated>;

    async fn update_lines(
        &self,
        checkout: &CheckoutId,
        lines: &[LineUpdate],
    ) -> Result<LinesUpdated>;

    async fn delete_line(&self, checkout: &CheckoutId, line: &LineId) -> Result<MutationAck>;

    /// Always-fresh read. `None` when the gateway no longer knows the checkout.
    async fn get_checkout(&self, checkout: &CheckoutId) -> Result<Option<CheckoutSnapshot>>;

    async fn set_shipping_address(
        &self,
        checkout: &CheckoutId,
        address: &Address,
    ) -> Result<MutationAck>;

    async fn set_billing_address(
        &self,
        checkout: &CheckoutId,
        address: &Address,
    ) -> Result<MutationAck>;

    async fn set_shipping_method(
        &self,
        checkout: &CheckoutId,
        method: &ShippingMethodId,
    ) -> Result<MutationAck>;

    async fn create_payment(
        &self,
        checkout: &CheckoutId,
        payment: &PaymentInput,
    ) -> Result<MutationAck>;

    async fn complete_checkout(&self, checkout: &CheckoutId) -> Result<CompletionResult>;
}

/// Read-only product browsing.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// One page of the listing; pass the returned end cursor as `after` to continue.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage>;
    async fn product_by_slug(&self, slug: &str, channel: &str) -> Result<Option<ProductDetail>>;
}

/// Reply to a login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenGrant {
    pub token: Option<String>,
    pub email: Option<String>,
    pub errors: Vec<FieldError>,
}

impl GatewayReply for TokenGrant {
    fn errors(&self) -> &[FieldError] {
        &self.errors
    }
}

#[async_trait]
pub trait AccountGateway: Send + Sync {
    async fn create_token(&self, email: &str, password: &str) -> Result<TokenGrant>;
}

/// Small key-value persistence for client state that must survive restarts.
#[automock]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

pub type GatewayRef = Arc<dyn CommerceGateway>;
pub type CatalogRef = Arc<dyn CatalogGateway>;
pub type AccountRef = Arc<dyn AccountGateway>;
pub type SessionStoreRef = Arc<dyn SessionStore>;
