use super::documents;
use super::wire::{
    CheckoutPayload, CompletePayload, Envelope, GraphQlError, ProductConnection, TokenPayload,
    WireCheckout, WireProduct, address_input,
};
use crate::domain::address::Address;
use crate::domain::catalog::{ProductDetail, ProductPage, ProductQuery};
use crate::domain::checkout::{
    CheckoutCreated, CheckoutDraft, CheckoutId, CheckoutSnapshot, CompletionResult, LineId,
    LineInput, LineUpdate, LinesUpdated, MutationAck, PaymentInput, ShippingMethodId,
};
use crate::domain::ports::{
    AUTH_TOKEN_KEY, AccountGateway, CatalogGateway, CommerceGateway, SessionStoreRef, TokenGrant,
};
use crate::error::{Result, SyncError};
use crate::infrastructure::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::ToPrimitive;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Commerce, catalog and account gateway over the storefront's GraphQL API.
///
/// Requests carry `Authorization: JWT <token>` while a login token is
/// persisted. Transient failures are retried according to the
/// [`RetryPolicy`]; callers only see the final outcome.
pub struct GraphQlGateway {
    http: Client,
    endpoint: String,
    session: SessionStoreRef,
    retry: RetryPolicy,
}

impl GraphQlGateway {
    pub fn new(
        endpoint: impl Into<String>,
        session: SessionStoreRef,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("cartsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, endpoint, session, retry))
    }

    pub fn with_client(
        http: Client,
        endpoint: impl Into<String>,
        session: SessionStoreRef,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            session,
            retry,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs `query` and decodes the `root` field of `data`.
    async fn execute<P: DeserializeOwned>(
        &self,
        root: &'static str,
        query: &'static str,
        variables: Value,
    ) -> Result<P> {
        let data = self
            .retry
            .run(root, || self.send_once(root, query, &variables))
            .await?;
        decode_root(data, root)
    }

    async fn send_once(&self, root: &'static str, query: &str, variables: &Value) -> Result<Value> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = self.session.get(AUTH_TOKEN_KEY).await? {
            request = request.header(AUTHORIZATION, format!("JWT {token}"));
        }

        debug!(operation = root, "sending GraphQL request");
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.forget_token().await;
            return Err(SyncError::Unauthenticated("HTTP 401".to_string()));
        }
        let body = response.text().await?;

        let envelope = serde_json::from_str::<Envelope>(&body);
        if !status.is_success() {
            // A 5xx stays a retryable status error whatever its body says,
            // unless the body reports rejected credentials.
            return Err(match envelope {
                Ok(envelope)
                    if !envelope.errors.is_empty()
                        && (!status.is_server_error()
                            || envelope.errors.iter().any(GraphQlError::is_unauthenticated)) =>
                {
                    self.graphql_failure(envelope.errors).await
                }
                _ => SyncError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let envelope = envelope
            .map_err(|e| SyncError::Protocol(format!("malformed response to {root}: {e}")))?;
        if !envelope.errors.is_empty() {
            return Err(self.graphql_failure(envelope.errors).await);
        }
        envelope
            .data
            .ok_or_else(|| SyncError::Protocol(format!("response to {root} carried no data")))
    }

    async fn graphql_failure(&self, errors: Vec<GraphQlError>) -> SyncError {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        if errors.iter().any(GraphQlError::is_unauthenticated) {
            self.forget_token().await;
            return SyncError::Unauthenticated(message);
        }
        SyncError::Protocol(message)
    }

    async fn forget_token(&self) {
        match self.session.delete(AUTH_TOKEN_KEY).await {
            Ok(()) => warn!("login token rejected; removed it"),
            Err(e) => warn!(error = %e, "login token rejected but could not be removed"),
        }
    }
}

fn decode_root<P: DeserializeOwned>(mut data: Value, root: &str) -> Result<P> {
    let field = data.get_mut(root).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(field)
        .map_err(|e| SyncError::Protocol(format!("unexpected {root} payload: {e}")))
}

fn lines_of(payload: CheckoutPayload) -> LinesUpdated {
    LinesUpdated {
        lines: payload
            .checkout
            .map(WireCheckout::into_lines)
            .unwrap_or_default(),
        errors: payload.errors,
    }
}

#[async_trait]
impl CommerceGateway for GraphQlGateway {
    async fn create_checkout(&self, draft: &CheckoutDraft) -> Result<CheckoutCreated> {
        let variables = json!({
            "input": {
                "channel": draft.channel,
                "email": draft.email,
                "lines": draft.lines,
            }
        });
        let payload: CheckoutPayload = self
            .execute("checkoutCreate", documents::CHECKOUT_CREATE, variables)
            .await?;
        let (checkout_id, lines) = match payload.checkout {
            Some(checkout) => (Some(checkout.id.clone()), checkout.into_lines()),
            None => (None, Vec::new()),
        };
        Ok(CheckoutCreated {
            checkout_id,
            lines,
            errors: payload.errors,
        })
    }

    async fn add_lines(&self, checkout: &CheckoutId, lines: &[LineInput]) -> Result<LinesUpdated> {
        let variables = json!({ "checkoutId": checkout, "lines": lines });
        let payload = self
            .execute("checkoutLinesAdd", documents::CHECKOUT_LINES_ADD, variables)
            .await?;
        Ok(lines_of(payload))
    }

    async fn update_lines(
        &self,
        checkout: &CheckoutId,
        lines: &[LineUpdate],
    ) -> Result<LinesUpdated> {
        let lines: Vec<Value> = lines
            .iter()
            .map(|l| json!({ "lineId": l.line_id, "quantity": l.quantity }))
            .collect();
        let variables = json!({ "checkoutId": checkout, "lines": lines });
        let payload = self
            .execute(
                "checkoutLinesUpdate",
                documents::CHECKOUT_LINES_UPDATE,
                variables,
            )
            .await?;
        Ok(lines_of(payload))
    }

    async fn delete_line(&self, checkout: &CheckoutId, line: &LineId) -> Result<MutationAck> {
        let variables = json!({ "checkoutId": checkout, "lineId": line });
        let payload: CheckoutPayload = self
            .execute("checkoutLineDelete", documents::CHECKOUT_LINE_DELETE, variables)
            .await?;
        Ok(MutationAck {
            errors: payload.errors,
        })
    }

    async fn get_checkout(&self, checkout: &CheckoutId) -> Result<Option<CheckoutSnapshot>> {
        let wire: Option<WireCheckout> = self
            .execute("checkout", documents::GET_CHECKOUT, json!({ "id": checkout }))
            .await?;
        Ok(wire.map(CheckoutSnapshot::from))
    }

    async fn set_shipping_address(
        &self,
        checkout: &CheckoutId,
        address: &Address,
    ) -> Result<MutationAck> {
        let variables = json!({
            "checkoutId": checkout,
            "shippingAddress": address_input(address),
        });
        let payload: CheckoutPayload = self
            .execute(
                "checkoutShippingAddressUpdate",
                documents::CHECKOUT_SHIPPING_ADDRESS_UPDATE,
                variables,
            )
            .await?;
        Ok(MutationAck {
            errors: payload.errors,
        })
    }

    async fn set_billing_address(
        &self,
        checkout: &CheckoutId,
        address: &Address,
    ) -> Result<MutationAck> {
        let variables = json!({
            "checkoutId": checkout,
            "billingAddress": address_input(address),
        });
        let payload: CheckoutPayload = self
            .execute(
                "checkoutBillingAddressUpdate",
                documents::CHECKOUT_BILLING_ADDRESS_UPDATE,
                variables,
            )
            .await?;
        Ok(MutationAck {
            errors: payload.errors,
        })
    }

    async fn set_shipping_method(
        &self,
        checkout: &CheckoutId,
        method: &ShippingMethodId,
    ) -> Result<MutationAck> {
        let variables = json!({ "checkoutId": checkout, "shippingMethodId": method });
        let payload: CheckoutPayload = self
            .execute(
                "checkoutShippingMethodUpdate",
                documents::CHECKOUT_SHIPPING_METHOD_UPDATE,
                variables,
            )
            .await?;
        Ok(MutationAck {
            errors: payload.errors,
        })
    }

    async fn create_payment(
        &self,
        checkout: &CheckoutId,
        payment: &PaymentInput,
    ) -> Result<MutationAck> {
        let amount = payment.amount.to_f64().ok_or_else(|| {
            SyncError::Protocol(format!("payment amount {} is not representable", payment.amount))
        })?;
        let variables = json!({
            "checkoutId": checkout,
            "input": {
                "gateway": payment.gateway,
                "token": payment.token,
                "amount": amount,
            }
        });
        let payload: CheckoutPayload = self
            .execute(
                "checkoutPaymentCreate",
                documents::CHECKOUT_PAYMENT_CREATE,
                variables,
            )
            .await?;
        Ok(MutationAck {
            errors: payload.errors,
        })
    }

    async fn complete_checkout(&self, checkout: &CheckoutId) -> Result<CompletionResult> {
        let payload: CompletePayload = self
            .execute(
                "checkoutComplete",
                documents::CHECKOUT_COMPLETE,
                json!({ "checkoutId": checkout }),
            )
            .await?;
        Ok(CompletionResult {
            order: payload.order.map(Into::into),
            confirmation_needed: payload.confirmation_needed,
            errors: payload.errors,
        })
    }
}

#[async_trait]
impl CatalogGateway for GraphQlGateway {
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        let mut variables = json!({
            "first": query.first,
            "channel": query.channel,
            "sortBy": { "field": query.sort.as_field(), "direction": "ASC" },
        });
        if let Some(search) = &query.search {
            variables["filter"] = json!({ "search": search });
        }
        if let Some(after) = &query.after {
            variables["after"] = json!(after);
        }
        let connection: Option<ProductConnection> = self
            .execute("products", documents::GET_PRODUCTS, variables)
            .await?;
        Ok(connection
            .map(ProductConnection::into_page)
            .unwrap_or_default())
    }

    async fn product_by_slug(&self, slug: &str, channel: &str) -> Result<Option<ProductDetail>> {
        let product: Option<WireProduct> = self
            .execute(
                "product",
                documents::GET_PRODUCT,
                json!({ "slug": slug, "channel": channel }),
            )
            .await?;
        Ok(product.map(ProductDetail::from))
    }
}

#[async_trait]
impl AccountGateway for GraphQlGateway {
    async fn create_token(&self, email: &str, password: &str) -> Result<TokenGrant> {
        let payload: TokenPayload = self
            .execute(
                "tokenCreate",
                documents::TOKEN_CREATE,
                json!({ "email": email, "password": password }),
            )
            .await?;
        Ok(TokenGrant {
            email: payload.email(),
            token: payload.token,
            errors: payload.errors,
        })
    }
}
