use super::cart::{CartSync, accepted, log_failure};
use crate::config::PaymentSettings;
use crate::domain::address::Address;
use crate::domain::checkout::{CheckoutId, OrderId, PaymentInput, ShippingMethodId};
use crate::domain::money::Money;
use crate::domain::ports::GatewayRef;
use crate::error::{Result, SyncError};
use std::fmt;
use tracing::{debug, info, warn};

/// Progress of one checkout completion attempt.
///
/// `DeliverySelected` is only passed through when the request names a
/// shipping method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    Idle,
    ShippingSubmitted,
    BillingSubmitted,
    DeliverySelected,
    PaymentAttached,
    Completed,
    Failed,
}

impl CheckoutStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStage::Idle => "idle",
            CheckoutStage::ShippingSubmitted => "shipping-submitted",
            CheckoutStage::BillingSubmitted => "billing-submitted",
            CheckoutStage::DeliverySelected => "delivery-selected",
            CheckoutStage::PaymentAttached => "payment-attached",
            CheckoutStage::Completed => "completed",
            CheckoutStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStage::Completed | CheckoutStage::Failed)
    }
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingAddress {
    /// Bill to a copy of the shipping address.
    SameAsShipping,
    Separate(Address),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub shipping: Address,
    pub billing: BillingAddress,
    pub shipping_method: Option<ShippingMethodId>,
}

/// What the caller gets back once the gateway has produced an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub order_number: String,
    pub status: String,
    pub amount_charged: Money,
}

/// Drives one checkout session from addresses to a placed order.
///
/// Strictly sequential and not resumable: each call to
/// [`CheckoutWorkflow::complete`] starts again from `Idle` against the
/// cart's current session. Steps already accepted by the gateway before a
/// failure are not rolled back.
pub struct CheckoutWorkflow {
    gateway: GatewayRef,
    payment: PaymentSettings,
    stage: CheckoutStage,
    failed_after: Option<CheckoutStage>,
}

impl CheckoutWorkflow {
    pub fn new(gateway: GatewayRef, payment: PaymentSettings) -> Self {
        Self {
            gateway,
            payment,
            stage: CheckoutStage::Idle,
            failed_after: None,
        }
    }

    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// The last stage reached before the most recent attempt failed.
    pub fn failed_after(&self) -> Option<CheckoutStage> {
        self.failed_after
    }

    /// Submits addresses, attaches a payment for the checkout's authoritative
    /// total and completes the checkout.
    ///
    /// On success the cart's session is cleared. On failure the session is
    /// left intact for another attempt.
    pub async fn complete(
        &mut self,
        cart: &mut CartSync,
        request: &CompletionRequest,
    ) -> Result<OrderConfirmation> {
        self.stage = CheckoutStage::Idle;
        self.failed_after = None;

        match self.run(cart, request).await {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => {
                warn!(stage = %self.stage, error = %e, "checkout aborted");
                self.failed_after = Some(self.stage);
                self.stage = CheckoutStage::Failed;
                Err(e)
            }
        }
    }

    async fn run(
        &mut self,
        cart: &mut CartSync,
        request: &CompletionRequest,
    ) -> Result<OrderConfirmation> {
        let checkout_id = cart.checkout_id().cloned().ok_or(SyncError::NoSession)?;

        request.shipping.validate()?;
        let billing = match &request.billing {
            BillingAddress::SameAsShipping => request.shipping.clone(),
            BillingAddress::Separate(address) => {
                address.validate()?;
                address.clone()
            }
        };

        let reply = self
            .gateway
            .set_shipping_address(&checkout_id, &request.shipping)
            .await
            .inspect_err(log_failure("checkoutShippingAddressUpdate"))?;
        accepted("checkoutShippingAddressUpdate", reply)?;
        self.advance(CheckoutStage::ShippingSubmitted);

        let reply = self
            .gateway
            .set_billing_address(&checkout_id, &billing)
            .await
            .inspect_err(log_failure("checkoutBillingAddressUpdate"))?;
        accepted("checkoutBillingAddressUpdate", reply)?;
        self.advance(CheckoutStage::BillingSubmitted);

        if let Some(method) = &request.shipping_method {
            let reply = self
                .gateway
                .set_shipping_method(&checkout_id, method)
                .await
                .inspect_err(log_failure("checkoutShippingMethodUpdate"))?;
            accepted("checkoutShippingMethodUpdate", reply)?;
            self.advance(CheckoutStage::DeliverySelected);
        }

        let amount = self.authoritative_total(&checkout_id).await?;
        let payment = PaymentInput {
            gateway: self.payment.gateway.clone(),
            token: self.payment.token.clone(),
            amount: amount.amount,
        };
        let reply = self
            .gateway
            .create_payment(&checkout_id, &payment)
            .await
            .inspect_err(log_failure("checkoutPaymentCreate"))?;
        accepted("checkoutPaymentCreate", reply)?;
        self.advance(CheckoutStage::PaymentAttached);

        let reply = self
            .gateway
            .complete_checkout(&checkout_id)
            .await
            .inspect_err(log_failure("checkoutComplete"))?;
        let completion = accepted("checkoutComplete", reply)?;
        let confirmation_needed = completion.confirmation_needed;
        let order = completion
            .order
            .ok_or(SyncError::MissingOrder {
                confirmation_needed,
            })?;
        self.advance(CheckoutStage::Completed);
        info!(checkout = %checkout_id, order = %order.number, "order placed");

        if let Err(e) = cart.clear_cart().await {
            warn!(error = %e, "order placed but the persisted session could not be removed");
        }

        Ok(OrderConfirmation {
            order_id: order.id,
            order_number: order.number,
            status: order.status,
            amount_charged: amount,
        })
    }

    /// Reads the total from the gateway rather than the local aggregate, so
    /// discounts and shipping applied server-side are charged as-is.
    async fn authoritative_total(&self, checkout_id: &CheckoutId) -> Result<Money> {
        let snapshot = self
            .gateway
            .get_checkout(checkout_id)
            .await
            .inspect_err(log_failure("checkout"))?
            .ok_or_else(|| SyncError::SessionExpired(checkout_id.clone()))?;
        snapshot
            .total
            .ok_or_else(|| SyncError::MissingTotal(checkout_id.clone()))
    }

    fn advance(&mut self, next: CheckoutStage) {
        debug!(from = %self.stage, to = %next, "checkout stage");
        self.stage = next;
    }
}
