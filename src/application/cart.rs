use crate::config::StorefrontSettings;
use crate::domain::checkout::{
    CartAggregate, CheckoutDraft, CheckoutId, CheckoutSnapshot, GatewayReply, LineId, LineInput,
    LineItem, LineUpdate, VariantId,
};
use crate::domain::ports::{CHECKOUT_ID_KEY, GatewayRef, SessionStoreRef};
use crate::error::{Result, SyncError};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

/// Local view of the cart.
///
/// Only ever a cache of gateway state: every successful call replaces
/// `items` wholesale with what the gateway returned and rebuilds
/// `aggregate` from it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartState {
    pub checkout_id: Option<CheckoutId>,
    pub items: Vec<LineItem>,
    pub aggregate: CartAggregate,
}

impl CartState {
    fn replace_lines(&mut self, lines: Vec<LineItem>) {
        self.aggregate = CartAggregate::from_lines(&lines);
        self.items = lines;
    }
}

/// Keeps the local cart in step with the checkout session on the gateway.
///
/// Operations take `&mut self`, so calls against one engine are serialized
/// by the borrow checker; two engines sharing a persisted session are not
/// coordinated (last writer wins).
///
/// Every operation returns `Err` without touching local state when the
/// gateway rejects the request or cannot be reached.
pub struct CartSync {
    gateway: GatewayRef,
    store: SessionStoreRef,
    settings: StorefrontSettings,
    state: CartState,
}

impl CartSync {
    /// Creates an engine with no session, ignoring anything persisted.
    pub fn new(gateway: GatewayRef, store: SessionStoreRef, settings: StorefrontSettings) -> Self {
        Self {
            gateway,
            store,
            settings,
            state: CartState::default(),
        }
    }

    /// Creates an engine and adopts the checkout id persisted by a previous run.
    ///
    /// Line items are not persisted; call [`CartSync::load_checkout`] to
    /// rebuild them from the gateway.
    pub async fn open(
        gateway: GatewayRef,
        store: SessionStoreRef,
        settings: StorefrontSettings,
    ) -> Result<Self> {
        let checkout_id = store.get(CHECKOUT_ID_KEY).await?.map(CheckoutId::new);
        if let Some(id) = &checkout_id {
            debug!(checkout = %id, "restored persisted checkout session");
        }
        let mut engine = Self::new(gateway, store, settings);
        engine.state.checkout_id = checkout_id;
        Ok(engine)
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn checkout_id(&self) -> Option<&CheckoutId> {
        self.state.checkout_id.as_ref()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.state.items
    }

    pub fn item_count(&self) -> u64 {
        self.state.aggregate.item_count
    }

    pub fn total_amount(&self) -> Decimal {
        self.state.aggregate.total_amount
    }

    /// Adds `quantity` of a variant, opening a checkout session first if
    /// there is none.
    pub async fn add_item(&mut self, variant_id: VariantId, quantity: i32) -> Result<()> {
        let lines = vec![LineInput {
            variant_id,
            quantity,
        }];

        match self.state.checkout_id.clone() {
            None => {
                let draft = CheckoutDraft {
                    channel: self.settings.channel.clone(),
                    email: self.settings.customer_email.clone(),
                    lines,
                };
                let reply = self
                    .gateway
                    .create_checkout(&draft)
                    .await
                    .inspect_err(log_failure("checkoutCreate"))?;
                let created = accepted("checkoutCreate", reply)?;
                let checkout_id = created.checkout_id.ok_or_else(|| {
                    SyncError::Protocol("checkoutCreate returned no checkout".to_string())
                })?;

                // Persist first: a storage failure must leave the local session unset.
                self.store.set(CHECKOUT_ID_KEY, checkout_id.as_str()).await?;
                info!(checkout = %checkout_id, "opened checkout session");

                self.state.checkout_id = Some(checkout_id);
                self.state.replace_lines(created.lines);
            }
            Some(checkout_id) => {
                let reply = self
                    .gateway
                    .add_lines(&checkout_id, &lines)
                    .await
                    .inspect_err(log_failure("checkoutLinesAdd"))?;
                let updated = accepted("checkoutLinesAdd", reply)?;
                self.state.replace_lines(updated.lines);
            }
        }

        debug!(
            items = self.state.aggregate.item_count,
            total = %self.state.aggregate.total_amount,
            "cart updated"
        );
        Ok(())
    }

    /// Sets the quantity of a line, then re-reads the whole checkout.
    ///
    /// The quantity is sent as given. Turning a non-positive quantity into a
    /// removal is the caller's decision.
    pub async fn update_item(&mut self, line_id: &LineId, quantity: i32) -> Result<()> {
        let checkout_id = self.require_session()?;
        let lines = vec![LineUpdate {
            line_id: line_id.clone(),
            quantity,
        }];

        let reply = self
            .gateway
            .update_lines(&checkout_id, &lines)
            .await
            .inspect_err(log_failure("checkoutLinesUpdate"))?;
        accepted("checkoutLinesUpdate", reply)?;

        self.load_checkout().await.map(|_| ())
    }

    /// Deletes a line, then re-reads the whole checkout.
    pub async fn remove_item(&mut self, line_id: &LineId) -> Result<()> {
        let checkout_id = self.require_session()?;

        let reply = self
            .gateway
            .delete_line(&checkout_id, line_id)
            .await
            .inspect_err(log_failure("checkoutLineDelete"))?;
        accepted("checkoutLineDelete", reply)?;

        self.load_checkout().await.map(|_| ())
    }

    /// Replaces local lines and aggregates with a fresh read of the checkout.
    ///
    /// Returns the snapshot so callers can show gateway-side totals,
    /// addresses and shipping methods.
    pub async fn load_checkout(&mut self) -> Result<CheckoutSnapshot> {
        let checkout_id = self.require_session()?;

        let snapshot = self
            .gateway
            .get_checkout(&checkout_id)
            .await
            .inspect_err(log_failure("checkout"))?
            .ok_or_else(|| {
                warn!(checkout = %checkout_id, "checkout not found on gateway");
                SyncError::SessionExpired(checkout_id.clone())
            })?;

        self.state.replace_lines(snapshot.lines.clone());
        debug!(
            checkout = %checkout_id,
            lines = self.state.items.len(),
            "resynchronized cart"
        );
        Ok(snapshot)
    }

    /// Forgets the session and empties the cart. No gateway call is made.
    ///
    /// Local state is reset even if removing the persisted id fails.
    pub async fn clear_cart(&mut self) -> Result<()> {
        if let Some(id) = self.state.checkout_id.take() {
            info!(checkout = %id, "cleared checkout session");
        }
        self.state = CartState::default();
        self.store.delete(CHECKOUT_ID_KEY).await
    }

    fn require_session(&self) -> Result<CheckoutId> {
        self.state.checkout_id.clone().ok_or_else(|| {
            debug!("no checkout session; nothing to do");
            SyncError::NoSession
        })
    }
}

/// Turns a reply carrying field errors into [`SyncError::Rejected`].
pub(crate) fn accepted<R: GatewayReply>(operation: &'static str, reply: R) -> Result<R> {
    if reply.errors().is_empty() {
        return Ok(reply);
    }
    warn!(operation, errors = ?reply.errors(), "gateway rejected mutation");
    Err(SyncError::Rejected {
        operation,
        errors: reply.errors().to_vec(),
    })
}

pub(crate) fn log_failure(operation: &'static str) -> impl FnOnce(&SyncError) {
    move |e: &SyncError| error!(operation, error = %e, "gateway call failed")
}
