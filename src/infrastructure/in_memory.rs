use crate::domain::address::Address;
use crate::domain::catalog::{
    ProductDetail, ProductPage, ProductQuery, ProductSort, ProductSummary, VariantSummary,
};
use crate::domain::checkout::{
    CheckoutCreated, CheckoutDraft, CheckoutId, CheckoutSnapshot, CompletionResult, FieldError,
    LineId, LineInput, LineItem, LineUpdate, LinesUpdated, MutationAck, Order, OrderId,
    PaymentInput, ShippingMethod, ShippingMethodId, VariantId, VariantSnapshot,
};
use crate::domain::money::Money;
use crate::domain::ports::{
    AccountGateway, CatalogGateway, CommerceGateway, SessionStore, TokenGrant,
};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory session store.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the engine persisted.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

/// A failure to inject into the next call of one gateway operation.
#[derive(Debug, Clone)]
pub enum InjectedFailure {
    /// The call is answered with these field errors.
    Reject(Vec<FieldError>),
    /// The call fails at the transport level with HTTP 503.
    Unavailable,
}

#[derive(Debug, Clone)]
struct StoredLine {
    id: LineId,
    variant_id: VariantId,
    quantity: u32,
}

#[derive(Debug, Clone, Default)]
struct StoredCheckout {
    lines: Vec<StoredLine>,
    shipping_address: Option<Address>,
    billing_address: Option<Address>,
    shipping_method: Option<ShippingMethodId>,
    payment: Option<PaymentInput>,
}

struct GatewayState {
    currency: String,
    products: Vec<ProductDetail>,
    stock: HashMap<VariantId, u32>,
    shipping_methods: Vec<ShippingMethod>,
    checkouts: HashMap<CheckoutId, StoredCheckout>,
    orders: Vec<Order>,
    customers: HashMap<String, String>,
    failures: HashMap<&'static str, VecDeque<InjectedFailure>>,
    calls: HashMap<&'static str, usize>,
    confirmation_needed: bool,
    sequence: u64,
}

fn field_error(field: &str, message: &str, code: &str) -> FieldError {
    FieldError {
        field: Some(field.to_string()),
        message: message.to_string(),
        code: Some(code.to_string()),
    }
}

fn checkout_not_found() -> FieldError {
    field_error("checkoutId", "Couldn't resolve to a node", "NOT_FOUND")
}

impl GatewayState {
    fn new(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            products: Vec::new(),
            stock: HashMap::new(),
            shipping_methods: Vec::new(),
            checkouts: HashMap::new(),
            orders: Vec::new(),
            customers: HashMap::new(),
            failures: HashMap::new(),
            calls: HashMap::new(),
            confirmation_needed: false,
            sequence: 0,
        }
    }

    /// Counts the call and applies any failure queued for `operation`.
    fn enter(&mut self, operation: &'static str) -> Result<Option<Vec<FieldError>>> {
        *self.calls.entry(operation).or_default() += 1;
        match self.failures.get_mut(operation).and_then(VecDeque::pop_front) {
            Some(InjectedFailure::Unavailable) => Err(SyncError::Status {
                status: 503,
                body: format!("{operation} unavailable"),
            }),
            Some(InjectedFailure::Reject(errors)) => Ok(Some(errors)),
            None => Ok(None),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}-{}", self.sequence)
    }

    fn variant_snapshot(&self, variant_id: &VariantId) -> Option<VariantSnapshot> {
        self.products.iter().find_map(|product| {
            product
                .variants
                .iter()
                .find(|v| &v.id == variant_id)
                .map(|variant| VariantSnapshot {
                    id: variant.id.clone(),
                    name: variant.name.clone(),
                    product_id: Some(product.id.clone()),
                    product_name: product.name.clone(),
                    product_slug: Some(product.slug.clone()),
                    thumbnail_url: None,
                    unit_price: variant.price.clone(),
                })
        })
    }

    fn check_stock(
        &self,
        variant_id: &VariantId,
        quantity: u32,
    ) -> std::result::Result<(), FieldError> {
        match self.stock.get(variant_id) {
            Some(available) if quantity > *available => Err(field_error(
                "quantity",
                &format!("Could not add items {variant_id}. Only {available} remaining in stock."),
                "INSUFFICIENT_STOCK",
            )),
            _ => Ok(()),
        }
    }

    /// Adds inputs to `lines`, merging by variant. `lines` is only touched on success.
    fn merge_lines(
        &mut self,
        lines: &mut Vec<StoredLine>,
        inputs: &[LineInput],
    ) -> std::result::Result<(), Vec<FieldError>> {
        let mut merged = lines.clone();
        for input in inputs {
            if input.quantity <= 0 {
                return Err(vec![field_error(
                    "quantity",
                    "The quantity should be higher than zero.",
                    "ZERO_QUANTITY",
                )]);
            }
            if self.variant_snapshot(&input.variant_id).is_none() {
                return Err(vec![field_error(
                    "variantId",
                    "Couldn't resolve to a node",
                    "NOT_FOUND",
                )]);
            }
            let added = input.quantity.unsigned_abs();
            match merged.iter_mut().find(|l| l.variant_id == input.variant_id) {
                Some(line) => {
                    let quantity = line.quantity.checked_add(added).ok_or_else(|| {
                        vec![field_error(
                            "quantity",
                            "Cannot add more of this item to the checkout.",
                            "QUANTITY_GREATER_THAN_LIMIT",
                        )]
                    })?;
                    self.check_stock(&line.variant_id, quantity)
                        .map_err(|e| vec![e])?;
                    line.quantity = quantity;
                }
                None => {
                    self.check_stock(&input.variant_id, added)
                        .map_err(|e| vec![e])?;
                    let id = LineId::new(self.next_id("line"));
                    merged.push(StoredLine {
                        id,
                        variant_id: input.variant_id.clone(),
                        quantity: added,
                    });
                }
            }
        }
        *lines = merged;
        Ok(())
    }

    fn line_items(&self, lines: &[StoredLine]) -> Vec<LineItem> {
        lines
            .iter()
            .filter_map(|line| {
                self.variant_snapshot(&line.variant_id).map(|variant| LineItem {
                    id: line.id.clone(),
                    quantity: line.quantity,
                    variant,
                })
            })
            .collect()
    }

    fn shipping_price(&self, checkout: &StoredCheckout) -> Decimal {
        checkout
            .shipping_method
            .as_ref()
            .and_then(|id| self.shipping_methods.iter().find(|m| &m.id == id))
            .and_then(|m| m.price.as_ref())
            .map(|p| p.amount)
            .unwrap_or_default()
    }

    fn total(&self, checkout: &StoredCheckout) -> Decimal {
        let subtotal: Decimal = self
            .line_items(&checkout.lines)
            .iter()
            .map(LineItem::line_total)
            .sum();
        subtotal + self.shipping_price(checkout)
    }

    fn snapshot(&self, id: &CheckoutId, checkout: &StoredCheckout) -> CheckoutSnapshot {
        let lines = self.line_items(&checkout.lines);
        let subtotal: Decimal = lines.iter().map(LineItem::line_total).sum();
        let shipping = self.shipping_price(checkout);
        CheckoutSnapshot {
            id: id.clone(),
            lines,
            total: Some(Money::new(subtotal + shipping, self.currency.clone())),
            subtotal: Some(Money::new(subtotal, self.currency.clone())),
            shipping_price: Some(Money::new(shipping, self.currency.clone())),
            shipping_address: checkout.shipping_address.clone(),
            billing_address: checkout.billing_address.clone(),
            shipping_methods: self.shipping_methods.clone(),
        }
    }

    fn check_address(address: &Address) -> std::result::Result<(), FieldError> {
        if address.postal_code.trim().is_empty() {
            return Err(field_error("postalCode", "This field is required.", "REQUIRED"));
        }
        if address.country_code.len() != 2 {
            return Err(field_error("country", "Invalid country code.", "INVALID"));
        }
        Ok(())
    }

    /// Places the order if the checkout is fully addressed and paid.
    fn place_order(&mut self, id: &CheckoutId) -> std::result::Result<Order, FieldError> {
        let checkout = self.checkouts.get(id).ok_or_else(checkout_not_found)?;
        if checkout.lines.is_empty() {
            return Err(field_error("lines", "Cannot create order without lines.", "NO_LINES"));
        }
        if checkout.shipping_address.is_none() {
            return Err(field_error(
                "shippingAddress",
                "Shipping address is not set",
                "SHIPPING_ADDRESS_NOT_SET",
            ));
        }
        if checkout.billing_address.is_none() {
            return Err(field_error(
                "billingAddress",
                "Billing address is not set",
                "BILLING_ADDRESS_NOT_SET",
            ));
        }
        let total = self.total(checkout);
        if checkout.payment.as_ref().map(|p| p.amount) != Some(total) {
            return Err(field_error(
                "payment",
                "Provided payment methods can not cover the checkout's total amount",
                "CHECKOUT_NOT_FULLY_PAID",
            ));
        }

        let lines = checkout.lines.clone();
        for line in &lines {
            if let Some(available) = self.stock.get_mut(&line.variant_id) {
                *available = available.saturating_sub(line.quantity);
            }
        }
        self.checkouts.remove(id);

        let order = Order {
            id: OrderId::new(self.next_id("order")),
            number: (self.orders.len() + 1).to_string(),
            status: "UNFULFILLED".to_string(),
            total: Some(Money::new(total, self.currency.clone())),
        };
        self.orders.push(order.clone());
        Ok(order)
    }
}

/// An in-process commerce backend for tests and offline runs.
///
/// Behaves like the remote gateway at the port level: field errors come back
/// inside replies, completed checkouts disappear, and a queued
/// [`InjectedFailure`] replaces the next call to the named operation.
/// Operation names are the GraphQL mutation names, e.g. `checkoutLinesAdd`.
#[derive(Clone)]
pub struct InMemoryGateway {
    state: Arc<RwLock<GatewayState>>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new("INR")
    }
}

impl InMemoryGateway {
    /// Creates an empty gateway pricing everything in `currency`.
    pub fn new(currency: &str) -> Self {
        Self {
            state: Arc::new(RwLock::new(GatewayState::new(currency))),
        }
    }

    pub async fn add_product(&self, product: ProductDetail) {
        self.state.write().await.products.push(product);
    }

    pub async fn set_stock(&self, variant_id: &VariantId, quantity: u32) {
        self.state
            .write()
            .await
            .stock
            .insert(variant_id.clone(), quantity);
    }

    pub async fn add_shipping_method(&self, method: ShippingMethod) {
        self.state.write().await.shipping_methods.push(method);
    }

    pub async fn register_customer(&self, email: &str, password: &str) {
        self.state
            .write()
            .await
            .customers
            .insert(email.to_string(), password.to_string());
    }

    pub async fn fail_next(&self, operation: &'static str, failure: InjectedFailure) {
        self.state
            .write()
            .await
            .failures
            .entry(operation)
            .or_default()
            .push_back(failure);
    }

    /// Makes completion answer with no order and `confirmationNeeded` set.
    pub async fn set_confirmation_needed(&self, needed: bool) {
        self.state.write().await.confirmation_needed = needed;
    }

    /// Forgets a checkout, as the gateway does when a session expires.
    pub async fn expire(&self, checkout: &CheckoutId) {
        self.state.write().await.checkouts.remove(checkout);
    }

    pub async fn calls(&self, operation: &str) -> usize {
        self.state
            .read()
            .await
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    pub async fn checkout_count(&self) -> usize {
        self.state.read().await.checkouts.len()
    }

    pub async fn stock(&self, variant_id: &VariantId) -> Option<u32> {
        self.state.read().await.stock.get(variant_id).copied()
    }

    /// Payment attached to a checkout, if any.
    pub async fn payment(&self, checkout: &CheckoutId) -> Option<PaymentInput> {
        self.state
            .read()
            .await
            .checkouts
            .get(checkout)
            .and_then(|c| c.payment.clone())
    }

    async fn update_address(
        &self,
        operation: &'static str,
        checkout: &CheckoutId,
        address: &Address,
        billing: bool,
    ) -> Result<MutationAck> {
        let mut state = self.state.write().await;
        if let Some(errors) = state.enter(operation)? {
            return Ok(MutationAck { errors });
        }
        if let Err(e) = GatewayState::check_address(address) {
            return Ok(MutationAck { errors: vec![e] });
        }
        let Some(stored) = state.checkouts.get_mut(checkout) else {
            return Ok(MutationAck {
                errors: vec![checkout_not_found()],
            });
        };
        if billing {
            stored.billing_address = Some(address.clone());
        } else {
            stored.shipping_address = Some(address.clone());
        }
        Ok(MutationAck::default())
    }
}

#[async_trait]
impl CommerceGateway for InMemoryGateway {
    async fn create_checkout(&self, draft: &CheckoutDraft) -> Result<CheckoutCreated> {
        let mut state = self.state.write().await;
        if let Some(errors) = state.enter("checkoutCreate")? {
            return Ok(CheckoutCreated {
                errors,
                ..Default::default()
            });
        }
        if draft.email.trim().is_empty() {
            return Ok(CheckoutCreated {
                errors: vec![field_error("email", "This field is required.", "REQUIRED")],
                ..Default::default()
            });
        }

        let mut checkout = StoredCheckout::default();
        if let Err(errors) = state.merge_lines(&mut checkout.lines, &draft.lines) {
            return Ok(CheckoutCreated {
                errors,
                ..Default::default()
            });
        }
        let id = CheckoutId::new(state.next_id("checkout"));
        let lines = state.line_items(&checkout.lines);
        state.checkouts.insert(id.clone(), checkout);

        Ok(CheckoutCreated {
            checkout_id: Some(id),
            lines,
            errors: vec![],
        })
    }

    async fn add_lines(&self, checkout: &CheckoutId, lines: &[LineInput]) -> Result<LinesUpdated> {
        let mut state = self.state.write().await;
        if let Some(errors) = state.enter("checkoutLinesAdd")? {
            return Ok(LinesUpdated {
                errors,
                ..Default::default()
            });
        }
        let Some(mut stored) = state.checkouts.get(checkout).map(|c| c.lines.clone()) else {
            return Ok(LinesUpdated {
                errors: vec![checkout_not_found()],
                ..Default::default()
            });
        };
        if let Err(errors) = state.merge_lines(&mut stored, lines) {
            return Ok(LinesUpdated {
                errors,
                ..Default::default()
            });
        }
        let items = state.line_items(&stored);
        if let Some(c) = state.checkouts.get_mut(checkout) {
            c.lines = stored;
        }
        Ok(LinesUpdated {
            lines: items,
            errors: vec![],
        })
    }

    async fn update_lines(
        &self,
        checkout: &CheckoutId,
        lines: &[LineUpdate],
    ) -> Result<LinesUpdated> {
        let mut state = self.state.write().await;
        if let Some(errors) = state.enter("checkoutLinesUpdate")? {
            return Ok(LinesUpdated {
                errors,
                ..Default::default()
            });
        }
        let Some(mut stored) = state.checkouts.get(checkout).map(|c| c.lines.clone()) else {
            return Ok(LinesUpdated {
                errors: vec![checkout_not_found()],
                ..Default::default()
            });
        };

        for update in lines {
            if update.quantity < 0 {
                return Ok(LinesUpdated {
                    errors: vec![field_error(
                        "quantity",
                        "The quantity should be higher than zero.",
                        "ZERO_QUANTITY",
                    )],
                    ..Default::default()
                });
            }
            let Some(position) = stored.iter().position(|l| l.id == update.line_id) else {
                return Ok(LinesUpdated {
                    errors: vec![field_error("lineId", "Couldn't resolve to a node", "NOT_FOUND")],
                    ..Default::default()
                });
            };
            // A zero quantity deletes the line.
            if update.quantity == 0 {
                stored.remove(position);
                continue;
            }
            let quantity = update.quantity.unsigned_abs();
            if let Err(e) = state.check_stock(&stored[position].variant_id, quantity) {
                return Ok(LinesUpdated {
                    errors: vec![e],
                    ..Default::default()
                });
            }
            stored[position].quantity = quantity;
        }

        let items = state.line_items(&stored);
        if let Some(c) = state.checkouts.get_mut(checkout) {
            c.lines = stored;
        }
        Ok(LinesUpdated {
            lines: items,
            errors: vec![],
        })
    }

    async fn delete_line(&self, checkout: &CheckoutId, line: &LineId) -> Result<MutationAck> {
        let mut state = self.state.write().await;
        if let Some(errors) = state.enter("checkoutLineDelete")? {
            return Ok(MutationAck { errors });
        }
        let Some(stored) = state.checkouts.get_mut(checkout) else {
            return Ok(MutationAck {
                errors: vec![checkout_not_found()],
            });
        };
        let before = stored.lines.len();
        stored.lines.retain(|l| &l.id != line);
        if stored.lines.len() == before {
            return Ok(MutationAck {
                errors: vec![field_error("lineId", "Couldn't resolve to a node", "NOT_FOUND")],
            });
        }
        Ok(MutationAck::default())
    }

    async fn get_checkout(&self, checkout: &CheckoutId) -> Result<Option<CheckoutSnapshot>> {
        let mut state = self.state.write().await;
        state.enter("checkout")?;
        Ok(state
            .checkouts
            .get(checkout)
            .map(|stored| state.snapshot(checkout, stored)))
    }

    async fn set_shipping_address(
        &self,
        checkout: &CheckoutId,
        address: &Address,
    ) -> Result<MutationAck> {
        self.update_address("checkoutShippingAddressUpdate", checkout, address, false)
            .await
    }

    async fn set_billing_address(
        &self,
        checkout: &CheckoutId,
        address: &Address,
    ) -> Result<MutationAck> {
        self.update_address("checkoutBillingAddressUpdate", checkout, address, true)
            .await
    }

    async fn set_shipping_method(
        &self,
        checkout: &CheckoutId,
        method: &ShippingMethodId,
    ) -> Result<MutationAck> {
        let mut state = self.state.write().await;
        if let Some(errors) = state.enter("checkoutShippingMethodUpdate")? {
            return Ok(MutationAck { errors });
        }
        if !state.shipping_methods.iter().any(|m| &m.id == method) {
            return Ok(MutationAck {
                errors: vec![field_error(
                    "shippingMethodId",
                    "Shipping method is not applicable.",
                    "SHIPPING_METHOD_NOT_APPLICABLE",
                )],
            });
        }
        let Some(stored) = state.checkouts.get_mut(checkout) else {
            return Ok(MutationAck {
                errors: vec![checkout_not_found()],
            });
        };
        if stored.shipping_address.is_none() {
            return Ok(MutationAck {
                errors: vec![field_error(
                    "shippingAddress",
                    "Cannot choose a shipping method for a checkout without the shipping address.",
                    "SHIPPING_ADDRESS_NOT_SET",
                )],
            });
        }
        stored.shipping_method = Some(method.clone());
        Ok(MutationAck::default())
    }

    async fn create_payment(
        &self,
        checkout: &CheckoutId,
        payment: &PaymentInput,
    ) -> Result<MutationAck> {
        let mut state = self.state.write().await;
        if let Some(errors) = state.enter("checkoutPaymentCreate")? {
            return Ok(MutationAck { errors });
        }
        let Some(total) = state.checkouts.get(checkout).map(|c| state.total(c)) else {
            return Ok(MutationAck {
                errors: vec![checkout_not_found()],
            });
        };
        if payment.amount != total {
            return Ok(MutationAck {
                errors: vec![field_error(
                    "amount",
                    "Partial payments are not allowed, amount should be equal checkout's total.",
                    "PARTIAL_PAYMENT_NOT_ALLOWED",
                )],
            });
        }
        if let Some(stored) = state.checkouts.get_mut(checkout) {
            stored.payment = Some(payment.clone());
        }
        Ok(MutationAck::default())
    }

    async fn complete_checkout(&self, checkout: &CheckoutId) -> Result<CompletionResult> {
        let mut state = self.state.write().await;
        if let Some(errors) = state.enter("checkoutComplete")? {
            return Ok(CompletionResult {
                errors,
                ..Default::default()
            });
        }
        if state.confirmation_needed {
            return Ok(CompletionResult {
                order: None,
                confirmation_needed: true,
                errors: vec![],
            });
        }
        Ok(match state.place_order(checkout) {
            Ok(order) => CompletionResult {
                order: Some(order),
                confirmation_needed: false,
                errors: vec![],
            },
            Err(e) => CompletionResult {
                errors: vec![e],
                ..Default::default()
            },
        })
    }
}

#[async_trait]
impl CatalogGateway for InMemoryGateway {
    /// Cursors are product ids; an unknown cursor fails the way the
    /// storefront reports a stale one.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        let mut state = self.state.write().await;
        state.enter("products")?;
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut matching: Vec<&ProductDetail> = state
            .products
            .iter()
            .filter(|p| match &needle {
                Some(needle) => p.name.to_lowercase().contains(needle),
                None => true,
            })
            .collect();
        match query.sort {
            ProductSort::Name => matching.sort_by(|a, b| a.name.cmp(&b.name)),
            ProductSort::Price => matching.sort_by_key(|p| {
                p.variants
                    .first()
                    .and_then(|v| v.price.as_ref())
                    .map(|price| price.amount)
            }),
        }

        let start = match &query.after {
            Some(after) => {
                let position = matching
                    .iter()
                    .position(|p| p.id.as_str() == after)
                    .ok_or_else(|| SyncError::Protocol(format!("cursor {after} does not exist")))?;
                position + 1
            }
            None => 0,
        };
        let remaining = &matching[start..];
        let taken = remaining.len().min(query.first as usize);
        let products: Vec<ProductSummary> = remaining[..taken]
            .iter()
            .map(|p| ProductSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                slug: p.slug.clone(),
                default_variant: p.variants.first().map(|v| VariantSummary {
                    id: v.id.clone(),
                    name: v.name.clone(),
                    sku: v.sku.clone(),
                }),
            })
            .collect();
        Ok(ProductPage {
            has_next_page: remaining.len() > taken,
            end_cursor: products.last().map(|p| p.id.to_string()),
            products,
        })
    }

    async fn product_by_slug(&self, slug: &str, _channel: &str) -> Result<Option<ProductDetail>> {
        let mut state = self.state.write().await;
        state.enter("product")?;
        Ok(state.products.iter().find(|p| p.slug == slug).cloned())
    }
}

#[async_trait]
impl AccountGateway for InMemoryGateway {
    async fn create_token(&self, email: &str, password: &str) -> Result<TokenGrant> {
        let mut state = self.state.write().await;
        if let Some(errors) = state.enter("tokenCreate")? {
            return Ok(TokenGrant {
                errors,
                ..Default::default()
            });
        }
        if state.customers.get(email).map(String::as_str) != Some(password) {
            return Ok(TokenGrant {
                errors: vec![field_error(
                    "email",
                    "Please, enter valid credentials",
                    "INVALID_CREDENTIALS",
                )],
                ..Default::default()
            });
        }
        let token = state.next_id("token");
        Ok(TokenGrant {
            token: Some(token),
            email: Some(email.to_string()),
            errors: vec![],
        })
    }
}
