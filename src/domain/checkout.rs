use super::address::Address;
use super::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use super::ids::*;

/// A validation or business failure the gateway attached to a mutation result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl FieldError {
    pub fn new(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            field: field.map(str::to_string),
            message: message.into(),
            code: None,
        }
    }
}

/// Read-only, denormalized view of the variant behind a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSnapshot {
    pub id: VariantId,
    pub name: String,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub product_slug: Option<String>,
    pub thumbnail_url: Option<String>,
    pub unit_price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: LineId,
    pub quantity: u32,
    pub variant: VariantSnapshot,
}

impl LineItem {
    /// Unit gross price times quantity; an unpriced variant counts as zero.
    pub fn line_total(&self) -> Decimal {
        self.variant
            .unit_price
            .as_ref()
            .map(|price| price.times(self.quantity))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Item count and total derived from a list of lines.
///
/// Never patched in place: it is rebuilt from the full list every time the
/// list changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartAggregate {
    pub item_count: u64,
    pub total_amount: Decimal,
    /// Currency of the first priced line; a cart is assumed single-currency.
    pub currency: Option<String>,
}

impl CartAggregate {
    pub fn from_lines(lines: &[LineItem]) -> Self {
        let item_count = lines.iter().map(|l| u64::from(l.quantity)).sum();
        let total_amount = lines.iter().map(LineItem::line_total).sum();
        let currency = lines
            .iter()
            .find_map(|l| l.variant.unit_price.as_ref())
            .map(|p| p.currency.clone());
        Self {
            item_count,
            total_amount,
            currency,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

/// A `{variantId, quantity}` line as sent to create/add mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineInput {
    pub variant_id: VariantId,
    pub quantity: i32,
}

/// A `{lineId, quantity}` update. The quantity is passed through as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineUpdate {
    pub line_id: LineId,
    pub quantity: i32,
}

/// Everything needed to open a new checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDraft {
    pub channel: String,
    pub email: String,
    pub lines: Vec<LineInput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    pub name: String,
    pub price: Option<Money>,
}

/// The authoritative state of a checkout as returned by a fresh read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSnapshot {
    pub id: CheckoutId,
    pub lines: Vec<LineItem>,
    pub total: Option<Money>,
    pub subtotal: Option<Money>,
    pub shipping_price: Option<Money>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub shipping_methods: Vec<ShippingMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInput {
    pub gateway: String,
    pub token: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub status: String,
    pub total: Option<Money>,
}

/// Common shape of every mutation reply: a payload plus a possibly empty
/// list of field errors.
pub trait GatewayReply {
    fn errors(&self) -> &[FieldError];
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckoutCreated {
    pub checkout_id: Option<CheckoutId>,
    pub lines: Vec<LineItem>,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinesUpdated {
    pub lines: Vec<LineItem>,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationAck {
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResult {
    pub order: Option<Order>,
    pub confirmation_needed: bool,
    pub errors: Vec<FieldError>,
}

macro_rules! impl_gateway_reply {
    ($($ty:ty),+) => {
        $(impl GatewayReply for $ty {
            fn errors(&self) -> &[FieldError] {
                &self.errors
            }
        })+
    };
}

impl_gateway_reply!(CheckoutCreated, LinesUpdated, MutationAck, CompletionResult);

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(id: &str, quantity: u32, price: Option<Decimal>) -> LineItem {
        LineItem {
            id: LineId::new(id),
            quantity,
            variant: VariantSnapshot {
                id: VariantId::new(format!("var-{id}")),
                name: "Default".into(),
                product_id: None,
                product_name: "Kurta".into(),
                product_slug: None,
                thumbnail_url: None,
                unit_price: price.map(|p| Money::new(p, "INR")),
            },
        }
    }

    #[test]
    fn test_aggregate_sums_lines() {
        let lines = vec![line("a", 2, Some(dec!(500))), line("b", 1, Some(dec!(250.5)))];
        let aggregate = CartAggregate::from_lines(&lines);
        assert_eq!(aggregate.item_count, 3);
        assert_eq!(aggregate.total_amount, dec!(1250.5));
        assert_eq!(aggregate.currency.as_deref(), Some("INR"));
    }

    #[test]
    fn test_aggregate_unpriced_line_counts_quantity_only() {
        let lines = vec![line("a", 4, None), line("b", 1, Some(dec!(10)))];
        let aggregate = CartAggregate::from_lines(&lines);
        assert_eq!(aggregate.item_count, 5);
        assert_eq!(aggregate.total_amount, dec!(10));
    }

    #[test]
    fn test_empty_aggregate() {
        let aggregate = CartAggregate::from_lines(&[]);
        assert_eq!(aggregate, CartAggregate::default());
        assert!(aggregate.is_empty());
        assert_eq!(aggregate.currency, None);
    }

    #[test]
    fn test_line_input_wire_shape() {
        let input = LineInput {
            variant_id: VariantId::new("v1"),
            quantity: 2,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            serde_json::json!({"variantId": "v1", "quantity": 2})
        );
    }
}
