//! Response shapes as the storefront API returns them, and their mapping
//! onto domain types.

use crate::domain::address::Address;
use crate::domain::catalog::{
    ProductDetail, ProductPage, ProductSummary, ProductVariant, VariantSummary,
};
use crate::domain::checkout::{
    CheckoutId, CheckoutSnapshot, FieldError, LineId, LineItem, Order, OrderId, ProductId,
    ShippingMethod, ShippingMethodId, VariantId, VariantSnapshot,
};
use crate::domain::money::Money;
use serde::Deserialize;
use serde_json::Value;

/// Top-level `{data, errors}` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub exception: Option<ErrorException>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorException {
    #[serde(default)]
    pub code: Option<String>,
}

impl GraphQlError {
    fn codes(&self) -> impl Iterator<Item = &str> {
        let ext = self.extensions.as_ref();
        let code = ext.and_then(|e| e.code.as_deref());
        let exception = ext
            .and_then(|e| e.exception.as_ref())
            .and_then(|e| e.code.as_deref());
        code.into_iter().chain(exception)
    }

    /// Missing, invalid or expired credentials.
    pub fn is_unauthenticated(&self) -> bool {
        self.message.to_lowercase().contains("expired")
            || self.codes().any(|c| {
                c == "UNAUTHENTICATED"
                    || c.contains("ExpiredSignature")
                    || c.contains("JSONWebToken")
            })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaxedMoney {
    pub gross: Money,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ProductRef {
    #[serde(default)]
    id: Option<ProductId>,
    name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Pricing {
    #[serde(default)]
    price: Option<TaxedMoney>,
}

#[derive(Debug, Deserialize)]
struct LineVariant {
    id: VariantId,
    name: String,
    product: ProductRef,
    #[serde(default)]
    pricing: Option<Pricing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireLine {
    id: LineId,
    quantity: u32,
    variant: LineVariant,
}

impl From<WireLine> for LineItem {
    fn from(line: WireLine) -> Self {
        let variant = line.variant;
        LineItem {
            id: line.id,
            quantity: line.quantity,
            variant: VariantSnapshot {
                id: variant.id,
                name: variant.name,
                product_id: variant.product.id,
                product_name: variant.product.name,
                product_slug: variant.product.slug,
                thumbnail_url: variant.product.thumbnail.map(|t| t.url),
                unit_price: variant.pricing.and_then(|p| p.price).map(|p| p.gross),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct Country {
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireAddress {
    first_name: String,
    last_name: String,
    street_address1: String,
    city: String,
    #[serde(default)]
    country_area: String,
    postal_code: String,
    country: Country,
}

impl From<WireAddress> for Address {
    fn from(address: WireAddress) -> Self {
        Address {
            first_name: address.first_name,
            last_name: address.last_name,
            street_address: address.street_address1,
            city: address.city,
            country_area: address.country_area,
            postal_code: address.postal_code,
            country_code: address.country.code,
        }
    }
}

/// `AddressInput` variables for the address mutations.
pub(crate) fn address_input(address: &Address) -> Value {
    serde_json::json!({
        "firstName": address.first_name,
        "lastName": address.last_name,
        "streetAddress1": address.street_address,
        "city": address.city,
        "countryArea": address.country_area,
        "postalCode": address.postal_code,
        "country": address.country_code,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireShippingMethod {
    id: ShippingMethodId,
    name: String,
    #[serde(default)]
    price: Option<Money>,
}

impl From<WireShippingMethod> for ShippingMethod {
    fn from(method: WireShippingMethod) -> Self {
        ShippingMethod {
            id: method.id,
            name: method.name,
            price: method.price,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireCheckout {
    pub id: CheckoutId,
    #[serde(default)]
    lines: Vec<WireLine>,
    #[serde(default)]
    total_price: Option<TaxedMoney>,
    #[serde(default)]
    subtotal_price: Option<TaxedMoney>,
    #[serde(default)]
    shipping_price: Option<TaxedMoney>,
    #[serde(default)]
    shipping_address: Option<WireAddress>,
    #[serde(default)]
    billing_address: Option<WireAddress>,
    #[serde(default)]
    available_shipping_methods: Vec<WireShippingMethod>,
}

impl WireCheckout {
    pub fn into_lines(self) -> Vec<LineItem> {
        self.lines.into_iter().map(LineItem::from).collect()
    }
}

impl From<WireCheckout> for CheckoutSnapshot {
    fn from(checkout: WireCheckout) -> Self {
        CheckoutSnapshot {
            id: checkout.id,
            lines: checkout.lines.into_iter().map(LineItem::from).collect(),
            total: checkout.total_price.map(|p| p.gross),
            subtotal: checkout.subtotal_price.map(|p| p.gross),
            shipping_price: checkout.shipping_price.map(|p| p.gross),
            shipping_address: checkout.shipping_address.map(Address::from),
            billing_address: checkout.billing_address.map(Address::from),
            shipping_methods: checkout
                .available_shipping_methods
                .into_iter()
                .map(ShippingMethod::from)
                .collect(),
        }
    }
}

/// Payload shared by every checkout mutation.
#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutPayload {
    #[serde(default)]
    pub checkout: Option<WireCheckout>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireOrder {
    id: OrderId,
    status: String,
    number: String,
    #[serde(default)]
    total: Option<TaxedMoney>,
}

impl From<WireOrder> for Order {
    fn from(order: WireOrder) -> Self {
        Order {
            id: order.id,
            number: order.number,
            status: order.status,
            total: order.total.map(|t| t.gross),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompletePayload {
    #[serde(default)]
    pub order: Option<WireOrder>,
    #[serde(default)]
    pub confirmation_needed: bool,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenPayload {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    user: Option<WireUser>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

impl TokenPayload {
    pub fn email(&self) -> Option<String> {
        self.user.as_ref().map(|u| u.email.clone())
    }
}

#[derive(Debug, Deserialize)]
struct WireVariantSummary {
    id: VariantId,
    name: String,
    #[serde(default)]
    sku: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProductNode {
    id: ProductId,
    name: String,
    slug: String,
    #[serde(default)]
    default_variant: Option<WireVariantSummary>,
}

#[derive(Debug, Deserialize)]
struct ProductEdge {
    node: WireProductNode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductConnection {
    edges: Vec<ProductEdge>,
    #[serde(default)]
    page_info: Option<PageInfo>,
}

impl ProductConnection {
    pub fn into_page(self) -> ProductPage {
        let page_info = self.page_info.unwrap_or_default();
        let products = self
            .edges
            .into_iter()
            .map(|edge| ProductSummary {
                id: edge.node.id,
                name: edge.node.name,
                slug: edge.node.slug,
                default_variant: edge.node.default_variant.map(|v| VariantSummary {
                    id: v.id,
                    name: v.name,
                    sku: v.sku,
                }),
            })
            .collect();
        ProductPage {
            products,
            has_next_page: page_info.has_next_page,
            end_cursor: page_info.end_cursor,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Category {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireProductVariant {
    id: VariantId,
    name: String,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    pricing: Option<Pricing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireProduct {
    id: ProductId,
    name: String,
    slug: String,
    #[serde(default)]
    is_available_for_purchase: Option<bool>,
    #[serde(default)]
    category: Option<Category>,
    #[serde(default)]
    variants: Option<Vec<WireProductVariant>>,
}

impl From<WireProduct> for ProductDetail {
    fn from(product: WireProduct) -> Self {
        ProductDetail {
            id: product.id,
            name: product.name,
            slug: product.slug,
            category: product.category.map(|c| c.name),
            available_for_purchase: product.is_available_for_purchase.unwrap_or(false),
            variants: product
                .variants
                .unwrap_or_default()
                .into_iter()
                .map(|v| ProductVariant {
                    id: v.id,
                    name: v.name,
                    sku: v.sku,
                    price: v.pricing.and_then(|p| p.price).map(|p| p.gross),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn checkout_fixture() -> Value {
        json!({
            "id": "Q2hlY2tvdXQ6MQ==",
            "token": "b6b1",
            "totalPrice": {"gross": {"amount": 1099.0, "currency": "INR"}},
            "subtotalPrice": {"gross": {"amount": 1000.0, "currency": "INR"}},
            "shippingPrice": {"gross": {"amount": 99.0, "currency": "INR"}},
            "lines": [{
                "id": "line-1",
                "quantity": 2,
                "variant": {
                    "id": "kurta-m",
                    "name": "M",
                    "product": {
                        "id": "prod-1",
                        "name": "Cotton Kurta",
                        "slug": "cotton-kurta",
                        "thumbnail": {"url": "https://cdn.example.com/kurta.png"}
                    },
                    "pricing": {"price": {"gross": {"amount": 500.0, "currency": "INR"}}}
                }
            }],
            "shippingAddress": {
                "firstName": "Asha",
                "lastName": "Rao",
                "streetAddress1": "12 MG Road",
                "city": "BENGALURU",
                "countryArea": "KA",
                "postalCode": "560001",
                "country": {"code": "IN"}
            },
            "billingAddress": null,
            "availableShippingMethods": [
                {"id": "standard", "name": "Standard", "price": {"amount": 99.0, "currency": "INR"}}
            ]
        })
    }

    #[test]
    fn test_checkout_maps_to_snapshot() {
        let wire: WireCheckout = serde_json::from_value(checkout_fixture()).unwrap();
        let snapshot = CheckoutSnapshot::from(wire);

        assert_eq!(snapshot.total, Some(Money::new(dec!(1099), "INR")));
        assert_eq!(snapshot.lines.len(), 1);
        let line = &snapshot.lines[0];
        assert_eq!(line.line_total(), dec!(1000));
        assert_eq!(line.variant.product_name, "Cotton Kurta");
        assert_eq!(
            line.variant.thumbnail_url.as_deref(),
            Some("https://cdn.example.com/kurta.png")
        );
        let shipping = snapshot.shipping_address.unwrap();
        assert_eq!(shipping.street_address, "12 MG Road");
        assert_eq!(shipping.country_code, "IN");
        assert!(snapshot.billing_address.is_none());
        assert_eq!(snapshot.shipping_methods[0].id.as_str(), "standard");
    }

    #[test]
    fn test_unpriced_variant_has_no_unit_price() {
        let wire: WireLine = serde_json::from_value(json!({
            "id": "line-9",
            "quantity": 1,
            "variant": {
                "id": "v9",
                "name": "Default",
                "product": {"name": "Gift card"},
                "pricing": null
            }
        }))
        .unwrap();
        let line = LineItem::from(wire);
        assert!(line.variant.unit_price.is_none());
        assert_eq!(line.line_total(), dec!(0));
    }

    #[test]
    fn test_completion_payload_without_order() {
        let payload: CompletePayload = serde_json::from_value(json!({
            "order": null,
            "confirmationNeeded": true,
            "errors": []
        }))
        .unwrap();
        assert!(payload.order.is_none());
        assert!(payload.confirmation_needed);
    }

    #[test]
    fn test_field_errors_deserialize_with_null_field() {
        let payload: CheckoutPayload = serde_json::from_value(json!({
            "checkout": null,
            "errors": [{"field": null, "message": "Checkout is locked", "code": "INVALID"}]
        }))
        .unwrap();
        assert_eq!(payload.errors[0].field, None);
        assert_eq!(payload.errors[0].code.as_deref(), Some("INVALID"));
    }

    #[test]
    fn test_unauthenticated_detection() {
        let expired: GraphQlError = serde_json::from_value(json!({
            "message": "Signature has expired",
            "extensions": {"exception": {"code": "ExpiredSignatureError"}}
        }))
        .unwrap();
        let plain: GraphQlError =
            serde_json::from_value(json!({"message": "Variant not found"})).unwrap();
        let coded: GraphQlError = serde_json::from_value(json!({
            "message": "You need to be authenticated",
            "extensions": {"code": "UNAUTHENTICATED"}
        }))
        .unwrap();

        assert!(expired.is_unauthenticated());
        assert!(coded.is_unauthenticated());
        assert!(!plain.is_unauthenticated());
    }

    #[test]
    fn test_product_connection_maps_default_variant() {
        let connection: ProductConnection = serde_json::from_value(json!({
            "edges": [
                {"node": {"id": "p1", "name": "Cotton Kurta", "slug": "cotton-kurta",
                          "defaultVariant": {"id": "kurta-m", "name": "M", "sku": "KUR-M"}}},
                {"node": {"id": "p2", "name": "Gift card", "slug": "gift-card",
                          "defaultVariant": null}}
            ],
            "pageInfo": {"hasNextPage": true, "endCursor": "YXJyYXljb25uZWN0aW9uOjE="}
        }))
        .unwrap();
        let page = connection.into_page();
        assert!(page.has_next_page);
        assert_eq!(page.end_cursor.as_deref(), Some("YXJyYXljb25uZWN0aW9uOjE="));
        let products = page.products;
        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0].default_variant.as_ref().map(|v| v.id.as_str()),
            Some("kurta-m")
        );
        assert!(products[1].default_variant.is_none());
    }

    #[test]
    fn test_product_connection_without_page_info_is_last_page() {
        let connection: ProductConnection =
            serde_json::from_value(json!({"edges": []})).unwrap();
        let page = connection.into_page();
        assert!(!page.has_next_page);
        assert!(page.end_cursor.is_none());
    }
}
