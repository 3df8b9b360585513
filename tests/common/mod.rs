#![allow(dead_code)]

use cartsync::application::CartSync;
use cartsync::config::StorefrontSettings;
use cartsync::domain::address::Address;
use cartsync::domain::catalog::{ProductDetail, ProductVariant};
use cartsync::domain::checkout::{ProductId, ShippingMethod, ShippingMethodId, VariantId};
use cartsync::domain::money::Money;
use cartsync::infrastructure::in_memory::{InMemoryGateway, InMemorySessionStore};
use rust_decimal_macros::dec;
use std::sync::Arc;

pub const KURTA: &str = "kurta-m";
pub const SCARF: &str = "scarf-silk";
pub const GIFT_CARD: &str = "gift-card";

/// A gateway stocked with a priced kurta (500 INR), a priced scarf
/// (249.50 INR), an unpriced gift card and one shipping method.
pub async fn stocked_gateway() -> InMemoryGateway {
    let gateway = InMemoryGateway::new("INR");
    gateway
        .add_product(product("p-kurta", "Cotton Kurta", KURTA, Some(dec!(500))))
        .await;
    gateway
        .add_product(product("p-scarf", "Silk Scarf", SCARF, Some(dec!(249.50))))
        .await;
    gateway
        .add_product(product("p-gift", "Gift Card", GIFT_CARD, None))
        .await;
    gateway
        .add_shipping_method(ShippingMethod {
            id: ShippingMethodId::new("standard"),
            name: "Standard".into(),
            price: Some(Money::new(dec!(99), "INR")),
        })
        .await;
    gateway
}

pub fn product(
    id: &str,
    name: &str,
    variant: &str,
    price: Option<rust_decimal::Decimal>,
) -> ProductDetail {
    ProductDetail {
        id: ProductId::new(id),
        name: name.into(),
        slug: name.to_lowercase().replace(' ', "-"),
        category: None,
        available_for_purchase: true,
        variants: vec![ProductVariant {
            id: VariantId::new(variant),
            name: "Default".into(),
            sku: None,
            price: price.map(|p| Money::new(p, "INR")),
        }],
    }
}

pub fn cart(gateway: &InMemoryGateway, store: &InMemorySessionStore) -> CartSync {
    CartSync::new(
        Arc::new(gateway.clone()),
        Arc::new(store.clone()),
        StorefrontSettings::default(),
    )
}

pub fn address() -> Address {
    Address {
        first_name: "Asha".into(),
        last_name: "Rao".into(),
        street_address: "12 MG Road".into(),
        city: "Bengaluru".into(),
        country_area: "Karnataka".into(),
        postal_code: "560001".into(),
        country_code: "IN".into(),
    }
}
