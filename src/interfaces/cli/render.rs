//! Text rendering of command results.

use crate::application::{CartState, OrderConfirmation};
use crate::domain::catalog::{ProductDetail, ProductPage};
use crate::domain::checkout::{CheckoutSnapshot, LineItem};
use crate::domain::money::Money;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

fn price(money: Option<&Money>) -> String {
    money.map_or_else(|| "-".to_string(), Money::to_string)
}

fn line_total(line: &LineItem) -> String {
    match &line.variant.unit_price {
        Some(unit) => Money::new(line.line_total(), unit.currency.clone()).to_string(),
        None => "-".to_string(),
    }
}

pub fn cart(state: &CartState) -> String {
    if state.items.is_empty() {
        return "cart is empty".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["Line", "Product", "Variant", "Qty", "Unit price", "Total"]);
    for line in &state.items {
        builder.push_record([
            line.id.to_string(),
            line.variant.product_name.clone(),
            line.variant.name.clone(),
            line.quantity.to_string(),
            price(line.variant.unit_price.as_ref()),
            line_total(line),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..6), Alignment::right());

    let aggregate = &state.aggregate;
    let total = match &aggregate.currency {
        Some(currency) => Money::new(aggregate.total_amount, currency.clone()).to_string(),
        None => format!("{:.2}", aggregate.total_amount),
    };
    let checkout = state
        .checkout_id
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);
    format!("{table}\nitems: {}  total: {total}  checkout: {checkout}", aggregate.item_count)
}

/// Gateway-side totals and delivery options shown under the cart.
pub fn checkout_summary(snapshot: &CheckoutSnapshot) -> String {
    let mut out = format!(
        "subtotal: {}  shipping: {}  total: {}",
        price(snapshot.subtotal.as_ref()),
        price(snapshot.shipping_price.as_ref()),
        price(snapshot.total.as_ref()),
    );
    if let Some(address) = &snapshot.shipping_address {
        out.push_str(&format!(
            "\nship to: {}, {}, {} {}",
            address.full_name(),
            address.street_address,
            address.city,
            address.postal_code
        ));
    }
    if !snapshot.shipping_methods.is_empty() {
        out.push_str("\nshipping methods:");
        for method in &snapshot.shipping_methods {
            out.push_str(&format!(
                "\n  {}  {}  {}",
                method.id,
                method.name,
                price(method.price.as_ref())
            ));
        }
    }
    out
}

/// Product table, followed by the cursor to pass as `--after` when more remain.
pub fn products(page: &ProductPage) -> String {
    if page.products.is_empty() {
        return "no products found".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(["Slug", "Name", "Default variant", "SKU"]);
    for product in &page.products {
        let variant = product.default_variant.as_ref();
        builder.push_record([
            product.slug.clone(),
            product.name.clone(),
            variant.map_or_else(|| "-".to_string(), |v| v.id.to_string()),
            variant
                .and_then(|v| v.sku.clone())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    match (&page.end_cursor, page.has_next_page) {
        (Some(cursor), true) => format!("{table}\nmore: --after {cursor}"),
        _ => table.to_string(),
    }
}

pub fn product(product: &ProductDetail) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Variant", "Name", "SKU", "Price"]);
    for variant in &product.variants {
        builder.push_record([
            variant.id.to_string(),
            variant.name.clone(),
            variant.sku.clone().unwrap_or_else(|| "-".to_string()),
            price(variant.price.as_ref()),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::last(), Alignment::right());

    let availability = if product.available_for_purchase {
        "available"
    } else {
        "not available for purchase"
    };
    format!(
        "{} ({})\ncategory: {}  {availability}\n{table}",
        product.name,
        product.slug,
        product.category.as_deref().unwrap_or("-"),
    )
}

pub fn order(confirmation: &OrderConfirmation) -> String {
    format!(
        "order #{} placed ({}); charged {}",
        confirmation.order_number, confirmation.status, confirmation.amount_charged
    )
}
