use super::ids::{ProductId, VariantId};
use super::money::Money;

/// Field a product listing is ordered by. Listings are always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Name,
    Price,
}

impl ProductSort {
    /// `ProductOrderField` value understood by the storefront API.
    pub fn as_field(&self) -> &'static str {
        match self {
            ProductSort::Name => "NAME",
            ProductSort::Price => "PRICE",
        }
    }
}

/// Filters, ordering and position for one page of a product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub first: u32,
    pub channel: String,
    pub search: Option<String>,
    pub sort: ProductSort,
    /// Opaque cursor from a previous page's `end_cursor`.
    pub after: Option<String>,
}

impl ProductQuery {
    pub fn new(channel: impl Into<String>, first: u32) -> Self {
        Self {
            first,
            channel: channel.into(),
            search: None,
            sort: ProductSort::default(),
            after: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPage {
    pub products: Vec<ProductSummary>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSummary {
    pub id: VariantId,
    pub name: String,
    pub sku: Option<String>,
}

/// One entry of a product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub default_variant: Option<VariantSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductVariant {
    pub id: VariantId,
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub available_for_purchase: bool,
    pub variants: Vec<ProductVariant>,
}
