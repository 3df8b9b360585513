use super::render;
use super::settings::Context;
use crate::domain::catalog::{ProductQuery, ProductSort};
use crate::domain::ports::CatalogGateway;
use crate::error::Result;
use clap::{Args, Subcommand, ValueEnum};

#[derive(Debug, Args)]
pub(crate) struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductsSubcommand {
    /// List products with their default variant
    List {
        /// Maximum number of products
        #[arg(long, default_value_t = 20)]
        first: u32,

        /// Only products whose name matches
        #[arg(long)]
        search: Option<String>,

        /// Ascending order of the listing
        #[arg(long, value_enum, default_value_t = SortField::Name)]
        sort: SortField,

        /// Continue after this cursor, as printed under the previous page
        #[arg(long)]
        after: Option<String>,
    },
    /// Show a product's variants and prices
    Show {
        /// Product slug
        slug: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortField {
    Name,
    Price,
}

impl From<SortField> for ProductSort {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Name => ProductSort::Name,
            SortField::Price => ProductSort::Price,
        }
    }
}

pub(crate) async fn run(command: ProductsCommand, context: &Context) -> Result<()> {
    let channel = context.storefront.channel.clone();
    match command.command {
        ProductsSubcommand::List {
            first,
            search,
            sort,
            after,
        } => {
            let query = ProductQuery {
                search,
                sort: sort.into(),
                after,
                ..ProductQuery::new(channel, first)
            };
            let page = context.gateway.list_products(&query).await?;
            println!("{}", render::products(&page));
        }
        ProductsSubcommand::Show { slug } => {
            match context.gateway.product_by_slug(&slug, &channel).await? {
                Some(product) => println!("{}", render::product(&product)),
                None => println!("no product with slug {slug}"),
            }
        }
    }
    Ok(())
}
