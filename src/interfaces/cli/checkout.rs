use super::cart;
use super::render;
use super::settings::Context;
use crate::application::{BillingAddress, CheckoutWorkflow, CompletionRequest};
use crate::domain::address::Address;
use crate::domain::checkout::ShippingMethodId;
use crate::error::Result;
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    /// State or region
    #[arg(long)]
    country_area: String,
    #[arg(long)]
    postal_code: String,
    /// ISO 3166-1 alpha-2 country code
    #[arg(long, default_value = "IN")]
    country: String,

    /// Billing first name; any billing flag switches to a separate billing address
    #[arg(long)]
    billing_first_name: Option<String>,
    #[arg(long)]
    billing_last_name: Option<String>,
    #[arg(long)]
    billing_street: Option<String>,
    #[arg(long)]
    billing_city: Option<String>,
    #[arg(long)]
    billing_country_area: Option<String>,
    #[arg(long)]
    billing_postal_code: Option<String>,
    #[arg(long)]
    billing_country: Option<String>,

    /// Shipping method id, as listed by `cart show`
    #[arg(long)]
    shipping_method: Option<String>,
}

impl CheckoutArgs {
    fn shipping(&self) -> Address {
        Address {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            street_address: self.street.clone(),
            city: self.city.clone(),
            country_area: self.country_area.clone(),
            postal_code: self.postal_code.clone(),
            country_code: self.country.clone(),
        }
    }

    fn billing(&self) -> BillingAddress {
        let fields = [
            &self.billing_first_name,
            &self.billing_last_name,
            &self.billing_street,
            &self.billing_city,
            &self.billing_country_area,
            &self.billing_postal_code,
            &self.billing_country,
        ];
        if fields.iter().all(|f| f.is_none()) {
            return BillingAddress::SameAsShipping;
        }
        let value = |f: &Option<String>| f.clone().unwrap_or_default();
        BillingAddress::Separate(Address {
            first_name: value(&self.billing_first_name),
            last_name: value(&self.billing_last_name),
            street_address: value(&self.billing_street),
            city: value(&self.billing_city),
            country_area: value(&self.billing_country_area),
            postal_code: value(&self.billing_postal_code),
            country_code: self
                .billing_country
                .clone()
                .unwrap_or_else(|| self.country.clone()),
        })
    }

    fn request(&self) -> CompletionRequest {
        CompletionRequest {
            shipping: self.shipping(),
            billing: self.billing(),
            shipping_method: self.shipping_method.clone().map(ShippingMethodId::new),
        }
    }
}

pub(crate) async fn run(args: CheckoutArgs, context: &Context) -> Result<()> {
    let mut cart = cart::open(context).await?;
    if cart.checkout_id().is_none() {
        println!("cart is empty; nothing to check out");
        return Ok(());
    }
    cart.load_checkout().await?;
    if cart.items().is_empty() {
        println!("cart is empty; nothing to check out");
        return Ok(());
    }

    let mut workflow = CheckoutWorkflow::new(context.gateway.clone(), context.payment.clone());
    let confirmation = workflow.complete(&mut cart, &args.request()).await?;
    println!("{}", render::order(&confirmation));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CheckoutArgs,
    }

    fn parse(extra: &[&str]) -> CheckoutArgs {
        let mut argv = vec![
            "checkout",
            "--first-name",
            "Asha",
            "--last-name",
            "Rao",
            "--street",
            "12 MG Road",
            "--city",
            "Bengaluru",
            "--country-area",
            "Karnataka",
            "--postal-code",
            "560001",
        ];
        argv.extend_from_slice(extra);
        Harness::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn test_billing_defaults_to_shipping() {
        let request = parse(&[]).request();
        assert_eq!(request.billing, BillingAddress::SameAsShipping);
        assert_eq!(request.shipping.country_code, "IN");
        assert!(request.shipping_method.is_none());
    }

    #[test]
    fn test_any_billing_flag_selects_separate_address() {
        let request =
            parse(&["--billing-city", "Mumbai", "--shipping-method", "standard"]).request();
        match request.billing {
            BillingAddress::Separate(address) => {
                assert_eq!(address.city, "Mumbai");
                assert_eq!(address.country_code, "IN");
                assert!(address.first_name.is_empty());
            }
            BillingAddress::SameAsShipping => panic!("expected a separate billing address"),
        }
        assert_eq!(
            request.shipping_method,
            Some(ShippingMethodId::new("standard"))
        );
    }
}
