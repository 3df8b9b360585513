//! GraphQL documents sent to the storefront API.
//!
//! Every document selects its root field under the same name as the
//! operation constant used for logging and error reporting.

macro_rules! money {
    () => {
        "amount currency"
    };
}

macro_rules! line_fields {
    () => {
        concat!(
            "lines { id quantity variant { id name ",
            "product { id name slug thumbnail { url } } ",
            "pricing { price { gross { ",
            money!(),
            " } } } } }"
        )
    };
}

macro_rules! address_fields {
    () => {
        "firstName lastName streetAddress1 city countryArea postalCode country { code }"
    };
}

macro_rules! field_errors {
    () => {
        "errors { field message code }"
    };
}

pub const TOKEN_CREATE: &str = concat!(
    "mutation TokenCreate($email: String!, $password: String!) { ",
    "tokenCreate(email: $email, password: $password) { token user { email } ",
    field_errors!(),
    " } }"
);

pub const CHECKOUT_CREATE: &str = concat!(
    "mutation CheckoutCreate($input: CheckoutCreateInput!) { ",
    "checkoutCreate(input: $input) { checkout { id token ",
    line_fields!(),
    " } ",
    field_errors!(),
    " } }"
);

pub const CHECKOUT_LINES_ADD: &str = concat!(
    "mutation CheckoutLinesAdd($checkoutId: ID!, $lines: [CheckoutLineInput!]!) { ",
    "checkoutLinesAdd(checkoutId: $checkoutId, lines: $lines) { checkout { id ",
    line_fields!(),
    " } ",
    field_errors!(),
    " } }"
);

pub const CHECKOUT_LINES_UPDATE: &str = concat!(
    "mutation CheckoutLinesUpdate($checkoutId: ID!, $lines: [CheckoutLineUpdateInput!]!) { ",
    "checkoutLinesUpdate(checkoutId: $checkoutId, lines: $lines) { checkout { id ",
    line_fields!(),
    " } ",
    field_errors!(),
    " } }"
);

pub const CHECKOUT_LINE_DELETE: &str = concat!(
    "mutation CheckoutLineDelete($checkoutId: ID!, $lineId: ID!) { ",
    "checkoutLineDelete(checkoutId: $checkoutId, lineId: $lineId) { checkout { id } ",
    field_errors!(),
    " } }"
);

pub const CHECKOUT_SHIPPING_ADDRESS_UPDATE: &str = concat!(
    "mutation CheckoutShippingAddressUpdate($checkoutId: ID!, $shippingAddress: AddressInput!) { ",
    "checkoutShippingAddressUpdate(checkoutId: $checkoutId, shippingAddress: $shippingAddress) { ",
    "checkout { id shippingAddress { ",
    address_fields!(),
    " } } ",
    field_errors!(),
    " } }"
);

pub const CHECKOUT_BILLING_ADDRESS_UPDATE: &str = concat!(
    "mutation CheckoutBillingAddressUpdate($checkoutId: ID!, $billingAddress: AddressInput!) { ",
    "checkoutBillingAddressUpdate(checkoutId: $checkoutId, billingAddress: $billingAddress) { ",
    "checkout { id billingAddress { ",
    address_fields!(),
    " } } ",
    field_errors!(),
    " } }"
);

pub const CHECKOUT_SHIPPING_METHOD_UPDATE: &str = concat!(
    "mutation CheckoutShippingMethodUpdate($checkoutId: ID!, $shippingMethodId: ID!) { ",
    "checkoutShippingMethodUpdate(checkoutId: $checkoutId, shippingMethodId: $shippingMethodId) { ",
    "checkout { id shippingMethod { id name price { ",
    money!(),
    " } } } ",
    field_errors!(),
    " } }"
);

pub const CHECKOUT_PAYMENT_CREATE: &str = concat!(
    "mutation CheckoutPaymentCreate($checkoutId: ID!, $input: PaymentInput!) { ",
    "checkoutPaymentCreate(checkoutId: $checkoutId, input: $input) { ",
    "checkout { id totalPrice { gross { ",
    money!(),
    " } } } ",
    field_errors!(),
    " } }"
);

pub const CHECKOUT_COMPLETE: &str = concat!(
    "mutation CheckoutComplete($checkoutId: ID!) { ",
    "checkoutComplete(checkoutId: $checkoutId) { ",
    "order { id status number total { gross { ",
    money!(),
    " } } } confirmationNeeded ",
    field_errors!(),
    " } }"
);

pub const GET_CHECKOUT: &str = concat!(
    "query GetCheckout($id: ID!) { checkout(id: $id) { id token ",
    "totalPrice { gross { ",
    money!(),
    " } } subtotalPrice { gross { ",
    money!(),
    " } } shippingPrice { gross { ",
    money!(),
    " } } ",
    line_fields!(),
    " shippingAddress { ",
    address_fields!(),
    " } billingAddress { ",
    address_fields!(),
    " } availableShippingMethods { id name price { ",
    money!(),
    " } } } }"
);

pub const GET_PRODUCTS: &str = concat!(
    "query GetProducts($first: Int, $after: String, $channel: String, ",
    "$filter: ProductFilterInput, $sortBy: ProductOrder) { ",
    "products(first: $first, after: $after, channel: $channel, ",
    "filter: $filter, sortBy: $sortBy) { ",
    "edges { node { id name slug defaultVariant { id name sku } } } ",
    "pageInfo { hasNextPage endCursor } } }"
);

pub const GET_PRODUCT: &str = concat!(
    "query GetProduct($slug: String, $channel: String) { ",
    "product(slug: $slug, channel: $channel) { id name slug isAvailableForPurchase ",
    "category { name } variants { id name sku pricing { price { gross { ",
    money!(),
    " } } } } } }"
);
