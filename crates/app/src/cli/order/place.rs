use std::io::Write;

use clap::Args;
use rustc_hash::FxHashMap;
use tessera::{
    cart::{CartLine, ProductId},
    orders::{PaymentMethod, ShippingAddress},
};
use tessera_app::{
    config::{DatabaseConfig, PricingSettings},
    context::AppContext,
    domain::{
        checkout::{CheckoutService, models::CheckoutRequest},
        products::ProductsService,
    },
};

#[derive(Debug, Args)]
pub(crate) struct PlaceOrderArgs {
    /// Customer contact e-mail
    #[arg(long)]
    email: String,

    /// Cart line as SKU=QUANTITY; repeat for more lines
    #[arg(long = "line", value_parser = parse_line, required = true)]
    lines: Vec<LineArg>,

    /// Coupon code entered by the customer
    #[arg(long)]
    coupon: Option<String>,

    /// Payment method (card, cash_on_delivery, bank_transfer)
    #[arg(long, default_value = "card")]
    payment: PaymentMethod,

    #[command(flatten)]
    address: AddressArgs,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    pricing: PricingSettings,
}

#[derive(Debug, Args)]
struct AddressArgs {
    /// Recipient name
    #[arg(long)]
    full_name: String,

    /// Street and number
    #[arg(long)]
    line1: String,

    /// Flat, floor, etc.
    #[arg(long)]
    line2: Option<String>,

    #[arg(long)]
    city: String,

    #[arg(long)]
    postal_code: String,

    /// ISO 3166 alpha-2 country code
    #[arg(long, default_value = "PL")]
    country: String,

    /// Contact phone for the courier
    #[arg(long)]
    phone: Option<String>,
}

impl From<AddressArgs> for ShippingAddress {
    fn from(args: AddressArgs) -> Self {
        Self {
            full_name: args.full_name,
            line1: args.line1,
            line2: args.line2,
            city: args.city,
            postal_code: args.postal_code,
            country: args.country.to_ascii_uppercase(),
            phone: args.phone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LineArg {
    sku: ProductId,
    quantity: u32,
}

fn parse_line(raw: &str) -> Result<LineArg, String> {
    let (sku, quantity) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SKU=QUANTITY, got {raw}"))?;

    let sku = sku.trim();

    if sku.is_empty() {
        return Err(format!("missing SKU in {raw}"));
    }

    let quantity = quantity
        .trim()
        .parse()
        .map_err(|error| format!("invalid quantity in {raw}: {error}"))?;

    Ok(LineArg {
        sku: ProductId::new(sku),
        quantity,
    })
}

pub(crate) async fn run(args: PlaceOrderArgs, out: &mut impl Write) -> Result<(), String> {
    let pricing = args
        .pricing
        .to_pricing_config()
        .map_err(|error| format!("invalid pricing settings: {error}"))?;

    let ctx = AppContext::from_database_url(&args.database.database_url, pricing)
        .await
        .map_err(|error| format!("failed to initialise services: {error}"))?;

    execute(ctx.products.as_ref(), ctx.checkout.as_ref(), args, out).await
}

async fn execute(
    products: &dyn ProductsService,
    checkout: &dyn CheckoutService,
    args: PlaceOrderArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let skus: Vec<ProductId> = args.lines.iter().map(|line| line.sku.clone()).collect();

    let prices: FxHashMap<ProductId, _> = products
        .get_products_by_sku(&skus)
        .await
        .map_err(|error| format!("failed to load products: {error}"))?
        .into_iter()
        .map(|product| (product.sku, product.price))
        .collect();

    let lines = args
        .lines
        .iter()
        .map(|line| {
            prices
                .get(&line.sku)
                .map(|price| CartLine::new(line.sku.clone(), *price, line.quantity))
                .ok_or_else(|| format!("unknown product {}", line.sku))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let outcome = checkout
        .checkout(CheckoutRequest {
            customer_email: args.email,
            shipping_address: args.address.into(),
            payment_method: args.payment,
            lines,
            coupon_code: args.coupon,
        })
        .await
        .map_err(|error| format!("checkout failed: {error}"))?;

    if let Some(rejection) = &outcome.coupon_rejection {
        crate::cli::write_line(out, format!("coupon not applied: {rejection}"))?;
    }

    super::write_order(&outcome.order, out)
}
