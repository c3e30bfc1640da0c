use std::io;

use bakehouse::{
    checkout::validate,
    payments::PaymentMethodId,
    products::ProductId,
    receipt::Receipt,
};
use bakehouse_app::{config::AppConfig, context::AppContext, session::CheckoutSession};
use clap::Args;
use rust_decimal::Decimal;
use tracing::warn;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Product to sell, as `ID` or `ID:QUANTITY`; repeat for more lines
    #[arg(long = "item", value_name = "ID[:QTY]", required = true, value_parser = parse_item)]
    items: Vec<ItemArg>,

    /// Payment as `METHOD_ID:AMOUNT`; repeat to split. Without it the whole
    /// total goes on the first active method
    #[arg(long = "pay", value_name = "METHOD_ID:AMOUNT", value_parser = parse_payment)]
    payments: Vec<PaymentArg>,

    /// Record that a receipt was handed over
    #[arg(long)]
    receipt: bool,

    /// Print the receipt and check the split without recording the sale
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy)]
struct ItemArg {
    product: ProductId,
    quantity: u32,
}

#[derive(Debug, Clone, Copy)]
struct PaymentArg {
    method: PaymentMethodId,
    amount: Decimal,
}

fn parse_item(value: &str) -> Result<ItemArg, String> {
    let (id, quantity) = value.split_once(':').unwrap_or((value, "1"));

    let id = id
        .trim()
        .parse::<u64>()
        .map_err(|error| format!("invalid product id {id:?}: {error}"))?;

    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid quantity {quantity:?}: {error}"))?;

    if quantity == 0 {
        return Err("quantity must be at least 1".to_string());
    }

    Ok(ItemArg {
        product: ProductId::new(id),
        quantity,
    })
}

fn parse_payment(value: &str) -> Result<PaymentArg, String> {
    let (id, amount) = value
        .split_once(':')
        .ok_or_else(|| format!("expected METHOD_ID:AMOUNT, got {value:?}"))?;

    let id = id
        .trim()
        .parse::<u64>()
        .map_err(|error| format!("invalid payment method id {id:?}: {error}"))?;

    let amount = amount
        .trim()
        .parse::<Decimal>()
        .map_err(|error| format!("invalid amount {amount:?}: {error}"))?;

    Ok(PaymentArg {
        method: PaymentMethodId::new(id),
        amount,
    })
}

#[expect(clippy::print_stdout, reason = "Command output to user")]
pub(crate) async fn run(config: &AppConfig, args: CheckoutArgs) -> Result<(), String> {
    let currency = config.api.currency().map_err(|error| error.to_string())?;
    let context = AppContext::from_config(&config.api)
        .map_err(|error| format!("failed to initialise API client: {error}"))?;

    let mut session = CheckoutSession::new(context, currency);

    session
        .refresh_methods()
        .await
        .map_err(|error| format!("failed to load payment methods: {error}"))?;

    for item in args.items {
        add_item(&mut session, item).await?;
    }

    if !args.payments.is_empty() {
        apply_split(&mut session, &args.payments)?;
    }

    Receipt::from_checkout(session.cart(), session.allocations())
        .and_then(|receipt| receipt.write_to(io::stdout().lock()))
        .map_err(|error| format!("failed to print receipt: {error}"))?;

    if args.dry_run {
        validate(session.cart(), session.allocations(), session.active_methods())
            .map_err(|error| error.to_string())?;

        println!("ready to submit");

        return Ok(());
    }

    let sale = session
        .submit(args.receipt)
        .await
        .map_err(|error| error.to_string())?;

    println!("sale #{} recorded", sale.id);

    Ok(())
}

async fn add_item(session: &mut CheckoutSession, item: ItemArg) -> Result<(), String> {
    let added = session
        .add_product(item.product)
        .await
        .map_err(|error| format!("failed to add product {}: {error}", item.product))?;

    let wanted = added.saturating_add(item.quantity.saturating_sub(1));

    if wanted == added {
        return Ok(());
    }

    let quantity = session
        .set_quantity(item.product, wanted)
        .map_err(|error| error.to_string())?;

    if quantity < wanted {
        warn!(product_id = %item.product, wanted, quantity, "quantity limited to stock");
    }

    Ok(())
}

fn apply_split(session: &mut CheckoutSession, payments: &[PaymentArg]) -> Result<(), String> {
    while !session.allocations().is_empty() {
        session
            .remove_allocation(0)
            .map_err(|error| error.to_string())?;
    }

    for payment in payments {
        let index = session
            .add_allocation()
            .map_err(|error| error.to_string())?
            .ok_or_else(|| "no unused active payment method left".to_string())?;

        session
            .update_method(index, payment.method)
            .map_err(|error| format!("payment method {}: {error}", payment.method))?;

        session
            .update_amount(index, payment.amount)
            .map_err(|error| format!("payment method {}: {error}", payment.method))?;
    }

    Ok(())
}
