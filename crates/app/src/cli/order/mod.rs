use std::io::Write;

use clap::{Args, Subcommand};
use tessera::orders::{Order, OrderLineItem, StatusEvent};
use tessera_app::domain::orders::models::OrderRecord;

mod list;
mod place;
mod show;
mod transition;

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    /// Show an order with its items and status history
    Show(show::ShowOrderArgs),
    /// List orders, newest first
    List(list::ListOrdersArgs),
    /// Move an order to a new status
    Transition(transition::TransitionOrderArgs),
    /// Place an order at current catalog prices
    Place(place::PlaceOrderArgs),
}

pub(crate) async fn run(command: OrderCommand, out: &mut impl Write) -> Result<(), String> {
    match command.command {
        OrderSubcommand::Show(args) => show::run(args, out).await,
        OrderSubcommand::List(args) => list::run(args, out).await,
        OrderSubcommand::Transition(args) => transition::run(args, out).await,
        OrderSubcommand::Place(args) => place::run(args, out).await,
    }
}

fn write_order(record: &OrderRecord, out: &mut impl Write) -> Result<(), String> {
    let order = &record.order;
    let totals = order.totals();
    let address = order.shipping_address();
    let money = |amount| super::money(amount, order.currency());

    let next = order
        .valid_next_statuses()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    for line in [
        format!("order_number: {}", order.number()),
        format!("order_uuid: {}", record.uuid),
        format!("status: {}", order.status()),
        format!(
            "next_statuses: {}",
            if next.is_empty() {
                "none".to_string()
            } else {
                next.join(", ")
            }
        ),
        format!(
            "payment: {} ({})",
            order.payment_method(),
            order.payment_status()
        ),
        format!("customer: {}", order.customer_email()),
        format!(
            "ship_to: {}, {}{}, {} {}, {}",
            address.full_name,
            address.line1,
            address
                .line2
                .as_deref()
                .map_or_else(String::new, |line2| format!(" {line2}")),
            address.postal_code,
            address.city,
            address.country
        ),
        format!("placed_at: {}", order.placed_at()),
        format!("coupon: {}", order.coupon_code().unwrap_or("none")),
    ] {
        super::write_line(out, line)?;
    }

    super::write_line(out, items_table(order))?;

    for (label, amount) in [
        ("subtotal", totals.subtotal),
        ("discount", totals.discount),
        ("tax", totals.tax),
        ("shipping", totals.shipping_fee),
        ("total", totals.total),
    ] {
        super::write_line(out, format!("{label}: {}", money(amount)))?;
    }

    super::write_line(out, history_table(order.history().iter()))
}

fn items_table(order: &Order) -> tabled::Table {
    let currency = order.currency();

    super::table(
        &["SKU", "Product", "Unit price", "Qty", "Line total"],
        order.items().iter().map(|item: &OrderLineItem| {
            [
                item.product_id.to_string(),
                item.product_name.clone(),
                super::money(item.unit_price, currency),
                item.quantity.to_string(),
                item.line_total()
                    .map_or_else(String::new, |total| super::money(total, currency)),
            ]
        }),
        &[2, 3, 4],
    )
}

fn history_table<'a>(events: impl Iterator<Item = &'a StatusEvent>) -> tabled::Table {
    super::table(
        &["Status", "When", "By", "Note"],
        events.map(|event| {
            [
                event.status.to_string(),
                event.timestamp.to_string(),
                event.updated_by.to_string(),
                event.note.clone().unwrap_or_default(),
            ]
        }),
        &[],
    )
}
