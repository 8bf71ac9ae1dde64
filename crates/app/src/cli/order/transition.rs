use std::io::Write;

use clap::Args;
use tessera::orders::{Actor, OrderNumber, OrderStatus};
use tessera_app::{
    config::DatabaseConfig,
    domain::orders::{OrdersService, PgOrdersService},
};

#[derive(Debug, Args)]
pub(crate) struct TransitionOrderArgs {
    /// Order number, e.g. TS-20261018-4F2A9C
    number: OrderNumber,

    /// Status to move the order to
    status: OrderStatus,

    /// Staff member making the change
    #[arg(long, env = "TESSERA_ACTOR")]
    actor: String,

    /// Note recorded with the change
    #[arg(long)]
    note: Option<String>,

    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: TransitionOrderArgs, out: &mut impl Write) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;
    let orders = PgOrdersService::new(db);

    execute(&orders, args, out).await
}

async fn execute(
    orders: &dyn OrdersService,
    args: TransitionOrderArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    if args.actor.trim().is_empty() {
        return Err("actor cannot be empty".to_string());
    }

    let record = orders
        .get_order_by_number(&args.number)
        .await
        .map_err(|error| format!("failed to load order {}: {error}", args.number))?;

    let updated = orders
        .transition_order(
            record.uuid,
            args.status,
            Actor::new(args.actor.trim()),
            args.note,
        )
        .await
        .map_err(|error| format!("failed to update order {}: {error}", args.number))?;

    super::write_order(&updated, out)
}

#[cfg(test)]
mod tests {
    use tessera::orders::{InvalidTransition, PaymentMethod};
    use tessera_app::domain::orders::{MockOrdersService, OrdersServiceError};
    use testresult::TestResult;

    use crate::cli::test_helpers::order_record;

    use super::*;

    fn args(number: &OrderNumber, status: OrderStatus, actor: &str) -> TransitionOrderArgs {
        TransitionOrderArgs {
            number: number.clone(),
            status,
            actor: actor.to_string(),
            note: Some("stock checked".to_string()),
            database: DatabaseConfig {
                database_url: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn transitions_by_order_number() -> TestResult {
        let record = order_record(PaymentMethod::Card)?;
        let number = record.order.number().clone();
        let uuid = record.uuid;

        let mut updated = record.clone();

        updated.order.apply_transition(
            OrderStatus::Confirmed,
            Actor::new("staff@tessera.example"),
            Some("stock checked".to_string()),
            record.updated_at,
        )?;

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order_by_number()
            .return_once(move |_| Ok(record));

        orders
            .expect_transition_order()
            .withf(move |order, status, actor, note| {
                *order == uuid
                    && *status == OrderStatus::Confirmed
                    && actor.as_str() == "staff@tessera.example"
                    && note.as_deref() == Some("stock checked")
            })
            .times(1)
            .return_once(move |_, _, _, _| Ok(updated));

        let mut out = Vec::new();

        execute(
            &orders,
            args(&number, OrderStatus::Confirmed, " staff@tessera.example "),
            &mut out,
        )
        .await?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("status: confirmed"), "{output}");
        assert!(output.contains("stock checked"), "{output}");

        Ok(())
    }

    #[tokio::test]
    async fn illegal_transition_is_reported() -> TestResult {
        let record = order_record(PaymentMethod::Card)?;
        let number = record.order.number().clone();

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order_by_number()
            .return_once(move |_| Ok(record));

        orders.expect_transition_order().return_once(|_, _, _, _| {
            Err(OrdersServiceError::InvalidTransition(InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            }))
        });

        let result = execute(
            &orders,
            args(&number, OrderStatus::Shipped, "staff@tessera.example"),
            &mut Vec::new(),
        )
        .await;

        assert!(
            matches!(&result, Err(message) if message.ends_with("cannot move order from pending to shipped")),
            "unexpected result: {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn blank_actor_is_rejected_before_loading() -> TestResult {
        let record = order_record(PaymentMethod::Card)?;
        let orders = MockOrdersService::new();

        let result = execute(
            &orders,
            args(record.order.number(), OrderStatus::Confirmed, "  "),
            &mut Vec::new(),
        )
        .await;

        assert_eq!(result, Err("actor cannot be empty".to_string()));

        Ok(())
    }
}
