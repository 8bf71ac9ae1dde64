//! Orders Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rusty_money::iso::Currency;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};
use tessera::{
    cart::ProductId,
    money::parse_currency,
    orders::{
        Actor, OrderLineItem, OrderNumber, OrderParts, OrderStatus, OrderTotals, PaymentMethod,
        PaymentStatus, ShippingAddress, StatusEvent,
    },
};
use uuid::Uuid;

use crate::{
    database::{count_to_i32, try_get_count, try_get_parsed},
    domain::orders::models::{NewOrder, OrderUuid},
};

const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_FOR_UPDATE_SQL: &str = include_str!("sql/get_order_for_update.sql");
const GET_ORDER_BY_NUMBER_SQL: &str = include_str!("sql/get_order_by_number.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const APPEND_STATUS_EVENT_SQL: &str = include_str!("sql/append_status_event.sql");
const GET_STATUS_EVENTS_SQL: &str = include_str!("sql/get_status_events.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");

/// The `orders` row of a stored order, without its items and history.
#[derive(Debug, Clone)]
pub(crate) struct OrderRow {
    pub(crate) uuid: OrderUuid,
    number: OrderNumber,
    status: OrderStatus,
    customer_email: String,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    currency: &'static Currency,
    totals: OrderTotals,
    coupon_code: Option<String>,
    placed_at: Timestamp,
    pub(crate) updated_at: Timestamp,
}

impl OrderRow {
    pub(crate) fn into_parts(
        self,
        items: Vec<OrderLineItem>,
        history: Vec<StatusEvent>,
    ) -> OrderParts {
        OrderParts {
            number: self.number,
            status: self.status,
            customer_email: self.customer_email,
            shipping_address: self.shipping_address,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            totals: self.totals,
            currency: self.currency,
            coupon_code: self.coupon_code,
            items,
            history,
            placed_at: self.placed_at,
        }
    }
}

struct ItemRow(OrderLineItem);

struct EventRow(StatusEvent);

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRow, sqlx::Error> {
        query_as::<Postgres, OrderRow>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an order row and hold a row lock on it until the transaction ends.
    pub(crate) async fn get_order_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRow, sqlx::Error> {
        query_as::<Postgres, OrderRow>(GET_ORDER_FOR_UPDATE_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        number: &OrderNumber,
    ) -> Result<OrderRow, sqlx::Error> {
        query_as::<Postgres, OrderRow>(GET_ORDER_BY_NUMBER_SQL)
            .bind(number.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Newest first, optionally only orders in `status`.
    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRow>, sqlx::Error> {
        query_as::<Postgres, OrderRow>(LIST_ORDERS_SQL)
            .bind(status.map(OrderStatus::as_str))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderLineItem>, sqlx::Error> {
        let rows = query_as::<Postgres, ItemRow>(GET_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|ItemRow(item)| item).collect())
    }

    /// Status history, oldest first.
    pub(crate) async fn get_status_events(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<StatusEvent>, sqlx::Error> {
        let rows = query_as::<Postgres, EventRow>(GET_STATUS_EVENTS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|EventRow(event)| event).collect())
    }

    /// Insert the order row, its items and its history so far.
    ///
    /// Returns the stored `updated_at`.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new_order: &NewOrder,
    ) -> Result<Timestamp, sqlx::Error> {
        let NewOrder { uuid, order } = new_order;
        let totals = order.totals();

        let (updated_at,): (SqlxTimestamp,) = query_as(CREATE_ORDER_SQL)
            .bind(uuid.into_uuid())
            .bind(order.number().as_str())
            .bind(order.status().as_str())
            .bind(order.customer_email())
            .bind(Json(order.shipping_address()))
            .bind(order.payment_method().as_str())
            .bind(order.payment_status().as_str())
            .bind(order.currency().iso_alpha_code)
            .bind(totals.subtotal)
            .bind(totals.discount)
            .bind(totals.tax)
            .bind(totals.shipping_fee)
            .bind(totals.total)
            .bind(order.coupon_code())
            .bind(SqlxTimestamp::from(order.placed_at()))
            .fetch_one(&mut **tx)
            .await?;

        for (position, item) in order.items().iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|error| sqlx::Error::Encode(Box::new(error)))?;

            query(CREATE_ORDER_ITEM_SQL)
                .bind(uuid.into_uuid())
                .bind(position)
                .bind(item.product_id.as_str())
                .bind(&item.product_name)
                .bind(item.unit_price)
                .bind(count_to_i32(item.quantity, "quantity")?)
                .execute(&mut **tx)
                .await?;
        }

        for event in order.history() {
            self.append_status_event(tx, *uuid, event).await?;
        }

        Ok(updated_at.to_jiff())
    }

    pub(crate) async fn append_status_event(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        event: &StatusEvent,
    ) -> Result<(), sqlx::Error> {
        query(APPEND_STATUS_EVENT_SQL)
            .bind(order.into_uuid())
            .bind(event.status.as_str())
            .bind(event.updated_by.as_str())
            .bind(event.note.as_deref())
            .bind(SqlxTimestamp::from(event.timestamp))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Returns the stored `updated_at`.
    pub(crate) async fn update_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        now: Timestamp,
    ) -> Result<Timestamp, sqlx::Error> {
        let (updated_at,): (SqlxTimestamp,) = query_as(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await?;

        Ok(updated_at.to_jiff())
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let currency_code: String = row.try_get("currency")?;
        let currency = parse_currency(&currency_code).map_err(|error| {
            sqlx::Error::ColumnDecode {
                index: "currency".to_string(),
                source: Box::new(error),
            }
        })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            number: try_get_parsed(row, "order_number")?,
            status: try_get_parsed(row, "status")?,
            customer_email: row.try_get("customer_email")?,
            shipping_address: row
                .try_get::<Json<ShippingAddress>, _>("shipping_address")?
                .0,
            payment_method: try_get_parsed(row, "payment_method")?,
            payment_status: try_get_parsed(row, "payment_status")?,
            currency,
            totals: OrderTotals {
                subtotal: row.try_get("subtotal")?,
                discount: row.try_get("discount")?,
                tax: row.try_get("tax")?,
                shipping_fee: row.try_get("shipping_fee")?,
                total: row.try_get("total")?,
            },
            coupon_code: row.try_get("coupon_code")?,
            placed_at: row.try_get::<SqlxTimestamp, _>("placed_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(OrderLineItem {
            product_id: ProductId::new(row.try_get::<String, _>("product_sku")?),
            product_name: row.try_get("product_name")?,
            unit_price: row.try_get("unit_price")?,
            quantity: try_get_count(row, "quantity")?,
        }))
    }
}

impl<'r> FromRow<'r, PgRow> for EventRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(StatusEvent {
            status: try_get_parsed(row, "status")?,
            timestamp: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_by: Actor::new(row.try_get::<String, _>("updated_by")?),
            note: row.try_get("note")?,
        }))
    }
}
