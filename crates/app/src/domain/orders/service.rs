//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tessera::orders::{Actor, Order, OrderNumber, OrderStatus};
use tracing::{info, instrument, warn};

use crate::{
    database::{Db, storage_now},
    domain::orders::{
        errors::OrdersServiceError,
        models::{NewOrder, OrderRecord, OrderUuid},
        repository::{OrderRow, PgOrdersRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }

    async fn load(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        row: OrderRow,
    ) -> Result<OrderRecord, OrdersServiceError> {
        load_order(&self.repository, tx, row).await
    }
}

/// Attach items and history to an order row and check the result is consistent.
pub(crate) async fn load_order(
    repository: &PgOrdersRepository,
    tx: &mut Transaction<'_, Postgres>,
    row: OrderRow,
) -> Result<OrderRecord, OrdersServiceError> {
    let items = repository.get_order_items(tx, row.uuid).await?;
    let history = repository.get_status_events(tx, row.uuid).await?;

    let uuid = row.uuid;
    let updated_at = row.updated_at;
    let order = Order::from_parts(row.into_parts(items, history))?;

    Ok(OrderRecord {
        uuid,
        order,
        updated_at,
    })
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let row = self.repository.get_order(&mut tx, order).await?;
        let record = self.load(&mut tx, row).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn get_order_by_number(
        &self,
        number: &OrderNumber,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let row = self.repository.get_order_by_number(&mut tx, number).await?;
        let record = self.load(&mut tx, row).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows = self.repository.list_orders(&mut tx, status).await?;
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            records.push(self.load(&mut tx, row).await?);
        }

        tx.commit().await?;

        Ok(records)
    }

    #[instrument(skip(self, order), fields(uuid = %order.uuid, number = %order.order.number()))]
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated_at = self.repository.create_order(&mut tx, &order).await?;

        tx.commit().await?;

        info!(total = %order.order.totals().total, "order created");

        Ok(OrderRecord {
            uuid: order.uuid,
            order: order.order,
            updated_at,
        })
    }

    #[instrument(skip(self, actor, note), fields(updated_by = %actor))]
    async fn transition_order(
        &self,
        order: OrderUuid,
        status: OrderStatus,
        actor: Actor,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let row = self.repository.get_order_for_update(&mut tx, order).await?;
        let mut record = self.load(&mut tx, row).await?;
        let now = storage_now();

        let event = record
            .order
            .apply_transition(status, actor, note, now)
            .inspect_err(|error| warn!(%error, "order transition refused"))?;

        record.updated_at = self
            .repository
            .update_order_status(&mut tx, order, status, now)
            .await?;

        self.repository
            .append_status_event(&mut tx, order, &event)
            .await?;

        tx.commit().await?;

        info!("order status changed");

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Retrieve a single order with its items and status history.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve an order by the reference shown to the customer.
    async fn get_order_by_number(
        &self,
        number: &OrderNumber,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve orders, newest first, optionally only those in `status`.
    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Stores a newly placed order with its items and initial history.
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError>;

    /// Moves an order to `status` and records who did it.
    ///
    /// The order row is locked for the duration, so concurrent staff actions on the same
    /// order are applied one after the other against the latest status.
    async fn transition_order(
        &self,
        order: OrderUuid,
        status: OrderStatus,
        actor: Actor,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
