use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrderItem, OrderItem, OrderItemChanges};
use crate::domain::ports::{CascadeOutcome, EntityRepository};
use crate::schema::order_items;

use super::cascade::{delete_cascading, CascadeRoot};
use super::models::{NewOrderItemRow, OrderItemRow};
use super::{ensure_order, ensure_product};

pub struct DieselOrderItemRepository {
    pool: DbPool,
}

impl DieselOrderItemRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl EntityRepository for DieselOrderItemRepository {
    type Entity = OrderItem;
    type New = NewOrderItem;
    type Changes = OrderItemChanges;

    fn create(&self, new: NewOrderItem) -> Result<OrderItem, DomainError> {
        new.validate()?;
        let mut conn = self.pool.get()?;
        let now = Utc::now().naive_utc();

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            ensure_order(conn, new.order_id)?;
            ensure_product(conn, new.product_id)?;

            let row = diesel::insert_into(order_items::table)
                .values(&NewOrderItemRow {
                    order_id: new.order_id,
                    product_id: new.product_id,
                    quantity: new.quantity,
                    created_at: now,
                    updated_at: now,
                })
                .returning(OrderItemRow::as_returning())
                .get_result(conn)?;

            Ok(row.into())
        })
    }

    fn find(&self, id: i32) -> Result<OrderItem, DomainError> {
        let mut conn = self.pool.get()?;

        order_items::table
            .find(id)
            .select(OrderItemRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(OrderItem::from)
            .ok_or_else(|| DomainError::not_found("OrderItem", id))
    }

    fn update(&self, id: i32, changes: OrderItemChanges) -> Result<OrderItem, DomainError> {
        let mut conn = self.pool.get()?;

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            let current: OrderItem = order_items::table
                .find(id)
                .select(OrderItemRow::as_select())
                .first(conn)
                .optional()?
                .map(OrderItem::from)
                .ok_or_else(|| DomainError::not_found("OrderItem", id))?;

            let merged = changes.merge(&current)?;
            ensure_order(conn, merged.order_id)?;
            ensure_product(conn, merged.product_id)?;

            let row = diesel::update(order_items::table.find(id))
                .set((
                    order_items::order_id.eq(merged.order_id),
                    order_items::product_id.eq(merged.product_id),
                    order_items::quantity.eq(merged.quantity),
                    order_items::updated_at.eq(Utc::now().naive_utc()),
                ))
                .returning(OrderItemRow::as_returning())
                .get_result(conn)?;

            Ok(row.into())
        })
    }

    fn delete(&self, id: i32) -> Result<CascadeOutcome, DomainError> {
        let mut conn = self.pool.get()?;
        conn.immediate_transaction(|conn| delete_cascading(conn, CascadeRoot::OrderItem(id)))
    }

    fn list(&self) -> Result<Vec<OrderItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = order_items::table
            .select(OrderItemRow::as_select())
            .order(order_items::id.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}
