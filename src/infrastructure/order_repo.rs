use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderChanges};
use crate::domain::ports::{CascadeOutcome, EntityRepository};
use crate::schema::orders;

use super::cascade::{delete_cascading, CascadeRoot};
use super::ensure_customer;
use super::models::{NewOrderRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl EntityRepository for DieselOrderRepository {
    type Entity = Order;
    type New = NewOrder;
    type Changes = OrderChanges;

    fn create(&self, new: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;
        let now = Utc::now().naive_utc();

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            ensure_customer(conn, new.customer_id)?;

            let row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    customer_id: new.customer_id,
                    order_date: new.order_date.map_or(now, |d| d.naive_utc()),
                    created_at: now,
                    updated_at: now,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            Ok(row.into())
        })
    }

    fn find(&self, id: i32) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Order::from)
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    fn update(&self, id: i32, changes: OrderChanges) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            let current: Order = orders::table
                .find(id)
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?
                .map(Order::from)
                .ok_or_else(|| DomainError::not_found("Order", id))?;

            let merged = changes.merge(&current);
            ensure_customer(conn, merged.customer_id)?;

            let now = Utc::now().naive_utc();
            let row = diesel::update(orders::table.find(id))
                .set((
                    orders::customer_id.eq(merged.customer_id),
                    orders::order_date.eq(merged.order_date.map_or(now, |d| d.naive_utc())),
                    orders::updated_at.eq(now),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            Ok(row.into())
        })
    }

    fn delete(&self, id: i32) -> Result<CascadeOutcome, DomainError> {
        let mut conn = self.pool.get()?;
        conn.immediate_transaction(|conn| delete_cascading(conn, CascadeRoot::Order(id)))
    }

    fn list(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order(orders::id.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Order::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::{at, customer, item, order, product, store};

    #[test]
    fn order_date_defaults_to_creation_time() {
        let store = store();
        let c = customer(&store, "A", "a@x.com");
        let before = Utc::now();

        let o = store
            .orders()
            .create(NewOrder {
                customer_id: c.id,
                order_date: None,
            })
            .expect("create failed");

        assert!(o.order_date >= before && o.order_date <= Utc::now());
        assert_eq!(o.order_date, o.created_at);
    }

    #[test]
    fn unknown_customer_is_a_validation_error() {
        let store = store();

        let result = store.orders().create(NewOrder {
            customer_id: 77,
            order_date: None,
        });

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(store.orders().list().expect("list failed").is_empty());
    }

    #[test]
    fn update_revalidates_customer_reference() {
        let store = store();
        let c = customer(&store, "A", "a@x.com");
        let o = order(&store, c.id, at(2024, 5, 3, 8, 0, 0));

        let result = store.orders().update(
            o.id,
            OrderChanges {
                customer_id: Some(c.id + 100),
                order_date: None,
            },
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn fractional_seconds_survive_storage() {
        let store = store();
        let c = customer(&store, "A", "a@x.com");
        let date = at(2024, 5, 3, 23, 59, 59) + chrono::Duration::milliseconds(999);

        let o = order(&store, c.id, date);

        assert_eq!(store.orders().find(o.id).expect("find failed").order_date, date);
    }

    #[test]
    fn delete_takes_its_items_along() {
        let store = store();
        let c = customer(&store, "A", "a@x.com");
        let p = product(&store, "Widget", 10.0);
        let o = order(&store, c.id, at(2024, 5, 3, 8, 0, 0));
        item(&store, o.id, p.id, 1);
        item(&store, o.id, p.id, 1);

        let outcome = store.orders().delete(o.id).expect("delete failed");

        assert_eq!(outcome.order_items, 2);
        assert!(store.order_items().list().expect("list failed").is_empty());
        assert_eq!(store.customers().list().expect("list failed").len(), 1);
        assert_eq!(store.products().list().expect("list failed").len(), 1);
    }
}
