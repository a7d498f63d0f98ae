//! Read side: relationship resolution and the snapshot reads behind the reports.
//!
//! Methods that need more than one query run them on one connection inside a
//! single transaction, so a caller never sees a mix of two store states.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    nest_order_details, Order, OrderDetail, OrderItemWithRefs, OrderWithCustomer,
};
use crate::domain::ports::{RelationshipResolver, ReportSource};
use crate::domain::report::{day_bounds, DatedOrderLine, EntityCounts, RevenueLine, SummarySnapshot};
use crate::schema::{customers, order_items, orders, products};

use super::models::{
    CustomerContactRow, CustomerRow, OrderItemRow, OrderRow, ProductRow, ProductSummaryRow,
};

pub struct DieselReader {
    pool: DbPool,
}

impl DieselReader {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Timestamps are stored as text. A bound past year 9999 is written with a
/// leading sign and sorts below every stored date, so such an upper bound is
/// left off the query instead.
fn naive_bounds(from: DateTime<Utc>, to: DateTime<Utc>) -> (NaiveDateTime, Option<NaiveDateTime>) {
    let to = to.naive_utc();
    (from.naive_utc(), (to.year() <= 9999).then_some(to))
}

impl RelationshipResolver for DieselReader {
    fn orders_with_customer(&self) -> Result<Vec<OrderWithCustomer>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(OrderRow, Option<CustomerRow>)> = orders::table
            .left_join(customers::table)
            .select((OrderRow::as_select(), Option::<CustomerRow>::as_select()))
            .order(orders::id.asc())
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(order, customer)| OrderWithCustomer {
                order: order.into(),
                customer: customer.map(Into::into),
            })
            .collect())
    }

    fn order_items_with_order_and_product(&self) -> Result<Vec<OrderItemWithRefs>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(OrderItemRow, Option<OrderRow>, Option<ProductRow>)> = order_items::table
            .left_join(orders::table)
            .left_join(products::table)
            .select((
                OrderItemRow::as_select(),
                Option::<OrderRow>::as_select(),
                Option::<ProductRow>::as_select(),
            ))
            .order(order_items::id.asc())
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(item, order, product)| OrderItemWithRefs {
                item: item.into(),
                order: order.map(Into::into),
                product: product.map(Into::into),
            })
            .collect())
    }

    fn orders_on_date(&self, date: NaiveDate) -> Result<Vec<Order>, DomainError> {
        let (from, to) = day_bounds(date);
        let (from, to) = naive_bounds(from, to);
        let mut conn = self.pool.get()?;

        let mut query = orders::table
            .filter(orders::order_date.ge(from))
            .select(OrderRow::as_select())
            .order(orders::id.asc())
            .into_boxed();
        if let Some(to) = to {
            query = query.filter(orders::order_date.lt(to));
        }
        let rows = query.load(&mut conn)?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    fn order_details_on_date(&self, date: NaiveDate) -> Result<Vec<OrderDetail>, DomainError> {
        let (from, to) = day_bounds(date);
        let (from, to) = naive_bounds(from, to);
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut order_query = orders::table
                .left_join(customers::table)
                .filter(orders::order_date.ge(from))
                .select((OrderRow::as_select(), Option::<CustomerContactRow>::as_select()))
                .order(orders::id.asc())
                .into_boxed();
            if let Some(to) = to {
                order_query = order_query.filter(orders::order_date.lt(to));
            }
            let day_orders: Vec<(OrderRow, Option<CustomerContactRow>)> = order_query.load(conn)?;

            let mut item_query = order_items::table
                .inner_join(orders::table)
                .left_join(products::table)
                .filter(orders::order_date.ge(from))
                .select((OrderItemRow::as_select(), Option::<ProductSummaryRow>::as_select()))
                .order(order_items::id.asc())
                .into_boxed();
            if let Some(to) = to {
                item_query = item_query.filter(orders::order_date.lt(to));
            }
            let items: Vec<(OrderItemRow, Option<ProductSummaryRow>)> = item_query.load(conn)?;

            Ok(nest_order_details(
                day_orders
                    .into_iter()
                    .map(|(order, customer)| (order.into(), customer.map(Into::into)))
                    .collect(),
                items
                    .into_iter()
                    .map(|(item, product)| (item.into(), product.map(Into::into)))
                    .collect(),
            ))
        })
    }
}

impl ReportSource for DieselReader {
    fn summary_snapshot(&self) -> Result<SummarySnapshot, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let counts = EntityCounts {
                customers: customers::table.count().get_result(conn)?,
                products: products::table.count().get_result(conn)?,
                orders: orders::table.count().get_result(conn)?,
                order_items: order_items::table.count().get_result(conn)?,
            };

            let lines: Vec<(i32, Option<f64>)> = order_items::table
                .left_join(products::table)
                .select((order_items::quantity, products::price.nullable()))
                .order(order_items::id.asc())
                .load(conn)?;

            Ok(SummarySnapshot {
                counts,
                lines: lines
                    .into_iter()
                    .map(|(quantity, unit_price)| RevenueLine {
                        quantity,
                        unit_price,
                    })
                    .collect(),
            })
        })
    }

    fn order_lines_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DatedOrderLine>, DomainError> {
        let (from, to) = naive_bounds(from, to);
        let mut conn = self.pool.get()?;

        let mut query = orders::table
            .left_join(order_items::table.left_join(products::table))
            .filter(orders::order_date.ge(from))
            .select((
                orders::id,
                orders::order_date,
                order_items::quantity.nullable(),
                products::price.nullable(),
            ))
            .order((orders::order_date.asc(), orders::id.asc()))
            .into_boxed();
        if let Some(to) = to {
            query = query.filter(orders::order_date.lt(to));
        }
        let rows: Vec<(i32, NaiveDateTime, Option<i32>, Option<f64>)> = query.load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(order_id, order_date, quantity, unit_price)| DatedOrderLine {
                order_id,
                order_date: order_date.and_utc(),
                line: quantity.map(|quantity| RevenueLine {
                    quantity,
                    unit_price,
                }),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::ports::EntityRepository;
    use crate::domain::product::ProductChanges;
    use crate::domain::report::YearMonth;
    use crate::infrastructure::testing::{at, customer, item, order, product, store};

    fn may_3() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
    }

    #[test]
    fn orders_carry_their_customer() {
        let store = store();
        let a = customer(&store, "A", "a@x.com");
        let b = customer(&store, "B", "b@x.com");
        order(&store, b.id, at(2024, 5, 3, 8, 0, 0));
        order(&store, a.id, at(2024, 5, 3, 9, 0, 0));

        let resolved = store.reader().orders_with_customer().expect("resolve failed");

        let names: Vec<&str> = resolved
            .iter()
            .map(|o| o.customer.as_ref().map(|c| c.name.as_str()).unwrap_or("-"))
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn items_carry_order_and_product() {
        let store = store();
        let a = customer(&store, "A", "a@x.com");
        let p = product(&store, "Widget", 10.0);
        let o = order(&store, a.id, at(2024, 5, 3, 8, 0, 0));
        item(&store, o.id, p.id, 3);

        let resolved = store
            .reader()
            .order_items_with_order_and_product()
            .expect("resolve failed");

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].order.as_ref().map(|o| o.id), Some(o.id));
        assert_eq!(resolved[0].product.as_ref().map(|p| p.price), Some(10.0));
    }

    #[test]
    fn day_match_ignores_time_of_day_and_fractional_seconds() {
        let store = store();
        let a = customer(&store, "A", "a@x.com");
        let midnight = order(&store, a.id, at(2024, 5, 3, 0, 0, 0));
        let last_instant = order(
            &store,
            a.id,
            at(2024, 5, 3, 23, 59, 59) + Duration::microseconds(999_999),
        );
        let fractional = order(&store, a.id, at(2024, 5, 3, 12, 30, 0) + Duration::milliseconds(250));
        order(&store, a.id, at(2024, 5, 2, 23, 59, 59) + Duration::milliseconds(999));
        order(&store, a.id, at(2024, 5, 4, 0, 0, 0));

        let found = store.reader().orders_on_date(may_3()).expect("query failed");

        let ids: Vec<i32> = found.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![midnight.id, last_instant.id, fractional.id]);
    }

    #[test]
    fn details_nest_customer_items_and_products() {
        let store = store();
        let a = customer(&store, "A", "a@x.com");
        let p = product(&store, "Widget", 10.0);
        let with_items = order(&store, a.id, at(2024, 5, 3, 8, 0, 0));
        let empty = order(&store, a.id, at(2024, 5, 3, 9, 0, 0));
        order(&store, a.id, at(2024, 5, 4, 9, 0, 0));
        item(&store, with_items.id, p.id, 3);
        item(&store, with_items.id, p.id, 1);

        let details = store.reader().order_details_on_date(may_3()).expect("query failed");

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].order.id, with_items.id);
        assert_eq!(details[0].customer.as_ref().map(|c| c.email.as_str()), Some("a@x.com"));
        assert_eq!(details[0].items.len(), 2);
        assert_eq!(
            details[0].items[0].product.as_ref().map(|p| p.name.as_str()),
            Some("Widget")
        );
        assert_eq!(details[1].order.id, empty.id);
        assert!(details[1].items.is_empty());
    }

    #[test]
    fn summary_snapshot_reads_current_prices() {
        let store = store();
        let a = customer(&store, "A", "a@x.com");
        let p = product(&store, "Widget", 10.0);
        let o = order(&store, a.id, at(2024, 5, 3, 8, 0, 0));
        item(&store, o.id, p.id, 3);
        store
            .products()
            .update(
                p.id,
                ProductChanges {
                    name: None,
                    price: Some(2.0),
                },
            )
            .expect("update failed");

        let snapshot = store.reader().summary_snapshot().expect("snapshot failed");

        assert_eq!(
            snapshot.counts,
            EntityCounts {
                customers: 1,
                products: 1,
                orders: 1,
                order_items: 1,
            }
        );
        assert_eq!(
            snapshot.lines,
            vec![RevenueLine {
                quantity: 3,
                unit_price: Some(2.0),
            }]
        );
    }

    #[test]
    fn dated_lines_include_orders_without_items() {
        let store = store();
        let a = customer(&store, "A", "a@x.com");
        let p = product(&store, "Widget", 10.0);
        let o1 = order(&store, a.id, at(2024, 5, 3, 8, 0, 0));
        let o2 = order(&store, a.id, at(2024, 5, 7, 8, 0, 0));
        order(&store, a.id, at(2024, 6, 1, 0, 0, 0));
        item(&store, o1.id, p.id, 2);

        let lines = store
            .reader()
            .order_lines_between(at(2024, 5, 1, 0, 0, 0), at(2024, 6, 1, 0, 0, 0))
            .expect("query failed");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].order_id, o1.id);
        assert_eq!(
            lines[0].line,
            Some(RevenueLine {
                quantity: 2,
                unit_price: Some(10.0),
            })
        );
        assert_eq!(lines[1].order_id, o2.id);
        assert_eq!(lines[1].line, None);
    }

    #[test]
    fn last_supported_month_and_day_still_match() {
        let store = store();
        let a = customer(&store, "A", "a@x.com");
        let p = product(&store, "Widget", 4.0);
        let late = order(&store, a.id, at(9999, 12, 31, 10, 0, 0));
        order(&store, a.id, at(2024, 12, 31, 10, 0, 0));
        item(&store, late.id, p.id, 2);
        let last_day = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();

        let (from, to) = YearMonth::new(9999, 12).unwrap().bounds();
        let lines = store.reader().order_lines_between(from, to).expect("query failed");
        let on_day = store.reader().orders_on_date(last_day).expect("query failed");
        let details = store.reader().order_details_on_date(last_day).expect("query failed");

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].order_id, late.id);
        assert_eq!(on_day.iter().map(|o| o.id).collect::<Vec<_>>(), vec![late.id]);
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].items.len(), 1);
    }
}
