//! Explicit cascade deletion.
//!
//! Foreign keys in the schema carry no `ON DELETE` action. Deleting a record
//! first collects the transitive closure of its dependents by following the
//! foreign-key edges
//!
//! ```text
//! customers ─┐
//!            └─< orders ─┐
//!                        └─< order_items >─┐
//!                                          └─ products
//! ```
//!
//! and then removes them bottom-up (items, orders, root). The caller owns the
//! transaction, so either the whole closure goes or nothing does.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::errors::DomainError;
use crate::domain::ports::CascadeOutcome;
use crate::schema::{customers, order_items, orders, products};

/// Bound parameters per `IN (...)` list.
const ID_CHUNK: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeRoot {
    Customer(i32),
    Product(i32),
    Order(i32),
    OrderItem(i32),
}

impl CascadeRoot {
    fn entity(&self) -> &'static str {
        match self {
            CascadeRoot::Customer(_) => "Customer",
            CascadeRoot::Product(_) => "Product",
            CascadeRoot::Order(_) => "Order",
            CascadeRoot::OrderItem(_) => "OrderItem",
        }
    }

    fn id(&self) -> i32 {
        match *self {
            CascadeRoot::Customer(id)
            | CascadeRoot::Product(id)
            | CascadeRoot::Order(id)
            | CascadeRoot::OrderItem(id) => id,
        }
    }
}

/// Records that must go when the root goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependents {
    pub order_ids: Vec<i32>,
    pub order_item_ids: Vec<i32>,
}

pub fn collect_dependents(
    conn: &mut SqliteConnection,
    root: CascadeRoot,
) -> Result<Dependents, DomainError> {
    let deps = match root {
        CascadeRoot::Customer(id) => {
            let order_ids: Vec<i32> = orders::table
                .filter(orders::customer_id.eq(id))
                .select(orders::id)
                .order(orders::id)
                .load(conn)?;
            let order_item_ids = items_of_orders(conn, &order_ids)?;
            Dependents {
                order_ids,
                order_item_ids,
            }
        }
        CascadeRoot::Order(id) => Dependents {
            order_ids: vec![],
            order_item_ids: items_of_orders(conn, &[id])?,
        },
        CascadeRoot::Product(id) => Dependents {
            order_ids: vec![],
            order_item_ids: order_items::table
                .filter(order_items::product_id.eq(id))
                .select(order_items::id)
                .order(order_items::id)
                .load(conn)?,
        },
        CascadeRoot::OrderItem(_) => Dependents::default(),
    };
    Ok(deps)
}

fn items_of_orders(conn: &mut SqliteConnection, order_ids: &[i32]) -> Result<Vec<i32>, DomainError> {
    let mut ids = Vec::new();
    for chunk in order_ids.chunks(ID_CHUNK) {
        let found: Vec<i32> = order_items::table
            .filter(order_items::order_id.eq_any(chunk))
            .select(order_items::id)
            .order(order_items::id)
            .load(conn)?;
        ids.extend(found);
    }
    Ok(ids)
}

/// Deletes `root` together with its dependents. Must be called inside a
/// transaction; a missing root yields `NotFound` and the caller rolls back.
pub fn delete_cascading(
    conn: &mut SqliteConnection,
    root: CascadeRoot,
) -> Result<CascadeOutcome, DomainError> {
    let deps = collect_dependents(conn, root)?;

    let mut outcome = CascadeOutcome::default();
    for chunk in deps.order_item_ids.chunks(ID_CHUNK) {
        outcome.order_items +=
            diesel::delete(order_items::table.filter(order_items::id.eq_any(chunk))).execute(conn)?;
    }
    for chunk in deps.order_ids.chunks(ID_CHUNK) {
        outcome.orders +=
            diesel::delete(orders::table.filter(orders::id.eq_any(chunk))).execute(conn)?;
    }

    let removed = match root {
        CascadeRoot::Customer(id) => diesel::delete(customers::table.find(id)).execute(conn)?,
        CascadeRoot::Product(id) => diesel::delete(products::table.find(id)).execute(conn)?,
        CascadeRoot::Order(id) => diesel::delete(orders::table.find(id)).execute(conn)?,
        CascadeRoot::OrderItem(id) => diesel::delete(order_items::table.find(id)).execute(conn)?,
    };
    if removed == 0 {
        return Err(DomainError::not_found(root.entity(), root.id()));
    }

    if outcome != CascadeOutcome::default() {
        log::info!(
            "Deleted {} {} with {} order(s) and {} order item(s)",
            root.entity(),
            root.id(),
            outcome.orders,
            outcome.order_items
        );
    }
    Ok(outcome)
}
