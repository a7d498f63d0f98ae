pub mod cascade;
pub mod customer_repo;
pub mod models;
pub mod order_item_repo;
pub mod order_repo;
pub mod product_repo;
pub mod reader;
pub mod store;

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;

use crate::domain::errors::DomainError;
use crate::schema::{customers, orders, products};

pub use store::Store;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation
                | DatabaseErrorKind::NotNullViolation,
                info,
            ) => DomainError::Validation(info.message().to_string()),
            other => DomainError::Storage(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

// ── Reference checks shared by the writers ───────────────────────────────────

pub(crate) fn ensure_customer(conn: &mut SqliteConnection, id: i32) -> Result<(), DomainError> {
    let found = customers::table
        .find(id)
        .select(customers::id)
        .first::<i32>(conn)
        .optional()?;
    found
        .map(|_| ())
        .ok_or_else(|| DomainError::validation(format!("customer {id} does not exist")))
}

pub(crate) fn ensure_product(conn: &mut SqliteConnection, id: i32) -> Result<(), DomainError> {
    let found = products::table
        .find(id)
        .select(products::id)
        .first::<i32>(conn)
        .optional()?;
    found
        .map(|_| ())
        .ok_or_else(|| DomainError::validation(format!("product {id} does not exist")))
}

pub(crate) fn ensure_order(conn: &mut SqliteConnection, id: i32) -> Result<(), DomainError> {
    let found = orders::table
        .find(id)
        .select(orders::id)
        .first::<i32>(conn)
        .optional()?;
    found
        .map(|_| ())
        .ok_or_else(|| DomainError::validation(format!("order {id} does not exist")))
}
