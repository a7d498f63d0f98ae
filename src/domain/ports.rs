use chrono::{DateTime, NaiveDate, Utc};

use super::errors::DomainError;
use super::order::{Order, OrderDetail, OrderItemWithRefs, OrderWithCustomer};
use super::report::{DatedOrderLine, SummarySnapshot};

/// Dependents removed together with a deleted record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub orders: usize,
    pub order_items: usize,
}

/// Typed CRUD for one entity type.
pub trait EntityRepository: Send + Sync + 'static {
    type Entity;
    type New;
    type Changes;

    fn create(&self, new: Self::New) -> Result<Self::Entity, DomainError>;
    fn find(&self, id: i32) -> Result<Self::Entity, DomainError>;
    fn update(&self, id: i32, changes: Self::Changes) -> Result<Self::Entity, DomainError>;
    /// Deletes the record and, atomically, everything that depends on it.
    fn delete(&self, id: i32) -> Result<CascadeOutcome, DomainError>;
    /// All records in insertion order.
    fn list(&self) -> Result<Vec<Self::Entity>, DomainError>;
}

pub trait RelationshipResolver: Send + Sync + 'static {
    fn orders_with_customer(&self) -> Result<Vec<OrderWithCustomer>, DomainError>;
    fn order_items_with_order_and_product(&self) -> Result<Vec<OrderItemWithRefs>, DomainError>;
    /// Orders whose date falls on `date` (UTC calendar day), without relations.
    fn orders_on_date(&self, date: NaiveDate) -> Result<Vec<Order>, DomainError>;
    /// Orders on `date` with their customer and items (each with its product).
    fn order_details_on_date(&self, date: NaiveDate) -> Result<Vec<OrderDetail>, DomainError>;
}

/// Snapshot reads backing the aggregate reports. Each call reads one
/// consistent view of the store.
pub trait ReportSource: Send + Sync + 'static {
    fn summary_snapshot(&self) -> Result<SummarySnapshot, DomainError>;
    /// Every order dated in `[from, to)` joined with its items and their
    /// current product prices.
    fn order_lines_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DatedOrderLine>, DomainError>;
}
