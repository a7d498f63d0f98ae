use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::customer::{Customer, CustomerContact};
use super::errors::DomainError;
use super::product::{Product, ProductSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub customer_id: i32,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: i32,
    /// Defaults to the time of creation.
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderChanges {
    pub customer_id: Option<i32>,
    pub order_date: Option<DateTime<Utc>>,
}

impl OrderChanges {
    pub fn merge(self, current: &Order) -> NewOrder {
        NewOrder {
            customer_id: self.customer_id.unwrap_or(current.customer_id),
            order_date: Some(self.order_date.unwrap_or(current.order_date)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

impl NewOrderItem {
    /// Field-level checks only; the order and product references are checked
    /// against the store inside the inserting transaction.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.quantity < 1 {
            return Err(DomainError::validation(format!(
                "quantity must be a positive integer, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemChanges {
    pub order_id: Option<i32>,
    pub product_id: Option<i32>,
    pub quantity: Option<i32>,
}

impl OrderItemChanges {
    pub fn merge(self, current: &OrderItem) -> Result<NewOrderItem, DomainError> {
        let merged = NewOrderItem {
            order_id: self.order_id.unwrap_or(current.order_id),
            product_id: self.product_id.unwrap_or(current.product_id),
            quantity: self.quantity.unwrap_or(current.quantity),
        };
        merged.validate()?;
        Ok(merged)
    }
}

// ── Resolved graphs ──────────────────────────────────────────────────────────
//
// A `None` reference can only show up when the store is already inconsistent;
// it is carried through rather than treated as an error.

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderWithCustomer {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderItemWithRefs {
    #[serde(flatten)]
    pub item: OrderItem,
    pub order: Option<Order>,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<CustomerContact>,
    pub items: Vec<OrderItemDetail>,
}

/// Nests `items` under their owning orders. Orders keep their input order and
/// an order without items gets an empty list; items whose order is not in
/// `orders` are dropped.
pub fn nest_order_details(
    orders: Vec<(Order, Option<CustomerContact>)>,
    items: Vec<(OrderItem, Option<ProductSummary>)>,
) -> Vec<OrderDetail> {
    let mut by_order: HashMap<i32, Vec<OrderItemDetail>> = HashMap::new();
    for (item, product) in items {
        by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderItemDetail { item, product });
    }

    orders
        .into_iter()
        .map(|(order, customer)| OrderDetail {
            items: by_order.remove(&order.id).unwrap_or_default(),
            order,
            customer,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 3, h, 0, 0).unwrap()
    }

    fn order(id: i32) -> Order {
        Order {
            id,
            customer_id: 1,
            order_date: at(10),
            created_at: at(10),
            updated_at: at(10),
        }
    }

    fn item(id: i32, order_id: i32, quantity: i32) -> OrderItem {
        OrderItem {
            id,
            order_id,
            product_id: 1,
            quantity,
            created_at: at(10),
            updated_at: at(10),
        }
    }

    #[test]
    fn quantity_defaults_to_one() {
        let parsed: NewOrderItem =
            serde_json::from_str(r#"{"orderId": 1, "productId": 2}"#).unwrap();
        assert_eq!(parsed.quantity, 1);
    }

    #[test]
    fn rejects_non_positive_quantity() {
        for quantity in [0, -3] {
            let item = NewOrderItem {
                order_id: 1,
                product_id: 1,
                quantity,
            };
            assert!(matches!(item.validate(), Err(DomainError::Validation(_))));
        }
    }

    #[test]
    fn order_date_is_optional_and_accepts_offsets() {
        let parsed: NewOrder = serde_json::from_str(r#"{"customerId": 4}"#).unwrap();
        assert_eq!(parsed.order_date, None);

        let parsed: NewOrder =
            serde_json::from_str(r#"{"customerId": 4, "orderDate": "2024-05-03T12:00:00+02:00"}"#)
                .unwrap();
        assert_eq!(parsed.order_date, Some(at(10)));
    }

    #[test]
    fn order_changes_keep_existing_values() {
        let merged = OrderChanges {
            customer_id: Some(9),
            order_date: None,
        }
        .merge(&order(1));
        assert_eq!(merged.customer_id, 9);
        assert_eq!(merged.order_date, Some(at(10)));
    }

    #[test]
    fn nesting_keeps_orders_without_items() {
        let details = nest_order_details(
            vec![(order(1), None), (order(2), None)],
            vec![(item(10, 2, 3), None), (item(11, 2, 1), None)],
        );

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].order.id, 1);
        assert!(details[0].items.is_empty());
        let ids: Vec<i32> = details[1].items.iter().map(|d| d.item.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn empty_item_list_serializes_as_array() {
        let details = nest_order_details(vec![(order(1), None)], vec![]);
        let json = serde_json::to_value(&details[0]).unwrap();
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["id"], 1);
        assert_eq!(json["customerId"], 1);
    }
}
