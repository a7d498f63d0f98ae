use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product fields exposed when nested under an order item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation(format!(
                "product price must be a non-negative number, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
}

impl ProductChanges {
    pub fn merge(self, current: &Product) -> Result<NewProduct, DomainError> {
        let merged = NewProduct {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            price: self.price.unwrap_or(current.price),
        };
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64) -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            price,
        }
    }

    #[test]
    fn free_products_are_allowed() {
        assert!(product(0.0).validate().is_ok());
    }

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        for price in [-0.01, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(product(price).validate(), Err(DomainError::Validation(_))),
                "{price} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_name() {
        let p = NewProduct {
            name: String::new(),
            price: 1.0,
        };
        assert!(matches!(p.validate(), Err(DomainError::Validation(_))));
    }
}
