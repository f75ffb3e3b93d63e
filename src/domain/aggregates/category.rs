//! Category and Quote records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::OrderItem;
use crate::domain::value_objects::new_id;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    pub fn create(name: impl Into<String>, icon: Option<String>, description: Option<String>) -> Self {
        Self { id: new_id("cat"), name: name.into().trim().to_string(), icon, description }
    }

    pub fn has_name(&self, name: &str) -> bool { self.name.to_lowercase() == name.trim().to_lowercase() }
}

/// A price request that has not become an order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default = "pending")]
    pub status: String,
    pub created_at: DateTime<Utc>,
}

fn pending() -> String { "pending".to_string() }

impl Quote {
    pub fn create(customer_id: Option<String>, items: Vec<OrderItem>, notes: Option<String>) -> Self {
        Self { id: new_id("quo"), customer_id, items, notes, status: pending(), created_at: Utc::now() }
    }
}
