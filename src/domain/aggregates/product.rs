//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::value_objects::{new_id, StockStatus, MAX_PRICE};
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProductRecord")]
pub struct Product {
    pub id: String,
    /// Distributor user id; admin-created products may have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub price_publico: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_distribuidor: Option<Decimal>,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub featured: bool,
    /// Never incremented by checkout.
    pub sales: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// On-disk shape, including the legacy single `price` field that predates
/// the public/distributor split.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    id: String,
    #[serde(default)]
    owner: Option<String>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    price_publico: Option<Decimal>,
    #[serde(default)]
    price_distribuidor: Option<Decimal>,
    #[serde(default)]
    stock: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    sales: u32,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        let price_publico = r.price_publico.or(r.price).unwrap_or(Decimal::ZERO);
        Self {
            id: r.id, owner: r.owner.filter(|o| !o.is_empty()), name: r.name, description: r.description,
            category: r.category, brand: r.brand, sku: r.sku, price_publico,
            price_distribuidor: r.price_distribuidor, stock: r.stock,
            image: r.image.filter(|i| !i.is_empty()), featured: r.featured, sales: r.sales,
            created_at: r.created_at, updated_at: r.updated_at,
        }
    }
}

/// Form input for creating or replacing a product
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default)]
    pub owner: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub price_publico: Decimal,
    #[serde(default)]
    pub price_distribuidor: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl ProductDraft {
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if self.price_publico.is_sign_negative() {
            return Err(StorefrontError::Validation("public price must not be negative".into()));
        }
        if self.price_publico > Decimal::from(MAX_PRICE) {
            return Err(StorefrontError::Validation(format!("public price must not exceed {MAX_PRICE}")));
        }
        if let Some(distributor) = self.price_distribuidor {
            if distributor.is_sign_negative() {
                return Err(StorefrontError::Validation("distributor price must not be negative".into()));
            }
            if distributor > self.price_publico {
                return Err(StorefrontError::Validation("distributor price exceeds public price".into()));
            }
        }
        Ok(())
    }
}

impl Product {
    pub fn create(draft: ProductDraft) -> Result<Self> {
        draft.check()?;
        Ok(Self {
            id: new_id("p"), owner: draft.owner, name: draft.name.trim().to_string(),
            description: draft.description, category: draft.category, brand: draft.brand, sku: draft.sku,
            price_publico: draft.price_publico, price_distribuidor: draft.price_distribuidor,
            stock: draft.stock, image: draft.image, featured: draft.featured, sales: 0,
            created_at: Some(Utc::now()), updated_at: None,
        })
    }

    /// Replaces the editable fields, keeping id, owner (unless given), sales
    /// and creation time.
    pub fn apply(&mut self, draft: ProductDraft) -> Result<()> {
        draft.check()?;
        if draft.owner.is_some() { self.owner = draft.owner; }
        self.name = draft.name.trim().to_string();
        self.description = draft.description;
        self.category = draft.category;
        self.brand = draft.brand;
        self.sku = draft.sku;
        self.price_publico = draft.price_publico;
        self.price_distribuidor = draft.price_distribuidor;
        self.stock = draft.stock;
        self.image = draft.image;
        self.featured = draft.featured;
        self.touch();
        Ok(())
    }

    pub fn is_in_stock(&self) -> bool { self.stock > 0 }
    pub fn stock_status(&self, threshold: u32) -> StockStatus { StockStatus::classify(self.stock, threshold) }
    pub fn is_owned_by(&self, user_id: &str) -> bool { self.owner.as_deref() == Some(user_id) }

    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&term));
        hit(Some(&self.name)) || hit(self.description.as_deref()) || hit(self.brand.as_deref()) || hit(self.sku.as_deref())
    }

    pub fn touch(&mut self) { self.updated_at = Some(Utc::now()); }
}
