//! Catalog and category management

use tracing::info;
use crate::domain::aggregates::{Category, Product, ProductDraft};
use crate::domain::value_objects::StockStatus;
use crate::store::Store;
use crate::{Result, StorefrontError};

pub struct Catalog<'a> {
    store: &'a Store,
}

impl<'a> Catalog<'a> {
    pub fn new(store: &'a Store) -> Self { Self { store } }

    pub fn list(&self) -> Vec<Product> { self.store.products() }

    pub fn get(&self, id: &str) -> Result<Product> {
        self.list().into_iter().find(|p| p.id == id).ok_or(StorefrontError::ProductNotFound)
    }

    pub fn by_owner(&self, owner: &str) -> Vec<Product> { self.filtered(|p| p.is_owned_by(owner)) }
    pub fn featured(&self) -> Vec<Product> { self.filtered(|p| p.featured) }
    pub fn by_category(&self, category: &str) -> Vec<Product> { self.filtered(|p| p.category == category) }
    pub fn search(&self, query: &str) -> Vec<Product> { self.filtered(|p| p.matches(query.trim())) }

    pub fn low_stock(&self) -> Vec<Product> { self.with_stock_status(StockStatus::Low) }
    pub fn out_of_stock(&self) -> Vec<Product> { self.with_stock_status(StockStatus::Out) }

    fn with_stock_status(&self, status: StockStatus) -> Vec<Product> {
        let threshold = self.store.settings().low_stock_threshold;
        self.filtered(|p| p.stock_status(threshold) == status)
    }

    fn filtered(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        self.list().into_iter().filter(|p| keep(p)).collect()
    }

    pub fn add_product(&self, draft: ProductDraft) -> Result<Product> {
        let product = Product::create(draft)?;
        let _guard = self.store.lock();
        let mut products = self.list();
        products.push(product.clone());
        self.store.set_products(&products)?;
        info!(product_id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    pub fn update_product(&self, id: &str, draft: ProductDraft) -> Result<Product> {
        self.modify(id, |p| p.apply(draft))
    }

    pub fn delete_product(&self, id: &str) -> Result<()> {
        let _guard = self.store.lock();
        let mut products = self.list();
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before { return Err(StorefrontError::ProductNotFound); }
        self.store.set_products(&products)?;
        info!(product_id = id, "product deleted");
        Ok(())
    }

    pub fn set_stock(&self, id: &str, stock: u32) -> Result<Product> {
        self.modify(id, |p| {
            p.stock = stock;
            p.touch();
            Ok(())
        })
    }

    /// Bumps the sales counter. Checkout does not call this.
    pub fn increment_sales(&self, id: &str, quantity: u32) -> Result<Product> {
        self.modify(id, |p| {
            p.sales = p.sales.saturating_add(quantity);
            Ok(())
        })
    }

    fn modify(&self, id: &str, change: impl FnOnce(&mut Product) -> Result<()>) -> Result<Product> {
        let _guard = self.store.lock();
        let mut products = self.list();
        let product = products.iter_mut().find(|p| p.id == id).ok_or(StorefrontError::ProductNotFound)?;
        change(product)?;
        let updated = product.clone();
        self.store.set_products(&products)?;
        Ok(updated)
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    pub fn categories(&self) -> Vec<Category> { self.store.categories() }

    pub fn category(&self, id: &str) -> Result<Category> {
        self.categories().into_iter().find(|c| c.id == id).ok_or(StorefrontError::CategoryNotFound)
    }

    /// Names are unique ignoring case.
    pub fn add_category(&self, name: &str, icon: Option<String>, description: Option<String>) -> Result<Category> {
        if name.trim().is_empty() {
            return Err(StorefrontError::Validation("category name is required".into()));
        }
        let _guard = self.store.lock();
        let mut categories = self.categories();
        if categories.iter().any(|c| c.has_name(name)) {
            return Err(StorefrontError::DuplicateCategory);
        }
        let category = Category::create(name, icon, description.filter(|d| !d.trim().is_empty()));
        categories.push(category.clone());
        self.store.set_categories(&categories)?;
        info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }
}
