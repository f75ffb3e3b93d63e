//! Persistent Store
//!
//! Named JSON collections under fixed keys in a [`KeyValueBackend`]. Reads
//! always deserialize a fresh copy; writes replace the whole collection.
//! Services hold [`Store::lock`] across each read-modify-write so callers
//! sharing one store never interleave inside a mutation. Corrupted values
//! never propagate: a collection that fails to parse reads as empty and a
//! single bad record is skipped.

mod backend;
mod seed;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use crate::domain::aggregates::{Cart, CartItem, Category, Order, Product, Quote, Session, User};
use crate::domain::value_objects::LOW_STOCK_THRESHOLD;
use crate::{Result, StorefrontError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Session,
    Products,
    Cart,
    Categories,
    Orders,
    Quotes,
    Settings,
    CartBackup,
}

impl Collection {
    /// Everything `export`/`import`/`clear_all` cover.
    pub const ALL: [Collection; 8] = [
        Self::Users, Self::Session, Self::Products, Self::Cart,
        Self::Categories, Self::Orders, Self::Quotes, Self::Settings,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Users => "hb_users",
            Self::Session => "hb_session",
            Self::Products => "hb_products",
            Self::Cart => "hb_cart",
            Self::Categories => "hb_categories",
            Self::Orders => "hb_orders",
            Self::Quotes => "hb_quotes",
            Self::Settings => "hb_settings",
            Self::CartBackup => "hb_cart_backup",
        }
    }

    /// Name used in exported snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Session => "session",
            Self::Products => "products",
            Self::Cart => "cart",
            Self::Categories => "categories",
            Self::Orders => "orders",
            Self::Quotes => "quotes",
            Self::Settings => "settings",
            Self::CartBackup => "cartBackup",
        }
    }
}

/// Shop-wide settings; unknown keys are kept as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub currency: String,
    pub currency_symbol: String,
    pub low_stock_threshold: u32,
    pub featured_products_count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "COP".into(), currency_symbol: "$".into(),
            low_stock_threshold: LOW_STOCK_THRESHOLD, featured_products_count: 6, extra: Map::new(),
        }
    }
}

/// Saved copy of the cart under `hb_cart_backup`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartBackup {
    pub items: Vec<CartItem>,
    pub saved_at: chrono::DateTime<chrono::Utc>,
    pub total: rust_decimal::Decimal,
}

pub struct Store {
    backend: Box<dyn KeyValueBackend>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("Store") }
}

impl Store {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self { backend: Box::new(backend), write_lock: Mutex::new(()) }
    }

    pub fn in_memory() -> Self { Self::new(MemoryBackend::new()) }

    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FileBackend::open(dir)?))
    }

    /// Exclusive access for one read-modify-write cycle. Not reentrant:
    /// code holding the guard must not call another locking method.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Raw JSON access
    // -------------------------------------------------------------------------

    fn read_json<T: DeserializeOwned>(&self, c: Collection) -> Option<T> {
        let raw = self.backend.read(c.key())?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = c.key(), error = %e, "corrupted store value, using fallback");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, c: Collection, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|e| StorefrontError::Storage(e.to_string()))?;
        self.backend.write(c.key(), &raw).inspect_err(|e| warn!(key = c.key(), error = %e, "store write failed"))?;
        debug!(key = c.key(), bytes = raw.len(), "store write");
        Ok(())
    }

    fn is_present(&self, c: Collection) -> bool {
        self.read_json::<Value>(c).is_some_and(|v| !v.is_null())
    }

    // -------------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------------

    /// Fresh copy of a list collection. Records that do not parse are skipped.
    pub fn get<T: DeserializeOwned>(&self, c: Collection) -> Vec<T> {
        let Some(records) = self.read_json::<Vec<Value>>(c) else { return vec![] };
        records.into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(key = c.key(), error = %e, "skipping corrupted record");
                    None
                }
            })
            .collect()
    }

    pub fn set<T: Serialize>(&self, c: Collection, list: &[T]) -> Result<()> { self.write_json(c, list) }

    pub fn users(&self) -> Vec<User> { self.get(Collection::Users) }
    pub fn set_users(&self, users: &[User]) -> Result<()> { self.set(Collection::Users, users) }
    pub fn products(&self) -> Vec<Product> { self.get(Collection::Products) }
    pub fn set_products(&self, products: &[Product]) -> Result<()> { self.set(Collection::Products, products) }
    pub fn categories(&self) -> Vec<Category> { self.get(Collection::Categories) }
    pub fn set_categories(&self, categories: &[Category]) -> Result<()> { self.set(Collection::Categories, categories) }
    pub fn orders(&self) -> Vec<Order> { self.get(Collection::Orders) }
    pub fn set_orders(&self, orders: &[Order]) -> Result<()> { self.set(Collection::Orders, orders) }
    pub fn quotes(&self) -> Vec<Quote> { self.get(Collection::Quotes) }
    pub fn set_quotes(&self, quotes: &[Quote]) -> Result<()> { self.set(Collection::Quotes, quotes) }

    pub fn cart(&self) -> Cart { Cart::from_items(self.get(Collection::Cart)) }
    pub fn set_cart(&self, cart: &Cart) -> Result<()> { self.write_json(Collection::Cart, cart) }

    pub fn cart_backup(&self) -> Option<CartBackup> { self.read_json(Collection::CartBackup) }
    pub fn set_cart_backup(&self, backup: &CartBackup) -> Result<()> { self.write_json(Collection::CartBackup, backup) }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    pub fn session(&self) -> Option<Session> { self.read_json::<Option<Session>>(Collection::Session).flatten() }
    pub fn set_session(&self, session: &Session) -> Result<()> { self.write_json(Collection::Session, session) }
    pub fn clear_session(&self) -> Result<()> { self.backend.remove(Collection::Session.key()) }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    pub fn settings(&self) -> Settings { self.read_json(Collection::Settings).unwrap_or_default() }
    pub fn set_settings(&self, settings: &Settings) -> Result<()> { self.write_json(Collection::Settings, settings) }

    /// Sets one key; known keys must keep their type.
    pub fn update_setting(&self, key: &str, value: Value) -> Result<Settings> {
        let _guard = self.lock();
        let mut raw = match serde_json::to_value(self.settings()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        raw.insert(key.to_string(), value);
        let settings: Settings = serde_json::from_value(Value::Object(raw))
            .map_err(|e| StorefrontError::Validation(format!("setting '{key}': {e}")))?;
        self.set_settings(&settings)?;
        Ok(settings)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Writes the demo dataset into absent keys only; never touches a key
    /// that already holds data, even an empty list.
    pub fn ensure_seed(&self) -> Result<()> {
        let _guard = self.lock();
        self.seed_missing()
    }

    fn seed_missing(&self) -> Result<()> {
        let mut seeded = vec![];
        if !self.is_present(Collection::Users) { self.set_users(&seed::users())?; seeded.push("users"); }
        if !self.is_present(Collection::Products) { self.set_products(&seed::products())?; seeded.push("products"); }
        if !self.is_present(Collection::Categories) { self.set_categories(&seed::categories())?; seeded.push("categories"); }
        for c in [Collection::Cart, Collection::Orders, Collection::Quotes] {
            if !self.is_present(c) { self.write_json(c, &Vec::<Value>::new())?; }
        }
        if !self.is_present(Collection::Settings) { self.set_settings(&seed::settings())?; }
        if !seeded.is_empty() {
            info!(collections = ?seeded, "seeded demo data");
        }
        Ok(())
    }

    /// Removes every key and reseeds.
    pub fn clear_all(&self) -> Result<()> {
        let _guard = self.lock();
        for c in Collection::ALL {
            self.backend.remove(c.key())?;
        }
        self.seed_missing()
    }

    /// Snapshot of every collection keyed by its export name.
    pub fn export(&self) -> Value {
        let data: Map<String, Value> = Collection::ALL.iter()
            .map(|c| {
                let fallback = if *c == Collection::Session { Value::Null } else { Value::Array(vec![]) };
                (c.name().to_string(), self.read_json::<Value>(*c).unwrap_or(fallback))
            })
            .collect();
        Value::Object(data)
    }

    /// Writes each recognised collection of a snapshot; unknown names are ignored.
    pub fn import(&self, data: &Value) -> Result<usize> {
        let Value::Object(map) = data else {
            return Err(StorefrontError::Validation("import data must be a JSON object".into()));
        };
        let _guard = self.lock();
        let mut written = 0;
        for c in Collection::ALL {
            if let Some(value) = map.get(c.name()) {
                if value.is_null() {
                    self.backend.remove(c.key())?;
                } else {
                    self.write_json(c, value)?;
                }
                written += 1;
            }
        }
        info!(collections = written, "imported store snapshot");
        Ok(written)
    }
}
