//! Demo dataset written on first run.

use rust_decimal::Decimal;
use crate::domain::aggregates::{Category, Product, User};
use crate::domain::value_objects::Role;
use crate::store::Settings;

pub(crate) fn users() -> Vec<User> {
    let user = |id: &str, role, name: &str, email: &str, password: &str| User {
        id: id.into(), role, name: name.into(), email: email.into(), password: password.into(),
        active: true, whatsapp: None, phone: None, created_at: None, last_login: None,
    };
    let mut distributor = user("d1", Role::Distributor, "Distribuidora Alfa", "distri@hb.local", "distri123");
    distributor.whatsapp = Some("+573001112233".into());
    vec![
        user("u1", Role::Admin, "Admin", "admin@hb.local", "admin123"),
        distributor,
        user("c1", Role::Client, "Cliente Demo", "cliente@hb.local", "cliente123"),
    ]
}

pub(crate) fn products() -> Vec<Product> {
    let product = |id: &str, name: &str, public: i64, distributor: i64, stock, category: &str| Product {
        id: id.into(), owner: Some("d1".into()), name: name.into(), description: None,
        category: category.into(), brand: None, sku: None,
        price_publico: Decimal::new(public, 0), price_distribuidor: Some(Decimal::new(distributor, 0)),
        stock, image: None, featured: false, sales: 0, created_at: None, updated_at: None,
    };
    vec![
        product("p1", "Auriculares BT", 99000, 75000, 12, "Audio"),
        product("p2", "Power Bank 10k", 75000, 55000, 5, "Accesorios"),
        product("p3", "Cable USB-C", 25000, 18000, 0, "Accesorios"),
    ]
}

pub(crate) fn categories() -> Vec<Category> {
    vec![
        Category { id: "cat1".into(), name: "Audio".into(), icon: Some("🎧".into()), description: None },
        Category { id: "cat2".into(), name: "Accesorios".into(), icon: Some("🔌".into()), description: None },
    ]
}

pub(crate) fn settings() -> Settings { Settings::default() }
