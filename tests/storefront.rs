//! End-to-end scenarios against a seeded in-memory store.

use hb_storefront::domain::aggregates::ProductDraft;
use hb_storefront::services::UserUpdate;
use hb_storefront::{OrderStatus, Role, Store, Storefront, StorefrontError};
use rust_decimal::Decimal;

fn shop() -> Storefront {
    Storefront::open(Store::in_memory()).unwrap()
}

#[test]
fn test_role_pricing_for_same_cart() {
    let shop = shop();
    shop.cart().add("p1", 2).unwrap();
    assert_eq!(shop.cart().total(), Decimal::new(198000, 0));

    shop.auth().login("cliente@hb.local", "cliente123").unwrap();
    assert_eq!(shop.cart().total(), Decimal::new(198000, 0));

    shop.auth().login("distri@hb.local", "distri123").unwrap();
    assert_eq!(shop.cart().total(), Decimal::new(150000, 0));
}

#[test]
fn test_out_of_stock_add_rejected() {
    let shop = shop();
    assert_eq!(shop.cart().add("p3", 1), Err(StorefrontError::OutOfStock));
    assert!(shop.cart().get().is_empty());
}

#[test]
fn test_add_beyond_stock_leaves_cart_unchanged() {
    let shop = shop();
    shop.cart().add("p2", 4).unwrap();
    assert_eq!(
        shop.cart().add("p2", 2),
        Err(StorefrontError::InsufficientStock { requested: 6, available: 5 })
    );
    assert_eq!(shop.cart().get().quantity_of("p2"), 4);
}

fn draft(name: &str, publico: i64, distribuidor: i64, stock: u32) -> ProductDraft {
    ProductDraft {
        name: name.into(), category: "Audio".into(),
        price_publico: Decimal::new(publico, 0), price_distribuidor: Some(Decimal::new(distribuidor, 0)),
        stock, ..Default::default()
    }
}

#[test]
fn test_order_total_frozen_after_price_change() {
    let shop = shop();
    let speaker = shop.catalog().add_product(draft("Parlante", 150000, 120000, 4)).unwrap();
    shop.auth().login("cliente@hb.local", "cliente123").unwrap();
    shop.cart().add("p1", 1).unwrap();
    shop.cart().add("p2", 2).unwrap();
    shop.cart().add(&speaker.id, 1).unwrap();
    let order = shop.orders().place_from_cart(Some("entregar en tienda".into())).unwrap();
    assert_eq!(order.items.len(), 3);
    assert_eq!(order.total, Decimal::new(399000, 0));
    assert_eq!(order.customer_id.as_deref(), Some("c1"));
    assert!(shop.cart().get().is_empty());
    // checkout does not touch stock or sales
    assert_eq!(shop.catalog().get("p1").unwrap().stock, 12);

    let catalog = shop.catalog();
    catalog.update_product("p1", draft("Auriculares BT", 120000, 90000, 12)).unwrap();
    catalog.update_product("p2", draft("Cargador", 10000, 8000, 5)).unwrap();
    catalog.update_product(&speaker.id, draft("Parlante", 500000, 400000, 4)).unwrap();

    let stored = shop.orders().get(&order.id).unwrap();
    assert_eq!(stored.total, Decimal::new(399000, 0));
    assert_eq!(stored.items, order.items);
}

#[test]
fn test_status_update_on_missing_order() {
    let shop = shop();
    shop.cart().add("p2", 1).unwrap();
    let order = shop.orders().place_from_cart(None).unwrap();
    assert_eq!(shop.orders().update_status("missing", OrderStatus::Shipped), Err(StorefrontError::OrderNotFound));
    assert_eq!(shop.orders().list(), vec![order]);
}

#[test]
fn test_status_transitions() {
    let shop = shop();
    shop.cart().add("p2", 1).unwrap();
    let order = shop.orders().place_from_cart(None).unwrap();
    let orders = shop.orders();
    orders.update_status(&order.id, OrderStatus::Shipped).unwrap();
    assert_eq!(
        orders.update_status(&order.id, OrderStatus::Processing),
        Err(StorefrontError::InvalidTransition { from: OrderStatus::Shipped, to: OrderStatus::Processing })
    );
    orders.update_status(&order.id, OrderStatus::Cancelled).unwrap();
    assert!(orders.update_status(&order.id, OrderStatus::Completed).is_err());
    assert_eq!(orders.get(&order.id).unwrap().status, OrderStatus::Cancelled);
}

#[test]
fn test_login_ignores_email_case() {
    let shop = shop();
    let session = shop.auth().login("ADMIN@HB.LOCAL", "admin123").unwrap();
    assert_eq!(session.role, Role::Admin);
    assert_eq!(shop.acting_role(), Some(Role::Admin));
}

#[test]
fn test_inactive_user_cannot_login() {
    let shop = shop();
    let auth = shop.auth();
    auth.update_user("c1", UserUpdate { active: Some(false), ..Default::default() }).unwrap();
    assert_eq!(auth.login("cliente@hb.local", "cliente123"), Err(StorefrontError::InvalidCredentials));
    assert_eq!(auth.login("cliente@hb.local", "wrong"), Err(StorefrontError::InvalidCredentials));
}

#[test]
fn test_dangling_cart_line_skipped_in_total() {
    let shop = shop();
    shop.cart().add("p1", 1).unwrap();
    shop.cart().add("p2", 1).unwrap();
    shop.catalog().delete_product("p1").unwrap();
    assert_eq!(shop.cart().total(), Decimal::new(75000, 0));
    assert_eq!(shop.cart().lines().len(), 1);
}

#[test]
fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let shop = Storefront::open(Store::open(dir.path()).unwrap()).unwrap();
        shop.cart().add("p1", 3).unwrap();
        shop.auth().login("cliente@hb.local", "cliente123").unwrap();
    }
    let shop = Storefront::open(Store::open(dir.path()).unwrap()).unwrap();
    assert_eq!(shop.cart().item_count(), 3);
    assert_eq!(shop.auth().current_session().map(|s| s.id), Some("c1".to_string()));
}

#[test]
fn test_export_import_between_stores() {
    let source = shop();
    source.cart().add("p2", 2).unwrap();
    let dump = source.store().export();

    let target = Store::in_memory();
    target.import(&dump).unwrap();
    assert_eq!(target.cart().quantity_of("p2"), 2);
    assert_eq!(target.products(), source.store().products());
}

#[test]
fn test_whatsapp_link_for_cart() {
    let shop = shop().with_default_whatsapp("570000000000");
    let date = chrono::NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();
    assert_eq!(shop.whatsapp_checkout_url(date), None);
    shop.cart().add("p1", 1).unwrap();
    let url = shop.whatsapp_checkout_url(date).unwrap();
    assert!(url.starts_with("https://wa.me/+573001112233?text="));
    assert!(url.contains("24%2F12%2F2024"));
}

#[test]
fn test_concurrent_product_writes_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let shop = Storefront::open(Store::open(dir.path()).unwrap()).unwrap();
    let before = shop.catalog().list().len();
    std::thread::scope(|scope| {
        for t in 0..8 {
            let shop = &shop;
            scope.spawn(move || {
                for i in 0..10 {
                    shop.catalog().add_product(draft(&format!("Item {t}-{i}"), 1000, 800, 1)).unwrap();
                }
            });
        }
    });
    assert_eq!(shop.catalog().list().len(), before + 80);

    let reopened = Storefront::open(Store::open(dir.path()).unwrap()).unwrap();
    assert_eq!(reopened.catalog().list().len(), before + 80);
}
