//! Trait-level checks against the relational backend that are awkward to
//! reach through the HTTP surface.

mod common;

use academia_api::models::{NewSale, UserUpdate};
use common::TestApp;

#[tokio::test]
async fn update_and_delete_of_unknown_ids_succeed_silently() {
    let app = TestApp::new().await;
    let storage = &app.state.storage;

    let update = UserUpdate {
        username: "fantasma".into(),
        password: None,
        name: "Fantasma".into(),
        role: "cashier".parse().unwrap(),
        category: "caixa-manha".into(),
        permissions: vec![],
        is_active: true,
    };

    storage.update_user("99999", &update).await.unwrap();
    storage.update_user("nao-numerico", &update).await.unwrap();
    storage.delete_user("99999").await.unwrap();
    storage.delete_user("nao-numerico").await.unwrap();
}

#[tokio::test]
async fn register_record_stays_single_per_category() {
    let app = TestApp::new().await;
    let storage = &app.state.storage;

    let mut record = storage.cash_control("caixa-manha").await.unwrap();
    record.initial_cash = 100.0;
    record.current_balance = 100.0;
    storage
        .put_cash_control("caixa-manha", &record)
        .await
        .unwrap();

    record.today_sales = 30.0;
    record.current_balance = 130.0;
    storage
        .put_cash_control("caixa-manha", &record)
        .await
        .unwrap();

    let current = storage.cash_control("caixa-manha").await.unwrap();
    assert_eq!(current.initial_cash, 100.0);
    assert_eq!(current.today_sales, 30.0);
    assert_eq!(current.current_balance, 130.0);
}

#[tokio::test]
async fn sales_without_items_have_no_product_summary() {
    let app = TestApp::new().await;
    let storage = &app.state.storage;

    let sale = NewSale {
        category: "caixa-noite".into(),
        cashier: "Caixa Noite".into(),
        total: 15.0,
        payment_method: "dinheiro".into(),
        change_amount: 0.0,
        status: "completed".into(),
        observations: String::new(),
        items: vec![],
    };
    let sale_id = storage.create_sale(&sale).await.unwrap();

    let sales = storage.list_sales("caixa-noite", None).await.unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].sale_id, sale_id);
    assert_eq!(sales[0].products, None);
}

#[tokio::test]
async fn sales_are_listed_newest_first() {
    let app = TestApp::new().await;
    let storage = &app.state.storage;

    let sale = |total: f64| NewSale {
        category: "caixa-manha".into(),
        cashier: "Caixa Manhã".into(),
        total,
        payment_method: "pix".into(),
        change_amount: 0.0,
        status: "completed".into(),
        observations: String::new(),
        items: vec![],
    };

    storage.create_sale(&sale(10.0)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    storage.create_sale(&sale(20.0)).await.unwrap();

    let sales = storage.list_sales("caixa-manha", None).await.unwrap();
    assert_eq!(sales.len(), 2);
    assert!(sales[0].timestamp >= sales[1].timestamp);
    assert_eq!(sales[0].total, 20.0);
}
