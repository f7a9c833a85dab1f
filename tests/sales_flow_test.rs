//! Cash control, point-of-sale, catalog and reporting flows.

mod common;

use common::{response_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn cash_control_for_unknown_category_is_a_zero_record() {
    let app = TestApp::new().await;

    let response = app.get("/cash-control/caixa-inexistente").await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    let record = &body["cashControl"];
    assert_eq!(record["category"], "caixa-inexistente");
    assert_eq!(record["is_open"], false);
    assert_eq!(record["initial_cash"], 0.0);
    assert_eq!(record["current_balance"], 0.0);
    assert_eq!(record["today_sales"], 0.0);
}

#[tokio::test]
async fn sale_updates_register_balance() {
    let app = TestApp::new().await;

    // Open the register with a 100 float.
    let response = app
        .post_json(
            "/cash-control/caixa-manha",
            json!({
                "is_open": true,
                "initial_cash": 100.0,
                "current_balance": 100.0,
                "today_sales": 0.0
            }),
        )
        .await;
    assert_eq!(response.status(), 200);

    // Record a 50 sale.
    let response = app
        .post_json(
            "/sales",
            json!({
                "category": "caixa-manha",
                "cashier": "Caixa Manhã",
                "total": 50.0,
                "payment_method": "dinheiro",
                "items": [{
                    "product_name": "Whey Protein",
                    "quantity": 2,
                    "unit_price": 25.0,
                    "total": 50.0,
                    "type": "product"
                }]
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    let sale_id = body["saleId"].as_str().unwrap();
    assert!(sale_id.starts_with("SALE_"));

    let response = app.get("/cash-control/caixa-manha").await;
    let body = response_json(response).await;
    assert_eq!(body["cashControl"]["today_sales"], 50.0);
    assert_eq!(body["cashControl"]["current_balance"], 150.0);
    assert_eq!(body["cashControl"]["initial_cash"], 100.0);
}

#[tokio::test]
async fn sale_with_missing_fields_is_400() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/sales",
            json!({"category": "caixa-manha", "cashier": "Caixa", "total": 10.0}),
        )
        .await;
    assert_eq!(response.status(), 400);

    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "Dados obrigatórios: category, cashier, total, payment_method, items"
    );
}

#[tokio::test]
async fn sales_listing_carries_item_summary_and_respects_date_range() {
    let app = TestApp::new().await;

    app.post_json(
        "/sales",
        json!({
            "category": "caixa-tarde",
            "cashier": "Caixa Tarde",
            "total": 35.0,
            "payment_method": "pix",
            "items": [{
                "product_name": "BCAA",
                "quantity": 1,
                "unit_price": 35.0,
                "total": 35.0,
                "type": "product"
            }]
        }),
    )
    .await;

    let response = app.get("/sales/caixa-tarde").await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    let sales = body["sales"].as_array().unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0]["products"], "BCAA (x1)");
    assert_eq!(sales[0]["status"], "completed");

    // Inclusive bounds: querying exactly the sale's timestamp keeps it.
    let timestamp = sales[0]["timestamp"].as_str().unwrap().to_string();
    let encoded = timestamp.replace('+', "%2B");
    let response = app
        .get(&format!(
            "/sales/caixa-tarde?start_date={encoded}&end_date={encoded}"
        ))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["sales"].as_array().unwrap().len(), 1);

    // A window entirely in the past excludes it.
    let response = app
        .get("/sales/caixa-tarde?start_date=2000-01-01&end_date=2000-01-02")
        .await;
    let body = response_json(response).await;
    assert_eq!(body["sales"].as_array().unwrap().len(), 0);

    // Other categories do not see it.
    let response = app.get("/sales/caixa-noite").await;
    let body = response_json(response).await;
    assert_eq!(body["sales"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn invalid_date_range_is_400() {
    let app = TestApp::new().await;

    let response = app
        .get("/sales/caixa-manha?start_date=ontem&end_date=hoje")
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn seeded_catalog_is_listed_alphabetically() {
    let app = TestApp::new().await;

    let response = app.get("/products").await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 12);

    let names: Vec<&str> = products
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(names.contains(&"Whey Protein"));
}

#[tokio::test]
async fn product_creation_validates_and_extends_the_catalog() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/products",
            json!({"name": "Toalha", "price": 20.0, "type": "product"}),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    assert!(body["productId"].as_str().is_some());

    let response = app.get("/products").await;
    let body = response_json(response).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 13);

    let response = app
        .post_json("/products", json!({"name": "Toalha", "price": 20.0}))
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Dados obrigatórios: name, price, type");

    let response = app
        .post_json(
            "/products",
            json!({"name": "Plano Anual", "price": 900.0, "type": "yearly"}),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn sales_report_aggregates_totals() {
    let app = TestApp::new().await;

    for total in [30.0, 45.0] {
        app.post_json(
            "/sales",
            json!({
                "category": "caixa-manha",
                "cashier": "Caixa Manhã",
                "total": total,
                "payment_method": "dinheiro",
                "items": []
            }),
        )
        .await;
    }

    let response = app.get("/reports/sales/caixa-manha").await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["report"]["category"], "caixa-manha");
    assert_eq!(body["report"]["total_sales"], 75.0);
    assert_eq!(body["report"]["total_transactions"], 2);
    assert_eq!(body["report"]["sales"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn health_is_a_liveness_check_reporting_the_backend() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "API funcionando corretamente");
    assert_eq!(body["database"], "SQLite");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn unmatched_routes_return_the_envelope_404() {
    let app = TestApp::new().await;

    let response = app.get("/nao-existe").await;
    assert_eq!(response.status(), 404);

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Endpoint não encontrado");
}
