//! Initial data inserted on first run: the four register accounts and the
//! base product catalog. Each backend checks for emptiness before inserting.

use crate::models::{NewProduct, NewUser, ProductType, UserRole};

const CASHIER_PERMISSIONS: [&str; 3] = ["add_sales", "view_daily_reports", "manage_products"];

pub(crate) fn initial_users() -> Vec<NewUser> {
    vec![
        NewUser {
            username: "admin".into(),
            password: "admin123".into(),
            name: "Administrador".into(),
            role: UserRole::Admin,
            category: "admin".into(),
            permissions: vec![
                "manage_users".into(),
                "view_all_reports".into(),
                "manage_products".into(),
            ],
        },
        cashier("caixa_manha", "manha123", "Caixa Manhã", "caixa-manha"),
        cashier("caixa_tarde", "tarde123", "Caixa Tarde", "caixa-tarde"),
        cashier("caixa_noite", "noite123", "Caixa Noite", "caixa-noite"),
    ]
}

fn cashier(username: &str, password: &str, name: &str, category: &str) -> NewUser {
    NewUser {
        username: username.into(),
        password: password.into(),
        name: name.into(),
        role: UserRole::Cashier,
        category: category.into(),
        permissions: CASHIER_PERMISSIONS.iter().map(|p| p.to_string()).collect(),
    }
}

pub(crate) fn initial_products() -> Vec<NewProduct> {
    [
        ("Mensalidade - Musculação", 120.00, ProductType::Membership),
        ("Mensalidade - Aeróbico", 80.00, ProductType::Membership),
        ("Mensalidade - Completa", 150.00, ProductType::Membership),
        ("Diária - Musculação", 15.00, ProductType::Daily),
        ("Diária - Aeróbico", 10.00, ProductType::Daily),
        ("Quinzena - Musculação", 60.00, ProductType::Biweekly),
        ("Quinzena - Aeróbico", 40.00, ProductType::Biweekly),
        ("Whey Protein", 89.90, ProductType::Product),
        ("Creatina", 45.00, ProductType::Product),
        ("BCAA", 35.00, ProductType::Product),
        ("Multivitamínico", 25.00, ProductType::Product),
        ("Garrafa Térmica", 15.00, ProductType::Product),
    ]
    .into_iter()
    .map(|(name, price, product_type)| NewProduct {
        name: name.into(),
        price,
        product_type,
        description: String::new(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_catalog_has_twelve_entries() {
        let products = initial_products();
        assert_eq!(products.len(), 12);
        assert!(products
            .iter()
            .any(|p| p.name == "Whey Protein" && p.product_type == ProductType::Product));
    }

    #[test]
    fn seed_users_cover_every_shift() {
        let users = initial_users();
        assert_eq!(users.len(), 4);
        assert_eq!(users[0].role, UserRole::Admin);
        let categories: Vec<&str> = users.iter().map(|u| u.category.as_str()).collect();
        assert_eq!(
            categories,
            ["admin", "caixa-manha", "caixa-tarde", "caixa-noite"]
        );
    }
}
