//! HTTP request handlers. Stateless: validation, storage-facade calls and
//! response shaping only.

pub mod auth;
pub mod cash_control;
pub mod common;
pub mod health;
pub mod products;
pub mod reports;
pub mod sales;
pub mod users;
