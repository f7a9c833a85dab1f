//! academia-api
//!
//! Gym management backend: authentication, cash control, point-of-sale,
//! product catalog and sales reporting over a pluggable storage backend,
//! plus a spreadsheet/CSV ingest pipeline feeding the dashboard statistics
//! document.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod api;
pub mod auth;
pub mod config;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod ingest;
pub mod migrator;
pub mod models;
pub mod storage;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::ingest::StatsStore;
use crate::storage::StorageBackend;

/// Shared application state, created once at startup and injected into
/// handlers. The storage facade owns the backend connection for the life of
/// the process.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageBackend>,
    pub config: AppConfig,
    pub stats: Arc<StatsStore>,
    cash_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageBackend>, config: AppConfig) -> Self {
        let stats = Arc::new(StatsStore::new(config.data_file.clone()));
        Self {
            storage,
            config,
            stats,
            cash_locks: Arc::new(DashMap::new()),
        }
    }

    /// Per-category lock serializing register read-modify-write sequences.
    pub fn cash_lock(&self, category: &str) -> Arc<Mutex<()>> {
        self.cash_locks
            .entry(category.to_string())
            .or_default()
            .clone()
    }
}
