//! The persisted statistics document and its on-disk store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::errors::ApiError;

/// Per-class-type counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub participantes_media: f64,
}

/// Member breakdown section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberStats {
    #[serde(default)]
    pub por_faixa_etaria: BTreeMap<String, u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The aggregated dashboard document. Sections the ingest pipeline does not
/// touch are carried verbatim so wholesale replacement round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsDocument {
    #[serde(default)]
    pub academia: Map<String, Value>,
    #[serde(default)]
    pub estatisticas: Map<String, Value>,
    #[serde(default)]
    pub membros: MemberStats,
    #[serde(default)]
    pub aulas: BTreeMap<String, ClassStats>,
    #[serde(default)]
    pub financeiro: Map<String, Value>,
    #[serde(default)]
    pub metas: Map<String, Value>,
    #[serde(default = "default_versao")]
    pub versao: String,
    #[serde(default)]
    pub ultima_atualizacao: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_versao() -> String {
    "1.0.0".to_string()
}

impl Default for StatsDocument {
    fn default() -> Self {
        Self {
            academia: Map::new(),
            estatisticas: Map::new(),
            membros: MemberStats::default(),
            aulas: BTreeMap::new(),
            financeiro: Map::new(),
            metas: Map::new(),
            versao: default_versao(),
            ultima_atualizacao: None,
            extra: Map::new(),
        }
    }
}

/// Flat-file store for the statistics document. Every mutation holds the
/// mutex across the whole read-merge-write so concurrent uploads cannot
/// drop each other's contribution.
pub struct StatsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document, or `None` when the file is absent or unreadable.
    pub async fn read(&self) -> Option<StatsDocument> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read statistics file");
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "statistics file is not valid JSON");
                None
            }
        }
    }

    /// Replace the document wholesale.
    pub async fn replace(&self, doc: StatsDocument) -> Result<StatsDocument, ApiError> {
        let _guard = self.lock.lock().await;
        self.write_locked(doc).await
    }

    /// Load the current document (or start fresh), apply `mutate`, persist.
    pub async fn update_with<F>(&self, mutate: F) -> Result<StatsDocument, ApiError>
    where
        F: FnOnce(&mut StatsDocument),
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await.unwrap_or_default();
        mutate(&mut doc);
        self.write_locked(doc).await
    }

    async fn write_locked(&self, mut doc: StatsDocument) -> Result<StatsDocument, ApiError> {
        doc.ultima_atualizacao = Some(Utc::now().to_rfc3339());

        if let Some(parent) = self.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!(path = %self.path.display(), error = %e, "failed to create data directory");
                return Err(ApiError::Processing("Erro ao salvar dados".into()));
            }
        }

        let raw = serde_json::to_vec_pretty(&doc)
            .map_err(|_| ApiError::Processing("Erro ao salvar dados".into()))?;

        if let Err(e) = tokio::fs::write(&self.path, raw).await {
            error!(path = %self.path.display(), error = %e, "failed to write statistics file");
            return Err(ApiError::Processing("Erro ao salvar dados".into()));
        }

        Ok(doc)
    }
}
