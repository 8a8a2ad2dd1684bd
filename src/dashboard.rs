use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::aggregate::aggregate_at;
use crate::certificates::{CertificateCounter, RequestDateCounter};
use crate::error::LoadResult;
use crate::models::Snapshot;
use crate::normalize::normalize;
use crate::parse::parse_rows;
use crate::source::SheetSource;

/// Runs parse, normalize and aggregate over one CSV document.
pub fn build_snapshot(source: &str, text: &str, at: DateTime<Utc>) -> LoadResult<Snapshot> {
    let rows = parse_rows(text)?;
    let records = normalize(&rows);
    let (kpis, distributions) = aggregate_at(&records, at);
    let certificates = RequestDateCounter::new(&records, at.date_naive()).counts();

    Ok(Snapshot {
        run_id: Uuid::new_v4(),
        source: source.to_string(),
        records,
        kpis,
        distributions,
        certificates,
    })
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Updated(Arc<Snapshot>),
    /// Another run was already in flight; its result will be published instead.
    Coalesced,
}

/// Owns the last published snapshot for one sheet source.
///
/// Only one pipeline run is in flight at a time, and a snapshot is published
/// only after a run completes. A failed run leaves the previous snapshot in
/// place and records the error.
pub struct Dashboard {
    source: SheetSource,
    current: RwLock<Option<Arc<Snapshot>>>,
    last_error: RwLock<Option<String>>,
    in_flight: Mutex<()>,
}

impl Dashboard {
    pub fn new(source: SheetSource) -> Self {
        Self {
            source,
            current: RwLock::new(None),
            last_error: RwLock::new(None),
            in_flight: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &SheetSource {
        &self.source
    }

    /// Runs the pipeline, waiting for any run already in flight to finish first.
    pub async fn load(&self) -> LoadResult<Arc<Snapshot>> {
        let _guard = self.in_flight.lock().await;
        self.run().await
    }

    /// Runs the pipeline unless one is already in flight.
    pub async fn refresh(&self) -> LoadResult<RefreshOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("refresh coalesced into the run already in flight");
            return Ok(RefreshOutcome::Coalesced);
        };
        self.run().await.map(RefreshOutcome::Updated)
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Message of the most recent failed run, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn run(&self) -> LoadResult<Arc<Snapshot>> {
        let label = self.source.label();
        let outcome = match self.source.fetch_text().await {
            Ok(text) => build_snapshot(&label, &text, Utc::now()),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                tracing::info!(
                    run_id = %snapshot.run_id,
                    students = snapshot.kpis.total_alunos,
                    "loaded {} student records",
                    snapshot.records.len()
                );
                *self
                    .current
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(snapshot.clone());
                *self
                    .last_error
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
                Ok(snapshot)
            }
            Err(err) => {
                tracing::warn!(source = %label, "sheet load failed: {}", err);
                *self
                    .last_error
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(err.to_string());
                Err(err)
            }
        }
    }
}
