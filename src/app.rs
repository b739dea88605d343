use std::time::Duration;

use serde::Serialize;

use crate::error::MirrorError;
use crate::psychonaut::PsychonautClient;
use crate::store::SubstanceStore;
use crate::transform::transform;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub found: usize,
    pub upserted: usize,
    pub failures: Vec<RecordFailure>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    pub name: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<P: PsychonautClient, S: SubstanceStore> {
    catalog: P,
    store: S,
}

impl<P: PsychonautClient, S: SubstanceStore> App<P, S> {
    pub fn new(catalog: P, store: S) -> Self {
        Self { catalog, store }
    }

    pub fn run(
        &self,
        options: SyncOptions,
        sink: &dyn ProgressSink,
    ) -> Result<SyncResult, MirrorError> {
        sink.event(ProgressEvent {
            message: "phase=Fetch; querying substance catalog".to_string(),
            elapsed: None,
        });
        sink.event(ProgressEvent {
            message: "catalog.request".to_string(),
            elapsed: None,
        });
        let start = std::time::Instant::now();
        let substances = self.catalog.fetch_substances()?;
        let latency = start.elapsed().as_millis();
        sink.event(ProgressEvent {
            message: format!("catalog.response latency_ms={latency}"),
            elapsed: None,
        });

        let found = substances.len();
        sink.event(ProgressEvent {
            message: format!("phase=Store; found {found} substances; updating store"),
            elapsed: None,
        });

        let mut upserted = 0usize;
        let mut failures = Vec::new();
        for raw in substances {
            let raw_name = raw.name.clone();
            let record = match transform(raw) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!("skipping record: {err}");
                    sink.event(ProgressEvent {
                        message: format!("phase=Store; skipped record: {err}"),
                        elapsed: None,
                    });
                    failures.push(RecordFailure {
                        name: raw_name,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if options.dry_run {
                upserted += 1;
                continue;
            }

            match self.store.upsert(&record) {
                Ok(()) => upserted += 1,
                Err(err) => {
                    tracing::warn!("upsert failed: {err}");
                    sink.event(ProgressEvent {
                        message: format!("phase=Store; {err}"),
                        elapsed: None,
                    });
                    failures.push(RecordFailure {
                        name: Some(record.name.as_str().to_string()),
                        reason: err.to_string(),
                    });
                }
            }
        }

        sink.event(ProgressEvent {
            message: format!("phase=Done; sync complete ({upserted}/{found} upserted)"),
            elapsed: None,
        });

        Ok(SyncResult {
            found,
            upserted,
            failures,
            dry_run: options.dry_run,
        })
    }
}
