//! Two-stage concurrent detection pipeline.
//!
//! Stage A: reader workers, each owning a disjoint partition of the corpus
//! files, stream records into signatures and push `(document, band key)`
//! observations onto one bounded channel per band. Stage B: exactly one
//! worker per band, each exclusively owning its [`BandStore`], forwards
//! emitted candidate edges to the aggregating coordinator.
//!
//! Termination is an explicit counted handshake: every reader sends
//! `ReaderDone` on every band channel when its partition is exhausted, and a
//! band worker finishes only after hearing from every reader; it then sends
//! `BandDone` to the coordinator. A channel that disconnects before its
//! count completes means a worker died, which is reported as an error — the
//! coordinator never infers completion from an idle channel, and never
//! hangs waiting for a signal that cannot come.
//!
//! Channels are bounded, so slow band workers exert backpressure on the
//! readers instead of letting queues grow with the corpus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use cluster::resolve;
use corpus::{Corpus, DocumentId};
use lsh::{BandStore, CandidateEdge, EdgeSet};
use serde::{Deserialize, Serialize};
use signature::{signature_for_text, BandKey, SignatureConfig};
use tracing::{debug, info, warn};

use crate::{PipelineError, RunReport, RunSummary};

/// Full configuration for one deduplication run: the signature parameters
/// plus the runtime knobs. Recorded in the run summary — every field
/// affects either which pairs are found or how fast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DedupConfig {
    /// Shingling / MinHash / banding parameters.
    pub signature: SignatureConfig,
    /// Number of stage-A reader workers. Stage B always runs one worker per
    /// band.
    pub reader_workers: usize,
    /// Capacity of each bounded channel between the stages.
    pub channel_capacity: usize,
    /// Upper bound on distinct keys per band store; `None` means unbounded.
    /// Exceeding the bound aborts the run rather than exhausting memory.
    pub max_band_keys: Option<usize>,
}

impl DedupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signature(mut self, signature: SignatureConfig) -> Self {
        self.signature = signature;
        self
    }

    pub fn with_reader_workers(mut self, workers: usize) -> Self {
        self.reader_workers = workers;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_max_band_keys(mut self, max: Option<usize>) -> Self {
        self.max_band_keys = max;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.signature.validate()?;
        if self.reader_workers < 1 {
            return Err(PipelineError::InvalidConfig(
                "reader_workers must be >= 1".into(),
            ));
        }
        if self.channel_capacity < 1 {
            return Err(PipelineError::InvalidConfig(
                "channel_capacity must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            signature: SignatureConfig::default(),
            reader_workers: 4,
            channel_capacity: 1024,
            max_band_keys: None,
        }
    }
}

/// Shared run-level cancellation flag.
///
/// Observed at every blocking point: readers stop producing, band workers
/// keep draining so no bounded send deadlocks, and everyone still completes
/// the closing handshake before exiting.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

enum BandMessage {
    Observe(DocumentId, BandKey),
    ReaderDone,
}

enum EdgeMessage {
    Edge(CandidateEdge),
    BandDone,
    Fault(PipelineError),
}

#[derive(Debug, Default, Clone, Copy)]
struct ReaderCounts {
    documents: u64,
    empty: u64,
}

/// Run near-duplicate detection over the corpus and resolve the result into
/// a [`crate::DuplicateIndex`].
///
/// Deterministic for a fixed config and input set regardless of worker
/// count or scheduling: arrival order affects only which document occupies
/// a band slot, never which pairs are eventually found, and representative
/// selection happens after the run-level barrier.
pub fn detect_duplicates(
    corpus: &dyn Corpus,
    cfg: &DedupConfig,
    cancel: &CancellationToken,
) -> Result<RunReport, PipelineError> {
    cfg.validate()?;
    let started = Instant::now();

    let files = corpus.files()?;
    let band_count = cfg.signature.band_count;
    let reader_count = cfg.reader_workers.min(files.len()).max(1);

    info!(
        files = files.len(),
        readers = reader_count,
        bands = band_count,
        "starting near-duplicate detection"
    );

    let mut band_senders: Vec<SyncSender<BandMessage>> = Vec::with_capacity(band_count);
    let mut band_receivers: Vec<Receiver<BandMessage>> = Vec::with_capacity(band_count);
    for _ in 0..band_count {
        let (tx, rx) = sync_channel(cfg.channel_capacity);
        band_senders.push(tx);
        band_receivers.push(rx);
    }
    let (edge_tx, edge_rx) = sync_channel::<EdgeMessage>(cfg.channel_capacity);

    let (edges, documents_seen, empty_documents) = thread::scope(|scope| {
        let band_handles: Vec<_> = band_receivers
            .into_iter()
            .map(|rx| {
                let edge_tx = edge_tx.clone();
                let cancel = cancel.clone();
                let max_keys = cfg.max_band_keys;
                scope.spawn(move || band_worker(rx, edge_tx, reader_count, max_keys, cancel))
            })
            .collect();
        // Only band workers may hold edge senders; the coordinator detects
        // their exit through disconnect.
        drop(edge_tx);

        let reader_handles: Vec<_> = (0..reader_count)
            .map(|worker| {
                let partition: Vec<Arc<str>> = files
                    .iter()
                    .skip(worker)
                    .step_by(reader_count)
                    .cloned()
                    .collect();
                let senders = band_senders.clone();
                let cancel = cancel.clone();
                let sig_cfg = &cfg.signature;
                scope.spawn(move || reader_worker(corpus, partition, senders, sig_cfg, cancel))
            })
            .collect();
        drop(band_senders);

        // Aggregate candidate edges on this thread until every band store
        // reports completion — the run-level barrier before resolution.
        let mut edges = EdgeSet::new();
        let mut bands_done = 0;
        let mut fault: Option<PipelineError> = None;
        while bands_done < band_count {
            match edge_rx.recv() {
                Ok(EdgeMessage::Edge(edge)) => {
                    edges.insert(edge);
                }
                Ok(EdgeMessage::BandDone) => bands_done += 1,
                Ok(EdgeMessage::Fault(err)) => {
                    cancel.cancel();
                    fault.get_or_insert(err);
                }
                // Every band worker exited; the joins below explain why.
                Err(_) => break,
            }
        }

        let mut documents_seen = 0u64;
        let mut empty_documents = 0u64;
        for handle in reader_handles {
            match handle.join() {
                Ok(Ok(counts)) => {
                    documents_seen += counts.documents;
                    empty_documents += counts.empty;
                }
                Ok(Err(err)) => {
                    fault.get_or_insert(err);
                }
                Err(_) => {
                    fault.get_or_insert(PipelineError::WorkerPanicked { stage: "reader" });
                }
            }
        }
        for handle in band_handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    fault.get_or_insert(err);
                }
                Err(_) => {
                    fault.get_or_insert(PipelineError::WorkerPanicked { stage: "band" });
                }
            }
        }

        if let Some(err) = fault {
            return Err(err);
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        if bands_done < band_count {
            return Err(PipelineError::WorkerLost { stage: "band" });
        }
        Ok((edges, documents_seen, empty_documents))
    })?;

    let candidate_edges = edges.len() as u64;
    let index = resolve(&edges);

    let summary = RunSummary {
        documents_seen,
        empty_documents,
        candidate_edges,
        duplicate_clusters: index.cluster_count() as u64,
        documents_flagged: index.dropped_documents() as u64,
        elapsed_ms: started.elapsed().as_millis() as u64,
        config: cfg.clone(),
    };
    info!(
        documents = summary.documents_seen,
        edges = summary.candidate_edges,
        clusters = summary.duplicate_clusters,
        flagged = summary.documents_flagged,
        elapsed_ms = summary.elapsed_ms,
        "detection finished"
    );

    Ok(RunReport { index, summary })
}

fn reader_worker(
    corpus: &dyn Corpus,
    partition: Vec<Arc<str>>,
    band_senders: Vec<SyncSender<BandMessage>>,
    cfg: &SignatureConfig,
    cancel: CancellationToken,
) -> Result<ReaderCounts, PipelineError> {
    let mut counts = ReaderCounts::default();
    let mut failure: Option<PipelineError> = None;

    'files: for file in partition {
        if cancel.is_cancelled() {
            break;
        }
        let records = match corpus.open(&file) {
            Ok(records) => records,
            Err(err) => {
                cancel.cancel();
                failure = Some(err.into());
                break;
            }
        };
        debug!(file = %file, "reading source file");
        for record in records {
            if cancel.is_cancelled() {
                break 'files;
            }
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    cancel.cancel();
                    failure = Some(err.into());
                    break 'files;
                }
            };
            let doc = match DocumentId::new(&file, record.record_offset) {
                Ok(doc) => doc,
                Err(err) => {
                    cancel.cancel();
                    failure = Some(err.into());
                    break 'files;
                }
            };
            counts.documents += 1;

            let sig = match signature_for_text(&record.text, cfg) {
                Ok(sig) => sig,
                Err(err) => {
                    cancel.cancel();
                    failure = Some(err.into());
                    break 'files;
                }
            };
            if sig.is_empty() {
                // Empty documents all share the sentinel signature; banding
                // them would pair every empty document with every other.
                counts.empty += 1;
                continue;
            }

            for (band, key) in sig.band_keys(cfg).into_iter().enumerate() {
                if band_senders[band]
                    .send(BandMessage::Observe(doc.clone(), key))
                    .is_err()
                {
                    // Consumer is gone; another failure is unwinding the run.
                    break 'files;
                }
            }
        }
    }

    // Counted closing handshake — sent even on early exit so no consumer
    // waits on a signal that will never come.
    for sender in &band_senders {
        let _ = sender.send(BandMessage::ReaderDone);
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(counts),
    }
}

fn band_worker(
    rx: Receiver<BandMessage>,
    edge_tx: SyncSender<EdgeMessage>,
    reader_count: usize,
    max_keys: Option<usize>,
    cancel: CancellationToken,
) -> Result<(), PipelineError> {
    let mut store = BandStore::with_capacity_limit(max_keys);
    let mut readers_done = 0;
    let mut outcome = Ok(());

    while readers_done < reader_count {
        match rx.recv() {
            Ok(BandMessage::Observe(doc, key)) => {
                if cancel.is_cancelled() {
                    // Keep draining so producers never block on a full
                    // channel during shutdown.
                    continue;
                }
                match store.observe(&doc, key) {
                    Ok(Some(edge)) => {
                        if edge_tx.send(EdgeMessage::Edge(edge)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(%err, keys = store.len(), "band store fault; aborting run");
                        cancel.cancel();
                        let err = PipelineError::from(err);
                        let _ = edge_tx.send(EdgeMessage::Fault(err.clone()));
                        outcome = Err(err);
                        break;
                    }
                }
            }
            Ok(BandMessage::ReaderDone) => readers_done += 1,
            Err(_) => {
                // Producers vanished without completing the handshake.
                if !cancel.is_cancelled() {
                    outcome = Err(PipelineError::WorkerLost { stage: "reader" });
                }
                break;
            }
        }
    }

    let _ = edge_tx.send(EdgeMessage::BandDone);
    outcome
}
