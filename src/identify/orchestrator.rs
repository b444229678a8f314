use std::any::Any;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error};

use crate::buffer::{Buffer, BufferError, BufferLimits};
use crate::core::identification::{sort_by_confidence, Identification};
use crate::identify::Identifier;

/// Default capacity of the result channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 4;

#[derive(Error, Debug)]
pub enum IdentifyError {
    #[error("Failed to read input: {0}")]
    Input(#[from] BufferError),

    #[error("Identification supervisor failed: {0}")]
    Task(#[from] JoinError),
}

/// Configuration for the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Capacity of the bounded result channel (at least 1)
    pub channel_capacity: usize,
    /// Head and tail windows kept from each input
    pub buffer_limits: BufferLimits,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            buffer_limits: BufferLimits::default(),
        }
    }
}

impl OrchestratorConfig {
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_buffer_limits(mut self, limits: BufferLimits) -> Self {
        self.buffer_limits = limits;
        self
    }
}

/// Summary of one identification call, available once every identifier finished
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Number of identifiers that were run
    pub identifiers: usize,
    /// Identifications accepted by the channel
    pub delivered: usize,
    /// Names of identifiers that panicked
    pub failed: Vec<String>,
    /// The stream was dropped before every result was delivered
    pub abandoned: bool,
}

#[derive(Debug, Default)]
struct WorkerOutcome {
    delivered: usize,
    abandoned: bool,
}

/// Results of one identification call.
///
/// The stream ends once every identifier has finished. Dropping it (or
/// calling [`finish`](Self::finish) early) makes the remaining sends fail,
/// and the workers stop instead of blocking.
#[derive(Debug)]
pub struct IdentificationStream {
    receiver: mpsc::Receiver<Identification>,
    supervisor: JoinHandle<RunReport>,
}

impl IdentificationStream {
    /// Next identification, or `None` once every identifier has finished
    pub async fn next(&mut self) -> Option<Identification> {
        self.receiver.recv().await
    }

    /// Drain the stream, then wait for the run report
    ///
    /// # Errors
    ///
    /// Returns `IdentifyError::Task` if the supervisor task itself failed.
    pub async fn collect(mut self) -> Result<(Vec<Identification>, RunReport), IdentifyError> {
        let mut identifications = Vec::new();
        while let Some(identification) = self.receiver.recv().await {
            identifications.push(identification);
        }
        let report = self.supervisor.await?;
        Ok((identifications, report))
    }

    /// Stop receiving and wait for every identifier to finish
    ///
    /// # Errors
    ///
    /// Returns `IdentifyError::Task` if the supervisor task itself failed.
    pub async fn finish(self) -> Result<RunReport, IdentifyError> {
        drop(self.receiver);
        Ok(self.supervisor.await?)
    }
}

/// Runs a set of identifiers concurrently over one input per call
#[derive(Clone, Default)]
pub struct Orchestrator {
    identifiers: Vec<Arc<dyn Identifier>>,
    config: OrchestratorConfig,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("identifiers", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

impl Orchestrator {
    #[must_use]
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            identifiers: Vec::new(),
            config,
        }
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Identifier + 'static) -> Self {
        self.add_identifier(Arc::new(identifier));
        self
    }

    /// Register an identifier that may be shared with other orchestrators
    pub fn add_identifier(&mut self, identifier: Arc<dyn Identifier>) {
        self.identifiers.push(identifier);
    }

    /// Names of the registered identifiers, in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.identifiers.iter().map(|i| i.name()).collect()
    }

    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Read `reader` into a buffer, then identify it.
    ///
    /// The input is read completely before any identifier starts, so a read
    /// failure is reported here and no stream is produced.
    ///
    /// # Errors
    ///
    /// Returns `IdentifyError::Input` if the source cannot be read.
    pub async fn identify<R: AsyncRead + Unpin>(
        &self,
        reader: R,
        filename: Option<&str>,
    ) -> Result<IdentificationStream, IdentifyError> {
        let buffer = Buffer::from_async_reader(reader, self.config.buffer_limits).await?;
        Ok(self.identify_buffer(buffer, filename))
    }

    /// Identify an already populated buffer.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn identify_buffer(&self, buffer: Buffer, filename: Option<&str>) -> IdentificationStream {
        let (sender, receiver) = mpsc::channel(self.config.channel_capacity.max(1));
        let supervisor = tokio::spawn(supervise(
            self.identifiers.clone(),
            Arc::new(buffer),
            filename.map(Arc::from),
            sender,
        ));
        IdentificationStream {
            receiver,
            supervisor,
        }
    }
}

async fn supervise(
    identifiers: Vec<Arc<dyn Identifier>>,
    buffer: Arc<Buffer>,
    filename: Option<Arc<str>>,
    sender: mpsc::Sender<Identification>,
) -> RunReport {
    debug!(
        "Running {} identifiers over {} bytes",
        identifiers.len(),
        buffer.len()
    );

    let workers: Vec<(String, JoinHandle<WorkerOutcome>)> = identifiers
        .into_iter()
        .map(|identifier| {
            let name = identifier.name().to_string();
            let buffer = Arc::clone(&buffer);
            let filename = filename.clone();
            let sender = sender.clone();
            let handle = tokio::task::spawn_blocking(move || {
                run_worker(identifier.as_ref(), &buffer, filename.as_deref(), &sender)
            });
            (name, handle)
        })
        .collect();

    let mut report = RunReport {
        identifiers: workers.len(),
        ..RunReport::default()
    };

    for (name, handle) in workers {
        match handle.await {
            Ok(outcome) => {
                report.delivered += outcome.delivered;
                report.abandoned |= outcome.abandoned;
            }
            Err(err) => {
                let reason = failure_reason(err);
                error!("Identifier '{name}' failed: {reason}");
                let unknown = Identification::unknown(name.clone(), format!("identifier failed: {reason}"));
                if sender.send(unknown).await.is_ok() {
                    report.delivered += 1;
                } else {
                    report.abandoned = true;
                }
                report.failed.push(name);
            }
        }
    }

    if report.abandoned {
        debug!("Receiver dropped before all results were delivered");
    }
    // Last sender dropped here; the stream ends
    report
}

fn run_worker(
    identifier: &dyn Identifier,
    buffer: &Buffer,
    filename: Option<&str>,
    sender: &mpsc::Sender<Identification>,
) -> WorkerOutcome {
    let mut results = identifier.identify(buffer, filename);
    if results.is_empty() {
        results.push(Identification::unknown(
            identifier.name(),
            "no identification produced",
        ));
    }
    sort_by_confidence(&mut results);

    let mut outcome = WorkerOutcome::default();
    for identification in results {
        if sender.blocking_send(identification).is_err() {
            debug!("Receiver dropped; '{}' stops early", identifier.name());
            outcome.abandoned = true;
            break;
        }
        outcome.delivered += 1;
    }
    outcome
}

fn failure_reason(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic().as_ref())
    } else {
        err.to_string()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
