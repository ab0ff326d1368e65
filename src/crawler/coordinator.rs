//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the run loop that coordinates all aspects of the
//! crawling process, including:
//! - Resolving and validating the seed
//! - Fetching the seed and filtering its links (discovery mode)
//! - Dispatching the work queue with bounded concurrency
//! - Routing each result to the artifact writer or the failure log
//! - Handling cancellation and the run timeout

use crate::crawler::phase::CrawlPhase;
use crate::crawler::{CrawlSettings, Seed};
use crate::fetch::{FetchEngine, FetchOptions, FetchResult};
use crate::output::{ArtifactWriter, FailedTarget, FailureKind, RunSummary, SavedArtifact};
use crate::url::{filter_links, normalize_target, TargetSet};
use crate::{ConfigError, ScribeError};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::{CancellationToken, DropGuard};
use url::Url;

/// The seed after validation
#[derive(Debug, Clone)]
enum ResolvedSeed {
    Domain { seed: Url, scope_prefix: String },
    List(TargetSet),
}

/// Failures appended concurrently by fetch tasks, tagged with dispatch index
#[derive(Debug, Clone, Default)]
struct FailureLog {
    entries: Arc<Mutex<Vec<(usize, FailedTarget)>>>,
}

impl FailureLog {
    fn record(&self, index: usize, url: &str, kind: FailureKind, reason: impl Into<String>) {
        let failure = FailedTarget {
            url: url.to_string(),
            kind,
            reason: reason.into(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((index, failure));
    }

    /// Takes every recorded failure, in dispatch order
    fn drain_sorted(&self) -> Vec<FailedTarget> {
        let mut entries =
            std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner));
        entries.sort_by_key(|(index, _)| *index);
        entries.into_iter().map(|(_, failure)| failure).collect()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    settings: CrawlSettings,
    engine: Arc<dyn FetchEngine>,
    writer: ArtifactWriter,
    resolved: ResolvedSeed,
    phase: CrawlPhase,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// The seed is validated here, so a malformed URL fails before anything
    /// is fetched.
    ///
    /// # Arguments
    ///
    /// * `settings` - The run settings
    /// * `engine` - The fetch engine every target is handed to
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScribeError::MalformedSeed)` - A seed URL is not a valid HTTP(S) URL
    pub fn new(settings: CrawlSettings, engine: Arc<dyn FetchEngine>) -> Result<Self, ScribeError> {
        if settings.max_concurrency == 0 {
            return Err(ConfigError::Validation(
                "max_concurrency must be at least 1".to_string(),
            )
            .into());
        }

        let resolved = resolve_seed(&settings)?;
        let writer = ArtifactWriter::new(settings.output_dir.clone(), settings.extension.clone());

        Ok(Self {
            settings,
            engine,
            writer,
            resolved,
            phase: CrawlPhase::Idle,
            config_hash: None,
        })
    }

    /// Records the configuration hash in the run summary
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to completion
    pub async fn run(&mut self) -> Result<RunSummary, ScribeError> {
        self.run_with_cancel(CancellationToken::new()).await
    }

    /// Runs the crawl until it completes or `cancel` fires
    ///
    /// On cancellation in-flight fetches are aborted and every target that
    /// did not finish is reported as a cancelled failure. The summary is
    /// still returned.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run completed, possibly with page failures
    /// * `Err(ScribeError::SeedFetch)` - The discovery seed could not be fetched
    pub async fn run_with_cancel(
        &mut self,
        cancel: CancellationToken,
    ) -> Result<RunSummary, ScribeError> {
        let started_at = Utc::now();
        let mode = self.settings.seed.mode();
        tracing::info!("Writing pages to {}", self.writer.output_dir().display());

        let cancel = cancel.child_token();
        let _timeout_guard = self
            .settings
            .run_timeout
            .map(|timeout| arm_run_timeout(timeout, cancel.clone()));

        let mut artifacts: Vec<(usize, SavedArtifact)> = Vec::new();
        let failures = FailureLog::default();

        let (targets, first_index) = match self.resolved.clone() {
            ResolvedSeed::Domain { seed, scope_prefix } => {
                let queue = self
                    .fetch_seed(&seed, &scope_prefix, &cancel, &mut artifacts, &failures)
                    .await?;
                (queue, 1)
            }
            ResolvedSeed::List(targets) => {
                tracing::info!("Starting batch crawl of {} URLs", targets.len());
                (targets, 0)
            }
        };

        self.transition(CrawlPhase::FetchingBatch)?;
        let cancelled = self
            .dispatch_batch(targets, first_index, &cancel, &mut artifacts, &failures)
            .await;
        self.transition(CrawlPhase::Completed)?;

        artifacts.sort_by_key(|(index, _)| *index);
        let summary = RunSummary {
            mode,
            phase: self.phase,
            started_at,
            finished_at: Utc::now(),
            artifacts: artifacts.into_iter().map(|(_, a)| a).collect(),
            failures: failures.drain_sorted(),
            cancelled,
            config_hash: self.config_hash.clone(),
        };

        tracing::info!(
            "Crawl completed: {} attempted, {} succeeded, {} failed in {:.2}s",
            summary.attempted(),
            summary.succeeded(),
            summary.failed(),
            summary.duration_seconds()
        );

        Ok(summary)
    }

    /// Fetches the discovery seed, saves it and returns the filtered queue
    async fn fetch_seed(
        &mut self,
        seed: &Url,
        scope_prefix: &str,
        cancel: &CancellationToken,
        artifacts: &mut Vec<(usize, SavedArtifact)>,
        failures: &FailureLog,
    ) -> Result<TargetSet, ScribeError> {
        self.transition(CrawlPhase::FetchingSeed)?;

        let seed_url = seed.to_string();
        tracing::info!("Starting crawl for {}", seed_url);

        let options = self.fetch_options().with_links();
        let result = tokio::select! {
            result = self.engine.fetch(&seed_url, &options) => result,
            _ = cancel.cancelled() => FetchResult::failure(&seed_url, "cancelled"),
        };

        match result {
            FetchResult::Success { content, links, .. } => {
                // An unsaved seed still contributes its links
                if let Some(artifact) =
                    save_page(self.writer.clone(), &seed_url, 0, content, failures).await
                {
                    artifacts.push((0, artifact));
                }

                let discovered = links.unwrap_or_default();
                let queue = filter_links(&discovered, scope_prefix, &seed_url);
                tracing::info!(
                    "Found {} internal links to crawl ({} discovered)",
                    queue.len(),
                    discovered.len()
                );
                for target in queue.iter() {
                    tracing::debug!("Queued {}", target);
                }

                Ok(queue)
            }
            FetchResult::Failure { reason, .. } => {
                tracing::error!("Failed to crawl seed {}: {}", seed_url, reason);
                self.transition(CrawlPhase::FailedEarly)?;
                Err(ScribeError::SeedFetch {
                    url: seed_url,
                    reason,
                })
            }
        }
    }

    /// Dispatches every target with at most `max_concurrency` fetches in flight
    ///
    /// Targets are dispatched in set order; results are routed as they
    /// complete. Returns true if the run was cancelled.
    async fn dispatch_batch(
        &self,
        targets: TargetSet,
        first_index: usize,
        cancel: &CancellationToken,
        artifacts: &mut Vec<(usize, SavedArtifact)>,
        failures: &FailureLog,
    ) -> bool {
        let total = targets.len();
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrency));
        let options = self.fetch_options();

        let mut queue = targets
            .into_iter()
            .enumerate()
            .map(|(offset, url)| (first_index + offset, url))
            .peekable();
        let mut tasks: JoinSet<(usize, Option<SavedArtifact>)> = JoinSet::new();
        let mut pending: HashMap<usize, String> = HashMap::new();
        let mut cancelled = false;

        loop {
            let can_dispatch = !cancelled && queue.peek().is_some();
            if !can_dispatch && tasks.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled(), if !cancelled => {
                    tracing::warn!("Crawl cancelled with {} fetches in flight", tasks.len());
                    cancelled = true;
                    tasks.abort_all();
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    match joined {
                        Ok((index, saved)) => {
                            pending.remove(&index);
                            if let Some(artifact) = saved {
                                artifacts.push((index, artifact));
                            }
                        }
                        Err(e) if e.is_panic() => tracing::error!("Fetch task panicked: {}", e),
                        Err(_) => {}
                    }
                }

                permit = semaphore.clone().acquire_owned(), if can_dispatch => {
                    let Ok(permit) = permit else { break };
                    if let Some((index, url)) = queue.next() {
                        tracing::debug!("Dispatching {} ({}/{})", url, index - first_index + 1, total);
                        pending.insert(index, url.clone());
                        tasks.spawn(process_target(
                            Arc::clone(&self.engine),
                            self.writer.clone(),
                            url,
                            index,
                            options,
                            permit,
                            failures.clone(),
                        ));
                    }
                }

                else => break,
            }
        }

        let mut unfinished: Vec<(usize, String)> = pending.into_iter().collect();
        unfinished.sort_by_key(|(index, _)| *index);
        for (index, url) in unfinished {
            if cancelled {
                failures.record(index, &url, FailureKind::Cancelled, "cancelled");
            } else {
                failures.record(index, &url, FailureKind::PageFetch, "fetch task ended unexpectedly");
            }
        }

        for (index, url) in queue {
            failures.record(index, &url, FailureKind::Cancelled, "cancelled before dispatch");
        }

        cancelled
    }

    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            bypass_cache: self.settings.bypass_cache,
            headless: self.settings.headless,
            discover_links: false,
        }
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), ScribeError> {
        if !self.phase.can_transition_to(next) {
            return Err(ScribeError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!("Crawl phase: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Validates the configured seed and builds the initial target set
fn resolve_seed(settings: &CrawlSettings) -> Result<ResolvedSeed, ScribeError> {
    match &settings.seed {
        Seed::Domain(raw) => {
            let seed = parse_seed(raw)?;
            let scope_prefix = match &settings.scope_prefix {
                Some(prefix) => parse_seed(prefix)?.to_string(),
                None => seed.to_string(),
            };
            Ok(ResolvedSeed::Domain { seed, scope_prefix })
        }
        Seed::List(urls) => {
            let mut targets = TargetSet::new();
            for raw in urls {
                if !targets.insert(parse_seed(raw)?) {
                    tracing::debug!("Skipping duplicate target {}", raw);
                }
            }
            Ok(ResolvedSeed::List(targets))
        }
    }
}

fn parse_seed(raw: &str) -> Result<Url, ScribeError> {
    normalize_target(raw).map_err(|e| ScribeError::MalformedSeed {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Cancels `cancel` after `timeout` unless the returned guard is dropped first
fn arm_run_timeout(timeout: Duration, cancel: CancellationToken) -> DropGuard {
    let disarm = CancellationToken::new();
    let guard = disarm.clone().drop_guard();

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!("Run timeout of {:?} reached, cancelling", timeout);
                cancel.cancel();
            }
            _ = disarm.cancelled() => {}
        }
    });

    guard
}

/// Fetches one target and routes its result
///
/// The concurrency permit is released as soon as the fetch resolves, so
/// writes never hold up the next fetch.
async fn process_target(
    engine: Arc<dyn FetchEngine>,
    writer: ArtifactWriter,
    url: String,
    index: usize,
    options: FetchOptions,
    permit: OwnedSemaphorePermit,
    failures: FailureLog,
) -> (usize, Option<SavedArtifact>) {
    let result = engine.fetch(&url, &options).await;
    drop(permit);

    match result {
        FetchResult::Success { content, .. } => {
            (index, save_page(writer, &url, index, content, &failures).await)
        }
        FetchResult::Failure { reason, .. } => {
            tracing::warn!("Failed: {} - Error: {}", url, reason);
            failures.record(index, &url, FailureKind::PageFetch, reason);
            (index, None)
        }
    }
}

/// Saves a fetched page, recording why when it yields no artifact
///
/// A page that rendered to no content is skipped rather than written.
async fn save_page(
    writer: ArtifactWriter,
    url: &str,
    index: usize,
    content: String,
    failures: &FailureLog,
) -> Option<SavedArtifact> {
    if content.trim().is_empty() {
        tracing::warn!("Skipping {}: page rendered to no content", url);
        failures.record(index, url, FailureKind::EmptyContent, "empty content");
        return None;
    }

    match persist_artifact(writer, url.to_string(), content).await {
        Ok(path) => Some(SavedArtifact {
            url: url.to_string(),
            path,
        }),
        Err(reason) => {
            tracing::warn!("Failed to save {}: {}", url, reason);
            failures.record(index, url, FailureKind::Write, reason);
            None
        }
    }
}

/// Writes an artifact on the blocking pool
async fn persist_artifact(
    writer: ArtifactWriter,
    url: String,
    content: String,
) -> Result<PathBuf, String> {
    tokio::task::spawn_blocking(move || writer.write(&url, &content))
        .await
        .map_err(|e| format!("write task failed: {}", e))?
        .map_err(|e| e.to_string())
}
