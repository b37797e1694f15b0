//! Hunt cycle: search every (location, keyword) pair, then filter, rank and
//! dispatch the results.
//!
//! Flow: load ledger → search → normalize → dedup → filter → rank → dispatch.
//!
//! Nothing inside the cycle is fatal. A failed search counts as a failed
//! search, a malformed listing as a discard, a ledger write failure as a
//! dispatch failure. Only loading the ledger up front can abort a run.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{BatchMode, SearchCriteria};
use crate::errors::AppError;
use crate::ledger::{recorded_on_day, ApplicationLedger};
use crate::listings::transport::TransportError;
use crate::listings::{FetchError, ListingsClient};
use crate::models::listing::{ListingRecord, RawListing};
use crate::pipeline::dispatch::{DispatchSummary, Dispatcher};
use crate::pipeline::filter::FilterStage;
use crate::pipeline::normalizer::normalize;
use crate::pipeline::ranking::Ranker;

// ────────────────────────────────────────────────────────────────────────────
// Run report
// ────────────────────────────────────────────────────────────────────────────

/// Totals for one hunt cycle, printed when the run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuntSummary {
    pub run_id: Uuid,
    pub searches: usize,
    pub failed_searches: usize,
    /// Raw listings returned by successful searches.
    pub found: usize,
    /// Raw listings dropped by the normalizer.
    pub discarded: usize,
    /// Listings seen more than once in this run (same id).
    pub duplicates: usize,
    /// Listings that passed the filter stage.
    pub filtered: usize,
    pub ranked: usize,
    pub dispatch: DispatchSummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct JobHunter {
    client: ListingsClient,
    filter: FilterStage,
    ranker: Ranker,
    dispatcher: Dispatcher,
    ledger: Arc<dyn ApplicationLedger>,
    criteria: SearchCriteria,
    batch_mode: BatchMode,
}

/// Mutable state carried across batches of one run.
struct RunState {
    run_id: Uuid,
    processed: HashSet<String>,
    seen: HashSet<String>,
    budget: usize,
    summary: HuntSummary,
}

impl JobHunter {
    pub fn new(
        client: ListingsClient,
        ranker: Ranker,
        dispatcher: Dispatcher,
        ledger: Arc<dyn ApplicationLedger>,
        criteria: SearchCriteria,
        batch_mode: BatchMode,
    ) -> Self {
        Self {
            client,
            filter: FilterStage::new(&criteria),
            ranker,
            dispatcher,
            ledger,
            criteria,
            batch_mode,
        }
    }

    /// Runs one full hunt cycle.
    pub async fn hunt(&self) -> Result<HuntSummary, AppError> {
        let run_id = Uuid::new_v4();
        let history = self.ledger.load().await?;

        let recorded_today = recorded_on_day(&history, Utc::now());
        let budget = self
            .criteria
            .max_applications_per_day
            .saturating_sub(recorded_today);
        info!(
            "Starting hunt {run_id}: {} locations x {} keywords, {} ledger records, budget {budget} for today",
            self.criteria.locations.len(),
            self.criteria.keywords.len(),
            history.len()
        );

        let mut state = RunState {
            run_id,
            processed: history.into_iter().map(|r| r.id).collect(),
            seen: HashSet::new(),
            budget,
            summary: HuntSummary {
                run_id,
                ..HuntSummary::default()
            },
        };

        for pairs in self.batches() {
            let results = self.run_searches(&pairs).await;
            let mut candidates = Vec::new();

            for ((location, keyword), result) in pairs.iter().zip(results) {
                state.summary.searches += 1;
                match result {
                    Ok(raw) => {
                        state.summary.found += raw.len();
                        self.collect(&raw, &mut state, &mut candidates);
                    }
                    Err(e) => {
                        warn!("Error searching for '{keyword}' in '{location}': {e}");
                        state.summary.failed_searches += 1;
                    }
                }
            }

            self.process_batch(candidates, &mut state).await;
        }

        let summary = state.summary;
        info!(
            "Hunt {run_id} finished: {} ready to apply, {} to review",
            summary.dispatch.ready_to_apply, summary.dispatch.to_review
        );
        Ok(summary)
    }

    /// (location, keyword) pairs grouped by batch, in configured order.
    fn batches(&self) -> Vec<Vec<(String, String)>> {
        let pairs_for = |location: &String| {
            self.criteria
                .keywords
                .iter()
                .map(|keyword| (location.clone(), keyword.clone()))
                .collect::<Vec<_>>()
        };

        match self.batch_mode {
            BatchMode::All => vec![self.criteria.locations.iter().flat_map(pairs_for).collect()],
            BatchMode::PerLocation => self.criteria.locations.iter().map(pairs_for).collect(),
        }
    }

    /// Runs the searches for `pairs`, returning results in the same order.
    async fn run_searches(
        &self,
        pairs: &[(String, String)],
    ) -> Vec<Result<Vec<RawListing>, FetchError>> {
        let concurrency = self.client.concurrency();

        if concurrency <= 1 {
            let mut results = Vec::with_capacity(pairs.len());
            for (location, keyword) in pairs {
                info!("Searching for '{keyword}' in '{location}'");
                results.push(self.client.search(keyword, location).await);
            }
            return results;
        }

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();
        for (index, (location, keyword)) in pairs.iter().cloned().enumerate() {
            let client = self.client.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                info!("Searching for '{keyword}' in '{location}'");
                (index, client.search(&keyword, &location).await)
            });
        }

        let mut slots: Vec<Option<Result<Vec<RawListing>, FetchError>>> =
            (0..pairs.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!("Search task panicked: {e}"),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(FetchError::Transport(TransportError(
                        "search task did not complete".to_string(),
                    )))
                })
            })
            .collect()
    }

    /// Normalizes raw listings into `candidates`, dropping repeats within the run.
    fn collect(&self, raw: &[RawListing], state: &mut RunState, candidates: &mut Vec<ListingRecord>) {
        for listing in raw {
            match normalize(listing, self.client.source()) {
                Ok(record) => {
                    if state.seen.insert(record.id.clone()) {
                        candidates.push(record);
                    } else {
                        state.summary.duplicates += 1;
                    }
                }
                Err(e) => {
                    debug!("Discarding listing: {e}");
                    state.summary.discarded += 1;
                }
            }
        }
    }

    async fn process_batch(&self, candidates: Vec<ListingRecord>, state: &mut RunState) {
        if candidates.is_empty() {
            return;
        }

        let filtered = self.filter.filter(candidates, &state.processed);
        state.summary.filtered += filtered.len();

        let ranked = self.ranker.rank(filtered);
        state.summary.ranked += ranked.len();

        let outcome = self
            .dispatcher
            .dispatch(&ranked, state.budget, self.criteria.auto_apply, state.run_id)
            .await;

        state.budget = state.budget.saturating_sub(outcome.dispatched());
        state.processed.extend(outcome.processed_ids.iter().cloned());
        state.summary.dispatch.merge(outcome);
    }
}
