use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ledger::ApplicationLedger;
use crate::letters::{LetterError, LetterGenerator, LetterStore};
use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::models::listing::RankedListing;

/// Counts from one dispatch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub ready_to_apply: usize,
    pub to_review: usize,
    pub letter_failures: usize,
    pub ledger_failures: usize,
    /// Listings skipped because the ledger already held their id.
    pub already_recorded: usize,
    /// Ids handled in this pass, recorded or not.
    pub processed_ids: Vec<String>,
}

impl DispatchSummary {
    pub fn dispatched(&self) -> usize {
        self.ready_to_apply + self.to_review
    }

    pub fn merge(&mut self, other: DispatchSummary) {
        self.ready_to_apply += other.ready_to_apply;
        self.to_review += other.to_review;
        self.letter_failures += other.letter_failures;
        self.ledger_failures += other.ledger_failures;
        self.already_recorded += other.already_recorded;
        self.processed_ids.extend(other.processed_ids);
    }
}

/// Turns the top of the ranked queue into ledger records.
///
/// "Apply" stops at the ledger: a ReadyToApply record plus a saved cover
/// letter. Nothing is ever submitted to the job source.
pub struct Dispatcher {
    ledger: Arc<dyn ApplicationLedger>,
    generator: Arc<dyn LetterGenerator>,
    store: Arc<dyn LetterStore>,
}

impl Dispatcher {
    pub fn new(
        ledger: Arc<dyn ApplicationLedger>,
        generator: Arc<dyn LetterGenerator>,
        store: Arc<dyn LetterStore>,
    ) -> Self {
        Self {
            ledger,
            generator,
            store,
        }
    }

    /// Dispatches at most `limit` listings from the front of `ranked`.
    pub async fn dispatch(
        &self,
        ranked: &[RankedListing],
        limit: usize,
        auto_apply: bool,
        run_id: Uuid,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for entry in ranked.iter().take(limit) {
            let listing = &entry.listing;
            summary.processed_ids.push(listing.id.clone());

            // another run may have recorded it since the ledger was loaded
            match self.ledger.contains(&listing.id).await {
                Ok(true) => {
                    debug!("Skipping {}: already in the ledger", listing.id);
                    summary.already_recorded += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => warn!("Ledger lookup failed for {}: {e}", listing.id),
            }

            let (status, cover_letter) = if auto_apply {
                info!(
                    "Preparing application for: {} at {} (match score {})",
                    listing.title, listing.company, entry.match_score
                );
                match self.prepare_letter(entry).await {
                    Ok(location) => (ApplicationStatus::ReadyToApply, Some(location)),
                    Err(e) => {
                        warn!(
                            "Cover letter failed for {} at {}, saving for review instead: {e}",
                            listing.title, listing.company
                        );
                        summary.letter_failures += 1;
                        (ApplicationStatus::ToReview, None)
                    }
                }
            } else {
                (ApplicationStatus::ToReview, None)
            };

            let record = ApplicationRecord {
                id: listing.id.clone(),
                title: listing.title.clone(),
                company: listing.company.clone(),
                recorded_at: Utc::now(),
                status,
                match_score: entry.match_score,
                application_url: listing.url.clone(),
                run_id,
                cover_letter,
            };

            if let Err(e) = self.ledger.append(record).await {
                warn!("Failed to record {} in the ledger: {e}", listing.id);
                summary.ledger_failures += 1;
                continue;
            }

            match status {
                ApplicationStatus::ReadyToApply => {
                    summary.ready_to_apply += 1;
                    info!("Job saved: {}", listing.url);
                }
                ApplicationStatus::ToReview => {
                    summary.to_review += 1;
                    info!(
                        "Saved job for review: {} at {}",
                        listing.title, listing.company
                    );
                }
            }
        }

        summary
    }

    async fn prepare_letter(&self, entry: &RankedListing) -> Result<String, LetterError> {
        let listing = &entry.listing;
        let text = self
            .generator
            .generate(&listing.title, &listing.company, &listing.description)?;
        info!("Generated custom cover letter");
        self.store.save(&listing.company, &listing.title, &text).await
    }
}
