use crate::errors::AppError;
use crate::ledger::ApplicationLedger;
use crate::models::application::{ApplicationRecord, ApplicationStatus};

/// Ledger records in review order: ToReview first, then ReadyToApply, each
/// by match score descending. Ties keep ledger order.
pub async fn review_queue(ledger: &dyn ApplicationLedger) -> Result<Vec<ApplicationRecord>, AppError> {
    let mut records = ledger.load().await?;
    records.sort_by(|a, b| {
        status_rank(a.status)
            .cmp(&status_rank(b.status))
            .then(b.match_score.cmp(&a.match_score))
    });
    Ok(records)
}

fn status_rank(status: ApplicationStatus) -> u8 {
    match status {
        ApplicationStatus::ToReview => 0,
        ApplicationStatus::ReadyToApply => 1,
    }
}

/// Plain-text listing for the terminal.
pub fn render(records: &[ApplicationRecord]) -> String {
    if records.is_empty() {
        return "No applications recorded yet. Run with --search first.\n".to_string();
    }

    let mut out = String::new();
    let mut current = None;
    for record in records {
        if current != Some(record.status) {
            current = Some(record.status);
            let heading = match record.status {
                ApplicationStatus::ToReview => "To review",
                ApplicationStatus::ReadyToApply => "Ready to apply",
            };
            out.push_str(&format!("\n== {heading} ==\n"));
        }
        out.push_str(&format!(
            "[{:>2}] {} at {} ({})\n",
            record.match_score,
            record.title,
            record.company,
            record.recorded_at.format("%Y-%m-%d %H:%M")
        ));
        out.push_str(&format!("     {}\n", record.application_url));
        if let Some(letter) = &record.cover_letter {
            out.push_str(&format!("     letter: {letter}\n"));
        }
    }
    out
}
