//! Mortality log.

mod error;

pub use crate::error::{MortalityError, MortalityErrorExt};

use farm_kernel::domain::constants::MORTALITY;
use farm_kernel::prelude::*;
use std::fmt::Write as _;
use tracing::{info, warn};

const TEMPLATE: &str =
    r#"<section class="module mortality"><h2>Mortality</h2><div id="mortality-list"></div></section>"#;

/// Cause recorded when none is given.
pub const UNKNOWN_CAUSE: &str = "unknown";

#[derive(Debug, Clone, Default)]
pub struct NewMortalityRecord {
    pub date: Option<String>,
    pub batch: String,
    pub count: u32,
    pub cause: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MortalitySummary {
    pub events: usize,
    pub total: u64,
    /// `(cause, deaths)` with the heaviest cause first.
    pub by_cause: Vec<(String, u64)>,
}

#[must_use]
pub fn descriptor() -> ModuleDescriptor {
    ModuleDescriptor::builder(MORTALITY)
        .template(TEMPLATE)
        .initialize(|ctx| {
            ctx.render(ctx.state().read(render));
            Ok(())
        })
        .build()
}

pub async fn add_mortality_record(
    app: &AppContext,
    input: NewMortalityRecord,
) -> Result<MortalityRecord, MortalityError> {
    if input.count == 0 {
        return Err(MortalityError::Validation {
            message: "count must be at least one".into(),
            context: None,
        });
    }
    let batch = input.batch.trim();
    if batch.is_empty() {
        return Err(MortalityError::Validation { message: "batch is required".into(), context: None });
    }

    let cause = match input.cause.trim() {
        "" => UNKNOWN_CAUSE.to_owned(),
        cause => cause.to_owned(),
    };
    let record = MortalityRecord {
        id: safe_nanoid!(),
        date: input.date.unwrap_or_else(farm_kernel::today),
        batch: batch.to_owned(),
        count: input.count,
        cause,
        notes: input.notes,
    };
    app.state().update(|data| data.mortality_records.push(record.clone()));
    if app.state().persist().await == PersistOutcome::Failed {
        warn!(id = %record.id, "Mortality record kept in memory only");
    }

    info!(id = %record.id, batch = %record.batch, count = record.count, "Mortality recorded");
    Ok(record)
}

#[must_use]
pub fn summary(data: &SharedAppData) -> MortalitySummary {
    let mut by_cause: Vec<(String, u64)> = Vec::new();
    let mut total = 0;
    for record in &data.mortality_records {
        total += u64::from(record.count);
        match by_cause.iter_mut().find(|(cause, _)| cause.eq_ignore_ascii_case(&record.cause)) {
            Some((_, deaths)) => *deaths += u64::from(record.count),
            None => by_cause.push((record.cause.clone(), u64::from(record.count))),
        }
    }
    by_cause.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    MortalitySummary { events: data.mortality_records.len(), total, by_cause }
}

fn render(data: &SharedAppData) -> String {
    let summary = summary(data);
    let mut out = String::from(r#"<section class="module mortality"><h2>Mortality</h2>"#);
    let _ = write!(
        out,
        r#"<p class="mortality-summary"><span data-stat="mortality-total">{}</span> losses in {} events</p>"#,
        summary.total, summary.events,
    );
    if !summary.by_cause.is_empty() {
        out.push_str(r#"<ul id="mortality-list">"#);
        for (cause, deaths) in &summary.by_cause {
            let _ = write!(out, "<li>{}: {deaths}</li>", escape(cause));
        }
        out.push_str("</ul>");
    }
    out.push_str("</section>");
    out
}
