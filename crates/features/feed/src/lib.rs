//! Feed records: what each batch was fed, how much and at what cost.

mod error;

pub use crate::error::{FeedError, FeedErrorExt};

use farm_kernel::domain::constants::FEED_RECORD;
use farm_kernel::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::{info, warn};

const TEMPLATE: &str =
    r#"<section class="module feed-record"><h2>Feed Records</h2><div id="feed-list"></div></section>"#;

#[derive(Debug, Clone, Default)]
pub struct NewFeedRecord {
    pub date: Option<String>,
    pub feed_type: String,
    pub quantity_kg: f64,
    pub cost: f64,
    pub batch: String,
    pub notes: String,
}

/// Consumption per feed type, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedUsage {
    pub records: usize,
    pub total_kg: f64,
    pub total_cost: f64,
    pub by_type: BTreeMap<String, f64>,
}

#[must_use]
pub fn descriptor() -> ModuleDescriptor {
    ModuleDescriptor::builder(FEED_RECORD)
        .template(TEMPLATE)
        .initialize(|ctx| {
            ctx.render(ctx.state().read(render));
            Ok(())
        })
        .build()
}

pub async fn add_feed_record(app: &AppContext, input: NewFeedRecord) -> Result<FeedRecord, FeedError> {
    let feed_type = input.feed_type.trim();
    if feed_type.is_empty() {
        return Err(FeedError::Validation { message: "feed type is required".into(), context: None });
    }
    if !(input.quantity_kg.is_finite() && input.quantity_kg > 0.0) {
        return Err(FeedError::Validation {
            message: "quantity must be positive".into(),
            context: Some(feed_type.to_owned().into()),
        });
    }
    if !(input.cost.is_finite() && input.cost >= 0.0) {
        return Err(FeedError::Validation {
            message: "cost cannot be negative".into(),
            context: Some(feed_type.to_owned().into()),
        });
    }

    let record = FeedRecord {
        id: safe_nanoid!(),
        date: input.date.unwrap_or_else(farm_kernel::today),
        feed_type: feed_type.to_owned(),
        quantity_kg: input.quantity_kg,
        cost: input.cost,
        batch: input.batch.trim().to_owned(),
        notes: input.notes,
    };
    app.state().update(|data| data.feed_records.push(record.clone()));
    if app.state().persist().await == PersistOutcome::Failed {
        warn!(id = %record.id, "Feed record kept in memory only");
    }

    info!(id = %record.id, feed_type = %record.feed_type, kg = record.quantity_kg, "Feed recorded");
    Ok(record)
}

#[must_use]
pub fn usage(data: &SharedAppData) -> FeedUsage {
    let mut usage = FeedUsage::default();
    for record in &data.feed_records {
        usage.records += 1;
        usage.total_kg += record.quantity_kg;
        usage.total_cost += record.cost;
        *usage.by_type.entry(record.feed_type.clone()).or_default() += record.quantity_kg;
    }
    usage
}

fn render(data: &SharedAppData) -> String {
    let usage = usage(data);
    let mut out = String::from(r#"<section class="module feed-record"><h2>Feed Records</h2>"#);
    let _ = write!(
        out,
        r#"<p class="feed-summary"><span data-stat="feed-kg">{:.1}</span> {} over {} records</p>"#,
        usage.total_kg,
        escape(&data.settings.weight_unit),
        usage.records,
    );

    if usage.by_type.is_empty() {
        out.push_str(r#"<p class="empty">No feed recorded yet.</p>"#);
    } else {
        out.push_str(r#"<ul id="feed-list">"#);
        for (feed_type, kg) in &usage.by_type {
            let _ = write!(out, "<li>{}: {kg:.1}</li>", escape(feed_type));
        }
        out.push_str("</ul>");
    }
    out.push_str("</section>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_groups_by_type() {
        let mut data = SharedAppData::default();
        for (feed_type, kg) in [("layer mash", 20.0), ("grower", 5.0), ("layer mash", 2.5)] {
            data.feed_records.push(FeedRecord {
                feed_type: feed_type.to_owned(),
                quantity_kg: kg,
                cost: 1.0,
                ..FeedRecord::default()
            });
        }

        let usage = usage(&data);
        assert_eq!(usage.records, 3);
        assert!((usage.total_kg - 27.5).abs() < f64::EPSILON);
        assert_eq!(usage.by_type.keys().collect::<Vec<_>>(), ["grower", "layer mash"]);
    }
}
