//! Dashboard: one glance over everything the other modules record.

use farm_kernel::domain::constants::{DASHBOARD, FEED_RECORD, MORTALITY, SALES};
use farm_kernel::prelude::*;
use farm_kernel::region::NAVIGATE_ACTION_PREFIX;
use std::fmt::Write as _;

const TEMPLATE: &str = r#"<section class="module dashboard"><h2>Dashboard</h2><div id="dashboard-stats"></div></section>"#;

/// Quick links rendered under the stats: `(element id, target module, label)`.
const QUICK_LINKS: [(&str, &str, &str); 3] = [
    ("open-sales", SALES, "Record a sale"),
    ("open-feed-record", FEED_RECORD, "Log feed"),
    ("open-mortality", MORTALITY, "Log losses"),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub farm_name: Option<String>,
    pub sales_count: usize,
    pub sales_revenue: f64,
    /// Income transactions plus sales revenue.
    pub income: f64,
    /// Expense transactions plus feed cost.
    pub expenses: f64,
    pub feed_kg: f64,
    pub mortality_total: u64,
    pub inventory_items: usize,
    pub inventory_value: f64,
}

impl DashboardSummary {
    #[must_use]
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

#[must_use]
pub fn descriptor() -> ModuleDescriptor {
    ModuleDescriptor::builder(DASHBOARD)
        .template(TEMPLATE)
        .initialize(|ctx| {
            let (summary, currency) =
                ctx.state().read(|data| (summarize(data), data.settings.currency.clone()));
            ctx.render(render(&summary, &currency));
            for (element, target, _) in QUICK_LINKS {
                ctx.region().attach(element, &format!("{NAVIGATE_ACTION_PREFIX}{target}"));
            }
            Ok(())
        })
        .build()
}

#[must_use]
pub fn summarize(data: &SharedAppData) -> DashboardSummary {
    let sales_revenue: f64 = data.sales.iter().map(Sale::total).sum();
    let feed_cost: f64 = data.feed_records.iter().map(|r| r.cost).sum();
    let (income, expenses) = data.transactions.iter().fold((0.0, 0.0), |(inc, exp), t| match t.kind {
        TransactionKind::Income => (inc + t.amount, exp),
        TransactionKind::Expense => (inc, exp + t.amount),
    });

    DashboardSummary {
        farm_name: data.profile.is_complete().then(|| data.profile.farm_name.clone()),
        sales_count: data.sales.len(),
        sales_revenue,
        income: income + sales_revenue,
        expenses: expenses + feed_cost,
        feed_kg: data.feed_records.iter().map(|r| r.quantity_kg).sum(),
        mortality_total: data.mortality_records.iter().map(|r| u64::from(r.count)).sum(),
        inventory_items: data.inventory.len(),
        inventory_value: data.inventory.iter().map(|i| i.quantity * i.cost_per_unit).sum(),
    }
}

fn render(summary: &DashboardSummary, currency: &str) -> String {
    let currency = escape(currency);
    let title = summary.farm_name.as_deref().map_or_else(|| "Dashboard".to_owned(), escape);

    let mut out = String::new();
    let _ = write!(out, r#"<section class="module dashboard"><h2>{title}</h2><div id="dashboard-stats">"#);
    let stats = [
        ("sales-count", "Sales", summary.sales_count.to_string()),
        ("sales-revenue", "Revenue", format!("{:.2} {currency}", summary.sales_revenue)),
        ("net", "Net", format!("{:.2} {currency}", summary.net())),
        ("feed-kg", "Feed used", format!("{:.1}", summary.feed_kg)),
        ("mortality-total", "Losses", summary.mortality_total.to_string()),
        ("inventory-items", "Inventory items", summary.inventory_items.to_string()),
    ];
    for (key, label, value) in stats {
        let _ = write!(out, r#"<div class="stat"><span>{label}</span><strong data-stat="{key}">{value}</strong></div>"#);
    }
    out.push_str(r#"</div><nav class="quick-links">"#);
    for (element, _, label) in QUICK_LINKS {
        let _ = write!(out, r#"<button id="{element}">{label}</button>"#);
    }
    out.push_str("</nav></section>");
    out
}
