//! Sales ledger: records what left the farm, for whom and at what price.

mod error;

pub use crate::error::{SalesError, SalesErrorExt};

use farm_kernel::domain::app_data::SharedAppData;
use farm_kernel::domain::constants::SALES;
use farm_kernel::domain::records::Sale;
use farm_kernel::prelude::*;
use std::fmt::Write as _;
use tracing::{info, warn};

const TEMPLATE: &str = r#"<section class="module sales"><h2>Sales</h2><div id="sales-list"></div></section>"#;

/// Input for [`add_sale`]. The date defaults to today.
#[derive(Debug, Clone, Default)]
pub struct NewSale {
    pub date: Option<String>,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub customer: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SalesSummary {
    pub count: usize,
    pub revenue: f64,
    pub quantity: f64,
}

#[must_use]
pub fn descriptor() -> ModuleDescriptor {
    ModuleDescriptor::builder(SALES)
        .template(TEMPLATE)
        .initialize(|ctx| {
            ctx.render(ctx.state().read(render));
            Ok(())
        })
        .build()
}

/// Appends a sale and persists the shared state.
pub async fn add_sale(app: &AppContext, sale: NewSale) -> Result<Sale, SalesError> {
    let product = sale.product.trim();
    if product.is_empty() {
        return Err(SalesError::Validation { message: "product is required".into(), context: None });
    }
    if !(sale.quantity.is_finite() && sale.quantity > 0.0) {
        return Err(SalesError::Validation {
            message: "quantity must be positive".into(),
            context: Some(product.to_owned().into()),
        });
    }
    if !(sale.unit_price.is_finite() && sale.unit_price >= 0.0) {
        return Err(SalesError::Validation {
            message: "unit price cannot be negative".into(),
            context: Some(product.to_owned().into()),
        });
    }

    let record = Sale {
        id: safe_nanoid!(),
        date: sale.date.unwrap_or_else(farm_kernel::today),
        product: product.to_owned(),
        quantity: sale.quantity,
        unit_price: sale.unit_price,
        customer: sale.customer.trim().to_owned(),
    };
    app.state().update(|data| data.sales.push(record.clone()));
    if app.state().persist().await == PersistOutcome::Failed {
        warn!(id = %record.id, "Sale kept in memory only");
    }

    info!(id = %record.id, product = %record.product, total = record.total(), "Sale recorded");
    Ok(record)
}

/// Removes the sale with `id`; returns whether one existed.
pub async fn remove_sale(app: &AppContext, id: &str) -> bool {
    let removed = app.state().update(|data| {
        let before = data.sales.len();
        data.sales.retain(|sale| sale.id != id);
        before != data.sales.len()
    });
    if removed && app.state().persist().await == PersistOutcome::Failed {
        warn!(id, "Sale removal kept in memory only");
    }
    removed
}

#[must_use]
pub fn summary(data: &SharedAppData) -> SalesSummary {
    data.sales.iter().fold(SalesSummary::default(), |mut acc, sale| {
        acc.count += 1;
        acc.revenue += sale.total();
        acc.quantity += sale.quantity;
        acc
    })
}

fn render(data: &SharedAppData) -> String {
    let totals = summary(data);
    let currency = escape(&data.settings.currency);
    let mut out = String::from(r#"<section class="module sales"><h2>Sales</h2>"#);
    let _ = write!(
        out,
        r#"<p class="sales-summary"><span data-stat="sales-count">{}</span> sales, <span data-stat="sales-revenue">{:.2}</span> {currency}</p>"#,
        totals.count, totals.revenue,
    );

    if data.sales.is_empty() {
        out.push_str(r#"<p class="empty">No sales recorded yet.</p>"#);
    } else {
        out.push_str(r#"<table id="sales-list"><tr><th>Date</th><th>Product</th><th>Qty</th><th>Customer</th><th>Total</th></tr>"#);
        // Newest first.
        for sale in data.sales.iter().rev() {
            let _ = write!(
                out,
                r#"<tr data-id="{}"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>"#,
                escape(&sale.id),
                escape(&sale.date),
                escape(&sale.product),
                sale.quantity,
                escape(&sale.customer),
                sale.total(),
            );
        }
        out.push_str("</table>");
    }
    out.push_str("</section>");
    out
}
