use crate::infra::property_service;
use clap::Args;
use property_ledger::config::AppConfig;
use property_ledger::error::AppError;
use property_ledger::properties::{ImportSummary, SalesCsvImporter, SearchPropertiesResult, SearchQuery};
use property_ledger::telemetry;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV export with address,suburb,state,postcode,sale_price,description columns
    #[arg(long, value_name = "PATH")]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SearchArgs {
    /// Restrict results to one suburb (case-insensitive)
    #[arg(long)]
    pub(crate) suburb: Option<String>,
    /// Page number, starting at 1
    #[arg(long)]
    pub(crate) page: Option<u32>,
    /// Results per page (1-100)
    #[arg(long)]
    pub(crate) limit: Option<u32>,
}

pub(crate) async fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    config.storage.require_persistent()?;

    let service = property_service(&config.storage).await?;
    let sales = SalesCsvImporter::from_path(&args.csv)?;
    let rows = sales.len();
    let summary = SalesCsvImporter::load_into(service.as_ref(), sales).await?;

    info!(
        path = %args.csv.display(),
        store = config.storage.label(),
        rows,
        inserted = summary.inserted,
        "sales import finished"
    );
    for line in render_import(&summary) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) async fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let service = property_service(&config.storage).await?;
    let result = service
        .search_properties(SearchQuery {
            suburb: args.suburb,
            page: args.page,
            limit: args.limit,
        })
        .await?;

    for line in render_page(&result) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_import(summary: &ImportSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Imported {} sale(s), rejected {}",
        summary.inserted,
        summary.rejected.len()
    )];
    for (line, err) in &summary.rejected {
        let fields: Vec<&str> = err.details.iter().map(|detail| detail.field.as_str()).collect();
        if fields.is_empty() {
            lines.push(format!("  line {line}: {}", err.message));
        } else {
            lines.push(format!("  line {line}: {} ({})", err.message, fields.join(", ")));
        }
    }
    lines
}

pub(crate) fn render_page(result: &SearchPropertiesResult) -> Vec<String> {
    let mut lines = vec![format!(
        "Page {} of {} ({} sale(s), {} per page)",
        result.page, result.total_pages, result.total, result.limit
    )];

    if result.properties.is_empty() {
        lines.push("  no matching sales".to_string());
        return lines;
    }

    for item in &result.properties {
        let property = &item.property;
        lines.push(format!(
            "  {} | {} | ${:.2} | suburb avg ${:.2} | {}",
            property.address,
            property.suburb,
            property.sale_price,
            item.suburb_avg,
            item.comparison.label()
        ));
    }
    lines
}
