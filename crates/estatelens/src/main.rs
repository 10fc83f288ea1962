use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use estatelens::analytics::derive::{
    format_change_rate, format_price, format_price_per_pyeong, group_thousands,
};
use estatelens::models::filter::{area_presets, price_presets};
use estatelens::models::{EstateConfig, MonthsWindow, PropertyType, RangeSelection};
use estatelens::SourceReport;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "estatelens", about = "Real-estate transaction trend analytics")]
struct Cli {
    /// Path to configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Property type: apartment, officetel or rowhouse
    #[arg(long)]
    property_type: Option<PropertyType>,

    /// Area range in ㎡ as MIN-MAX. Repeat to select several buckets.
    #[arg(long = "area", value_parser = parse_range)]
    areas: Vec<(f64, f64)>,

    /// Price range in 만원 as MIN-MAX. Repeat to select several buckets.
    #[arg(long = "price", value_parser = parse_range)]
    prices: Vec<(f64, f64)>,

    /// Sidebar area bucket by index (0: ~33㎡ .. 4: 132㎡~). Repeatable.
    #[arg(long = "area-bucket")]
    area_buckets: Vec<usize>,

    /// Sidebar price bucket by index (0: ~5억 .. 3: 15억~). Repeatable.
    #[arg(long = "price-bucket")]
    price_buckets: Vec<usize>,

    /// District (동). Repeat to select several.
    #[arg(long = "dong")]
    dongs: Vec<String>,

    /// Months of history: 3, 6, 12 or 24
    #[arg(long, default_value_t = 12, value_parser = parse_months)]
    months: u32,

    /// Result page to fetch (1-based)
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Reference date for trend windows (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    now: Option<NaiveDate>,

    /// Also fetch current listings
    #[arg(long)]
    listings: bool,

    /// Print a human-readable summary instead of JSON
    #[arg(long)]
    text: bool,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

fn parse_range(s: &str) -> Result<(f64, f64), String> {
    let (min, max) = s
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got {s}"))?;
    let min: f64 = min
        .trim()
        .parse()
        .map_err(|_| format!("invalid lower bound in {s}"))?;
    let max: f64 = max
        .trim()
        .parse()
        .map_err(|_| format!("invalid upper bound in {s}"))?;
    if min > max {
        return Err(format!("lower bound exceeds upper bound in {s}"));
    }
    Ok((min, max))
}

fn preset(presets: &[RangeSelection], index: usize, flag: &str) -> Result<RangeSelection> {
    match presets.get(index) {
        Some(range) => Ok(range.clone()),
        None => bail!(
            "--{flag} {index} is out of range (0..{})",
            presets.len().saturating_sub(1)
        ),
    }
}

fn parse_months(s: &str) -> Result<u32, String> {
    let months: u32 = s.parse().map_err(|_| format!("invalid months: {s}"))?;
    MonthsWindow::try_from(months).map(u32::from)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => estatelens::load_config(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EstateConfig::default(),
    };
    if cli.page == 0 {
        bail!("--page must be at least 1");
    }

    let mut dashboard =
        estatelens::build_dashboard(&config).context("Failed to build HTTP transport")?;

    let panel = dashboard.filters_mut();
    panel.set_property_type(cli.property_type);
    panel.set_months_window(MonthsWindow::try_from(cli.months).map_err(anyhow::Error::msg)?);
    for (min, max) in &cli.areas {
        panel.toggle_area_range(RangeSelection::new(*min, *max, format!("{min}-{max}㎡")));
    }
    for (min, max) in &cli.prices {
        panel.toggle_price_range(RangeSelection::new(*min, *max, format!("{min}-{max}만원")));
    }
    let areas = area_presets();
    for index in &cli.area_buckets {
        panel.toggle_area_range(preset(&areas, *index, "area-bucket")?);
    }
    let prices = price_presets();
    for index in &cli.price_buckets {
        panel.toggle_price_range(preset(&prices, *index, "price-bucket")?);
    }
    for dong in &cli.dongs {
        panel.toggle_dong(dong);
    }

    let (trades, _) = dashboard.apply().await;
    info!(outcome = ?trades, "Trade history loaded");
    if cli.page > 1 {
        dashboard.trades().change_page(cli.page).await;
    }
    if cli.listings {
        dashboard.activate_listings().await;
        if cli.page > 1 {
            dashboard.listings().change_page(cli.page).await;
        }
    }

    let now = cli
        .now
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let trade_report = dashboard.trade_report(now);
    let listings_report = cli.listings.then(|| dashboard.listings_report(now));

    if cli.text {
        print_text("실거래가", &trade_report);
        if let Some(report) = &listings_report {
            print_text("현재 매물", report);
        }
        return Ok(());
    }

    let output = serde_json::json!({
        "query": dashboard.filters().composed_query(cli.page, config.paging.page_size),
        "trade_history": trade_report,
        "current_listings": listings_report,
    });
    let output = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{output}");

    Ok(())
}

fn print_text(title: &str, report: &SourceReport) {
    println!("== {title} ==");
    if let Some(error) = &report.error {
        println!("오류: {error}");
        return;
    }
    println!(
        "총 {}건 (페이지 {}/{})",
        group_thousands(report.pagination.total),
        report.pagination.page,
        report.page.total_pages
    );
    println!(
        "평균 거래가 {} | 변동률 {} ({:?})",
        format_price(report.trend.overall_average.round() as u64),
        format_change_rate(Some(report.trend.change_rate_percent)),
        report.trend.trend_direction
    );
    println!(
        "평당가 {}",
        format_price_per_pyeong(report.page.average_price, report.page.average_area)
    );
    for month in &report.monthly {
        println!(
            "  {} 평균 {} 최고 {} 최저 {} ({}건)",
            month.key,
            format_price(month.average_price.round() as u64),
            format_price(month.max_price),
            format_price(month.min_price),
            month.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_argument() {
        assert_eq!(parse_range("33-66").unwrap(), (33.0, 66.0));
        assert_eq!(parse_range("0 - 50000").unwrap(), (0.0, 50_000.0));
        assert!(parse_range("66").is_err());
        assert!(parse_range("99-66").is_err());
    }

    #[test]
    fn bucket_indices_select_presets() {
        let areas = area_presets();
        let bucket = preset(&areas, 2, "area-bucket").unwrap();
        assert_eq!(bucket, RangeSelection::new(66.0, 99.0, ""));
        assert_eq!(bucket.label, "20-30평");
        assert!(preset(&areas, 5, "area-bucket").is_err());
        assert!(preset(&price_presets(), 4, "price-bucket").is_err());

        let cli = Cli::try_parse_from([
            "estatelens",
            "--area-bucket",
            "0",
            "--area-bucket",
            "4",
            "--price-bucket",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.area_buckets, vec![0, 4]);
        assert_eq!(cli.price_buckets, vec![3]);
    }

    #[test]
    fn months_argument() {
        assert_eq!(parse_months("6").unwrap(), 6);
        assert!(parse_months("5").is_err());
    }

    #[test]
    fn cli_parses_filters() {
        let cli = Cli::try_parse_from([
            "estatelens",
            "--property-type",
            "officetel",
            "--area",
            "0-33",
            "--area",
            "66-99",
            "--dong",
            "역삼동",
            "--months",
            "24",
            "--now",
            "2024-10-15",
        ])
        .unwrap();
        assert_eq!(cli.property_type, Some(PropertyType::Officetel));
        assert_eq!(cli.areas, vec![(0.0, 33.0), (66.0, 99.0)]);
        assert_eq!(cli.months, 24);
        assert_eq!(cli.now, NaiveDate::from_ymd_opt(2024, 10, 15));
    }
}
