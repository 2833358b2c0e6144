use crate::commands::build_dashboard;
use crate::error::Result;
use crate::models::PriceRange;
use crate::services::Dashboard;
use crate::utils::format_date;

pub fn run(company: String) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = build_dashboard().and_then(|dashboard| runtime.block_on(show_detail(&dashboard, &company)));

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn show_detail(dashboard: &Dashboard, company: &str) -> Result<()> {
    let detail = dashboard.render_detail(company, &PriceRange::default()).await?;

    println!("🔹 {}", detail.title);
    if detail.bars.is_empty() {
        println!("   No trades in the last 6 months");
        return Ok(());
    }

    println!(
        "{:<10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>12}  {:>10}",
        "Date", "Open", "High", "Low", "Close", "Volume", "SMA5"
    );
    for bar in &detail.bars {
        println!(
            "{:<10}  {:>10.1}  {:>10.1}  {:>10.1}  {:>10.1}  {:>12}  {:>10.1}",
            format_date(&bar.date),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
            bar.sma05
        );
    }
    println!("\n📊 {} trading days", detail.bars.len());
    Ok(())
}
