use crate::commands::build_dashboard;
use crate::error::{AppError, Result};
use crate::models::PriceRange;
use crate::services::{tidy_to_csv, Dashboard, OverviewSection, WideTableView};

pub fn run(days: u16, companies: Vec<String>, csv: bool) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = build_dashboard().and_then(|dashboard| {
        runtime.block_on(show_overview(&dashboard, days, companies, csv))
    });

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn show_overview(dashboard: &Dashboard, days: u16, companies: Vec<String>, csv: bool) -> Result<()> {
    let companies = if companies.is_empty() {
        dashboard.tickers().names()
    } else {
        for name in &companies {
            if !dashboard.tickers().contains(name) {
                return Err(AppError::InvalidInput(format!(
                    "Unknown company '{}'. Known: {}",
                    name,
                    dashboard.tickers().names().join(", ")
                )));
            }
        }
        companies
    };

    let section = dashboard
        .render_overview(days, &companies, &PriceRange::default())
        .await?;

    match section {
        OverviewSection::Ready { table, tidy, .. } => {
            if csv {
                print!("{}", tidy_to_csv(&tidy)?);
            } else {
                println!("📈 過去 {}日間 {}", days, table.title);
                print_table(&table);
            }
        }
        OverviewSection::SelectionEmpty { message } => println!("{}", message),
    }
    Ok(())
}

/// One line per date, one column per company
fn print_table(table: &WideTableView) {
    let label_width = table.columns.iter().map(|c| c.len()).max().unwrap_or(0);

    print!("{:<width$}", "", width = label_width);
    for row in &table.rows {
        print!("  {:>12}", row.name);
    }
    println!();

    for (col, label) in table.columns.iter().enumerate() {
        print!("{:<width$}", label, width = label_width);
        for row in &table.rows {
            match row.values.get(col).copied().flatten() {
                Some(value) => print!("  {:>12.1}", value),
                None => print!("  {:>12}", "-"),
            }
        }
        println!();
    }
}
