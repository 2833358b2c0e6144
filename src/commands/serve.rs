use crate::commands::build_dashboard;
use crate::server::{self, AppState};
use crate::utils::{get_port, get_public_dir};

pub fn run(port: Option<u16>) {
    let port = port.unwrap_or_else(get_port);
    println!("🚀 Starting automaker-stocks server on port {}", port);

    let dashboard = match build_dashboard() {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("❌ Failed to configure price source: {}", e);
            std::process::exit(1);
        }
    };
    println!("🚗 Companies: {}", dashboard.tickers().names().join(", "));

    let public_dir = get_public_dir();
    println!("📁 Public directory: {}", public_dir.display());

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(dashboard, public_dir);
    if let Err(e) = runtime.block_on(server::serve(app_state, port)) {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
