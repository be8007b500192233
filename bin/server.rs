// Jabar Bansos Analytics - Web Server
// Serves the dashboard page and its JSON render payload with Axum

use anyhow::{Context, Result};
use bansos_analytics::server::{router, AppState};
use bansos_analytics::{check_quality, Config, DataSource};
use log::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🌐 Jabar Bansos Analytics - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let (config, rest) = Config::from_args(std::env::args().skip(1))?;
    if !rest.is_empty() {
        anyhow::bail!("unexpected arguments: {}", rest.join(" "));
    }

    // Load once up front; every request shares the cached context
    let source = DataSource::new(config.clone());
    let ctx = match source.get() {
        Ok(ctx) => ctx,
        Err(e) if e.is_missing_input() => {
            let config = source.config();
            eprintln!("❌ {}", e);
            eprintln!(
                "   Pastikan '{}' dan '{}' ada di {:?}.",
                config.timeseries_file, config.ranking_file, config.data_dir
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("failed to load dashboard data"),
    };
    println!(
        "✓ Data loaded: {} time-series rows, {} ranked regions",
        ctx.timeseries.len(),
        ctx.ranking.len()
    );

    let report = check_quality(ctx);
    if report.is_clean() {
        info!("data contract checks passed");
    } else {
        warn!("data contract: {}", report.summary());
        report.log();
    }

    let app = router(AppState::new(source));

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.addr))?;

    println!("\n🚀 Server running on http://{}", config.addr);
    println!("   API: http://{}/api/dashboard", config.addr);
    println!("   UI:  http://{}", config.addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}
