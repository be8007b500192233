// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::path::PathBuf;

// Use library instead of local modules
use bansos_analytics::{check_quality, compute_kpis, export_csv, Config, DataContext, DataSource, Severity};

fn main() -> Result<()> {
    let (config, args) = Config::from_args(std::env::args().skip(1))?;
    let command = args.first().map(String::as_str).unwrap_or("tui");

    if command != "tui" {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let source = DataSource::new(config);
    match command {
        "summary" => run_summary(&source),
        "export" => run_export(&source, args.get(1).map(PathBuf::from)),
        "check" => run_check(&source),
        "tui" => run_ui_mode(&source),
        other => {
            eprintln!("❌ Unknown command: {}", other);
            eprintln!("   Usage: bansos-analytics [tui|summary|export [path]|check] [--data-dir DIR]");
            std::process::exit(2);
        }
    }
}

/// Load both CSVs or stop here with the user-facing message
fn load_or_exit(source: &DataSource) -> Result<&DataContext> {
    match source.get() {
        Ok(ctx) => Ok(ctx),
        Err(e) if e.is_missing_input() => {
            let config = source.config();
            eprintln!("❌ {}", e);
            eprintln!(
                "   Pastikan '{}' dan '{}' ada di folder {:?}.",
                config.timeseries_file, config.ranking_file, config.data_dir
            );
            std::process::exit(1);
        }
        Err(e) => Err(e).context("failed to load dashboard data"),
    }
}

fn run_summary(source: &DataSource) -> Result<()> {
    let ctx = load_or_exit(source)?;
    let kpis = compute_kpis(ctx).context("cannot compute KPIs")?;

    println!("📊 Executive Summary: Stabilitas Bansos Jabar");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for kpi in kpis.cards() {
        println!("{:<34} {:>20}   {}", kpi.label, kpi.value, kpi.delta);
    }

    Ok(())
}

fn run_export(source: &DataSource, target: Option<PathBuf>) -> Result<()> {
    let ctx = load_or_exit(source)?;
    let file = export_csv(&ctx.ranking)?;
    let path = target.unwrap_or_else(|| source.config().export_path());

    std::fs::write(&path, &file.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("📥 {} rows exported to {}", ctx.ranking.len(), path.display());
    Ok(())
}

fn run_check(source: &DataSource) -> Result<()> {
    let ctx = load_or_exit(source)?;
    let report = check_quality(ctx);

    println!("🔍 Data contract check");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if report.is_clean() {
        println!("✅ No issues found");
        return Ok(());
    }
    for issue in &report.issues {
        let marker = match issue.severity {
            Severity::Critical => "❌",
            Severity::Warning => "⚠️ ",
        };
        println!("{} {:<26} {}", marker, issue.rule, issue.message);
    }
    println!("\n{}", report.summary());

    if report.has_critical_issues() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(source: &DataSource) -> Result<()> {
    // stderr only, and quiet, so the alternate screen stays clean
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("🖥️  Loading Jabar Bansos Analytics...\n");
    let ctx = load_or_exit(source)?;
    println!(
        "✓ Loaded {} time-series rows and {} ranked regions\n",
        ctx.timeseries.len(),
        ctx.ranking.len()
    );

    let report = check_quality(ctx);
    report.log();

    let mut app = ui::App::new(ctx, source.config()).context("cannot render dashboard")?;
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_source: &DataSource) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin bansos-server --features server");
    std::process::exit(1);
}
