mod config;
mod error;
mod handlers;
mod models;
mod services;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use config::{Command, Config};
use handlers::scan::health_alert;
use handlers::{logs, FoodLogBook, ScanHandler};
use services::{ClassificationService, RemoteClassifier};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables before clap reads them
    dotenv().ok();
    env_logger::init();

    let config = Config::parse();
    log::info!("🚀 Starting PlastyAI scanner against {}", config.api_url);

    let classifier = match config.timeout() {
        Some(timeout) => RemoteClassifier::with_timeout(&config.api_url, timeout)?,
        None => RemoteClassifier::new(&config.api_url),
    };
    log::debug!("🔗 Classifier base URL: {}", classifier.base_url());
    let classifier: Arc<dyn ClassificationService> = Arc::new(classifier);
    let handler = ScanHandler::new(classifier);

    match config.command {
        Command::Health => run_health(&handler).await,
        Command::Scan { images } => run_scan(&handler, &images).await,
    }
}

async fn run_health(handler: &ScanHandler) -> Result<ExitCode> {
    let result = handler.refresh_health().await;
    if let Ok(health) = &result {
        println!("🩺 Status: {}", health.status.as_deref().unwrap_or("unknown"));
        println!("🧠 Model loaded: {}", health.model_loaded);
        if let Some(classes) = health.num_classes {
            println!("🏷️ Classes: {}", classes);
        }
    }

    match health_alert(&result) {
        Some(alert) => {
            eprintln!("⚠️ Error: {}", alert);
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

async fn run_scan(handler: &ScanHandler, images: &[std::path::PathBuf]) -> Result<ExitCode> {
    let result = handler.refresh_health().await;
    if let Some(alert) = health_alert(&result) {
        eprintln!("⚠️ Error: {}", alert);
        return Ok(ExitCode::FAILURE);
    }

    let mut log_book = FoodLogBook::new();

    for image in images {
        println!("\n📸 {}", image.display());
        match handler.scan_or_alert(image).await {
            Ok(outcome) => {
                for (rank, prediction) in outcome.predictions.iter().take(5).enumerate() {
                    let count = prediction.microplastics_count.unwrap_or(0);
                    println!(
                        "   {}. {} ({:.1}%) → {} particles",
                        rank + 1,
                        prediction.label,
                        prediction.confidence * 100.0,
                        count
                    );
                }
                println!("🔬 Analysis Complete: {} [{}]", outcome.summary(), outcome.level());

                let food_item = outcome
                    .top()
                    .map(|p| p.label.clone())
                    .unwrap_or_else(|| file_label(image));
                log_book.record(&food_item, outcome.top_count(), Utc::now());
            }
            Err(alert) => {
                eprintln!("⚠️ Error: {}", alert);
                log_book.record_failure(&file_label(image), Utc::now());
            }
        }
    }

    print_session_summary(&log_book);
    Ok(ExitCode::SUCCESS)
}

fn file_label(image: &Path) -> String {
    image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn print_session_summary(log_book: &FoodLogBook) {
    if log_book.is_empty() {
        return;
    }

    let today = Utc::now().date_naive();
    let weekly = log_book.weekly_summary(today);
    let daily: Vec<u32> = weekly.days.iter().map(|d| d.count).collect();
    let trend = logs::trend(&daily);

    println!("\n📊 Weekly Microplastics");
    for day in &weekly.days {
        println!("   {} {}: {} ({}, {})", day.weekday, day.date, day.count, day.level, day.level.color());
    }
    println!("   Total: {} | Daily average: {:.1} | Peak: {}", weekly.total, weekly.average_daily, weekly.max_count);
    println!(
        "   Trend: {} {:.0}% (avg {:.1}, high {}, low {})",
        trend.direction, trend.percentage, trend.average, trend.highest, trend.lowest
    );

    println!("\n🗂️ Session log");
    for entry in log_book.entries() {
        println!(
            "   {} {}: {} particles ({}) [{:?}]",
            entry.logged_at.format("%H:%M:%S"),
            entry.food_item,
            entry.microplastics_count,
            entry.level(),
            entry.status
        );
    }

    println!("\n🧾 Today's breakdown");
    for item in log_book.daily_breakdown(today) {
        println!("   {}: {} ({:.0}%)", item.food_item, item.count, item.percentage);
    }
}
