use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::info;

use crate::controller::ControlError;
use crate::state::AppState;
use giveaway_core::domain::draw::{DrawResult, Pairing};
use giveaway_core::types::lines::parse_lines;
use giveaway_core::types::post_url::PostUrl;
use giveaway_infra::reddit::{RedditClient, RedditError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("reddit credentials not configured")]
    MissingCredentials,
    #[error("reddit error: {0}")]
    Reddit(#[from] RedditError),
    #[error("control error: {0}")]
    Control(#[from] ControlError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connects, collects, loads items, draws once and reveals the winners.
pub async fn run(
    state: &AppState,
    urls_path: &Path,
    items_path: &Path,
    seed: Option<u64>,
) -> Result<(), RunError> {
    let credentials = state
        .config
        .reddit
        .clone()
        .ok_or(RunError::MissingCredentials)?;
    let client = RedditClient::new(state.http_client.clone(), credentials);
    client.verify().await?;
    state.controller.connect(client).await?;

    let urls = PostUrl::parse_list(&tokio::fs::read_to_string(urls_path).await?);
    let items = parse_lines(&tokio::fs::read_to_string(items_path).await?);
    info!(urls = urls.len(), items = items.len(), "inputs loaded");

    let ticket = state.controller.collect(urls).await?;
    let summary = ticket.finished().await?;
    println!("{}", summary.status_line());

    let item_count = state.controller.load_items(items).await?;
    let result = state.controller.draw(seed).await?;
    reveal(&result, summary.total_commenters, item_count, state.config.reveal_interval).await;
    println!("{}", result.summary());
    Ok(())
}

async fn reveal(result: &DrawResult, commenters: usize, items: usize, interval: Duration) {
    println!("--- Giveaway Winners ---");
    println!();
    if result.pairings.is_empty() {
        println!("No winners drawn. Check if users and items were available.");
        return;
    }
    for (index, pairing) in result.pairings.iter().enumerate() {
        if index > 0 {
            sleep(interval).await;
        }
        println!("{}", winner_line(index, pairing));
    }
    if let Some(line) = unawarded_line(result, commenters, items) {
        println!();
        println!("{line}");
    }
}

fn winner_line(index: usize, pairing: &Pairing) -> String {
    format!(
        "Winner {}: {} wins \"{}\"",
        index + 1,
        pairing.winner,
        pairing.item
    )
}

fn unawarded_line(result: &DrawResult, commenters: usize, items: usize) -> Option<String> {
    let remaining = result.leftover_items.len();
    if remaining > 0 && commenters < items {
        Some(format!(
            "--- {remaining} item(s) not awarded (no more unique users) ---"
        ))
    } else {
        None
    }
}
