use anyhow::{Context, Result};

use mood_journal::ai::Assistant;
use mood_journal::config::MoodJournalConfig;
use mood_journal::journal::history::sentiment_history;
use mood_journal::journal::store;

/// Store a new entry and analyse it.
pub async fn write(config: &MoodJournalConfig, content: &str) -> Result<()> {
    anyhow::ensure!(!content.trim().is_empty(), "entry content must not be empty");

    let conn = super::open_db(config)?;
    let entry = store::create_entry(&conn, content)?;
    println!("Saved entry {}", entry.id);

    let assistant = Assistant::from_config(config)?;
    match assistant.analyze(&entry.content).await {
        Ok(analysis) => {
            store::upsert_analysis(&conn, &entry.id, &analysis, Some(assistant.model()))?;
            println!(
                "  mood: {}  sentiment: {}  color: {}",
                analysis.mood, analysis.sentiment_score, analysis.color
            );
            println!("  {}", analysis.summary);
        }
        Err(e) => println!("  analysis unavailable: {e}"),
    }

    Ok(())
}

/// Analyse text without storing it and print the result as JSON.
pub async fn analyze(config: &MoodJournalConfig, content: &str) -> Result<()> {
    let assistant = Assistant::from_config(config)?;
    let analysis = assistant
        .analyze(content)
        .await
        .context("analysis failed")?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

pub fn list(config: &MoodJournalConfig) -> Result<()> {
    let conn = super::open_db(config)?;
    let items = store::list_entries_with_analysis(&conn)?;

    if items.is_empty() {
        println!("No entries yet.");
        return Ok(());
    }

    for item in &items {
        let preview: String = item.entry.content.chars().take(60).collect();
        match &item.analysis {
            Some(a) => println!(
                "{}  {:<12} {:>5}  {}",
                item.entry.created_at, a.mood, a.sentiment_score, preview
            ),
            None => println!("{}  {:<12} {:>5}  {}", item.entry.created_at, "-", "-", preview),
        }
    }
    println!("\n{} entries", items.len());
    Ok(())
}

pub fn history(config: &MoodJournalConfig) -> Result<()> {
    let conn = super::open_db(config)?;
    let history = sentiment_history(&conn)?;

    println!("Sentiment History");
    println!("{}", "=".repeat(40));
    for point in &history.points {
        println!("  {}  {:>5}  {}", point.created_at, point.sentiment_score, point.mood);
    }
    println!();
    println!("Average sentiment:     {:.2}", history.average);
    Ok(())
}
