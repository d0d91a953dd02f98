// mobwatch/src/main.rs
//
// Mobwatch feed daemon — temporal abuse-pattern detection for group chats.
//
// Two operational modes:
//   tail    — follow a live JSONL feed written by the transport layer
//   replay  — replay a captured feed at scaled speed (testing/research)
//
// Each feed line is one normalized message plus its externally computed
// base score:
//   {"group_id":"g1","base_score":4.0,"id":"m1","sender":"111",
//    "timestamp":"2026-08-30T12:00:00Z","text":"@222 ...","quoted_sender":null}
//
// Usage:
//   mobwatch --mode tail --path /var/run/chat/feed.jsonl
//   mobwatch --mode replay --path captured.jsonl --speed 10.0

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mobwatch::engine::TemporalEngine;
use mobwatch::events::{ChatMessage, TemporalScore};
use mobwatch::EngineConfig;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "mobwatch",
    about   = "Temporal abuse-pattern detection for group chats",
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    #[arg(long, value_enum, default_value = "tail")]
    mode: Mode,

    #[arg(long, default_value = "/tmp/mobwatch_feed.jsonl",
          help = "JSONL feed path")]
    path: PathBuf,

    #[arg(long, default_value = "1.0", help = "Replay speed multiplier")]
    speed: f64,

    #[arg(long, help = "Optional JSON config file overriding defaults")]
    config: Option<PathBuf>,

    #[arg(long, default_value = "8",
          help = "Print an alert when the temporal score reaches this")]
    alert_threshold: u32,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    Tail,   // follow a live feed
    Replay, // replay a static capture at scaled speed
}

// ── Feed line ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FeedLine {
    group_id: String,
    base_score: f32,
    #[serde(flatten)]
    message: ChatMessage,
}

// ── Terminal output ───────────────────────────────────────────────────────────

fn print_alert(score: &TemporalScore) {
    let (color, icon) = match score.temporal_score {
        s if s >= 20 => ("\x1b[91;1m", "🔴"),
        s if s >= 12 => ("\x1b[93;1m", "🟡"),
        _ => ("\x1b[96m", "🔵"),
    };
    let reset = "\x1b[0m";
    let b = &score.breakdown;

    println!(
        "\n{}{} temporal score {} in group {}{}",
        color, icon, score.temporal_score, score.group_id, reset
    );
    println!("  Message : {}", score.message_id);
    println!(
        "  Patterns: pile_on={} velocity={} silencing={} targeting={}",
        b.pile_on, b.velocity, b.silencing, b.targeting
    );
    println!(
        "  Last 15m: {} msgs, {} negative, {} senders, avg base {:.2}",
        score.patterns.messages,
        score.patterns.negative,
        score.patterns.distinct_senders,
        score.patterns.avg_base_score
    );
}

async fn print_stats_loop(engine: Arc<TemporalEngine>, start: Instant) {
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
        let s = engine.stats();
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "\n\x1b[1m── stats  uptime={:.0}s  scored={}  mps={:.1}  groups={}  users={}  targets={} ──\x1b[0m",
            elapsed,
            s.messages_scored,
            s.messages_scored as f64 / elapsed,
            s.groups,
            s.tracked_users,
            s.targeting_keys
        );
    }
}

// ── Feed sources ──────────────────────────────────────────────────────────────

async fn tail_jsonl(path: PathBuf, tx: mpsc::Sender<FeedLine>, seek_end: bool) -> Result<()> {
    let file = tokio::fs::File::open(&path).await?;
    let mut lines = BufReader::new(file).lines();

    if seek_end {
        while lines.next_line().await?.is_some() {} // consume existing
    }

    info!("Tailing {}", path.display());
    loop {
        match lines.next_line().await? {
            Some(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<FeedLine>(line) {
                    Ok(fl) => {
                        if tx.send(fl).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Parse error: {}", e),
                }
            }
            None => tokio::time::sleep(tokio::time::Duration::from_millis(50)).await,
        }
    }
    Ok(())
}

async fn replay_jsonl(path: PathBuf, tx: mpsc::Sender<FeedLine>, speed: f64) -> Result<()> {
    let content = tokio::fs::read_to_string(&path).await?;
    let mut lines: Vec<(f64, FeedLine)> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Ok(fl) = serde_json::from_str::<FeedLine>(line) {
            let ts = fl.message.timestamp.timestamp_millis() as f64;
            lines.push((ts, fl));
        }
    }

    if lines.is_empty() {
        return Ok(());
    }
    lines.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    let base_ts = lines[0].0;
    let base_wall = Instant::now();

    for (ts, mut fl) in lines {
        let offset = (ts - base_ts) / speed / 1000.0;
        let target = base_wall + std::time::Duration::from_secs_f64(offset);
        let now = Instant::now();
        if target > now {
            tokio::time::sleep(target - now).await;
        }
        fl.message.timestamp = Utc::now(); // rebase onto the wall clock
        if tx.send(fl).await.is_err() {
            break;
        }
    }
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("mobwatch=info".parse()?),
        )
        .compact()
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = Arc::new(TemporalEngine::new(config));
    let start = Instant::now();
    let (tx, mut rx) = mpsc::channel::<FeedLine>(16384);

    println!("\x1b[1mmobwatch\x1b[0m — temporal abuse-pattern detection");

    // Stats printer
    tokio::spawn(print_stats_loop(Arc::clone(&engine), start));

    // Housekeeping
    tokio::spawn(Arc::clone(&engine).housekeeping_loop());

    // Feed source
    match cli.mode {
        Mode::Tail => {
            println!("  Mode: \x1b[96mTAIL\x1b[0m  |  {}\n", cli.path.display());
            let path = cli.path.clone();
            tokio::spawn(async move { tail_jsonl(path, tx, true).await.ok(); });
        }
        Mode::Replay => {
            println!(
                "  Mode: \x1b[93mREPLAY\x1b[0m  |  {}  speed={:.1}x\n",
                cli.path.display(),
                cli.speed
            );
            let path = cli.path.clone();
            let speed = cli.speed;
            tokio::spawn(async move { replay_jsonl(path, tx, speed).await.ok(); });
        }
    }

    println!("  Press Ctrl+C to stop.\n");

    // Single consumer — messages for one group must be scored in
    // arrival order, so scoring stays on one task.
    while let Some(fl) = rx.recv().await {
        let score = engine.analyze(&fl.group_id, fl.message, fl.base_score);
        if score.temporal_score >= cli.alert_threshold {
            print_alert(&score);
        }
    }

    Ok(())
}
