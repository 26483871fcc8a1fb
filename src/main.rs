use anyhow::Result;
use clap::Parser;
use interview_coach::{
    Config, LogNotifier, NullAcquirer, QuestionBank, SessionConfig, SessionController,
    SessionHandle,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "interview-coach", about = "Run a mock-interview practice session")]
struct Cli {
    /// Config file to load (e.g., config/interview-coach)
    #[arg(short, long)]
    config: Option<String>,

    /// JSON question bank; overrides the config file
    #[arg(short, long)]
    questions: Option<String>,

    /// Seconds allotted per question; overrides the config file
    #[arg(short, long)]
    seconds: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let bank = match cli.questions.as_deref().or(cfg.interview.questions_path.as_deref()) {
        Some(path) => QuestionBank::from_file(path)?,
        None => QuestionBank::default(),
    };

    let session_config = SessionConfig {
        seconds_per_question: cli.seconds.unwrap_or(cfg.interview.seconds_per_question),
        ..SessionConfig::default()
    };

    info!("{} v0.1.0", cfg.service.name);
    info!(
        "{} questions, {}s per question",
        bank.len(),
        session_config.seconds_per_question
    );

    let (handle, mut summary_rx, task) = SessionController::spawn(
        session_config,
        bank,
        Arc::new(NullAcquirer),
        Arc::new(LogNotifier),
    );

    handle.start().await?;

    println!("Commands: [p]ause/resume  [n]ext  [c]amera  [m]ic  [s]tatus  [q]uit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            summary = &mut summary_rx => {
                if let Ok(summary) = summary {
                    println!(
                        "Interview complete: {} questions in {:.0}s",
                        summary.questions_presented, summary.total_duration_secs
                    );
                }
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) => dispatch(&handle, line.trim()).await,
                None => {
                    let _ = handle.shutdown().await;
                    break;
                }
            },
        }
    }

    task.await?;
    Ok(())
}

async fn dispatch(handle: &SessionHandle, input: &str) {
    let result = match input {
        "" => Ok(()),
        "p" | "pause" => handle.toggle_pause().await,
        "n" | "next" => handle.advance().await,
        "c" | "camera" => handle.toggle_camera().await,
        "m" | "mic" => handle.toggle_mic().await,
        "s" | "status" => match handle.snapshot().await {
            Ok(snapshot) => {
                println!(
                    "[{:?}] question {}/{} | {} left | camera {} | mic {}",
                    snapshot.phase,
                    snapshot.question_index + 1,
                    snapshot.question_total,
                    format_time(snapshot.remaining_seconds),
                    if snapshot.camera_enabled { "on" } else { "off" },
                    if snapshot.mic_enabled { "on" } else { "off" },
                );
                if let Some(question) = &snapshot.question {
                    println!("  {question}");
                }
                Ok(())
            }
            Err(err) => Err(err),
        },
        "q" | "quit" => handle.shutdown().await,
        other => {
            println!("Unknown command: {other}");
            Ok(())
        }
    };

    if let Err(err) = result {
        warn!("Command failed: {err}");
    }
}

fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
