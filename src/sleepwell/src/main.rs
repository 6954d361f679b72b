#[macro_use]
extern crate log;

use std::{
    collections::HashMap,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::NaiveTime;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use dotenv::dotenv;
use sleepwell::{
    DEFAULT_SCORE_WINDOW, PipelineConfig, SleepSession,
    http::{AppState, create_router},
};
use sleepwell_algos::{AggregatorConfig, RegularityMetrics, ScoreConfig, SegmenterConfig};
use sleepwell_types::{NightRecord, Summary, Trend};

#[derive(Parser)]
#[command(name = "sleepwell", version, about = "Sleep metrics from Apple Health exports")]
pub struct SleepwellCli {
    /// Local time (HH:MM) from which samples belong to that evening's night
    #[arg(env, long, default_value = "18:00", value_parser = parse_cutoff)]
    pub evening_cutoff: NaiveTime,
    /// Most recent nights used for scoring
    #[arg(env, long, default_value_t = DEFAULT_SCORE_WINDOW)]
    pub score_window: usize,
    /// Age in years, lowers the HRV target range past 30
    #[arg(env, long)]
    pub age: Option<u32>,
    /// Only average samples taken between bed time and wake time
    #[arg(env, long, default_value_t = true, action = ArgAction::Set)]
    pub sleep_window_only: bool,
    #[clap(subcommand)]
    pub subcommand: SleepwellCommand,
}

#[derive(Subcommand)]
pub enum SleepwellCommand {
    ///
    /// Serve the dashboard API
    ///
    Serve {
        #[arg(env, long, default_value = "0.0.0.0")]
        host: String,
        #[arg(env, long, default_value_t = 8001)]
        port: u16,
    },
    ///
    /// Print one line per night of an export
    ///
    Nights { export: PathBuf },
    ///
    /// Print the cross-night summary of an export
    ///
    Summary { export: PathBuf },
    ///
    /// Print the Sleep Health Score of an export's most recent nights
    /// Given values replace the ones derived from the export
    ///
    Score {
        export: PathBuf,
        #[arg(long)]
        avg_hr: Option<f64>,
        #[arg(long)]
        resp_rate: Option<f64>,
        #[arg(long)]
        avg_hrv: Option<f64>,
        #[arg(long)]
        sleep_hours: Option<f64>,
        #[arg(long)]
        regularity_minutes: Option<f64>,
    },
    ///
    /// Generate shell completions
    ///
    Completions { shell: Shell },
}

impl SleepwellCli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            segmenter: SegmenterConfig {
                evening_cutoff: self.evening_cutoff,
            },
            aggregator: AggregatorConfig {
                sleep_window_only: self.sleep_window_only,
            },
            score: ScoreConfig {
                age: self.age,
                ..Default::default()
            },
            score_window: self.score_window,
        }
    }
}

fn parse_cutoff(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| format!("expected HH:MM, got `{}`: {}", value, e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(error) = dotenv() {
        eprintln!("{}", error);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = SleepwellCli::parse();
    let session = SleepSession::new(cli.pipeline_config());

    match cli.subcommand {
        SleepwellCommand::Serve { host, port } => {
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("invalid bind address {}:{}", host, port))?;
            let app = create_router(AppState::new(session));

            info!("listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
            Ok(())
        }
        SleepwellCommand::Nights { export } => {
            ingest(&session, &export)?;
            for night in session.nights()? {
                println!("{}", night_line(&night));
            }
            Ok(())
        }
        SleepwellCommand::Summary { export } => {
            ingest(&session, &export)?;
            print_summary(&session.get_summary()?);
            Ok(())
        }
        SleepwellCommand::Score {
            export,
            avg_hr,
            resp_rate,
            avg_hrv,
            sleep_hours,
            regularity_minutes,
        } => {
            ingest(&session, &export)?;
            let overrides = [
                ("avg_hr", avg_hr),
                ("resp_rate", resp_rate),
                ("avg_hrv", avg_hrv),
                ("sleep_hours", sleep_hours),
                ("regularity_minutes", regularity_minutes),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
            .collect::<HashMap<_, _>>();

            let result = session.get_score(Some(&overrides))?;
            println!("Score: {}/100", result.score);
            println!("{}", result.explanation);
            Ok(())
        }
        SleepwellCommand::Completions { shell } => {
            let mut command = SleepwellCli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn ingest(session: &SleepSession, export: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read(export)
        .with_context(|| format!("failed to read export {}", export.display()))?;
    let dataset = session
        .ingest(&raw)
        .with_context(|| format!("failed to ingest {}", export.display()))?;
    info!(
        "{}: {} nights, {} observations",
        export.display(),
        dataset.nights.len(),
        dataset.observation_count
    );
    Ok(())
}

/// Hours as `H:MM`.
fn hours_hm(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as i64;
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

fn opt(value: Option<f64>, format: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| "-".to_string(), format)
}

fn night_line(night: &NightRecord) -> String {
    format!(
        "{}  sleep {}  rem {}  hr {}  hrv {}  resp {}",
        night.date,
        opt(night.total_sleep_hours, hours_hm),
        opt(night.rem_percentage, |v| format!("{:.0}%", v * 100.0)),
        opt(night.avg_hr, |v| format!("{:.1}", v)),
        opt(night.avg_hrv, |v| format!("{:.1}", v)),
        opt(night.avg_resp, |v| format!("{:.1}", v)),
    )
}

fn print_summary(summary: &Summary) {
    let (Some(first), Some(last)) = (summary.first_night, summary.last_night) else {
        println!("No nights tracked");
        return;
    };

    println!("Nights: {} ({} to {})", summary.nights_tracked, first, last);
    println!("Average sleep: {}", opt(summary.avg_total_sleep, hours_hm));
    println!("Average heart rate: {}", opt(summary.avg_hr, |v| format!("{} bpm", v)));
    println!("Average HRV: {}", opt(summary.avg_hrv, |v| format!("{} ms", v)));
    println!(
        "Average respiratory rate: {}",
        opt(summary.avg_resp_rate, |v| format!("{} br/min", v))
    );
    println!(
        "Average REM: {}",
        opt(summary.avg_rem_pct, |v| format!("{:.1}%", v * 100.0))
    );

    let regularity = RegularityMetrics {
        mean_bed_time: summary.mean_bed_time,
        mean_wake_time: summary.mean_wake_time,
        bed_time_std_minutes: summary.bed_time_std_minutes,
        wake_time_std_minutes: summary.wake_time_std_minutes,
    };
    println!("{}", regularity);

    let trend = |t: Option<Trend>| t.map_or_else(|| "-".to_string(), |t| t.to_string());
    println!(
        "Trends: sleep {}, heart rate {}, hrv {}",
        trend(summary.trends.sleep_duration),
        trend(summary.trends.heart_rate),
        trend(summary.trends.hrv),
    );
}
