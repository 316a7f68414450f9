mod db;
mod error;
mod models;
mod tui;
mod views;

use clap::{Args, Parser, Subcommand};
use log::{debug, warn};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use db::RecordStore;
use models::{format_time, JsonOutput, LearningRecord, RecordForm, COLUMNS};
use tui::widgets::truncate;
use views::DashboardViews;

const DEFAULT_DB_NAME: &str = "studylog.db";

#[derive(Parser)]
#[command(name = "studylog")]
#[command(about = "Log, browse and chart personal learning sessions")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Database file (defaults to $STUDYLOG_DB, then the user config dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the learning_data table
    Init,

    /// Manage learning records
    #[command(subcommand)]
    Record(RecordCommands),

    /// Print the four dashboard views
    Dashboard,

    /// Launch interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum RecordCommands {
    /// List all records
    List,

    /// Show one record
    Show {
        /// Serial number
        serial_no: i64,
    },

    /// Add a new record (every field is required)
    Add {
        /// Serial number (must not already exist)
        serial_no: i64,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Change fields of an existing record
    Edit {
        /// Serial number
        serial_no: i64,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a record
    Delete {
        /// Serial number
        serial_no: i64,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
struct FieldArgs {
    /// Session date, YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,

    /// Start time, HH:MM
    #[arg(long)]
    from: Option<String>,

    /// End time, HH:MM
    #[arg(long)]
    to: Option<String>,

    #[arg(long)]
    topic: Option<String>,

    /// Type of learning (reading, video, practice...)
    #[arg(long = "type")]
    kind: Option<String>,

    /// Duration in minutes
    #[arg(long)]
    duration: Option<String>,

    #[arg(long)]
    focus: Option<String>,

    #[arg(long)]
    difficulty: Option<String>,

    #[arg(long)]
    energy: Option<String>,

    #[arg(long)]
    distraction: Option<String>,

    #[arg(long)]
    completion_percentage: Option<String>,

    /// Learning mode (Online, Offline...)
    #[arg(long)]
    mode: Option<String>,

    #[arg(long)]
    completion_rate: Option<String>,
}

impl FieldArgs {
    // Overwrites only the fields that were given on the command line
    fn apply(&self, form: &mut RecordForm) {
        let given = [
            &self.date,
            &self.from,
            &self.to,
            &self.topic,
            &self.kind,
            &self.duration,
            &self.focus,
            &self.difficulty,
            &self.energy,
            &self.distraction,
            &self.completion_percentage,
            &self.mode,
            &self.completion_rate,
        ];
        for (i, value) in given.into_iter().enumerate() {
            if let Some(value) = value {
                form.set(i + 1, value.as_str());
            }
        }
    }
}

fn get_db_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }

    if let Ok(path) = std::env::var("STUDYLOG_DB") {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studylog");

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn get_busy_timeout() -> Duration {
    match std::env::var("STUDYLOG_BUSY_TIMEOUT_MS") {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!("Ignoring invalid STUDYLOG_BUSY_TIMEOUT_MS '{}'", raw);
                db::DEFAULT_BUSY_TIMEOUT
            }
        },
        Err(_) => db::DEFAULT_BUSY_TIMEOUT,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_db_path(cli.db.clone());
    debug!("Using database at {}", db_path.display());
    let store = RecordStore::open(&db_path)?.with_busy_timeout(get_busy_timeout());

    match cli.command {
        Commands::Init => {
            store.init()?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", store.path().display());
            }
        }

        Commands::Record(record_cmd) => match record_cmd {
            RecordCommands::List => {
                let records = store.fetch_all()?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&records))?);
                } else if records.is_empty() {
                    println!("No records found.");
                } else {
                    println!(
                        "{:<6} {:<10} {:<11} {:<20} {:<12} {:>5} {:>5} {:<10} {:>6}",
                        "NO", "DATE", "TIME", "TOPIC", "TYPE", "MIN", "FOCUS", "MODE", "RATE"
                    );
                    println!("{}", "-".repeat(93));
                    for record in &records {
                        println!("{}", format_row(record));
                    }
                }
            }

            RecordCommands::Show { serial_no } => match store.fetch_by_key(serial_no)? {
                Some(record) => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&record))?);
                    } else {
                        for (column, value) in COLUMNS.iter().zip(record.cells()) {
                            println!("{:<23} {}", format!("{}:", column), value);
                        }
                    }
                }
                None => print_not_found(cli.json, serial_no)?,
            },

            RecordCommands::Add { serial_no, fields } => {
                let mut form = RecordForm::default();
                form.set(0, serial_no.to_string());
                fields.apply(&mut form);
                let record = form.parse()?;

                store.insert(&record)?;

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "serial_no": record.serial_no
                        })))?
                    );
                } else {
                    println!("Added record {} ({}).", record.serial_no, record.topic);
                }
            }

            RecordCommands::Edit { serial_no, fields } => {
                // Read and write are separate calls; a concurrent delete turns this into a no-op
                let Some(existing) = store.fetch_by_key(serial_no)? else {
                    return print_not_found(cli.json, serial_no);
                };

                let mut form = RecordForm::from_record(&existing);
                fields.apply(&mut form);
                let updated = form.parse()?;

                if store.update(serial_no, &updated.fields())? == 0 {
                    return print_not_found(cli.json, serial_no);
                }

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&updated))?);
                } else {
                    println!("Updated record {}.", serial_no);
                }
            }

            RecordCommands::Delete { serial_no, yes } => {
                if !yes && !cli.json && io::stdin().is_terminal() && !confirm_delete(serial_no)? {
                    println!("Cancelled.");
                    return Ok(());
                }

                if store.delete(serial_no)? == 0 {
                    return print_not_found(cli.json, serial_no);
                }

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                } else {
                    println!("Record {} deleted.", serial_no);
                }
            }
        },

        Commands::Dashboard => {
            let records = store.fetch_all()?;
            let views = DashboardViews::from_records(&records);
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&views))?);
            } else {
                print_dashboard(&views);
            }
        }

        Commands::Tui => {
            tui::run(store)?;
        }
    }

    Ok(())
}

fn print_not_found(json: bool, serial_no: i64) -> Result<(), Box<dyn std::error::Error>> {
    let message = format!("No record found with Serial No {}.", serial_no);
    if json {
        println!("{}", serde_json::to_string(&JsonOutput::<()>::err(message))?);
    } else {
        println!("{}", message);
    }
    Ok(())
}

fn confirm_delete(serial_no: i64) -> io::Result<bool> {
    print!(
        "Are you sure you want to delete Serial No {}? [y/N] ",
        serial_no
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn format_row(record: &LearningRecord) -> String {
    format!(
        "{:<6} {:<10} {:<11} {:<20} {:<12} {:>5} {:>5} {:<10} {:>6}",
        record.serial_no,
        record.date.format("%Y-%m-%d"),
        format!("{}-{}", format_time(record.time_from), format_time(record.time_to)),
        truncate(&record.topic, 20),
        truncate(&record.type_of_learning, 12),
        record.duration_min,
        record.focus_level,
        truncate(&record.learning_mode, 10),
        record.completion_rate,
    )
}

fn print_dashboard(views: &DashboardViews) {
    if views.is_empty() {
        println!("No records found.");
        return;
    }

    println!("=== Total Duration by Topic ===");
    for (topic, total) in &views.duration_by_topic {
        println!("{:<30} {:>6} min", truncate(topic, 30), total);
    }

    println!();
    println!("=== Learning Mode Distribution ===");
    let total = views.record_count();
    for (mode, count) in &views.learning_mode_distribution {
        println!(
            "{:<30} {:>6} ({:.1}%)",
            truncate(mode, 30),
            count,
            *count as f64 * 100.0 / total as f64
        );
    }

    println!();
    println!("=== Focus Level vs Completion Rate ===");
    println!(
        "{:<6} {:>4} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "FOCUS", "N", "MIN", "Q1", "MEDIAN", "Q3", "MAX"
    );
    for (focus, summary) in views.completion_summaries() {
        let n = views
            .focus_vs_completion
            .get(&focus)
            .map(Vec::len)
            .unwrap_or(0);
        println!(
            "{:<6} {:>4} {:>7.1} {:>7.1} {:>7.1} {:>7.1} {:>7.1}",
            focus, n, summary.min, summary.q1, summary.median, summary.q3, summary.max
        );
    }

    println!();
    println!("=== Focus Level vs Duration ===");
    println!("{:<6} {:>8}", "FOCUS", "MINUTES");
    for (focus, duration) in &views.focus_vs_duration {
        println!("{:<6} {:>8}", focus, duration);
    }
}
