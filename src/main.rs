use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use court_booker::api::{build_router, state::AppState};
use court_booker::calculate::{aggregate_player_stats, summarize};
use court_booker::config::AppConfig;
use court_booker::models::{BookingDraft, BookingId};
use court_booker::notify::{
    compose_confirmation, dispatch, parse_recipients, DryRunSender, HttpEmailSender,
    NotificationSender, NotifyError,
};
use court_booker::schedule::{day_schedule, week_of, CellState, WeekGrid};
use court_booker::storage::{
    add_booking, cancel_booking, BookingStore, JsonlBookingStore, StorageConfig,
};

#[derive(Parser)]
#[command(name = "court-booker")]
#[command(about = "Tennis court scheduler with player statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// List courts and bookable time slots
    Slots,

    /// Book a court
    Book {
        /// Date of play (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        #[arg(long)]
        court: u32,

        /// Slot label, e.g. "08:00-09:00"
        #[arg(long)]
        slot: String,

        /// Player name (repeat for each player)
        #[arg(long = "player")]
        players: Vec<String>,

        /// Email a confirmation to these addresses (comma-separated)
        #[arg(long)]
        notify: Option<String>,
    },

    /// Cancel a booking
    Cancel {
        #[arg(long)]
        date: String,

        #[arg(long)]
        id: String,
    },

    /// Show one day's bookings
    Day {
        /// Date (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the weekly grid
    Week {
        /// Any date in the week (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show player statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send an email to a list of recipients
    Notify {
        /// Recipient addresses (comma-separated)
        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        message: Option<String>,

        /// Date of a booking to confirm
        #[arg(long, requires = "booking_id")]
        date: Option<String>,

        /// ID of a booking to confirm
        #[arg(long, requires = "date")]
        booking_id: Option<String>,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", raw))
}

fn date_or_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(Utc::now().date_naive()),
    }
}

fn select_sender(config: &AppConfig) -> Result<Arc<dyn NotificationSender>> {
    if config.notification.enabled {
        let sender = HttpEmailSender::from_config(&config.notification)
            .context("Failed to set up email provider")?;
        Ok(Arc::new(sender))
    } else {
        tracing::info!("Email provider disabled; confirmations will only be logged");
        Ok(Arc::new(DryRunSender))
    }
}

/// Send one email per address in `to`, printing what was sent.
async fn send_emails(
    sender: Arc<dyn NotificationSender>,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<(), NotifyError> {
    let recipients = parse_recipients(to);
    let report = dispatch(sender, &recipients, subject, body).await?;

    println!("Sent {} email(s)", report.succeeded);
    if report.skipped > 0 {
        println!("Skipped {} invalid address(es)", report.skipped);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting court-booker v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonlBookingStore::new(StorageConfig::new(config.data_dir.clone()));
    let schedule = config.schedule();

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state = AppState::new(Arc::new(store), schedule, select_sender(&config)?);
            let app = build_router(state, &config.server.cors_origin);

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Slots => {
            println!("Courts: {:?}", schedule.courts);
            for slot in &schedule.slots {
                println!("  {:<12} {}", slot.label, slot.match_type);
            }
        }
        Commands::Book {
            date,
            court,
            slot,
            players,
            notify,
        } => {
            let date = parse_date(&date)?;
            let draft = BookingDraft {
                court,
                time_slot: slot,
                players,
            };

            let booking = match add_booking(&store, &schedule, date, &draft) {
                Ok(b) => b,
                Err(e) => bail!("Could not book: {}", e),
            };
            println!(
                "Booked court {} at {} on {} (id {})",
                booking.court, booking.time_slot, booking.date, booking.id
            );

            if let Some(to) = notify {
                // The booking stands even if the confirmation does not go out
                let (subject, body) = compose_confirmation(&booking);
                if let Err(e) = send_emails(select_sender(&config)?, &to, &subject, &body).await {
                    tracing::error!("Confirmation email failed: {}", e);
                    eprintln!("Booked, but confirmation failed: {}", e);
                }
            }
        }
        Commands::Cancel { date, id } => {
            let date = parse_date(&date)?;
            match cancel_booking(&store, date, &BookingId::from(id)) {
                Ok(b) => println!("Cancelled court {} at {} on {}", b.court, b.time_slot, b.date),
                Err(e) => bail!("Could not cancel: {}", e),
            }
        }
        Commands::Day { date } => {
            let date = date_or_today(date.as_deref())?;
            let bookings = day_schedule(&schedule, store.read(date)?);

            println!("\n=== {} ===", date.format("%A %-d %B %Y"));
            if bookings.is_empty() {
                println!("No bookings");
            }
            for b in &bookings {
                println!(
                    "{:<12} court {}  {:<8} {}  [{}]",
                    b.time_slot,
                    b.court,
                    b.match_type,
                    b.active_players().collect::<Vec<_>>().join(", "),
                    b.id
                );
            }
        }
        Commands::Week { date } => {
            let date = date_or_today(date.as_deref())?;
            let days = week_of(date);
            let bookings = store.read_range(days[0], days[6])?;
            let grid = WeekGrid::build(date, &schedule, &bookings);

            println!("\n=== Week of {} ===", grid.week_start);
            for day in &grid.days {
                println!(
                    "\n{} {} ({} booked)",
                    day.weekday,
                    day.date,
                    day.booked_count()
                );
                for cell in &day.cells {
                    if let CellState::Booked { players, .. } = &cell.state {
                        println!(
                            "  {:<12} court {}  {}",
                            cell.time_slot,
                            cell.court,
                            players.join(", ")
                        );
                    }
                }
            }
        }
        Commands::Stats { json } => {
            let bookings = store.read_all()?;
            let stats = aggregate_player_stats(&bookings);
            let summary = summarize(&stats);

            if json {
                let out = serde_json::json!({ "players": stats, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            println!("\n=== Player Statistics ===");
            println!("Players:          {}", summary.total_players);
            println!("Matches:          {}", summary.total_matches);
            println!("Hours:            {}", summary.total_hours);
            println!("Avg per player:   {}", summary.average_display());
            println!();
            println!(
                "{:<20} {:>7} {:>7} {:>7} {:>5} {:>6}  {}",
                "Player", "Matches", "Singles", "Doubles", "Hours", "Court", "Last played"
            );
            for s in &stats {
                println!(
                    "{:<20} {:>7} {:>7} {:>7} {:>5} {:>6}  {}",
                    s.name,
                    s.total_matches,
                    s.singles_matches,
                    s.doubles_matches,
                    s.total_hours,
                    s.favorite_court,
                    s.last_played
                );
            }
        }
        Commands::Notify {
            to,
            subject,
            message,
            date,
            booking_id,
        } => {
            let (default_subject, default_body) = match (date, booking_id) {
                (Some(date), Some(id)) => {
                    let date = parse_date(&date)?;
                    let id = BookingId::from(id);
                    let booking = store
                        .read(date)?
                        .into_iter()
                        .find(|b| b.id == id)
                        .with_context(|| format!("No booking {} on {}", id, date))?;
                    compose_confirmation(&booking)
                }
                _ => (String::new(), String::new()),
            };

            let subject = subject.unwrap_or(default_subject);
            let body = message.unwrap_or(default_body);
            send_emails(select_sender(&config)?, &to, &subject, &body)
                .await
                .context("Email dispatch failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_emails_reports_failure() {
        let err = send_emails(Arc::new(DryRunSender), "not-an-address", "Hi", "Body")
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::NoValidRecipients));
    }

    #[tokio::test]
    async fn test_send_emails_ok() {
        send_emails(Arc::new(DryRunSender), "ann@example.com", "Hi", "Body")
            .await
            .unwrap();
    }
}
