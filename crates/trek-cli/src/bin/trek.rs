//! Command line front end for the Everest step challenge.
//!
//! Talks to the log board named by `TREK_REMOTE_URL` and falls back to the
//! local snapshot when the board is unreachable.

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use trek_cli::{render_day, render_grid, render_route, render_status, render_team};
use trek_core::{
    daily_totals, find_member, parse_date_time, parse_steps, ChangeEvent, Route, TEAM_MEMBERS,
};
use trek_store::{HttpLogStore, StoreConfig};

/// Everest step challenge
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the team's progress towards the summit
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Log steps for a team member
    Log {
        /// Member id (member-1 .. member-4)
        #[arg(long)]
        member: String,
        #[arg(long)]
        steps: String,
        /// Local date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Local time, HH:MM (default: now)
        #[arg(long)]
        time: Option<String>,
    },
    /// Change the steps or date of an existing log
    Edit {
        id: String,
        #[arg(long)]
        steps: Option<String>,
        #[arg(long, requires = "time")]
        date: Option<String>,
        #[arg(long, requires = "date")]
        time: Option<String>,
    },
    /// Delete a log
    Delete { id: String },
    /// Per-member totals
    Team,
    /// Logs recorded on one local day
    Day {
        /// YYYY-MM-DD (default: today)
        date: Option<String>,
    },
    /// Daily consistency grid
    Grid {
        #[arg(long, default_value_t = 14)]
        days: u32,
    },
    /// Milestones along the route
    Route,
    /// Follow live changes from the log board
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trek=warn,trek_store=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = StoreConfig::from_env();
    let mut store = trek_store::connect(&config)
        .await
        .context("Failed to open the log store")?;
    let route = Route::everest();

    match args.command {
        Command::Status { json } => {
            let progress = store.progress(&route);
            if json {
                let body = json!({ "phase": store.phase(), "progress": progress });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", render_status(&progress, &route, store.phase()));
            }
        }
        Command::Log { member, steps, date, time } => {
            let Some(member) = find_member(&member) else {
                bail!("Unknown member '{}'", member);
            };
            let steps = parse_steps(&steps)?;
            let now = Local::now();
            let date = date.unwrap_or_else(|| now.format("%Y-%m-%d").to_string());
            let time = time.unwrap_or_else(|| now.format("%H:%M").to_string());
            let when = parse_date_time(&date, &time, &Local)?;

            let log = store.add_log(member.id, steps, when).await;
            println!("Logged {} steps for {} ({})", log.steps, member.name, log.id);
        }
        Command::Edit { id, steps, date, time } => {
            let Some(mut log) = store.get(&id).cloned() else {
                bail!("No log with id '{}'", id);
            };
            if steps.is_none() && date.is_none() {
                bail!("Nothing to change, pass --steps or --date/--time");
            }
            if let Some(steps) = steps {
                log.steps = parse_steps(&steps)?;
            }
            if let (Some(date), Some(time)) = (date, time) {
                log.set_date(parse_date_time(&date, &time, &Local)?);
            }

            store.update_log(log.clone()).await;
            println!("Updated {}: {} steps at {}", log.id, log.steps, log.date);
        }
        Command::Delete { id } => {
            if store.delete_log(&id).await {
                println!("Deleted {}", id);
            } else {
                println!("No log with id '{}'", id);
            }
        }
        Command::Team => {
            println!("{}", render_team(store.logs(), &TEAM_MEMBERS));
        }
        Command::Day { date } => {
            let day = match date {
                Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .with_context(|| format!("Invalid date '{}'", raw))?,
                None => Local::now().date_naive(),
            };
            println!("{}", day.format("%A, %B %-d"));
            println!("{}", render_day(&store.logs_for_day(day, &Local), &Local));
        }
        Command::Grid { days } => {
            let today = Local::now().date_naive();
            println!("{}", render_grid(&daily_totals(store.logs(), today, days, &Local)));
        }
        Command::Route => {
            println!("{}", render_route(&route, store.elevation()));
        }
        Command::Watch => watch(&mut store, &route).await?,
    }

    store.close();
    Ok(())
}

async fn watch(store: &mut HttpLogStore, route: &Route) -> anyhow::Result<()> {
    if !store.is_subscribed() {
        bail!("Live updates need a reachable log board (set TREK_REMOTE_URL)");
    }
    println!("{}\n", render_status(&store.progress(route), route, store.phase()));

    loop {
        tokio::select! {
            change = store.next_change() => {
                let Some(change) = change else {
                    println!("Change feed closed");
                    return Ok(());
                };
                match &change {
                    ChangeEvent::Insert { record } => {
                        println!("+ {} steps from {}", record.steps, record.member_id)
                    }
                    ChangeEvent::Update { record } => {
                        println!("~ {} now {} steps", record.id, record.steps)
                    }
                    ChangeEvent::Delete { id } => println!("- {}", id),
                }
                let progress = store.progress(route);
                println!(
                    "  {}m / {}m ({:.1}%)",
                    progress.elevation_m,
                    route.summit_elevation(),
                    progress.percent
                );
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Stopping");
                return Ok(());
            }
        }
    }
}
