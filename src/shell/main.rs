use anyhow::Context;
use clap::{Parser, Subcommand};
use time_tracking::modules::time_tracking::core::aggregate::format_hms;
use time_tracking::modules::time_tracking::core::time_entry::TimeEntry;
use time_tracking::modules::time_tracking::use_cases::punch_clock::handler::ClockStatus;
use time_tracking::modules::time_tracking::use_cases::track_time::timesheet_view::TimesheetView;
use time_tracking::shared::infrastructure::backend::http::HttpBackend;
use time_tracking::shell::config::{AppType, Config};
use time_tracking::shell::kiosk::EndReason;
use time_tracking::shell::state::AppState;
use time_tracking::shell::telemetry;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "time_tracking")]
#[command(about = "Clock in and out, and follow your hours")]
#[command(version)]
struct Cli {
    /// Access code used when there is no live session
    #[arg(long, global = true, env = "TIME_TRACKING_ACCESS_CODE", hide_env_values = true)]
    access_code: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the clock status and this week's hours
    Status,

    /// Start a session
    ClockIn,

    /// Close the open session
    ClockOut,

    /// Keep polling and report hours on every tick
    Watch {
        /// Weekly target in hours, defaults to the profile's target
        #[arg(long)]
        target: Option<f64>,
    },

    /// Show a team member's timesheet
    Member {
        #[arg(value_name = "USER_ID")]
        user_id: String,

        /// Week offset, 0 is the current week and -1 the one before
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        week: i32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    telemetry::init();
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let cli = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;
    let state = AppState::from_config(config).context("could not build the backend client")?;
    let user = state
        .sign_in(cli.access_code.as_deref())
        .await
        .context("sign in failed")?;

    match cli.command {
        Commands::Status => {
            let status = state.punch.load_status().await?;
            print_status(&status);
            print_week(&state.store.snapshot().await, user.target_hours_per_week);
        }
        Commands::ClockIn => {
            state.punch.load_status().await?;
            let entry = state.punch.clock_in().await?;
            println!("Clocked in at {}", entry.clock_in.format("%H:%M:%S"));
        }
        Commands::ClockOut => {
            state.punch.load_status().await?;
            let entry = state.punch.clock_out().await?;
            let worked = entry.duration.unwrap_or_default() as f64;
            println!("Clocked out after {}", format_hms(worked));
        }
        Commands::Watch { target } => {
            let target = target.unwrap_or(user.target_hours_per_week);
            watch(&state, target).await?;
        }
        Commands::Member { user_id, week } => {
            let view = state.member_timesheet.handle(&user, &user_id).await?;
            print_member(&view, &user_id, week);
        }
    }
    Ok(())
}

async fn watch(state: &AppState<HttpBackend>, target: f64) -> anyhow::Result<()> {
    let kiosk = state.kiosk_session();
    let guard_idle = state.config.app_type == AppType::Clock;
    let mut ticks = state.store.live_clock().subscribe();
    let mut polls = tokio::time::interval(state.config.poll_interval);
    state.store.start().await;

    loop {
        tokio::select! {
            changed = ticks.changed() => {
                if changed.is_err() {
                    break;
                }
                report(&state.store.snapshot().await, target);
            }
            _ = polls.tick() => {
                if state.store.is_loaded().await {
                    report(&state.store.snapshot().await, target);
                }
            }
            reason = kiosk.idle_guard(), if guard_idle => {
                info!(?reason, "kiosk session ended");
                return Ok(());
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(error) = signal {
                    warn!(%error, "could not listen for ctrl-c");
                }
                break;
            }
        }
    }

    if guard_idle {
        kiosk.end(EndReason::Unload).await;
    } else {
        state.store.stop().await;
    }
    Ok(())
}

fn report(view: &TimesheetView, target: f64) {
    let stats = view.stats_for_week(0, target);
    info!(
        tick = view.tick(),
        today = %view.hours_today(),
        week_hours = stats.total_hours,
        progress = stats.progress,
        session = ?view.open_session_seconds().map(|s| format_hms(s as f64)),
        "hours"
    );
}

fn print_status(status: &ClockStatus) {
    match &status.current_session {
        Some(session) => println!("Clocked in since {}", session.clock_in.format("%Y-%m-%d %H:%M:%S")),
        None => println!("Not clocked in"),
    }
    if let Some(last) = &status.last_activity {
        println!("Last activity: {}", describe(last));
    }
}

fn describe(entry: &TimeEntry) -> String {
    match entry.clock_out {
        Some(out) => format!(
            "{} - {} ({})",
            entry.clock_in.format("%Y-%m-%d %H:%M"),
            out.format("%H:%M"),
            format_hms(entry.duration.unwrap_or_default() as f64)
        ),
        None => format!("{} - open", entry.clock_in.format("%Y-%m-%d %H:%M")),
    }
}

fn print_week(view: &TimesheetView, target: f64) {
    let stats = view.stats_for_week(0, target);
    println!("Today: {}", view.hours_today());
    println!(
        "This week: {:.2}h of {:.0}h ({}%), {} days, {:.2}h/day, trend {:?}",
        stats.total_hours,
        target,
        stats.progress,
        stats.days_worked,
        stats.average_daily,
        stats.trend
    );

    let dashboard = view.dashboard();
    println!(
        "Streak: {} days (longest {}), productivity {}",
        dashboard.current_streak, dashboard.longest_streak, dashboard.productivity_score
    );
    for insight in &dashboard.insights {
        println!("  - {insight}");
    }
}

fn print_member(view: &TimesheetView, user_id: &str, week: i32) {
    let stats = view.stats_for_week(week, 0.0);
    println!(
        "Member {user_id}, week {week}: {:.2}h over {} days",
        stats.total_hours, stats.days_worked
    );
    for day in view.daily_breakdown(week) {
        println!(
            "  {} {:?}: {:>6.2}h in {} sessions",
            day.date, day.weekday, day.hours, day.sessions
        );
    }
}
