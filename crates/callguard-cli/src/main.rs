//! Callguard CLI - after-hours call screening
//!
//! Runs the screening workflow for a single call against the hosted
//! services, or offline with simulated collaborators.

mod config;
mod dry_run;
mod output;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use callguard::services::diagram;
use callguard::{
    CallRecord, CallRouter, MessageComposer, NotificationSender, PipelineOutcome,
    DEFAULT_FALLBACK_MESSAGE,
};
use callguard_integration_openai::OpenAiTextGeneration;
use callguard_integration_twilio::TwilioMessaging;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::Confirm;
use tracing_subscriber::EnvFilter;

use config::{mask_secret, Settings, REQUIRED_KEYS};
use dry_run::{DryRunMessaging, StaticTextGeneration, DRY_RUN_SENDER};

const SIMULATION_NUMBER: &str = "+923075861200";
const SIMULATION_NAME: &str = "Test Caller";

#[derive(Parser)]
#[command(name = "callguard")]
#[command(about = "Callguard - answer after-hours calls with an SMS", long_about = None)]
#[command(version)]
struct Cli {
    /// Print outcomes as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a call and reply by SMS if it came in after hours
    Handle {
        /// Caller phone number (E.164)
        number: String,
        /// Caller display name
        #[arg(short, long)]
        name: Option<String>,
        /// Call time: "HH:MM" (today) or "YYYY-MM-DD HH:MM"; defaults to now
        #[arg(short = 't', long)]
        at: Option<String>,
        /// Treat the call as after hours regardless of the time
        #[arg(short, long)]
        force: bool,
        /// Send without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the workflow offline with a static message and no real SMS
    Simulate {
        /// Caller phone number
        #[arg(default_value = SIMULATION_NUMBER)]
        number: String,
        /// Caller display name
        #[arg(short, long, default_value = SIMULATION_NAME)]
        name: String,
        /// Call time; without it a 03:30 and an 11:30 call are simulated
        #[arg(short = 't', long)]
        at: Option<String>,
        /// Treat the call as after hours regardless of the time
        #[arg(short, long)]
        force: bool,
    },

    /// Show which configuration keys are set
    CheckEnv,

    /// Print the workflow graph
    Diagram {
        #[arg(short, long, value_enum, default_value_t = DiagramFormat::Both)]
        format: DiagramFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DiagramFormat {
    Ascii,
    Mermaid,
    Both,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info");

    let cli = Cli::parse();

    match cli.command {
        Commands::Handle {
            number,
            name,
            at,
            force,
            yes,
        } => handle(number, name, at, force, yes, cli.json).await,
        Commands::Simulate {
            number,
            name,
            at,
            force,
        } => simulate(number, name, at, force, cli.json).await,
        Commands::CheckEnv => check_env(),
        Commands::Diagram { format } => {
            print_diagram(format);
            Ok(())
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn handle(
    number: String,
    name: Option<String>,
    at: Option<String>,
    force: bool,
    yes: bool,
    json: bool,
) -> Result<()> {
    let settings = Settings::from_env().context("Failed to load configuration")?;
    let twilio = settings
        .twilio_config()
        .context("Twilio is not configured")?;
    let openai = settings
        .openai_config()
        .context("OpenAI is not configured")?;

    let call_time = parse_call_time(at.as_deref(), Local::now().naive_local())?;

    let generator = Arc::new(OpenAiTextGeneration::new(&openai)?);
    let messaging = Arc::new(TwilioMessaging::new(&twilio)?);
    let router = CallRouter::new(
        MessageComposer::new(generator, settings.failure_policy.clone()),
        NotificationSender::new(messaging, twilio.phone_number.clone()),
    )
    .with_window(settings.window);

    let will_send = force || router.window().contains(&call_time);
    if will_send && !yes {
        let proceed = Confirm::new()
            .with_prompt(format!("Send an SMS to {}?", number))
            .default(false)
            .interact()?;
        if !proceed {
            println!("{}", "Aborted, nothing was sent.".yellow());
            return Ok(());
        }
    }

    let record = CallRecord::new(number, call_time).with_caller_name(name);
    let outcome = run(&router, record, force).await;
    output::print_outcome(&outcome, json)
}

async fn simulate(
    number: String,
    name: String,
    at: Option<String>,
    force: bool,
    json: bool,
) -> Result<()> {
    let settings = Settings::from_env().context("Failed to load configuration")?;
    let sender = settings
        .twilio_phone_number
        .clone()
        .unwrap_or_else(|| DRY_RUN_SENDER.to_string());

    let router = CallRouter::new(
        MessageComposer::new(
            Arc::new(StaticTextGeneration::new(DEFAULT_FALLBACK_MESSAGE)),
            settings.failure_policy.clone(),
        ),
        NotificationSender::new(Arc::new(DryRunMessaging), sender),
    )
    .with_window(settings.window);

    let now = Local::now().naive_local();
    let times = match at {
        Some(raw) => vec![parse_call_time(Some(&raw), now)?],
        None => vec![at_time(now.date(), 3, 30)?, at_time(now.date(), 11, 30)?],
    };

    if !json {
        println!("{}", "Simulation: no message will be sent.".yellow());
    }
    for call_time in times {
        let record =
            CallRecord::new(number.clone(), call_time).with_caller_name(Some(name.clone()));
        let outcome = run(&router, record, force).await;
        if !json {
            println!();
        }
        output::print_outcome(&outcome, json)?;
    }

    Ok(())
}

async fn run(router: &CallRouter, record: CallRecord, force: bool) -> PipelineOutcome {
    if force {
        router.run_forced(record).await
    } else {
        router.run(record).await
    }
}

fn check_env() -> Result<()> {
    println!("{}", "Checking environment variables:".bold());
    println!("{}", "=".repeat(50));

    for key in REQUIRED_KEYS {
        match std::env::var(key).ok().filter(|v| !v.trim().is_empty()) {
            Some(value) => println!(
                "{} {}: {} (length: {})",
                "✓".green(),
                key,
                mask_secret(&value),
                value.chars().count()
            ),
            None => println!("{} {}: {}", "✗".red(), key, "NOT FOUND".red()),
        }
    }

    println!("{}", "=".repeat(50));

    let settings = Settings::from_env()?;
    match settings.openai_config().and_then(|c| OpenAiTextGeneration::new(&c)) {
        Ok(_) => println!("{} OpenAI client created", "✓".green()),
        Err(e) => println!("{} OpenAI client failed: {}", "✗".red(), e),
    }
    match settings.twilio_config().and_then(|c| TwilioMessaging::new(&c)) {
        Ok(_) => println!("{} Twilio client created", "✓".green()),
        Err(e) => println!("{} Twilio client failed: {}", "✗".red(), e),
    }
    println!(
        "  After-hours window: {}, on generation failure: {}",
        settings.window, settings.failure_policy
    );

    Ok(())
}

fn print_diagram(format: DiagramFormat) {
    if matches!(format, DiagramFormat::Ascii | DiagramFormat::Both) {
        println!("{}", diagram::render_ascii());
    }
    if matches!(format, DiagramFormat::Mermaid | DiagramFormat::Both) {
        println!("{}", diagram::render_mermaid());
    }
}

fn at_time(date: NaiveDate, hour: u32, minute: u32) -> Result<NaiveDateTime> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .with_context(|| format!("Invalid time {:02}:{:02}", hour, minute))?;
    Ok(date.and_time(time))
}

/// Parse `--at`: "HH:MM" on the date of `now`, or a full date and time
fn parse_call_time(input: Option<&str>, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let Some(raw) = input.map(str::trim) else {
        return Ok(now);
    };

    if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M") {
        return Ok(now.date().and_time(time));
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }

    bail!(
        "Invalid call time '{}': expected HH:MM or YYYY-MM-DD HH:MM",
        raw
    )
}
