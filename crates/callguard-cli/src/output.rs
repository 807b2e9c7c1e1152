//! Human-readable rendering of pipeline outcomes

use callguard::{DeliveryResult, MessageSource, PipelineFailure, PipelineOutcome, Terminal};
use colored::Colorize;

/// Print an outcome either as pretty JSON or as a colored summary
pub fn print_outcome(outcome: &PipelineOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    let record = &outcome.record;
    println!(
        "{} {} ({}) at {}",
        "Call:".bold(),
        record.caller_name(),
        record.caller_number(),
        record.call_time().format("%Y-%m-%d %H:%M")
    );
    println!(
        "  After hours: {}",
        if record.is_after_hours() {
            "yes".yellow()
        } else {
            "no".green()
        }
    );

    let trace: Vec<&str> = outcome.trace.iter().map(|s| s.node_name()).collect();
    println!("  Path:        {}", trace.join(" -> ").dimmed());

    if let Some(composition) = &outcome.composition {
        let source = match composition.source {
            MessageSource::Generated => "generated",
            MessageSource::Fallback => "fallback",
        };
        println!("  Message ({}): {}", source, composition.text.cyan());
    }

    match &outcome.delivery {
        Some(DeliveryResult::Accepted { message_id, status }) => println!(
            "  SMS:         {} {} {}",
            "sent".green(),
            message_id,
            status.as_deref().unwrap_or_default().dimmed()
        ),
        Some(DeliveryResult::Failed { reason, .. }) => {
            println!("  SMS:         {} {}", "failed".red(), reason)
        }
        None => {}
    }

    if let Some(PipelineFailure::Compose { error }) = &outcome.failure {
        println!("  Compose:     {} {}", "failed".red(), error);
    }
    if let Some(PipelineFailure::InvariantViolated { message }) = &outcome.failure {
        println!("  Error:       {}", message.red());
    }
    if let Some(PipelineFailure::StepLimit { max_steps }) = &outcome.failure {
        println!("  Error:       {}", format!("stopped after {} steps", max_steps).red());
    }

    let status = outcome.status.to_string();
    let status = match outcome.status {
        Terminal::Handled => status.green().bold(),
        Terminal::NoAction => status.normal().bold(),
        _ => status.red().bold(),
    };
    println!("  Outcome:     {}", status);
    if record.follow_up_scheduled() {
        println!("  Follow-up:   {}", "meeting requested".dimmed());
    }

    Ok(())
}
