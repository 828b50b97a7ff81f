use autocapture_chain::cli::commands::{cmd_capture, cmd_check, cmd_render};
use autocapture_chain::cli::config::{Cli, Commands, log_level, merge_mask_flags};
use autocapture_chain::eligibility::config::load_config;
use autocapture_chain::trace::logger::TraceLogger;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = load_config(cli.config.as_deref())?;
    let tracer = match cli.trace.as_deref() {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    let output = match cli.command {
        Commands::Check {
            snapshot,
            target,
            event,
            url,
        } => cmd_check(&snapshot, &target, &event, url.as_deref(), &options)?,
        Commands::Capture {
            snapshot,
            target,
            event,
            chain_only,
            mask_text,
            mask_attributes,
        } => {
            let options = merge_mask_flags(options, mask_text, mask_attributes);
            cmd_capture(&snapshot, &target, &event, chain_only, &options, &tracer)?
        }
        Commands::Render { bags, fingerprint } => cmd_render(&bags, fingerprint)?,
    };

    println!("{}", output);
    Ok(())
}
