use clap::{Parser, Subcommand};

use crate::eligibility::config::CaptureOptions;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "autocapture-inspect",
    version,
    about = "Inspect autocapture decisions and element chains for page snapshots"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: autocapture.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append capture decisions to this JSONL file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run only the eligibility gate
    Check {
        /// Page snapshot JSON file
        #[arg(long)]
        snapshot: String,

        /// Target element: CSS selector or `#<node index>`
        #[arg(long)]
        target: String,

        /// Interaction type
        #[arg(long, default_value = "click")]
        event: String,

        /// Page URL to check against, instead of the snapshot's
        #[arg(long)]
        url: Option<String>,
    },

    /// Run the full capture pipeline and print the property bag
    Capture {
        /// Page snapshot JSON file
        #[arg(long)]
        snapshot: String,

        /// Target element: CSS selector or `#<node index>`
        #[arg(long)]
        target: String,

        /// Interaction type
        #[arg(long, default_value = "click")]
        event: String,

        /// Print only the element chain
        #[arg(long)]
        chain_only: bool,

        /// Override config: withhold all element text
        #[arg(long)]
        mask_text: bool,

        /// Override config: withhold all element attributes
        #[arg(long)]
        mask_attributes: bool,
    },

    /// Render an element chain from a JSON array of property bags
    Render {
        /// Property bags JSON file
        #[arg(long)]
        bags: String,

        /// Also print the chain fingerprint
        #[arg(long)]
        fingerprint: bool,
    },
}

// ============================================================================
// Config Builders (merge CLI flags with config file)
// ============================================================================

/// Apply CLI mask flags on top of file options. Flags only ever tighten.
pub fn merge_mask_flags(mut options: CaptureOptions, mask_text: bool, mask_attributes: bool) -> CaptureOptions {
    options.mask_all_text |= mask_text;
    options.mask_all_element_attributes |= mask_attributes;
    options
}

/// Default tracing filter for a `-v` count.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
