//! Autocapture decisions for page interactions: eligibility, privacy
//! filtering, and the canonical element chain used to group captured events.

pub mod capture;
pub mod chain;
pub mod cli;
pub mod dom;
pub mod eligibility;
pub mod error;
pub mod privacy;
pub mod text;
pub mod trace;

pub use capture::pipeline::{CaptureOutcome, capture_interaction};
pub use chain::descriptor::{ElementDescriptor, Properties, to_descriptors};
pub use chain::render::{elements_chain_string, render};
pub use eligibility::config::{AutocaptureConfig, CaptureOptions, UrlPattern};
pub use eligibility::filter::{DomEvent, is_capture_eligible};
pub use error::{CaptureError, DomError};
