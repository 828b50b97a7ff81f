use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::capture::pipeline::CaptureOutcome;
use crate::eligibility::filter::DomEvent;

/// One line of the capture audit trail.
#[derive(Debug, Serialize)]
pub struct CaptureTraceEvent {
    pub timestamp_ms: u128,

    pub event_type: String,
    pub target_tag: Option<String>,

    pub decision: String,

    pub elements_chain: Option<String>,
    pub chain_fingerprint: Option<String>,

    pub suppression_reason: Option<String>,
}

impl CaptureTraceEvent {
    pub fn now(event: &DomEvent, target_tag: Option<String>) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            event_type: event.event_type.clone(),
            target_tag,
            decision: String::new(),
            elements_chain: None,
            chain_fingerprint: None,
            suppression_reason: None,
        }
    }

    pub fn with_outcome(mut self, outcome: &CaptureOutcome) -> Self {
        self.decision = outcome.label().to_string();
        match outcome {
            CaptureOutcome::Captured(props) => {
                if let Some(chain) = props.get("$elements_chain").and_then(|c| c.as_str()) {
                    self = self.with_chain(chain);
                }
            }
            CaptureOutcome::Ineligible => {
                self = self.with_suppression("eligibility gate rejected the interaction");
            }
            CaptureOutcome::Excluded => {
                self = self.with_suppression("element path carries ph-no-capture");
            }
        }
        self
    }

    pub fn with_chain(mut self, chain: &str) -> Self {
        self.chain_fingerprint = Some(crate::chain::render::chain_fingerprint(chain));
        self.elements_chain = Some(chain.to_string());
        self
    }

    pub fn with_suppression(mut self, reason: impl ToString) -> Self {
        self.suppression_reason = Some(reason.to_string());
        self
    }
}
