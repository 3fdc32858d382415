use serde::Serialize;

use super::{AggregatedResolutionFailure, FailureReason, ResolutionFailure};
use crate::core::maven::{ArtifactVersion, VersionRange};

impl FailureReason {
    /// Advice shown next to a failure of this kind.
    pub fn guidance(&self) -> &'static str {
        match self {
            FailureReason::RangeConflict => {
                "Mods require incompatible versions of this dependency. \
                 Update or remove one of the requesting mods."
            }
            FailureReason::MissingSatisfyingArtifact => {
                "No contained jar provides a version inside the requested range. \
                 Update the mods that ship this dependency."
            }
        }
    }
}

/// One requester of an unresolvable identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequesterLine {
    pub package: String,
    pub range: VersionRange,
    /// Version of the jar the requester itself embeds for this identity.
    pub included_version: Option<ArtifactVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityConflict {
    pub identity: String,
    pub reason: FailureReason,
    pub guidance: &'static str,
    pub requesters: Vec<RequesterLine>,
}

/// Presentation-free view of an aggregated failure: identities in catalog
/// order, requesters in package order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictReport {
    pub conflicts: Vec<IdentityConflict>,
}

impl ConflictReport {
    pub fn from_failure(failure: &AggregatedResolutionFailure) -> Self {
        Self {
            conflicts: failure.failures().iter().map(conflict_for).collect(),
        }
    }
}

fn conflict_for(failure: &ResolutionFailure) -> IdentityConflict {
    let requesters = failure
        .requests
        .iter()
        .map(|request| RequesterLine {
            package: request.requester.display_name.clone(),
            range: request.range.clone(),
            included_version: failure
                .candidates
                .iter()
                .find(|c| c.origin.id == request.requester.id)
                .map(|c| c.version.clone()),
        })
        .collect();

    IdentityConflict {
        identity: failure.identity.to_string(),
        reason: failure.reason,
        guidance: failure.reason.guidance(),
        requesters,
    }
}

/// Turns a [`ConflictReport`] into text for some audience.
pub trait ReportRenderer {
    fn render(&self, report: &ConflictReport) -> String;
}

/// One line per requester per identity:
/// `<group:artifact> requested-by <package> range=<range> (reason: <conflict|missing>)`
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn render(&self, report: &ConflictReport) -> String {
        let mut out = String::new();
        for conflict in &report.conflicts {
            for requester in &conflict.requesters {
                out.push_str(&format!(
                    "{} requested-by {} range={} (reason: {})\n",
                    conflict.identity, requester.package, requester.range, conflict.reason
                ));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &ConflictReport) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\":{:?}}}", e.to_string()))
    }
}
