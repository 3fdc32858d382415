use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{FailureReason, ResolutionFailure, ResolutionOutcome};
use crate::core::catalog::{Candidate, Request};
use crate::core::maven::{ArtifactIdentity, ArtifactVersion, VersionRange};

/// Which satisfying candidate wins when several fit every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Highest satisfying version.
    #[default]
    Newest,
    /// Lowest satisfying version.
    Oldest,
}

impl SelectionPolicy {
    /// True when `challenger` should replace `current`. Equal versions never
    /// replace, so the first declared candidate wins a tie.
    fn prefers(&self, challenger: &ArtifactVersion, current: &ArtifactVersion) -> bool {
        match self {
            SelectionPolicy::Newest => challenger > current,
            SelectionPolicy::Oldest => challenger < current,
        }
    }
}

/// Picks one version per identity. Pure: no I/O, no shared state.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionResolver {
    policy: SelectionPolicy,
}

impl VersionResolver {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Resolve one identity.
    ///
    /// `None` when nothing requests the identity: embedded jars nobody asked
    /// for are not dependencies. Request ranges are checked against each
    /// other before any candidate is looked at.
    pub fn resolve(
        &self,
        identity: &ArtifactIdentity,
        candidates: &[Candidate],
        requests: &[Request],
    ) -> Option<ResolutionOutcome> {
        if requests.is_empty() {
            trace!("{} is embedded but never requested", identity);
            return None;
        }

        let infeasible = |reason: FailureReason| {
            debug!("{} cannot be resolved: {}", identity, reason);
            ResolutionOutcome::Infeasible(ResolutionFailure {
                identity: identity.clone(),
                reason,
                requests: requests.to_vec(),
                candidates: candidates.to_vec(),
            })
        };

        let effective = requests
            .iter()
            .fold(VersionRange::unbounded(), |acc, request| acc.intersect(&request.range));
        if effective.is_empty() {
            return Some(infeasible(FailureReason::RangeConflict));
        }

        let mut chosen: Option<&Candidate> = None;
        for candidate in candidates.iter().filter(|c| effective.contains(&c.version)) {
            chosen = match chosen {
                Some(best) if !self.policy.prefers(&candidate.version, &best.version) => Some(best),
                _ => Some(candidate),
            };
        }

        match chosen {
            Some(candidate) => {
                debug!(
                    "Selected {}@{} from {} (range {}, {} request(s))",
                    identity,
                    candidate.version,
                    candidate.origin,
                    effective,
                    requests.len()
                );
                Some(ResolutionOutcome::Selected(candidate.clone()))
            }
            None => Some(infeasible(FailureReason::MissingSatisfyingArtifact)),
        }
    }
}
