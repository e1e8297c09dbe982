//! Workflow state threaded through provisioning and cleanup

use chrono::{DateTime, Utc};
use std::fmt;
use tabled::Tabled;

use crate::error::AnfError;

/// Steps of the sample, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    SubnetCheck,
    AccountCreate,
    PoolCreate,
    Nfsv3VolumeCreate,
    Nfsv41VolumeCreate,
    SnapshotCreate,
    VolumeFromSnapshotCreate,
    VolumeResize,
    Cleanup,
}

impl Stage {
    /// Forward stages; the first failure stops the rest
    pub const PROVISIONING: [Stage; 8] = [
        Stage::SubnetCheck,
        Stage::AccountCreate,
        Stage::PoolCreate,
        Stage::Nfsv3VolumeCreate,
        Stage::Nfsv41VolumeCreate,
        Stage::SnapshotCreate,
        Stage::VolumeFromSnapshotCreate,
        Stage::VolumeResize,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::SubnetCheck => "Subnet check",
            Stage::AccountCreate => "Create account",
            Stage::PoolCreate => "Create capacity pool",
            Stage::Nfsv3VolumeCreate => "Create NFSv3 volume",
            Stage::Nfsv41VolumeCreate => "Create NFSv4.1 volume",
            Stage::SnapshotCreate => "Create snapshot",
            Stage::VolumeFromSnapshotCreate => "Create volume from snapshot",
            Stage::VolumeResize => "Resize NFSv4.1 volume",
            Stage::Cleanup => "Cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Succeeded,
    /// Cleanup ran without deleting anything because it was not requested
    Skipped,
    Failed(String),
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Pending => f.write_str("Pending"),
            StageStatus::Succeeded => f.write_str("Succeeded"),
            StageStatus::Skipped => f.write_str("Skipped"),
            StageStatus::Failed(msg) => write!(f, "Failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
    pub resource_id: Option<String>,
}

/// A resource created by a successful stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub stage: Stage,
    pub name: String,
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl ResourceRecord {
    pub fn new(stage: Stage, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            stage,
            name: name.into(),
            id: id.into(),
            created_at: Utc::now(),
        }
    }
}

/// One slot per creation stage, filled when that stage succeeds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionedResources {
    pub account: Option<ResourceRecord>,
    pub pool: Option<ResourceRecord>,
    pub nfsv3_volume: Option<ResourceRecord>,
    pub nfsv41_volume: Option<ResourceRecord>,
    pub snapshot: Option<ResourceRecord>,
    pub volume_from_snapshot: Option<ResourceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub outcomes: Vec<StageOutcome>,
    pub cleanup_requested: bool,
    pub exit_status: ExitStatus,
    pub resources: ProvisionedResources,
    /// Service-side id of the snapshot, needed to restore a volume from it
    pub snapshot_guid: Option<String>,
    pub resized_quota: Option<u64>,
}

impl WorkflowState {
    pub fn new(cleanup_requested: bool) -> Self {
        let outcomes = Stage::PROVISIONING
            .iter()
            .chain(std::iter::once(&Stage::Cleanup))
            .map(|stage| StageOutcome {
                stage: *stage,
                status: StageStatus::Pending,
                resource_id: None,
            })
            .collect();

        Self {
            outcomes,
            cleanup_requested,
            exit_status: ExitStatus::Success,
            resources: ProvisionedResources::default(),
            snapshot_guid: None,
            resized_quota: None,
        }
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }

    pub fn status(&self, stage: Stage) -> StageStatus {
        self.outcome(stage)
            .map(|o| o.status.clone())
            .unwrap_or(StageStatus::Pending)
    }

    fn outcome_mut(&mut self, stage: Stage) -> Option<&mut StageOutcome> {
        self.outcomes.iter_mut().find(|o| o.stage == stage)
    }

    pub fn mark_succeeded(&mut self, stage: Stage, resource_id: Option<String>) {
        if let Some(outcome) = self.outcome_mut(stage) {
            outcome.status = StageStatus::Succeeded;
            outcome.resource_id = resource_id;
        }
    }

    pub fn mark_skipped(&mut self, stage: Stage) {
        if let Some(outcome) = self.outcome_mut(stage) {
            outcome.status = StageStatus::Skipped;
        }
    }

    /// Record a failure; any failure makes the run exit non-zero
    pub fn mark_failed(&mut self, stage: Stage, error: &AnfError) {
        if let Some(outcome) = self.outcome_mut(stage) {
            outcome.status = StageStatus::Failed(error.to_string());
        }
        self.exit_status = ExitStatus::Failure;
    }

    pub fn is_success(&self) -> bool {
        self.exit_status == ExitStatus::Success
    }

    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.outcomes
            .iter()
            .map(|o| SummaryRow {
                stage: o.stage.to_string(),
                status: o.status.to_string(),
                resource: o.resource_id.clone().unwrap_or_else(|| "-".to_string()),
            })
            .collect()
    }
}

/// Row of the end-of-run summary table
#[derive(Debug, Clone, Tabled)]
pub struct SummaryRow {
    #[tabled(rename = "Stage")]
    pub stage: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Resource")]
    pub resource: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_all_pending() {
        let state = WorkflowState::new(false);
        assert_eq!(state.outcomes.len(), 9);
        assert!(state
            .outcomes
            .iter()
            .all(|o| o.status == StageStatus::Pending));
        assert_eq!(state.exit_status.code(), 0);
    }

    #[test]
    fn test_failure_sets_exit_status() {
        let mut state = WorkflowState::new(true);
        state.mark_succeeded(Stage::AccountCreate, Some("/id".to_string()));
        state.mark_failed(Stage::PoolCreate, &AnfError::azure_api("quota"));

        assert_eq!(state.status(Stage::AccountCreate), StageStatus::Succeeded);
        assert!(matches!(state.status(Stage::PoolCreate), StageStatus::Failed(_)));
        assert_eq!(state.exit_status, ExitStatus::Failure);
        assert_eq!(state.exit_status.code(), 1);
    }

    #[test]
    fn test_summary_rows_follow_stage_order() {
        let mut state = WorkflowState::new(false);
        state.mark_succeeded(Stage::SubnetCheck, Some("/subnet".to_string()));
        let rows = state.summary_rows();
        assert_eq!(rows[0].stage, "Subnet check");
        assert_eq!(rows[0].resource, "/subnet");
        assert_eq!(rows[8].stage, "Cleanup");
        assert_eq!(rows[8].resource, "-");
    }
}
