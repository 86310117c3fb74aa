//! Domain model: ids, statuses, environments, projects, checklists, snapshot, metrics.
//!
//! ここは純粋なデータと状態遷移だけを持ちます。
//! collaborator 呼び出しや時刻取得などの副作用は `ports` / `app` 側です。

pub mod checklist;
pub mod environment;
pub mod errors;
pub mod ids;
pub mod metrics;
pub mod project;
pub mod record;
pub mod snapshot;
pub mod status;

pub use checklist::{compute_progress, ChecklistDraft, ChecklistItem, ChecklistProgress};
pub use environment::{EnvMap, Environment, UnknownEnvironment};
pub use errors::{
    ConsistencyError, ErrorKind, RequiredField, TrackerError, TransportError, ValidationError,
};
pub use ids::{ChecklistItemId, ChecklistItemKey, ComponentId, LocalToken, ProjectId};
pub use metrics::{compute_dashboard_metrics, ChecklistStats, DashboardMetrics, EnvStats};
pub use project::{
    Component, ComponentSpec, EnvironmentVersion, Project, ProjectSpec, VersionSpec, DEFAULT_ACTOR,
};
pub use record::{ChecklistItemRecord, ComponentRecord, ProjectRecord, VersionRecord, VersionsRecord};
pub use snapshot::{checklist_from_drafts, Snapshot};
pub use status::{classify, DeploymentStatus};
