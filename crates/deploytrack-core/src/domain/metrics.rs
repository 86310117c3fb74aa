//! Portfolio-wide dashboard metrics.
//!
//! Always derived from a snapshot on demand; nothing here is cached.

use serde::{Deserialize, Serialize};

use super::checklist::rounded_percentage;
use super::environment::{EnvMap, Environment};
use super::project::Project;
use super::status::DeploymentStatus;

/// Per-environment counters.
///
/// `total` counts every component; `Pending` slots only show up there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvStats {
    pub total: usize,
    pub deployed: usize,
    pub inprogress: usize,
    pub failed: usize,
}

impl EnvStats {
    /// Zero when deserialized counters don't add up.
    pub fn pending(&self) -> usize {
        self.total
            .saturating_sub(self.deployed)
            .saturating_sub(self.inprogress)
            .saturating_sub(self.failed)
    }

    fn record(&mut self, status: DeploymentStatus) {
        self.total += 1;
        match status {
            DeploymentStatus::Deployed => self.deployed += 1,
            DeploymentStatus::InProgress => self.inprogress += 1,
            DeploymentStatus::Failed => self.failed += 1,
            DeploymentStatus::Pending => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistStats {
    pub total_checklist_items: usize,
    pub completed_checklist_items: usize,
    pub completion_percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_projects: usize,
    pub total_components: usize,
    pub env_stats: EnvMap<EnvStats>,
    pub checklist_stats: ChecklistStats,
}

impl DashboardMetrics {
    pub fn env(&self, env: Environment) -> &EnvStats {
        self.env_stats.get(env)
    }
}

pub fn compute_dashboard_metrics(projects: &[Project]) -> DashboardMetrics {
    let mut metrics = DashboardMetrics {
        total_projects: projects.len(),
        ..DashboardMetrics::default()
    };
    let mut items = 0;
    let mut completed = 0;

    for component in projects.iter().flat_map(|p| p.components.iter()) {
        metrics.total_components += 1;
        for env in Environment::ALL {
            metrics
                .env_stats
                .get_mut(env)
                .record(component.version(env).status);
        }
        items += component.checklist.len();
        completed += component.checklist.iter().filter(|i| i.completed).count();
    }

    metrics.checklist_stats = ChecklistStats {
        total_checklist_items: items,
        completed_checklist_items: completed,
        completion_percentage: rounded_percentage(completed, items),
    };
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::ProjectId;
    use crate::domain::snapshot::fixtures::{component, project};
    use crate::domain::snapshot::Snapshot;
    use crate::domain::status::DeploymentStatus::*;

    fn portfolio() -> Vec<Project> {
        vec![
            project(
                1,
                vec![
                    component(10, [Deployed, Deployed, InProgress, Pending], &[true, true, false]),
                    component(11, [Deployed, Failed, Pending, Pending], &[false]),
                ],
            ),
            project(2, vec![component(20, [InProgress, Pending, Pending, Pending], &[true])]),
            project(3, vec![]),
        ]
    }

    #[test]
    fn empty_portfolio_has_zero_metrics() {
        let metrics = compute_dashboard_metrics(&[]);
        assert_eq!(metrics, DashboardMetrics::default());
        assert_eq!(metrics.checklist_stats.completion_percentage, 0);
    }

    #[test]
    fn counts_every_environment_of_every_component() {
        let metrics = compute_dashboard_metrics(&portfolio());

        assert_eq!(metrics.total_projects, 3);
        assert_eq!(metrics.total_components, 3);

        let dev = metrics.env(Environment::Dev);
        assert_eq!((dev.total, dev.deployed, dev.inprogress, dev.failed), (3, 2, 1, 0));

        let qa = metrics.env(Environment::Qa);
        assert_eq!((qa.total, qa.deployed, qa.failed, qa.pending()), (3, 1, 1, 1));

        let prod = metrics.env(Environment::Prod);
        assert_eq!((prod.total, prod.pending()), (3, 3));

        assert_eq!(
            metrics.checklist_stats,
            ChecklistStats {
                total_checklist_items: 5,
                completed_checklist_items: 3,
                completion_percentage: 60,
            }
        );
    }

    #[test]
    fn removing_a_project_removes_its_contribution() {
        let mut snap = Snapshot::new(portfolio());
        let before = compute_dashboard_metrics(snap.projects());

        let removed = snap.remove_project(ProjectId::new(1)).unwrap();
        let after = compute_dashboard_metrics(snap.projects());

        assert_eq!(
            after.total_components,
            before.total_components - removed.components_count()
        );
        for env in Environment::ALL {
            assert_eq!(after.env(env).total, before.env(env).total - 2);
        }
        assert_eq!(after.env(Environment::Dev).deployed, 0);
        assert_eq!(after.env(Environment::Qa).failed, 0);
        assert_eq!(after.checklist_stats.total_checklist_items, 1);
    }

    #[test]
    fn serializes_with_dashboard_field_names() {
        let json = serde_json::to_value(compute_dashboard_metrics(&portfolio())).unwrap();
        assert_eq!(json["totalComponents"], 3);
        assert_eq!(json["envStats"]["dev"]["inprogress"], 1);
        assert_eq!(json["checklistStats"]["completionPercentage"], 60);
    }

    #[test]
    fn pending_never_underflows_on_inconsistent_counters() {
        let stats: EnvStats =
            serde_json::from_str(r#"{"total":1,"deployed":2,"inprogress":1,"failed":0}"#).unwrap();
        assert_eq!(stats.pending(), 0);
    }
}
