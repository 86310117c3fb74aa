//! Wire records exchanged with the persistence collaborator.
//!
//! JSON shape is camelCase. Inbound statuses always go through `classify`,
//! so an unexpected token can never reach the snapshot; outbound statuses
//! use the canonical label.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::checklist::ChecklistItem;
use super::environment::EnvMap;
use super::ids::{ChecklistItemId, ChecklistItemKey, ComponentId, ProjectId};
use super::project::{Component, EnvironmentVersion, Project, DEFAULT_ACTOR};
use super::status::classify;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Derived on output; ignored on input.
    #[serde(default)]
    pub components_count: usize,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub id: ComponentId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_ticket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_allocation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(default)]
    pub versions: VersionsRecord,
    #[serde(default)]
    pub checklist: Vec<ChecklistItemRecord>,
}

/// A missing environment key means an untouched (Pending) slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<VersionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa: Option<VersionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uat: Option<VersionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod: Option<VersionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_deploy: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItemRecord {
    pub id: ChecklistItemId,
    pub item: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ========================================
// record -> domain
// ========================================

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        Project {
            id: record.id,
            name: record.name,
            description: record.description.filter(|d| !d.is_empty()),
            components: record.components.into_iter().map(Component::from).collect(),
        }
    }
}

impl From<ComponentRecord> for Component {
    fn from(record: ComponentRecord) -> Self {
        let VersionsRecord { dev, qa, uat, prod } = record.versions;
        Component {
            id: record.id,
            name: record.name,
            kind: record.kind,
            jira_ticket: record.jira_ticket,
            memory_allocation: record.memory_allocation,
            timeout: record.timeout,
            versions: EnvMap {
                dev: slot_from(dev),
                qa: slot_from(qa),
                uat: slot_from(uat),
                prod: slot_from(prod),
            },
            checklist: record
                .checklist
                .into_iter()
                .enumerate()
                .map(|(index, item)| ChecklistItem {
                    key: ChecklistItemKey::Persisted(item.id),
                    description: item.item,
                    completed: item.completed,
                    notes: item.notes,
                    order: index as u32 + 1,
                })
                .collect(),
        }
    }
}

fn slot_from(record: Option<VersionRecord>) -> EnvironmentVersion {
    let Some(record) = record else {
        return EnvironmentVersion::default();
    };
    EnvironmentVersion {
        version: record.version,
        status: classify(record.status.as_deref()),
        last_deploy: record.last_deploy,
        deployed_by: record
            .deployed_by
            .filter(|actor| !actor.is_empty())
            .unwrap_or_else(|| DEFAULT_ACTOR.to_string()),
    }
}

// ========================================
// domain -> record
// ========================================

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        ProjectRecord {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            components_count: project.components_count(),
            components: project.components.iter().map(ComponentRecord::from).collect(),
        }
    }
}

impl From<&Component> for ComponentRecord {
    fn from(component: &Component) -> Self {
        let versions = component.versions.map(|_, slot| Some(VersionRecord::from(slot)));
        ComponentRecord {
            id: component.id,
            name: component.name.clone(),
            kind: component.kind.clone(),
            jira_ticket: component.jira_ticket.clone(),
            memory_allocation: component.memory_allocation.clone(),
            timeout: component.timeout.clone(),
            versions: VersionsRecord {
                dev: versions.dev,
                qa: versions.qa,
                uat: versions.uat,
                prod: versions.prod,
            },
            // Pending items have no collaborator id and are not part of the wire shape.
            checklist: component
                .checklist
                .iter()
                .filter_map(|item| {
                    item.key.persisted_id().map(|id| ChecklistItemRecord {
                        id,
                        item: item.description.clone(),
                        completed: item.completed,
                        notes: item.notes.clone(),
                    })
                })
                .collect(),
        }
    }
}

impl From<&EnvironmentVersion> for VersionRecord {
    fn from(slot: &EnvironmentVersion) -> Self {
        VersionRecord {
            version: slot.version.clone(),
            status: Some(slot.status.label().to_string()),
            last_deploy: slot.last_deploy,
            deployed_by: Some(slot.deployed_by.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::environment::Environment;
    use crate::domain::status::DeploymentStatus;

    const PAYLOAD: &str = r#"
    [{
      "id": 1,
      "name": "Payments",
      "description": "card flows",
      "componentsCount": 99,
      "components": [{
        "id": 10,
        "name": "charge-lambda",
        "type": "lambda",
        "jiraTicket": "PAY-101",
        "versions": {
          "dev": { "version": "1.2.0", "status": "Deployed", "lastDeploy": "2024-02-01", "deployedBy": "ana" },
          "qa":  { "version": "1.1.0", "status": "InProgress" },
          "prod": { "version": "", "status": "rolled-back" }
        },
        "checklist": [
          { "id": 5, "item": "smoke tests", "completed": true },
          { "id": 6, "item": "sign-off", "completed": false, "notes": "waiting on QA" }
        ]
      }]
    }]"#;

    #[test]
    fn decodes_collaborator_payload() {
        let records: Vec<ProjectRecord> = serde_json::from_str(PAYLOAD).unwrap();
        let projects: Vec<Project> = records.into_iter().map(Project::from).collect();

        let component = &projects[0].components[0];
        assert_eq!(projects[0].components_count(), 1);
        assert_eq!(component.kind, "lambda");

        let dev = component.version(Environment::Dev);
        assert_eq!(dev.status, DeploymentStatus::Deployed);
        assert_eq!(dev.last_deploy, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(dev.deployed_by, "ana");

        assert_eq!(component.version(Environment::Qa).status, DeploymentStatus::InProgress);
        assert_eq!(component.version(Environment::Qa).deployed_by, "system");
        // missing slot and unknown token both fall back to Pending
        assert_eq!(component.version(Environment::Uat), &EnvironmentVersion::default());
        assert_eq!(component.version(Environment::Prod).status, DeploymentStatus::Pending);

        let orders: Vec<u32> = component.checklist.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(component.checklist[1].notes.as_deref(), Some("waiting on QA"));
    }

    #[test]
    fn encodes_canonical_labels_and_derived_count() {
        let records: Vec<ProjectRecord> = serde_json::from_str(PAYLOAD).unwrap();
        let project = Project::from(records[0].clone());

        let json = serde_json::to_value(ProjectRecord::from(&project)).unwrap();
        assert_eq!(json["componentsCount"], 1);
        let versions = &json["components"][0]["versions"];
        assert_eq!(versions["qa"]["status"], "in-progress");
        assert_eq!(versions["uat"]["status"], "pending");
        assert_eq!(versions["dev"]["lastDeploy"], "2024-02-01");
        assert_eq!(json["components"][0]["jiraTicket"], "PAY-101");
    }
}
