//! Project / Component / EnvironmentVersion and their input specs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::checklist::{compute_progress, ChecklistItem, ChecklistProgress};
use super::environment::{EnvMap, Environment};
use super::errors::{RequiredField, ValidationError};
use super::ids::{ComponentId, ProjectId};
use super::status::{classify, DeploymentStatus};

/// Actor recorded when nobody is named.
pub const DEFAULT_ACTOR: &str = "system";

/// Deployment state of one component in one environment.
///
/// Every (component, environment) pair has one; an untouched slot is
/// `Pending` with an empty version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentVersion {
    /// Empty means "not yet deployed".
    pub version: String,
    pub status: DeploymentStatus,
    pub last_deploy: Option<NaiveDate>,
    pub deployed_by: String,
}

impl Default for EnvironmentVersion {
    fn default() -> Self {
        Self {
            version: String::new(),
            status: DeploymentStatus::Pending,
            last_deploy: None,
            deployed_by: DEFAULT_ACTOR.to_string(),
        }
    }
}

impl EnvironmentVersion {
    pub fn is_deployed(&self) -> bool {
        !self.version.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    /// Free-form tag (lambda, api, frontend, ...).
    pub kind: String,
    pub jira_ticket: Option<String>,
    pub memory_allocation: Option<String>,
    pub timeout: Option<String>,
    pub versions: EnvMap<EnvironmentVersion>,
    pub checklist: Vec<ChecklistItem>,
}

impl Component {
    pub fn version(&self, env: Environment) -> &EnvironmentVersion {
        self.versions.get(env)
    }

    pub fn progress(&self) -> ChecklistProgress {
        compute_progress(&self.checklist)
    }

    /// Overwrite the descriptive fields; versions and checklist are untouched.
    pub(crate) fn apply_spec(&mut self, spec: &ComponentSpec) {
        self.name = spec.name.clone();
        self.kind = spec.kind.clone();
        self.jira_ticket = spec.jira_ticket.clone();
        self.memory_allocation = spec.memory_allocation.clone();
        self.timeout = spec.timeout.clone();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub components: Vec<Component>,
}

impl Project {
    pub fn components_count(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }
}

/// Input for creating or editing a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, RequiredField::ProjectName)
    }
}

/// Input for creating or editing a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_ticket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_allocation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

impl ComponentSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            jira_ticket: None,
            memory_allocation: None,
            timeout: None,
        }
    }

    pub fn with_jira_ticket(mut self, ticket: impl Into<String>) -> Self {
        self.jira_ticket = Some(ticket.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, RequiredField::ComponentName)
    }
}

/// Input for an explicit version edit of one environment slot.
///
/// `status` is raw text and goes through `classify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSpec {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_by: Option<String>,
}

impl VersionSpec {
    pub fn new(version: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            status: Some(status.into()),
            deployed_by: None,
        }
    }

    pub fn deployed_by(mut self, actor: impl Into<String>) -> Self {
        self.deployed_by = Some(actor.into());
        self
    }

    pub fn status(&self) -> DeploymentStatus {
        classify(self.status.as_deref())
    }

    /// Build the replacement slot.
    ///
    /// `last_deploy` is kept from `previous` unless the new status is
    /// `Deployed`, in which case it is stamped with `today`.
    pub fn to_slot(
        &self,
        previous: &EnvironmentVersion,
        today: NaiveDate,
        default_actor: &str,
    ) -> EnvironmentVersion {
        let status = self.status();
        let last_deploy = if status == DeploymentStatus::Deployed {
            Some(today)
        } else {
            previous.last_deploy
        };
        EnvironmentVersion {
            version: self.version.trim().to_string(),
            status,
            last_deploy,
            deployed_by: actor_or_default(self.deployed_by.as_deref(), default_actor),
        }
    }
}

pub(crate) fn actor_or_default(actor: Option<&str>, default_actor: &str) -> String {
    match actor.map(str::trim) {
        Some(actor) if !actor.is_empty() => actor.to_string(),
        _ => default_actor.to_string(),
    }
}

fn require(value: &str, field: RequiredField) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}
