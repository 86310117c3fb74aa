//! InMemoryBackend - 開発用 / テスト用の collaborator
//!
//! wire record（`ProjectRecord`）をそのままメモリに持ち、API サーバーの
//! 振る舞いを真似します。ID は 1 から連番で採番します。
//!
//! `fail_next(n)` で次の n 回の呼び出しを `TransportError` にできるので、
//! store の「失敗時は snapshot を変えない」性質をテストできます。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::domain::{
    ChecklistDraft, ChecklistItemId, ChecklistItemRecord, Component, ComponentId,
    ComponentRecord, ComponentSpec, DeploymentStatus, Environment, Project, ProjectId,
    ProjectRecord, ProjectSpec, TransportError, VersionRecord, VersionSpec, VersionsRecord,
};
use crate::ports::{Clock, DeploymentBackend, SystemClock};

struct InMemoryState {
    projects: Vec<ProjectRecord>,
    next_id: u64,
    /// Remaining calls that should fail.
    failures: usize,
    /// Operations that fail once, on their next call.
    failing_ops: Vec<&'static str>,
    /// Operation names in call order.
    calls: Vec<&'static str>,
}

impl InMemoryState {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record the call and decide whether it fails.
    fn begin(&mut self, operation: &'static str) -> Result<(), TransportError> {
        self.calls.push(operation);
        if self.failures > 0 {
            self.failures -= 1;
            return Err(TransportError::new(operation, "injected failure"));
        }
        if let Some(index) = self.failing_ops.iter().position(|op| *op == operation) {
            self.failing_ops.remove(index);
            return Err(TransportError::new(operation, "injected failure"));
        }
        Ok(())
    }

    fn project_mut(
        &mut self,
        operation: &'static str,
        id: ProjectId,
    ) -> Result<&mut ProjectRecord, TransportError> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| TransportError::new(operation, format!("{id} not found")))
    }

    fn component_mut(
        &mut self,
        operation: &'static str,
        id: ComponentId,
    ) -> Result<&mut ComponentRecord, TransportError> {
        self.projects
            .iter_mut()
            .flat_map(|p| p.components.iter_mut())
            .find(|c| c.id == id)
            .ok_or_else(|| TransportError::new(operation, format!("{id} not found")))
    }
}

/// Clones share the same state.
#[derive(Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<InMemoryState>>,
    /// Stamps `lastDeploy`, as the API server does with its own clock.
    clock: Arc<dyn Clock>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Seed with existing records; new ids continue after the largest seeded id.
    pub fn with_records(projects: Vec<ProjectRecord>) -> Self {
        let max_id = projects
            .iter()
            .flat_map(|p| {
                std::iter::once(p.id.value()).chain(p.components.iter().flat_map(|c| {
                    std::iter::once(c.id.value()).chain(c.checklist.iter().map(|i| i.id.value()))
                }))
            })
            .max()
            .unwrap_or(0);
        Self {
            state: Arc::new(Mutex::new(InMemoryState {
                projects,
                next_id: max_id + 1,
                failures: 0,
                failing_ops: Vec::new(),
                calls: Vec::new(),
            })),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Make the next `n` calls fail with a `TransportError`.
    pub async fn fail_next(&self, n: usize) {
        self.state.lock().await.failures = n;
    }

    /// Make the next call of `operation` fail; other operations are unaffected.
    pub async fn fail_on(&self, operation: &'static str) {
        self.state.lock().await.failing_ops.push(operation);
    }

    pub async fn calls(&self) -> Vec<&'static str> {
        self.state.lock().await.calls.clone()
    }

    pub async fn records(&self) -> Vec<ProjectRecord> {
        self.state.lock().await.projects.clone()
    }

    /// Mutate the stored records directly, as another client would.
    pub async fn edit<R>(&self, f: impl FnOnce(&mut Vec<ProjectRecord>) -> R) -> R {
        f(&mut self.state.lock().await.projects)
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn version_record(
    spec: &VersionSpec,
    previous: Option<&VersionRecord>,
    today: NaiveDate,
) -> VersionRecord {
    let status = spec.status();
    let last_deploy = if status == DeploymentStatus::Deployed {
        Some(today)
    } else {
        previous.and_then(|p| p.last_deploy)
    };
    VersionRecord {
        version: spec.version.trim().to_string(),
        status: Some(status.label().to_string()),
        last_deploy,
        deployed_by: spec.deployed_by.clone(),
    }
}

fn slot_mut(versions: &mut VersionsRecord, env: Environment) -> &mut Option<VersionRecord> {
    match env {
        Environment::Dev => &mut versions.dev,
        Environment::Qa => &mut versions.qa,
        Environment::Uat => &mut versions.uat,
        Environment::Prod => &mut versions.prod,
    }
}

#[async_trait]
impl DeploymentBackend for InMemoryBackend {
    async fn fetch_all(&self) -> Result<Vec<Project>, TransportError> {
        let mut state = self.state.lock().await;
        state.begin("fetch_all")?;
        Ok(state.projects.iter().cloned().map(Project::from).collect())
    }

    async fn create_project(&self, spec: &ProjectSpec) -> Result<Project, TransportError> {
        let mut state = self.state.lock().await;
        state.begin("create_project")?;
        let record = ProjectRecord {
            id: ProjectId::new(state.allocate_id()),
            name: spec.name.trim().to_string(),
            description: spec.description.clone(),
            components_count: 0,
            components: Vec::new(),
        };
        state.projects.push(record.clone());
        Ok(Project::from(record))
    }

    async fn update_project(
        &self,
        id: ProjectId,
        spec: &ProjectSpec,
    ) -> Result<Project, TransportError> {
        let mut state = self.state.lock().await;
        state.begin("update_project")?;
        let record = state.project_mut("update_project", id)?;
        record.name = spec.name.trim().to_string();
        record.description = spec.description.clone();
        Ok(Project::from(record.clone()))
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.begin("delete_project")?;
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Err(TransportError::new("delete_project", format!("{id} not found")));
        }
        Ok(())
    }

    async fn create_component(
        &self,
        project_id: ProjectId,
        spec: &ComponentSpec,
    ) -> Result<Component, TransportError> {
        let mut state = self.state.lock().await;
        state.begin("create_component")?;
        let id = ComponentId::new(state.allocate_id());
        let record = ComponentRecord {
            id,
            name: spec.name.trim().to_string(),
            kind: spec.kind.clone(),
            jira_ticket: spec.jira_ticket.clone(),
            memory_allocation: spec.memory_allocation.clone(),
            timeout: spec.timeout.clone(),
            versions: VersionsRecord::default(),
            checklist: Vec::new(),
        };
        let project = state.project_mut("create_component", project_id)?;
        project.components.push(record.clone());
        project.components_count = project.components.len();
        Ok(Component::from(record))
    }

    async fn update_component(
        &self,
        id: ComponentId,
        spec: &ComponentSpec,
    ) -> Result<Component, TransportError> {
        let mut state = self.state.lock().await;
        state.begin("update_component")?;
        let record = state.component_mut("update_component", id)?;
        record.name = spec.name.trim().to_string();
        record.kind = spec.kind.clone();
        record.jira_ticket = spec.jira_ticket.clone();
        record.memory_allocation = spec.memory_allocation.clone();
        record.timeout = spec.timeout.clone();
        Ok(Component::from(record.clone()))
    }

    async fn delete_component(&self, id: ComponentId) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.begin("delete_component")?;
        for project in &mut state.projects {
            if let Some(index) = project.components.iter().position(|c| c.id == id) {
                project.components.remove(index);
                project.components_count = project.components.len();
                return Ok(());
            }
        }
        Err(TransportError::new("delete_component", format!("{id} not found")))
    }

    async fn set_version(
        &self,
        component_id: ComponentId,
        env: Environment,
        spec: &VersionSpec,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.begin("set_version")?;
        let record = state.component_mut("set_version", component_id)?;
        let slot = slot_mut(&mut record.versions, env);
        *slot = Some(version_record(spec, slot.as_ref(), self.clock.today()));
        Ok(())
    }

    async fn promote(
        &self,
        component_id: ComponentId,
        env: Environment,
        version: &str,
        deployed_by: &str,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.begin("promote")?;
        let record = state.component_mut("promote", component_id)?;
        *slot_mut(&mut record.versions, env) = Some(VersionRecord {
            version: version.to_string(),
            status: Some(DeploymentStatus::Deployed.label().to_string()),
            last_deploy: Some(self.clock.today()),
            deployed_by: Some(deployed_by.to_string()),
        });
        Ok(())
    }

    async fn toggle_checklist_item(
        &self,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.begin("toggle_checklist_item")?;
        let item = state
            .projects
            .iter_mut()
            .flat_map(|p| p.components.iter_mut())
            .flat_map(|c| c.checklist.iter_mut())
            .find(|i| i.id == item_id)
            .ok_or_else(|| {
                TransportError::new("toggle_checklist_item", format!("{item_id} not found"))
            })?;
        item.completed = completed;
        Ok(())
    }

    async fn replace_checklist(
        &self,
        component_id: ComponentId,
        items: &[ChecklistDraft],
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.begin("replace_checklist")?;
        let records: Vec<ChecklistItemRecord> = items
            .iter()
            .map(|draft| ChecklistItemRecord {
                id: draft
                    .id
                    .unwrap_or_else(|| ChecklistItemId::new(state.allocate_id())),
                item: draft.description.trim().to_string(),
                completed: draft.completed,
                notes: draft.notes.clone(),
            })
            .collect();
        state.component_mut("replace_checklist", component_id)?.checklist = records;
        Ok(())
    }
}
