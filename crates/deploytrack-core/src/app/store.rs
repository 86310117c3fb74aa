//! DeploymentStateStore - snapshot を所有する唯一のコントローラ
//!
//! # 変更の流れ（promote 以外）
//! 1. 入力を検証（ValidationError）
//! 2. 参照する ID が snapshot にあるか確認（ConsistencyError）
//! 3. collaborator を呼ぶ（TransportError なら snapshot はそのまま）
//! 4. 成功したら snapshot に反映
//! 5. `resync_after_mutation` が有効なら `fetch_all` で全体を置き換え
//!
//! 変更は `&mut self` で 1 つずつ実行されるので、同じ snapshot に対する
//! 2 つの変更が交互に進むことはありません。

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::domain::project::actor_or_default;
use crate::domain::{
    checklist_from_drafts, compute_dashboard_metrics, ChecklistDraft, ChecklistItemKey,
    ChecklistProgress, Component, ComponentId, ComponentSpec, ConsistencyError, DashboardMetrics,
    Environment, Project, ProjectId, ProjectSpec, RequiredField, Snapshot, TrackerError,
    TransportError, ValidationError, VersionSpec,
};
use crate::ports::{Clock, DeploymentBackend, TokenGenerator};

pub struct DeploymentStateStore<B> {
    pub(super) backend: B,
    pub(super) clock: Box<dyn Clock>,
    pub(super) tokens: Box<dyn TokenGenerator>,
    pub(super) config: TrackerConfig,
    pub(super) snapshot: Snapshot,
}

impl<B: DeploymentBackend> DeploymentStateStore<B> {
    // ========================================
    // 読み取り
    // ========================================

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn projects(&self) -> &[Project] {
        self.snapshot.projects()
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.snapshot.project(id)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.snapshot.component(id)
    }

    pub fn checklist_progress(&self, id: ComponentId) -> Result<ChecklistProgress, TrackerError> {
        Ok(self.snapshot.require_component(id)?.progress())
    }

    /// Recomputed from the current snapshot on every call.
    pub fn metrics(&self) -> DashboardMetrics {
        compute_dashboard_metrics(self.snapshot.projects())
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ========================================
    // 同期
    // ========================================

    /// Full resynchronization. Replaces the whole snapshot, including any
    /// pending checklist identities. On failure nothing changes.
    pub async fn refresh(&mut self) -> Result<(), TrackerError> {
        let projects = confirm(self.backend.fetch_all().await)?;
        info!(projects = projects.len(), "snapshot resynchronized");
        self.snapshot.replace_all(projects);
        Ok(())
    }

    /// Resync after a confirmed mutation when configured to.
    ///
    /// The mutation is already applied, so a failure here is only logged.
    pub(super) async fn after_mutation(&mut self) {
        if !self.config.resync_after_mutation {
            return;
        }
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "resync after mutation failed; keeping local snapshot");
        }
    }

    // ========================================
    // Project
    // ========================================

    pub async fn add_project(&mut self, spec: ProjectSpec) -> Result<ProjectId, TrackerError> {
        spec.validate()?;
        let project = confirm(self.backend.create_project(&spec).await)?;
        let id = project.id;
        debug!(project = %id, name = %project.name, "project added");
        self.snapshot.insert_project(project);
        self.after_mutation().await;
        Ok(id)
    }

    pub async fn update_project(
        &mut self,
        id: ProjectId,
        spec: ProjectSpec,
    ) -> Result<(), TrackerError> {
        spec.validate()?;
        self.snapshot.require_project(id)?;
        let updated = confirm(self.backend.update_project(id, &spec).await)?;
        self.snapshot.update_project(id, updated)?;
        debug!(project = %id, "project updated");
        self.after_mutation().await;
        Ok(())
    }

    /// Removes the project and, with it, every component it owns.
    pub async fn remove_project(&mut self, id: ProjectId) -> Result<(), TrackerError> {
        self.snapshot.require_project(id)?;
        confirm(self.backend.delete_project(id).await)?;
        let removed = self.snapshot.remove_project(id)?;
        debug!(project = %id, components = removed.components_count(), "project removed");
        self.after_mutation().await;
        Ok(())
    }

    // ========================================
    // Component
    // ========================================

    pub async fn add_component(
        &mut self,
        project_id: ProjectId,
        spec: ComponentSpec,
    ) -> Result<ComponentId, TrackerError> {
        spec.validate()?;
        self.snapshot.require_project(project_id)?;
        let component = confirm(self.backend.create_component(project_id, &spec).await)?;
        let id = component.id;
        self.snapshot.insert_component(project_id, component)?;
        debug!(project = %project_id, component = %id, "component added");
        self.after_mutation().await;
        Ok(id)
    }

    pub async fn update_component(
        &mut self,
        id: ComponentId,
        spec: ComponentSpec,
    ) -> Result<(), TrackerError> {
        spec.validate()?;
        self.snapshot.require_component(id)?;
        let updated = confirm(self.backend.update_component(id, &spec).await)?;
        self.snapshot.update_component(id, updated)?;
        debug!(component = %id, "component updated");
        self.after_mutation().await;
        Ok(())
    }

    pub async fn remove_component(&mut self, id: ComponentId) -> Result<(), TrackerError> {
        self.snapshot.require_component(id)?;
        confirm(self.backend.delete_component(id).await)?;
        self.snapshot.remove_component(id)?;
        debug!(component = %id, "component removed");
        self.after_mutation().await;
        Ok(())
    }

    // ========================================
    // EnvironmentVersion
    // ========================================

    /// Replace one environment slot wholesale.
    ///
    /// Any status is accepted. `last_deploy` is stamped with today only when
    /// the new status is `Deployed`; otherwise it keeps its previous value.
    pub async fn set_version(
        &mut self,
        component_id: ComponentId,
        env: Environment,
        spec: VersionSpec,
    ) -> Result<(), TrackerError> {
        let previous = self
            .snapshot
            .require_component(component_id)?
            .version(env)
            .clone();
        let spec = VersionSpec {
            deployed_by: Some(resolve_actor(&self.config, spec.deployed_by.as_deref())),
            ..spec
        };
        confirm(self.backend.set_version(component_id, env, &spec).await)?;

        let slot = spec.to_slot(&previous, self.clock.today(), &self.config.default_actor);
        debug!(
            component = %component_id,
            %env,
            version = %slot.version,
            status = %slot.status,
            "version set"
        );
        self.snapshot.set_version(component_id, env, slot)?;
        self.after_mutation().await;
        Ok(())
    }

    // ========================================
    // Checklist
    // ========================================

    /// Flip `completed` on one item and return the new value.
    ///
    /// Items still waiting for a collaborator id cannot be toggled until the
    /// next `refresh()`.
    pub async fn toggle_checklist_item(
        &mut self,
        component_id: ComponentId,
        key: ChecklistItemKey,
    ) -> Result<bool, TrackerError> {
        let item = self.snapshot.require_checklist_item(component_id, key)?;
        let item_id = match key {
            ChecklistItemKey::Persisted(id) => id,
            ChecklistItemKey::Pending(token) => {
                return Err(ConsistencyError::ChecklistItemNotPersisted(token).into());
            }
        };
        let completed = !item.completed;

        confirm(self.backend.toggle_checklist_item(item_id, completed).await)?;
        let now = self.snapshot.toggle_checklist_item(component_id, key)?;
        debug!(component = %component_id, item = %item_id, completed = now, "checklist item toggled");
        self.after_mutation().await;
        Ok(now)
    }

    /// Wholesale replace. Order becomes `1..=n` in the given sequence;
    /// drafts without an id get a pending identity until the next resync.
    pub async fn replace_checklist(
        &mut self,
        component_id: ComponentId,
        drafts: Vec<ChecklistDraft>,
    ) -> Result<(), TrackerError> {
        if drafts.iter().any(|d| d.description.trim().is_empty()) {
            return Err(ValidationError::Required(RequiredField::ChecklistDescription).into());
        }
        self.snapshot.check_checklist_drafts(component_id, &drafts)?;
        confirm(self.backend.replace_checklist(component_id, &drafts).await)?;

        let tokens = &self.tokens;
        let items = checklist_from_drafts(&drafts, || tokens.next_token());
        let pending = items.iter().filter(|i| i.key.is_pending()).count();
        self.snapshot.replace_checklist(component_id, items)?;
        debug!(
            component = %component_id,
            items = drafts.len(),
            pending,
            "checklist replaced"
        );
        self.after_mutation().await;
        Ok(())
    }
}

/// Map a collaborator result into the store's error type, logging failures.
pub(super) fn confirm<T>(result: Result<T, TransportError>) -> Result<T, TrackerError> {
    result.map_err(|e| {
        warn!(operation = e.operation, error = %e.message, "collaborator call failed");
        TrackerError::Transport(e)
    })
}

/// Used where the store needs the configured default actor.
pub(super) fn resolve_actor(config: &TrackerConfig, actor: Option<&str>) -> String {
    actor_or_default(actor, &config.default_actor)
}
