//! DeploymentBackend port - 永続化 / API 層（collaborator）
//!
//! 実装は HTTP クライアントでも DB でも構いません。core が見るのは
//! 成功か失敗（`TransportError`）かだけで、ステータスコードなどは解釈しません。

use async_trait::async_trait;

use crate::domain::{
    ChecklistDraft, ChecklistItemId, Component, ComponentId, ComponentSpec, Environment, Project,
    ProjectId, ProjectSpec, TransportError, VersionSpec,
};

/// One method per collaborator operation.
///
/// Each call is treated as atomic by the store: either it succeeds, or the
/// local snapshot must not change (promotion under the optimistic policy is
/// the one exception, see `app::promotion`).
#[async_trait]
pub trait DeploymentBackend: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Project>, TransportError>;

    async fn create_project(&self, spec: &ProjectSpec) -> Result<Project, TransportError>;

    async fn update_project(
        &self,
        id: ProjectId,
        spec: &ProjectSpec,
    ) -> Result<Project, TransportError>;

    async fn delete_project(&self, id: ProjectId) -> Result<(), TransportError>;

    async fn create_component(
        &self,
        project_id: ProjectId,
        spec: &ComponentSpec,
    ) -> Result<Component, TransportError>;

    async fn update_component(
        &self,
        id: ComponentId,
        spec: &ComponentSpec,
    ) -> Result<Component, TransportError>;

    async fn delete_component(&self, id: ComponentId) -> Result<(), TransportError>;

    async fn set_version(
        &self,
        component_id: ComponentId,
        env: Environment,
        spec: &VersionSpec,
    ) -> Result<(), TransportError>;

    async fn promote(
        &self,
        component_id: ComponentId,
        env: Environment,
        version: &str,
        deployed_by: &str,
    ) -> Result<(), TransportError>;

    async fn toggle_checklist_item(
        &self,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> Result<(), TransportError>;

    async fn replace_checklist(
        &self,
        component_id: ComponentId,
        items: &[ChecklistDraft],
    ) -> Result<(), TransportError>;
}
