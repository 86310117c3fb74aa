//! Snapshot - Project → Component → EnvironmentVersion / Checklist のツリー
//!
//! ここにある遷移関数は純粋な状態遷移だけを担当します（I/O なし）。
//! 各関数は前提条件を全部チェックしてから変更するので、
//! エラーのときは snapshot が一切変わりません。

use super::checklist::{ChecklistDraft, ChecklistItem};
use super::environment::Environment;
use super::errors::ConsistencyError;
use super::ids::{ChecklistItemKey, ComponentId, LocalToken, ProjectId};
use super::project::{Component, EnvironmentVersion, Project};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    projects: Vec<Project>,
}

impl Snapshot {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.projects.iter().find_map(|p| p.component(id))
    }

    /// Project that owns `id`.
    pub fn owner_of(&self, id: ComponentId) -> Option<ProjectId> {
        self.projects
            .iter()
            .find(|p| p.component(id).is_some())
            .map(|p| p.id)
    }

    pub fn require_project(&self, id: ProjectId) -> Result<&Project, ConsistencyError> {
        self.project(id).ok_or(ConsistencyError::ProjectNotFound(id))
    }

    pub fn require_component(&self, id: ComponentId) -> Result<&Component, ConsistencyError> {
        self.component(id)
            .ok_or(ConsistencyError::ComponentNotFound(id))
    }

    pub fn require_checklist_item(
        &self,
        component: ComponentId,
        key: ChecklistItemKey,
    ) -> Result<&ChecklistItem, ConsistencyError> {
        self.require_component(component)?
            .checklist
            .iter()
            .find(|item| item.key == key)
            .ok_or(ConsistencyError::ChecklistItemNotFound {
                component,
                item: key,
            })
    }

    /// Every persisted id in a replacement must already be on the component,
    /// and at most once.
    pub fn check_checklist_drafts(
        &self,
        component: ComponentId,
        drafts: &[ChecklistDraft],
    ) -> Result<(), ConsistencyError> {
        let current = &self.require_component(component)?.checklist;
        let mut seen = Vec::new();
        for id in drafts.iter().filter_map(|d| d.id) {
            let key = ChecklistItemKey::Persisted(id);
            if !current.iter().any(|item| item.key == key) {
                return Err(ConsistencyError::ChecklistItemNotFound {
                    component,
                    item: key,
                });
            }
            if seen.contains(&id) {
                return Err(ConsistencyError::DuplicateChecklistItem {
                    component,
                    item: id,
                });
            }
            seen.push(id);
        }
        Ok(())
    }

    /// Full resynchronization: discards everything held locally.
    pub fn replace_all(&mut self, projects: Vec<Project>) {
        self.projects = projects;
    }

    pub fn insert_project(&mut self, project: Project) {
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project,
            None => self.projects.push(project),
        }
    }

    /// Take name and description from `updated`; components stay as they are.
    pub fn update_project(
        &mut self,
        id: ProjectId,
        updated: Project,
    ) -> Result<(), ConsistencyError> {
        let project = self.project_mut(id)?;
        project.name = updated.name;
        project.description = updated.description;
        Ok(())
    }

    /// Removes the project together with all of its components.
    pub fn remove_project(&mut self, id: ProjectId) -> Result<Project, ConsistencyError> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(ConsistencyError::ProjectNotFound(id))?;
        Ok(self.projects.remove(index))
    }

    pub fn insert_component(
        &mut self,
        project_id: ProjectId,
        component: Component,
    ) -> Result<(), ConsistencyError> {
        self.require_project(project_id)?;
        if let Some(owner) = self.owner_of(component.id)
            && owner != project_id
        {
            // A component belongs to exactly one project.
            self.project_mut(owner)?
                .components
                .retain(|c| c.id != component.id);
        }
        let project = self.project_mut(project_id)?;
        match project.components.iter_mut().find(|c| c.id == component.id) {
            Some(existing) => *existing = component,
            None => project.components.push(component),
        }
        Ok(())
    }

    /// Take the descriptive fields from `updated`; versions and checklist stay.
    pub fn update_component(
        &mut self,
        id: ComponentId,
        updated: Component,
    ) -> Result<(), ConsistencyError> {
        let component = self.component_mut(id)?;
        component.name = updated.name;
        component.kind = updated.kind;
        component.jira_ticket = updated.jira_ticket;
        component.memory_allocation = updated.memory_allocation;
        component.timeout = updated.timeout;
        Ok(())
    }

    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component, ConsistencyError> {
        for project in &mut self.projects {
            if let Some(index) = project.components.iter().position(|c| c.id == id) {
                return Ok(project.components.remove(index));
            }
        }
        Err(ConsistencyError::ComponentNotFound(id))
    }

    /// Replace one environment slot wholesale.
    pub fn set_version(
        &mut self,
        id: ComponentId,
        env: Environment,
        slot: EnvironmentVersion,
    ) -> Result<(), ConsistencyError> {
        *self.component_mut(id)?.versions.get_mut(env) = slot;
        Ok(())
    }

    /// Flip `completed` on exactly one item and return the new value.
    pub fn toggle_checklist_item(
        &mut self,
        id: ComponentId,
        key: ChecklistItemKey,
    ) -> Result<bool, ConsistencyError> {
        let item = self
            .component_mut(id)?
            .checklist
            .iter_mut()
            .find(|item| item.key == key)
            .ok_or(ConsistencyError::ChecklistItemNotFound {
                component: id,
                item: key,
            })?;
        item.completed = !item.completed;
        Ok(item.completed)
    }

    /// Wholesale replace; order is reassigned as `1..=n` in sequence order.
    pub fn replace_checklist(
        &mut self,
        id: ComponentId,
        items: Vec<ChecklistItem>,
    ) -> Result<(), ConsistencyError> {
        let component = self.component_mut(id)?;
        component.checklist = renumber(items);
        Ok(())
    }

    fn project_mut(&mut self, id: ProjectId) -> Result<&mut Project, ConsistencyError> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ConsistencyError::ProjectNotFound(id))
    }

    fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component, ConsistencyError> {
        self.projects
            .iter_mut()
            .flat_map(|p| p.components.iter_mut())
            .find(|c| c.id == id)
            .ok_or(ConsistencyError::ComponentNotFound(id))
    }
}

/// Turn replace drafts into checklist items.
///
/// Drafts without an id get a pending identity from `next_token`.
pub fn checklist_from_drafts(
    drafts: &[ChecklistDraft],
    mut next_token: impl FnMut() -> LocalToken,
) -> Vec<ChecklistItem> {
    let items = drafts
        .iter()
        .map(|draft| ChecklistItem {
            key: match draft.id {
                Some(id) => ChecklistItemKey::Persisted(id),
                None => ChecklistItemKey::Pending(next_token()),
            },
            description: draft.description.trim().to_string(),
            completed: draft.completed,
            notes: draft.notes.clone(),
            order: 0,
        })
        .collect();
    renumber(items)
}

fn renumber(mut items: Vec<ChecklistItem>) -> Vec<ChecklistItem> {
    for (index, item) in items.iter_mut().enumerate() {
        item.order = index as u32 + 1;
    }
    items
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::environment::EnvMap;
    use crate::domain::ids::ChecklistItemId;
    use crate::domain::status::DeploymentStatus;

    pub fn component(id: u64, statuses: [DeploymentStatus; 4], checklist: &[bool]) -> Component {
        Component {
            id: ComponentId::new(id),
            name: format!("component-{id}"),
            kind: "lambda".to_string(),
            jira_ticket: None,
            memory_allocation: None,
            timeout: None,
            versions: EnvMap::from_fn(|env| {
                let index = Environment::ALL.iter().position(|e| *e == env).unwrap_or(0);
                EnvironmentVersion {
                    status: statuses[index],
                    ..EnvironmentVersion::default()
                }
            }),
            checklist: checklist
                .iter()
                .enumerate()
                .map(|(i, &completed)| ChecklistItem {
                    key: ChecklistItemKey::Persisted(ChecklistItemId::new(id * 100 + i as u64)),
                    description: format!("check {i}"),
                    completed,
                    notes: None,
                    order: i as u32 + 1,
                })
                .collect(),
        }
    }

    pub fn project(id: u64, components: Vec<Component>) -> Project {
        Project {
            id: ProjectId::new(id),
            name: format!("project-{id}"),
            description: None,
            components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{component, project};
    use super::*;
    use crate::domain::ids::ChecklistItemId;
    use crate::domain::status::DeploymentStatus::{self, *};
    use ulid::Ulid;

    const PENDING: [DeploymentStatus; 4] = [Pending, Pending, Pending, Pending];

    fn snapshot() -> Snapshot {
        Snapshot::new(vec![
            project(1, vec![component(10, PENDING, &[false, true]), component(11, PENDING, &[])]),
            project(2, vec![component(20, PENDING, &[false])]),
        ])
    }

    #[test]
    fn remove_project_cascades_to_components() {
        let mut snap = snapshot();
        let removed = snap.remove_project(ProjectId::new(1)).unwrap();
        assert_eq!(removed.components_count(), 2);
        assert!(snap.component(ComponentId::new(10)).is_none());
        assert!(snap.component(ComponentId::new(20)).is_some());
    }

    #[test]
    fn remove_component_leaves_siblings() {
        let mut snap = snapshot();
        snap.remove_component(ComponentId::new(10)).unwrap();
        let p1 = snap.project(ProjectId::new(1)).unwrap();
        assert_eq!(p1.components.len(), 1);
        assert_eq!(p1.components[0].id, ComponentId::new(11));
    }

    #[test]
    fn missing_ids_are_consistency_errors_without_mutation() {
        let mut snap = snapshot();
        let before = snap.clone();

        assert_eq!(
            snap.remove_component(ComponentId::new(99)),
            Err(ConsistencyError::ComponentNotFound(ComponentId::new(99)))
        );
        let missing = ChecklistItemKey::Persisted(ChecklistItemId::new(5));
        assert!(matches!(
            snap.toggle_checklist_item(ComponentId::new(10), missing),
            Err(ConsistencyError::ChecklistItemNotFound { .. })
        ));
        assert!(snap
            .insert_component(ProjectId::new(99), component(30, PENDING, &[]))
            .is_err());
        assert_eq!(snap, before);
    }

    #[test]
    fn toggle_flips_exactly_one_item() {
        let mut snap = snapshot();
        let key = ChecklistItemKey::Persisted(ChecklistItemId::new(1000));
        let before = snap.component(ComponentId::new(10)).unwrap().checklist.clone();

        let now = snap.toggle_checklist_item(ComponentId::new(10), key).unwrap();
        assert!(now);

        let after = &snap.component(ComponentId::new(10)).unwrap().checklist;
        assert!(after[0].completed);
        assert_eq!(after[0].order, before[0].order);
        assert_eq!(after[0].description, before[0].description);
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn drafts_get_contiguous_order_and_pending_keys() {
        let token = LocalToken::from_ulid(Ulid::from_parts(1, 1));
        let drafts = vec![
            ChecklistDraft::new("smoke test"),
            ChecklistDraft::persisted(ChecklistItemId::new(7), "db migration").completed(true),
        ];
        let items = checklist_from_drafts(&drafts, || token);

        assert_eq!(items[0].order, 1);
        assert_eq!(items[0].key, ChecklistItemKey::Pending(token));
        assert_eq!(items[1].order, 2);
        assert_eq!(items[1].key, ChecklistItemKey::Persisted(ChecklistItemId::new(7)));
        assert!(items[1].completed);
    }

    #[test]
    fn replacement_drafts_must_reference_current_items_once() {
        let snap = snapshot();
        let c10 = ComponentId::new(10);
        let known = ChecklistItemId::new(1000);

        let ok = [
            ChecklistDraft::persisted(known, "kept"),
            ChecklistDraft::new("fresh"),
        ];
        assert_eq!(snap.check_checklist_drafts(c10, &ok), Ok(()));

        let unknown = [ChecklistDraft::persisted(ChecklistItemId::new(999), "ghost")];
        assert_eq!(
            snap.check_checklist_drafts(c10, &unknown),
            Err(ConsistencyError::ChecklistItemNotFound {
                component: c10,
                item: ChecklistItemKey::Persisted(ChecklistItemId::new(999)),
            })
        );

        let twice = [
            ChecklistDraft::persisted(known, "a"),
            ChecklistDraft::persisted(known, "b"),
        ];
        assert_eq!(
            snap.check_checklist_drafts(c10, &twice),
            Err(ConsistencyError::DuplicateChecklistItem {
                component: c10,
                item: known,
            })
        );
    }

    #[test]
    fn moving_component_keeps_single_owner() {
        let mut snap = snapshot();
        let moved = snap.component(ComponentId::new(10)).unwrap().clone();
        snap.insert_component(ProjectId::new(2), moved).unwrap();

        assert_eq!(snap.owner_of(ComponentId::new(10)), Some(ProjectId::new(2)));
        assert_eq!(snap.project(ProjectId::new(1)).unwrap().components.len(), 1);
    }
}
