//! Errors - エラー型と分類
//!
//! どのエラーも呼び出し側へ返すだけで、自動リトライはしません。
//! 再実行するか `refresh()` で再同期するかは呼び出し側が決めます。

use thiserror::Error;

use super::ids::{ChecklistItemId, ChecklistItemKey, ComponentId, LocalToken, ProjectId};

/// ErrorKind は運用上の分類
///
/// - Validation: 必須項目が空（collaborator 呼び出し前に検出、状態変更なし）
/// - Transport: collaborator の失敗・到達不能（snapshot は変更なし）
/// - Consistency: snapshot に存在しない ID を参照（状態変更なし）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Consistency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    ProjectName,
    ComponentName,
    PromotionVersion,
    ChecklistDescription,
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequiredField::ProjectName => "project name",
            RequiredField::ComponentName => "component name",
            RequiredField::PromotionVersion => "promotion version",
            RequiredField::ChecklistDescription => "checklist item description",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Required(RequiredField),
}

/// Failure reported by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct TransportError {
    pub operation: &'static str,
    pub message: String,
}

impl TransportError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("project {0} is not in the current snapshot")]
    ProjectNotFound(ProjectId),

    #[error("component {0} is not in the current snapshot")]
    ComponentNotFound(ComponentId),

    #[error("checklist item {item} not found on component {component}")]
    ChecklistItemNotFound {
        component: ComponentId,
        item: ChecklistItemKey,
    },

    #[error("checklist item {0} has not been persisted yet; resynchronize first")]
    ChecklistItemNotPersisted(LocalToken),

    #[error("checklist item {item} appears more than once in the replacement for {component}")]
    DuplicateChecklistItem {
        component: ComponentId,
        item: ChecklistItemId,
    },
}

/// TrackerError は全操作の共通エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::Validation(_) => ErrorKind::Validation,
            TrackerError::Transport(_) => ErrorKind::Transport,
            TrackerError::Consistency(_) => ErrorKind::Consistency,
        }
    }
}
