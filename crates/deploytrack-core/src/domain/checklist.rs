//! Checklist items and progress calculation.

use serde::{Deserialize, Serialize};

use super::ids::{ChecklistItemId, ChecklistItemKey};

/// A promotion gating item attached to one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub key: ChecklistItemKey,
    pub description: String,
    pub completed: bool,
    pub notes: Option<String>,

    /// 1-based, contiguous within a component's checklist.
    pub order: u32,
}

/// Input for a wholesale checklist replace.
///
/// `id: None` marks an item the collaborator has not persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ChecklistItemId>,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ChecklistDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: None,
            description: description.into(),
            completed: false,
            notes: None,
        }
    }

    pub fn persisted(id: ChecklistItemId, description: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            ..Self::new(description)
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Completion counts for a list of checklist items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

impl ChecklistProgress {
    pub fn from_counts(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            percentage: rounded_percentage(completed, total),
        }
    }
}

pub fn compute_progress(items: &[ChecklistItem]) -> ChecklistProgress {
    let completed = items.iter().filter(|item| item.completed).count();
    ChecklistProgress::from_counts(completed, items.len())
}

/// `round(part / whole * 100)` with halves rounded up; 0 when `whole == 0`.
pub(crate) fn rounded_percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u64;
    let whole = whole as u64;
    ((part * 200 + whole) / (whole * 2)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::ChecklistItemId;
    use rstest::rstest;

    fn items(flags: &[bool]) -> Vec<ChecklistItem> {
        flags
            .iter()
            .enumerate()
            .map(|(i, &completed)| ChecklistItem {
                key: ChecklistItemKey::Persisted(ChecklistItemId::new(i as u64 + 1)),
                description: format!("step {}", i + 1),
                completed,
                notes: None,
                order: i as u32 + 1,
            })
            .collect()
    }

    #[test]
    fn empty_checklist_is_zero_percent() {
        let progress = compute_progress(&[]);
        assert_eq!(progress, ChecklistProgress::from_counts(0, 0));
        assert_eq!(progress.percentage, 0);
    }

    #[test]
    fn one_of_three_is_thirty_three() {
        let progress = compute_progress(&items(&[true, false, false]));
        assert_eq!(
            progress,
            ChecklistProgress {
                completed: 1,
                total: 3,
                percentage: 33
            }
        );
    }

    #[rstest]
    #[case::two_of_three(2, 3, 67)]
    #[case::half(1, 2, 50)]
    #[case::all(4, 4, 100)]
    #[case::none(0, 5, 0)]
    #[case::round_half_up(1, 8, 13)]
    fn percentage_rounds_to_nearest(#[case] done: usize, #[case] total: usize, #[case] pct: u32) {
        assert_eq!(rounded_percentage(done, total), pct);
    }

    #[test]
    fn percentage_stays_in_range() {
        for total in 0..20 {
            for done in 0..=total {
                let flags: Vec<bool> = (0..total).map(|i| i < done).collect();
                let pct = compute_progress(&items(&flags)).percentage;
                assert!(pct <= 100, "{done}/{total} gave {pct}");
            }
        }
    }
}
