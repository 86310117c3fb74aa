//! Status - デプロイ状態の正規化
//!
//! collaborator や入力フォームから来る status 文字列は表記揺れがある
//! （"InProgress" / "in-progress" / "DEPLOYED" など）ので、
//! 必ず `classify` を通して 4 つの正規値のどれかに落とします。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical deployment status of one environment slot.
///
/// # 状態遷移
/// - 初期状態は `Pending`
/// - `set_version` による明示的な編集: 任意の状態へ遷移可能
/// - `promote`: `Deployed` へ遷移（version が空でないことが前提）
/// - それ以外の自動遷移は存在しない
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    #[default]
    Pending,
    InProgress,
    Deployed,
    Failed,
}

impl DeploymentStatus {
    pub const ALL: [DeploymentStatus; 4] = [
        DeploymentStatus::Pending,
        DeploymentStatus::InProgress,
        DeploymentStatus::Deployed,
        DeploymentStatus::Failed,
    ];

    /// Display label used on the dashboard and on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            DeploymentStatus::Pending => "pending",
            DeploymentStatus::InProgress => "in-progress",
            DeploymentStatus::Deployed => "deployed",
            DeploymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalize an arbitrary status token.
///
/// Case-insensitive. Unknown, empty or missing tokens map to `Pending`; this never fails.
pub fn classify(raw: Option<&str>) -> DeploymentStatus {
    let Some(raw) = raw else {
        return DeploymentStatus::Pending;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "deployed" => DeploymentStatus::Deployed,
        "inprogress" | "in-progress" => DeploymentStatus::InProgress,
        "failed" => DeploymentStatus::Failed,
        _ => DeploymentStatus::Pending,
    }
}
