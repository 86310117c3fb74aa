//! Promotion (quick-deploy) - slot を `Deployed` にする唯一のガード付き遷移
//!
//! # 適用タイミング
//! - `PromotionPolicy::Optimistic`（デフォルト）: 先に snapshot へ反映し、
//!   その後 collaborator に確認する。確認に失敗しても巻き戻さず、
//!   `TransportError` だけを返す。
//! - `PromotionPolicy::ConfirmFirst`: 他の変更と同じく、確認後に反映する。

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::app::store::{confirm, resolve_actor, DeploymentStateStore};
use crate::config::PromotionPolicy;
use crate::domain::{
    ComponentId, DeploymentStatus, Environment, EnvironmentVersion, RequiredField, TrackerError,
    ValidationError,
};
use crate::ports::DeploymentBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOutcome {
    Promoted,
    /// The slot was already `Deployed` with the same version; nothing was sent.
    AlreadyDeployed,
}

/// Slot produced by a promotion.
pub fn promoted_slot(version: &str, deployed_by: String, today: NaiveDate) -> EnvironmentVersion {
    EnvironmentVersion {
        version: version.to_string(),
        status: DeploymentStatus::Deployed,
        last_deploy: Some(today),
        deployed_by,
    }
}

impl<B: DeploymentBackend> DeploymentStateStore<B> {
    /// Mark `version` as deployed to `env`.
    ///
    /// `deployed_by` defaults to the configured actor (`"system"`).
    pub async fn promote(
        &mut self,
        component_id: ComponentId,
        env: Environment,
        version: &str,
        deployed_by: Option<&str>,
    ) -> Result<PromotionOutcome, TrackerError> {
        let version = version.trim();
        if version.is_empty() {
            return Err(ValidationError::Required(RequiredField::PromotionVersion).into());
        }

        let current = self.snapshot.require_component(component_id)?.version(env);
        if current.status == DeploymentStatus::Deployed && current.version == version {
            debug!(component = %component_id, %env, version, "already deployed, skipping");
            return Ok(PromotionOutcome::AlreadyDeployed);
        }

        let actor = resolve_actor(&self.config, deployed_by);
        let slot = promoted_slot(version, actor.clone(), self.clock.today());

        match self.config.promotion_policy {
            PromotionPolicy::Optimistic => {
                self.snapshot.set_version(component_id, env, slot)?;
                info!(component = %component_id, %env, version, actor = %actor, "promoted");
                let confirmed = self
                    .backend
                    .promote(component_id, env, version, &actor)
                    .await;
                if confirmed.is_err() {
                    warn!(
                        component = %component_id,
                        %env,
                        version,
                        "promotion not confirmed; local snapshot keeps it until the next refresh"
                    );
                }
                confirm(confirmed)?;
            }
            PromotionPolicy::ConfirmFirst => {
                confirm(
                    self.backend
                        .promote(component_id, env, version, &actor)
                        .await,
                )?;
                self.snapshot.set_version(component_id, env, slot)?;
                info!(component = %component_id, %env, version, actor = %actor, "promoted");
            }
        }

        self.after_mutation().await;
        Ok(PromotionOutcome::Promoted)
    }
}
