use crate::bucket::evaluate;
use crate::config::FeatureConfig;
use crate::errors::ProviderError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// The identity a feature is evaluated for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetingContext {
    pub user_id: String,
}

impl TargetingContext {
    pub fn new<U: Into<String>>(user_id: U) -> Self {
        TargetingContext {
            user_id: user_id.into(),
        }
    }
}

/// Answers whether a feature is enabled for an identity.
///
/// Handlers only depend on this trait, so the decision can come from any
/// feature management backend or from an in-memory double in tests.
#[async_trait]
pub trait FeatureProvider: Send + Sync {
    async fn is_enabled(
        &self,
        feature: &str,
        context: &TargetingContext,
    ) -> Result<bool, ProviderError>;
}

struct FeatureRules {
    users: HashSet<String>,
    rollout: FeatureConfig,
}

/// Feature provider backed by the static `features` section of the config.
///
/// Targeted users always get the feature. Everyone else is placed in a bucket
/// and compared against the rollout percentage. Features missing from the
/// config are reported as disabled.
pub struct StaticFeatureProvider {
    features: HashMap<String, FeatureRules>,
}

impl StaticFeatureProvider {
    pub fn new(features: HashMap<String, FeatureConfig>) -> Self {
        let features = features
            .into_iter()
            .map(|(name, rollout)| {
                let users = rollout.users.iter().map(|u| u.to_lowercase()).collect();
                (name, FeatureRules { users, rollout })
            })
            .collect();

        StaticFeatureProvider { features }
    }
}

#[async_trait]
impl FeatureProvider for StaticFeatureProvider {
    async fn is_enabled(
        &self,
        feature: &str,
        context: &TargetingContext,
    ) -> Result<bool, ProviderError> {
        let Some(rules) = self.features.get(feature) else {
            tracing::warn!(feature, "Feature is not configured, treating as disabled");
            return Ok(false);
        };

        if rules.users.contains(&context.user_id.to_lowercase()) {
            tracing::debug!(feature, user_id = %context.user_id, "Targeted user");
            return Ok(true);
        }

        let evaluation = evaluate(&context.user_id, rules.rollout.rollout_percentage);
        Ok(evaluation.enabled)
    }
}
