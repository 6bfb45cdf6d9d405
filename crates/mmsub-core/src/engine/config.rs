use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// What resolution does with interactions that receive no parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnassignedPolicy {
    /// Collect them as warnings in the result.
    #[default]
    Report,
    /// Fail the whole molecule.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolverConfig {
    /// Upper bound on mappings enumerated per substructure record. `None`
    /// enumerates all of them.
    pub max_mappings_per_record: Option<usize>,
    pub unassigned_policy: UnassignedPolicy,
}

#[derive(Default)]
pub struct ResolverConfigBuilder {
    max_mappings_per_record: Option<usize>,
    unassigned_policy: Option<UnassignedPolicy>,
}

impl ResolverConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_mappings_per_record(mut self, limit: usize) -> Self {
        self.max_mappings_per_record = Some(limit);
        self
    }
    pub fn unassigned_policy(mut self, policy: UnassignedPolicy) -> Self {
        self.unassigned_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<ResolverConfig, ConfigError> {
        if self.max_mappings_per_record == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "max_mappings_per_record",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(ResolverConfig {
            max_mappings_per_record: self.max_mappings_per_record,
            unassigned_policy: self.unassigned_policy.unwrap_or_default(),
        })
    }
}
