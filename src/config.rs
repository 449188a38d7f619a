use crate::error::{InductionError, InductionResult};
use crate::types::{
    PairPolicy, SpanStep, DEFAULT_MAX_LEN, DEFAULT_MAX_PROPOSALS, DEFAULT_MIN_LEN,
    PARALLEL_PAIR_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupingConfig {
    pub min_len: usize,
    pub max_len: usize,
    pub span_step: SpanStep,
    pub pair_depth: PairPolicy,
    pub pair_size: PairPolicy,
    pub max_proposals: usize,
    pub parallel_threshold: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            span_step: SpanStep::default(),
            pair_depth: PairPolicy::default(),
            pair_size: PairPolicy::default(),
            max_proposals: DEFAULT_MAX_PROPOSALS,
            parallel_threshold: PARALLEL_PAIR_THRESHOLD,
        }
    }
}

impl GroupingConfig {
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> InductionResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> InductionResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| InductionError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> InductionResult<()> {
        if self.min_len == 0 {
            return Err(InductionError::InvalidConfig {
                field: "min_len",
                message: "must be greater than or equal to 1".to_string(),
            });
        }
        if self.max_len < self.min_len {
            return Err(InductionError::InvalidConfig {
                field: "max_len",
                message: format!(
                    "must be greater than or equal to min_len ({}), got {}",
                    self.min_len, self.max_len
                ),
            });
        }
        if self.max_proposals == 0 {
            return Err(InductionError::InvalidConfig {
                field: "max_proposals",
                message: "must be greater than or equal to 1".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn span_lengths(&self) -> impl Iterator<Item = usize> {
        (self.min_len..=self.max_len).step_by(self.span_step.stride(self.max_len))
    }
}
