use crate::error::InductionError;
use serde::{Deserialize, Serialize};

pub(crate) const CONTEXT_WIDTH: usize = 4;
pub(crate) const DEFAULT_MIN_LEN: usize = 1;
pub(crate) const DEFAULT_MAX_LEN: usize = 4;
pub(crate) const DEFAULT_MAX_PROPOSALS: usize = 100;
pub(crate) const PARALLEL_PAIR_THRESHOLD: usize = 64;

pub const START_SYMBOL: &str = "START";

pub type SymbolId = u32;
pub type TreeIndex = usize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStep {
    #[default]
    Unit,
    // Span lengths grow by `max_len - 1`, so only the shortest and the longest
    // lengths are tried for the usual `min_len = 1`.
    Increment,
}

impl SpanStep {
    pub fn parse(value: &str) -> Result<Self, InductionError> {
        match value {
            "unit" => Ok(Self::Unit),
            "increment" => Ok(Self::Increment),
            _ => Err(InductionError::UnknownPolicy {
                kind: "span_step",
                value: value.to_string(),
                expected: "'unit', 'increment'",
            }),
        }
    }

    pub(crate) fn stride(self, max_len: usize) -> usize {
        match self {
            Self::Unit => 1,
            Self::Increment => max_len.saturating_sub(1).max(1),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairPolicy {
    #[default]
    Larger,
    Average,
}

impl PairPolicy {
    pub fn parse(value: &str) -> Result<Self, InductionError> {
        match value {
            "larger" => Ok(Self::Larger),
            "average" => Ok(Self::Average),
            _ => Err(InductionError::UnknownPolicy {
                kind: "pair_policy",
                value: value.to_string(),
                expected: "'larger', 'average'",
            }),
        }
    }
}
