use crate::symbols::SymbolTable;
use crate::types::{SymbolId, CONTEXT_WIDTH};
use dashmap::DashMap;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ContextSymbol {
    Start,
    End,
    // The edge of a node that has siblings on this side in its parent; the
    // real neighbour is not visible from inside the node.
    NoContext,
    Symbol(SymbolId),
}

impl ContextSymbol {
    pub fn is_no_context(self) -> bool {
        matches!(self, Self::NoContext)
    }

    pub fn display(self, symbols: &SymbolTable) -> String {
        match self {
            Self::Start => "^".to_string(),
            Self::End => "$".to_string(),
            Self::NoContext => "_".to_string(),
            Self::Symbol(id) => symbols.resolve(id).to_string(),
        }
    }
}

pub type Side = SmallVec<[ContextSymbol; CONTEXT_WIDTH]>;

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Context {
    pub lhs: Side,
    pub rhs: Side,
}

impl Context {
    pub fn new(lhs: &[ContextSymbol], rhs: &[ContextSymbol]) -> Self {
        let lhs_start = lhs.len().saturating_sub(CONTEXT_WIDTH);
        let rhs_end = rhs.len().min(CONTEXT_WIDTH);
        Self {
            lhs: lhs[lhs_start..].iter().copied().collect(),
            rhs: rhs[..rhs_end].iter().copied().collect(),
        }
    }

    pub fn similarity(&self, other: &Context) -> f64 {
        if self == other {
            return 1.0;
        }
        side_similarity(&self.lhs, &other.lhs, true)
            + side_similarity(&self.rhs, &other.rhs, false)
    }

    pub fn similarity_cached(&self, other: &Context, cache: &SimilarityCache) -> f64 {
        if self == other {
            return 1.0;
        }
        cache.side_similarity(&self.lhs, &other.lhs, true)
            + cache.side_similarity(&self.rhs, &other.rhs, false)
    }

    pub fn display(&self, symbols: &SymbolTable) -> String {
        let render = |side: &Side| {
            side.iter()
                .map(|symbol| symbol.display(symbols))
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!("{}[...]{}", render(&self.lhs), render(&self.rhs))
    }
}

/// Positional similarity of two context sides, in `[0, 0.5]`.
///
/// Identical sides score 0.5. Otherwise position `i` (counted from the bubble
/// outwards, so from the right end of a left side) adds `1 / 2^(i + 2)` when
/// both symbols are equal and neither is [`ContextSymbol::NoContext`]. Two
/// sides that run out at the same position keep matching; once only one has
/// run out the scan stops.
pub fn side_similarity(
    side: &[ContextSymbol],
    other: &[ContextSymbol],
    from_right_end: bool,
) -> f64 {
    if side == other {
        return 0.5;
    }

    let mut score = 0.0;
    for i in 0..CONTEXT_WIDTH {
        let weight = 1.0 / f64::from(1u32 << (i + 2));
        if i < side.len() && i < other.len() {
            let (mine, theirs) = if from_right_end {
                (side[side.len() - 1 - i], other[other.len() - 1 - i])
            } else {
                (side[i], other[i])
            };
            if mine.is_no_context() || theirs.is_no_context() {
                continue;
            }
            if mine == theirs {
                score += weight;
            }
        } else if side.len() == other.len() {
            score += weight;
        } else {
            break;
        }
    }
    score
}

type SideKey = (Side, Side, bool);

#[derive(Default, Debug)]
pub struct SimilarityCache {
    entries: DashMap<SideKey, f64>,
}

impl SimilarityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn side_similarity(&self, side: &Side, other: &Side, from_right_end: bool) -> f64 {
        // The measure is symmetric, so both argument orders share an entry.
        let key = if side <= other {
            (side.clone(), other.clone(), from_right_end)
        } else {
            (other.clone(), side.clone(), from_right_end)
        };
        if let Some(score) = self.entries.get(&key) {
            return *score;
        }
        let score = side_similarity(side, other, from_right_end);
        self.entries.insert(key, score);
        score
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
