use crate::bubble::Bubble;
use crate::config::GroupingConfig;
use crate::context::SimilarityCache;
use crate::grouping::BubbleMap;
use crate::types::PairPolicy;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairScore {
    pub similarity: f64,
    // Negated depth, so shallower pairs rank higher.
    pub depth: f64,
    pub commonness: f64,
    pub size: f64,
}

impl PairScore {
    pub fn key_cmp(&self, other: &Self) -> Ordering {
        self.similarity
            .total_cmp(&other.similarity)
            .then_with(|| self.depth.total_cmp(&other.depth))
            .then_with(|| self.commonness.total_cmp(&other.commonness))
            .then_with(|| self.size.total_cmp(&other.size))
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Proposal<'a> {
    Single(&'a Bubble),
    Pair {
        first: &'a Bubble,
        second: &'a Bubble,
    },
}

impl<'a> Proposal<'a> {
    pub fn bubbles(&self) -> Vec<&'a Bubble> {
        match *self {
            Self::Single(bubble) => vec![bubble],
            Self::Pair { first, second } => vec![first, second],
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Self::Pair { .. })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RankedProposal<'a> {
    pub proposal: Proposal<'a>,
    pub score: PairScore,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ScoredPair<'a> {
    pub(crate) score: PairScore,
    pub(crate) first: &'a Bubble,
    pub(crate) second: &'a Bubble,
}

fn pair_value(policy: PairPolicy, a: f64, b: f64, larger: f64) -> f64 {
    match policy {
        PairPolicy::Larger => larger,
        PairPolicy::Average => (a + b) / 2.0,
    }
}

pub(crate) fn score_pair<'a>(
    a: &'a Bubble,
    b: &'a Bubble,
    config: &GroupingConfig,
    cache: &SimilarityCache,
) -> Option<ScoredPair<'a>> {
    if a.is_single() && b.is_single() {
        return None;
    }

    let (a_breaks_b, b_breaks_a) = a.application_breaks_other(b);
    if a_breaks_b && b_breaks_a {
        return None;
    }

    let similarity = a.context_similarity_cached(b, cache);
    let a_total = a.context_total() as f64;
    let b_total = b.context_total() as f64;
    let commonness = if a.is_single() {
        b_total / 2.0
    } else if b.is_single() {
        a_total
    } else {
        (a_total + b_total) / 2.0
    };

    let larger = if a.len() > b.len() { a } else { b };
    let depth = -pair_value(
        config.pair_depth,
        a.depth as f64,
        b.depth as f64,
        larger.depth as f64,
    );
    let size = pair_value(
        config.pair_size,
        a.len() as f64,
        b.len() as f64,
        larger.len() as f64,
    );

    let (first, second) = if a_breaks_b { (b, a) } else { (a, b) };

    Some(ScoredPair {
        score: PairScore {
            similarity,
            depth,
            commonness,
            size,
        },
        first,
        second,
    })
}

pub(crate) fn sorted_candidates(bubbles: &BubbleMap) -> Vec<&Bubble> {
    let mut sorted = bubbles.values().collect::<Vec<_>>();
    sorted.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.seq.cmp(&b.seq)));
    sorted
}

pub(crate) fn score_pairs<'a>(
    sorted: &[&'a Bubble],
    config: &GroupingConfig,
    cache: &SimilarityCache,
) -> Vec<ScoredPair<'a>> {
    let n = sorted.len();
    let pairs_for = move |i: usize| {
        (i + 1..n).filter_map(move |j| score_pair(sorted[i], sorted[j], config, cache))
    };

    if n >= config.parallel_threshold {
        (0..n).into_par_iter().flat_map_iter(pairs_for).collect()
    } else {
        (0..n).flat_map(pairs_for).collect()
    }
}

pub fn rank_bubbles<'a>(
    bubbles: &'a BubbleMap,
    config: &GroupingConfig,
    cache: &SimilarityCache,
) -> Vec<RankedProposal<'a>> {
    let sorted = sorted_candidates(bubbles);
    let mut pairs = score_pairs(&sorted, config, cache);
    let n = sorted.len();
    let total_pairs = n * n.saturating_sub(1) / 2;

    pairs.sort_by(|x, y| y.score.key_cmp(&x.score));

    let mut proposed_singles = FxHashSet::default();
    let mut ranked = Vec::with_capacity(config.max_proposals.min(pairs.len()));
    for pair in &pairs {
        if ranked.len() >= config.max_proposals {
            break;
        }

        let proposal = if pair.first.is_single() {
            if !proposed_singles.insert(pair.second.id.as_str()) {
                continue;
            }
            Proposal::Single(pair.second)
        } else if pair.second.is_single() {
            if !proposed_singles.insert(pair.first.id.as_str()) {
                continue;
            }
            Proposal::Single(pair.first)
        } else {
            Proposal::Pair {
                first: pair.first,
                second: pair.second,
            }
        };
        ranked.push(RankedProposal {
            proposal,
            score: pair.score,
        });
    }

    tracing::debug!(
        candidates = n,
        pairs_scored = pairs.len(),
        pairs_skipped = total_pairs - pairs.len(),
        proposals = ranked.len(),
        parallel = n >= config.parallel_threshold,
        "ranked groupings"
    );

    ranked
}
