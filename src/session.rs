use crate::bubble::Bubble;
use crate::config::GroupingConfig;
use crate::context::SimilarityCache;
use crate::error::InductionResult;
use crate::grouping::{enumerate_groupings, GroupingPass};
use crate::scoring::{rank_bubbles, Proposal, RankedProposal};
use crate::symbols::{NonterminalAllocator, SymbolTable};
use crate::tree::{apply_grouping, naive_trees, ParseNode};

#[derive(Debug)]
pub struct InductionSession {
    config: GroupingConfig,
    // Grows with every distinct payload seen; only `reset` empties it.
    symbols: SymbolTable,
    allocator: NonterminalAllocator,
    cache: SimilarityCache,
}

impl InductionSession {
    pub fn new(config: GroupingConfig) -> InductionResult<Self> {
        Self::with_allocator(config, NonterminalAllocator::new())
    }

    pub fn with_allocator(
        config: GroupingConfig,
        allocator: NonterminalAllocator,
    ) -> InductionResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            symbols: SymbolTable::default(),
            allocator,
            cache: SimilarityCache::new(),
        })
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    pub fn set_span_bounds(&mut self, min_len: usize, max_len: usize) -> InductionResult<()> {
        let config = GroupingConfig {
            min_len,
            max_len,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn allocator(&self) -> &NonterminalAllocator {
        &self.allocator
    }

    pub fn cache(&self) -> &SimilarityCache {
        &self.cache
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // Cache keys hold symbol ids, so the table and the cache are dropped
    // together. Contexts of earlier passes cannot be displayed afterwards.
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.cache.clear();
    }

    pub fn naive_trees(&mut self, examples: &[Vec<String>]) -> Vec<ParseNode> {
        naive_trees(examples, &mut self.allocator)
    }

    pub fn enumerate(&mut self, trees: &[ParseNode]) -> InductionResult<GroupingPass> {
        enumerate_groupings(trees, &self.config, &mut self.symbols, &mut self.allocator)
    }

    pub fn rank<'p>(&self, pass: &'p GroupingPass) -> Vec<RankedProposal<'p>> {
        rank_bubbles(&pass.bubbles, &self.config, &self.cache)
    }
}

pub fn apply_bubble(trees: &[ParseNode], bubble: &Bubble) -> Vec<ParseNode> {
    apply_grouping(trees, &bubble.elements, &bubble.id)
}

pub fn apply_proposal(trees: &[ParseNode], proposal: &Proposal<'_>) -> Vec<ParseNode> {
    match *proposal {
        Proposal::Single(bubble) => apply_bubble(trees, bubble),
        Proposal::Pair { first, second } => apply_bubble(&apply_bubble(trees, first), second),
    }
}
