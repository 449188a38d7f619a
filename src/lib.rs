mod bubble;
mod config;
mod context;
mod error;
mod grouping;
mod scoring;
mod session;
mod symbols;
mod tree;
mod types;

#[cfg(feature = "python")]
mod py_bindings;

pub use bubble::{Bubble, SiteKey, SpanRange};
pub use config::GroupingConfig;
pub use context::{side_similarity, Context, ContextSymbol, Side, SimilarityCache};
pub use error::{InductionError, InductionResult};
pub use grouping::{enumerate_groupings, is_balanced, BubbleMap, GroupingPass, GroupingStats};
pub use scoring::{rank_bubbles, PairScore, Proposal, RankedProposal};
pub use session::{apply_bubble, apply_proposal, InductionSession};
pub use symbols::{NonterminalAllocator, SymbolTable};
pub use tree::{apply_grouping, naive_trees, ParseNode};
pub use types::{PairPolicy, SpanStep, SymbolId, TreeIndex, START_SYMBOL};
