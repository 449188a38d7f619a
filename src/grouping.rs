use crate::bubble::{Bubble, SiteKey, SpanRange};
use crate::config::GroupingConfig;
use crate::context::{Context, ContextSymbol};
use crate::error::InductionResult;
use crate::symbols::{NonterminalAllocator, SymbolTable};
use crate::tree::ParseNode;
use crate::types::{TreeIndex, CONTEXT_WIDTH};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

pub type BubbleMap = FxHashMap<String, Bubble>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GroupingStats {
    pub nodes_visited: usize,
    pub spans_considered: usize,
    pub single_terminals: usize,
    pub unbalanced: usize,
    pub wrappers_suppressed: usize,
}

#[derive(Debug, Default)]
pub struct GroupingPass {
    pub bubbles: BubbleMap,
    pub stats: GroupingStats,
}

fn closing_for(ch: char) -> Option<char> {
    match ch {
        ')' => Some('('),
        ']' => Some('['),
        '}' => Some('{'),
        _ => None,
    }
}

pub fn is_balanced(text: &str) -> bool {
    let mut stack: SmallVec<[char; 8]> = SmallVec::new();
    let mut quote = None;

    for ch in text.chars() {
        if let Some(open_quote) = quote {
            if ch == open_quote {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => stack.push(ch),
            _ => {
                if let Some(opener) = closing_for(ch) {
                    if stack.pop() != Some(opener) {
                        return false;
                    }
                }
            }
        }
    }

    // An open quote only suspends bracket matching; it never rejects a span.
    stack.is_empty()
}

struct Frame<'a> {
    tree: TreeIndex,
    node: &'a ParseNode,
    path: Vec<usize>,
    left: ContextSymbol,
    right: ContextSymbol,
    depth: usize,
}

struct Enumerator<'c> {
    config: &'c GroupingConfig,
    bubbles: BubbleMap,
    // Rendered string -> number of times it was a node's whole child list.
    full_wrappers: FxHashMap<String, usize>,
    stats: GroupingStats,
}

impl Enumerator<'_> {
    fn visit(
        &mut self,
        frame: &Frame<'_>,
        symbols: &mut SymbolTable,
        allocator: &mut NonterminalAllocator,
    ) {
        let children = &frame.node.children;
        let n = children.len();
        self.stats.nodes_visited += 1;

        let ids = children
            .iter()
            .map(|child| ContextSymbol::Symbol(symbols.intern(&child.payload)))
            .collect::<Vec<_>>();
        let derived = children
            .iter()
            .map(ParseNode::derived_string)
            .collect::<Vec<_>>();
        let site = SiteKey::new(frame.tree, &frame.path);

        for i in 0..n {
            for len in self.config.span_lengths() {
                let j = i + len;
                if j > n {
                    break;
                }
                self.stats.spans_considered += 1;

                if len == 1 && children[i].is_terminal {
                    self.stats.single_terminals += 1;
                    continue;
                }

                let text = derived[i..j].concat();
                if !is_balanced(&text) {
                    self.stats.unbalanced += 1;
                    tracing::trace!(%text, "skipping unbalanced span");
                    continue;
                }

                let rendered = children[i..j]
                    .iter()
                    .map(|child| child.payload.as_str())
                    .collect::<String>();
                if i == 0 && j == n {
                    *self.full_wrappers.entry(rendered.clone()).or_insert(0) += 1;
                }

                let context = span_context(&ids, i, j, frame.left, frame.right);
                let seq = self.bubbles.len();
                let bubble = self.bubbles.entry(rendered).or_insert_with(|| {
                    let mut bubble =
                        Bubble::new(allocator.allocate(), children[i..j].to_vec(), frame.depth);
                    bubble.seq = seq;
                    bubble
                });
                bubble.record_occurrence(
                    site.clone(),
                    SpanRange::new(i, j - 1),
                    context,
                    frame.depth,
                );
            }
        }
    }

    fn suppress_wrappers(&mut self) {
        for (rendered, wrapper_count) in &self.full_wrappers {
            let only_wrapper = self
                .bubbles
                .get(rendered)
                .is_some_and(|bubble| bubble.occurrence_count == *wrapper_count);
            if only_wrapper {
                tracing::trace!(%rendered, "dropping run only seen as a whole child list");
                self.bubbles.remove(rendered);
                self.stats.wrappers_suppressed += 1;
            }
        }
    }
}

fn span_context(
    ids: &[ContextSymbol],
    start: usize,
    end: usize,
    left: ContextSymbol,
    right: ContextSymbol,
) -> Context {
    let mut lhs: SmallVec<[ContextSymbol; CONTEXT_WIDTH + 1]> = SmallVec::new();
    if start < CONTEXT_WIDTH {
        lhs.push(left);
    }
    lhs.extend_from_slice(&ids[start.saturating_sub(CONTEXT_WIDTH)..start]);

    let rhs_end = ids.len().min(end + CONTEXT_WIDTH);
    let mut rhs: SmallVec<[ContextSymbol; CONTEXT_WIDTH + 1]> = SmallVec::new();
    rhs.extend_from_slice(&ids[end..rhs_end]);
    if rhs_end == ids.len() {
        rhs.push(right);
    }

    Context::new(&lhs, &rhs)
}

/// Collects every candidate grouping of the forest.
///
/// Each node's child list is scanned for runs of the configured lengths. Runs
/// of a lone terminal and runs whose derived text has unbalanced brackets are
/// skipped. Equal runs, by concatenated payloads, share one [`Bubble`] that
/// records every site and context. Runs that only ever occur as a node's
/// complete child list are dropped at the end. Traversal is pre-order with an
/// explicit stack, so tree depth is not bounded by the call stack.
///
/// Fails with [`InductionError::InvalidConfig`] when `config` does not pass
/// [`GroupingConfig::validate`].
///
/// [`InductionError::InvalidConfig`]: crate::InductionError::InvalidConfig
pub fn enumerate_groupings(
    trees: &[ParseNode],
    config: &GroupingConfig,
    symbols: &mut SymbolTable,
    allocator: &mut NonterminalAllocator,
) -> InductionResult<GroupingPass> {
    config.validate()?;

    let mut enumerator = Enumerator {
        config,
        bubbles: BubbleMap::default(),
        full_wrappers: FxHashMap::default(),
        stats: GroupingStats::default(),
    };

    for (tree_ix, tree) in trees.iter().enumerate() {
        let mut stack = vec![Frame {
            tree: tree_ix,
            node: tree,
            path: Vec::new(),
            left: ContextSymbol::Start,
            right: ContextSymbol::End,
            depth: 0,
        }];

        while let Some(frame) = stack.pop() {
            enumerator.visit(&frame, symbols, allocator);

            let last = frame.node.children.len().saturating_sub(1);
            for (child_ix, child) in frame.node.children.iter().enumerate().rev() {
                if child.is_terminal {
                    continue;
                }
                let mut path = frame.path.clone();
                path.push(child_ix);
                stack.push(Frame {
                    tree: tree_ix,
                    node: child,
                    path,
                    left: if child_ix == 0 {
                        frame.left
                    } else {
                        ContextSymbol::NoContext
                    },
                    right: if child_ix == last {
                        frame.right
                    } else {
                        ContextSymbol::NoContext
                    },
                    depth: frame.depth + 1,
                });
            }
        }
    }

    enumerator.suppress_wrappers();

    tracing::debug!(
        trees = trees.len(),
        nodes = enumerator.stats.nodes_visited,
        spans = enumerator.stats.spans_considered,
        unbalanced = enumerator.stats.unbalanced,
        wrappers_suppressed = enumerator.stats.wrappers_suppressed,
        candidates = enumerator.bubbles.len(),
        "enumerated groupings"
    );

    Ok(GroupingPass {
        bubbles: enumerator.bubbles,
        stats: enumerator.stats,
    })
}
