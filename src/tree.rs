use crate::symbols::NonterminalAllocator;
use crate::types::START_SYMBOL;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ParseNode {
    pub payload: String,
    pub is_terminal: bool,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn terminal(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            is_terminal: true,
            children: Vec::new(),
        }
    }

    pub fn nonterminal(payload: impl Into<String>, children: Vec<ParseNode>) -> Self {
        Self {
            payload: payload.into(),
            is_terminal: false,
            children,
        }
    }

    pub fn derived_string(&self) -> String {
        let mut out = String::new();
        self.push_derived(&mut out);
        out
    }

    pub(crate) fn push_derived(&self, out: &mut String) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_terminal {
                out.push_str(&node.payload);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

fn opens_group(token: &str) -> bool {
    matches!(token, "(" | "[" | "{")
}

fn closes_group(token: &str) -> bool {
    matches!(token, ")" | "]" | "}")
}

pub fn naive_trees(
    examples: &[Vec<String>],
    allocator: &mut NonterminalAllocator,
) -> Vec<ParseNode> {
    let mut tokens = examples.iter().flatten().collect::<Vec<_>>();
    tokens.sort_unstable();
    tokens.dedup();
    let classes = tokens
        .into_iter()
        .map(|token| (token.clone(), allocator.allocate()))
        .collect::<FxHashMap<_, _>>();

    let leaf = |token: &String| {
        ParseNode::nonterminal(
            classes[token].clone(),
            vec![ParseNode::terminal(token.clone())],
        )
    };

    examples
        .iter()
        .map(|example| {
            let mut open: Vec<Vec<ParseNode>> = vec![Vec::new()];
            for token in example {
                if opens_group(token) {
                    open.push(vec![leaf(token)]);
                } else if closes_group(token) && open.len() > 1 {
                    let mut children = open.pop().unwrap_or_default();
                    children.push(leaf(token));
                    let group = ParseNode::nonterminal(allocator.allocate(), children);
                    if let Some(parent) = open.last_mut() {
                        parent.push(group);
                    }
                } else if let Some(current) = open.last_mut() {
                    current.push(leaf(token));
                }
            }
            while open.len() > 1 {
                let children = open.pop().unwrap_or_default();
                let group = ParseNode::nonterminal(allocator.allocate(), children);
                if let Some(parent) = open.last_mut() {
                    parent.push(group);
                }
            }
            ParseNode::nonterminal(START_SYMBOL, open.pop().unwrap_or_default())
        })
        .collect()
}

fn leftmost_match(pattern: &[&str], layer: &[ParseNode]) -> Option<usize> {
    if pattern.is_empty() || pattern.len() > layer.len() {
        return None;
    }
    layer.windows(pattern.len()).position(|window| {
        window
            .iter()
            .zip(pattern)
            .all(|(node, payload)| node.payload == *payload)
    })
}

fn apply_to_node(node: &ParseNode, pattern: &[&str], new_id: &str) -> ParseNode {
    if node.is_terminal {
        return node.clone();
    }

    let mut children = node
        .children
        .iter()
        .map(|child| apply_to_node(child, pattern, new_id))
        .collect::<Vec<_>>();

    while let Some(ix) = leftmost_match(pattern, &children) {
        let grouped = children.drain(ix..ix + pattern.len()).collect::<Vec<_>>();
        children.insert(ix, ParseNode::nonterminal(new_id, grouped));
    }

    ParseNode::nonterminal(node.payload.clone(), children)
}

pub fn apply_grouping(
    trees: &[ParseNode],
    elements: &[ParseNode],
    new_id: &str,
) -> Vec<ParseNode> {
    assert!(!elements.is_empty(), "cannot apply a grouping without elements");
    let pattern = elements
        .iter()
        .map(|element| element.payload.as_str())
        .collect::<Vec<_>>();
    trees
        .iter()
        .map(|tree| apply_to_node(tree, &pattern, new_id))
        .collect()
}
