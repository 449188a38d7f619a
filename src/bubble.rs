use crate::context::{Context, SimilarityCache};
use crate::tree::ParseNode;
use crate::types::TreeIndex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SiteKey {
    pub tree: TreeIndex,
    pub path: SmallVec<[usize; 8]>,
}

impl SiteKey {
    pub fn new(tree: TreeIndex, path: &[usize]) -> Self {
        Self {
            tree,
            path: path.iter().copied().collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SpanRange {
    pub start: usize,
    pub end: usize,
}

impl SpanRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span range start after end");
        Self { start, end }
    }

    pub fn is_disjoint(self, other: SpanRange) -> bool {
        self.end < other.start || self.start > other.end
    }

    pub fn contains(self, other: SpanRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Clone, Debug)]
pub struct Bubble {
    pub id: String,
    pub elements: Vec<ParseNode>,
    // Concatenated element payloads; the deduplication key of a pass.
    pub rendered: String,
    pub occurrence_count: usize,
    pub contexts: FxHashMap<Context, usize>,
    pub sources: FxHashMap<SiteKey, Vec<SpanRange>>,
    pub depth: usize,
    // Discovery order within the pass; keeps ranking deterministic.
    pub(crate) seq: usize,
}

impl Bubble {
    pub fn new(id: impl Into<String>, elements: Vec<ParseNode>, depth: usize) -> Self {
        let rendered = elements
            .iter()
            .map(|element| element.payload.as_str())
            .collect::<String>();
        Self {
            id: id.into(),
            elements,
            rendered,
            occurrence_count: 0,
            contexts: FxHashMap::default(),
            sources: FxHashMap::default(),
            depth,
            seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.elements.len() == 1
    }

    pub fn add_source(&mut self, site: SiteKey, range: SpanRange) {
        self.sources.entry(site).or_default().push(range);
        self.occurrence_count += 1;
    }

    pub fn add_context(&mut self, context: Context) {
        *self.contexts.entry(context).or_insert(0) += 1;
    }

    pub(crate) fn record_occurrence(
        &mut self,
        site: SiteKey,
        range: SpanRange,
        context: Context,
        depth: usize,
    ) {
        self.add_source(site, range);
        self.add_context(context);
        self.depth = self.depth.min(depth);
    }

    pub fn context_total(&self) -> usize {
        self.contexts.values().sum()
    }

    pub fn source_range_count(&self) -> usize {
        self.sources.values().map(Vec::len).sum()
    }

    pub fn derived_string(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            element.push_derived(&mut out);
        }
        out
    }

    pub fn context_similarity(&self, other: &Bubble) -> f64 {
        self.max_context_similarity(other, |mine, theirs| mine.similarity(theirs))
    }

    pub fn context_similarity_cached(&self, other: &Bubble, cache: &SimilarityCache) -> f64 {
        self.max_context_similarity(other, |mine, theirs| mine.similarity_cached(theirs, cache))
    }

    fn max_context_similarity(
        &self,
        other: &Bubble,
        similarity: impl Fn(&Context, &Context) -> f64,
    ) -> f64 {
        let mut best = 0.0f64;
        for mine in self.contexts.keys() {
            for theirs in other.contexts.keys() {
                best = best.max(similarity(mine, theirs));
                if best >= 1.0 {
                    return best;
                }
            }
        }
        best
    }

    /// Whether applying one bubble destroys occurrences the other needs.
    ///
    /// Returns `(self_breaks_other, other_breaks_self)`: the first flag is true
    /// when bubbling `self` first leaves `other` with nowhere to apply, the
    /// second is the same question in the other order. Both start out true and
    /// are cleared by evidence:
    ///
    /// - disjoint ranges at a shared site clear both;
    /// - a range of one bubble containing a range of the other clears the
    ///   containing bubble's flag, since the contained run stays intact inside
    ///   the new node;
    /// - a site only one bubble occurs at clears the other bubble's flag.
    ///
    /// # Panics
    ///
    /// Panics when neither bubble has a recorded source; enumeration never
    /// produces such bubbles.
    pub fn application_breaks_other(&self, other: &Bubble) -> (bool, bool) {
        assert!(
            !(self.sources.is_empty() && other.sources.is_empty()),
            "bubbles {} and {} have no recorded sources",
            self.id,
            other.id
        );

        let mut self_breaks_other = true;
        let mut other_breaks_self = true;

        for (site, my_ranges) in &self.sources {
            let Some(their_ranges) = other.sources.get(site) else {
                other_breaks_self = false;
                continue;
            };

            for mine in my_ranges {
                for theirs in their_ranges {
                    if mine.is_disjoint(*theirs) {
                        self_breaks_other = false;
                        other_breaks_self = false;
                        continue;
                    }
                    if mine.contains(*theirs) {
                        self_breaks_other = false;
                    }
                    if theirs.contains(*mine) {
                        other_breaks_self = false;
                    }
                }
            }
        }

        if self_breaks_other
            && other
                .sources
                .keys()
                .any(|site| !self.sources.contains_key(site))
        {
            self_breaks_other = false;
        }

        (self_breaks_other, other_breaks_self)
    }
}
