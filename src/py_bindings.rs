use crate::bubble::Bubble;
use crate::config::GroupingConfig;
use crate::error::{InductionError, InductionResult};
use crate::session::{apply_bubble, InductionSession};
use crate::tree::ParseNode;
use crate::types::{PairPolicy, SpanStep};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyList, PyTuple};
use rustc_hash::FxHashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

impl From<InductionError> for PyErr {
    fn from(err: InductionError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

// Trees cross the boundary as `(payload, is_terminal, [children])` tuples.
impl<'py> FromPyObject<'py> for ParseNode {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        let (payload, is_terminal, children): (String, bool, Vec<ParseNode>) = ob.extract()?;
        if is_terminal && !children.is_empty() {
            return Err(PyValueError::new_err(format!(
                "terminal {payload:?} must not have children"
            )));
        }
        Ok(Self {
            payload,
            is_terminal,
            children,
        })
    }
}

fn node_to_py<'py>(py: Python<'py>, node: &ParseNode) -> PyResult<Bound<'py, PyTuple>> {
    let children = node
        .children
        .iter()
        .map(|child| node_to_py(py, child))
        .collect::<PyResult<Vec<_>>>()?;
    let children = PyList::new(py, children)?;
    (node.payload.as_str(), node.is_terminal, children).into_pyobject(py)
}

fn forest_to_py<'py>(py: Python<'py>, trees: &[ParseNode]) -> PyResult<Bound<'py, PyList>> {
    let trees = trees
        .iter()
        .map(|tree| node_to_py(py, tree))
        .collect::<PyResult<Vec<_>>>()?;
    PyList::new(py, trees)
}

fn panic_payload_to_string(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_string()
}

#[pyclass(frozen, name = "Proposal")]
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalView {
    #[pyo3(get)]
    pub(crate) is_pair: bool,
    #[pyo3(get)]
    pub(crate) ids: Vec<String>,
    #[pyo3(get)]
    pub(crate) elements: Vec<Vec<String>>,
    #[pyo3(get)]
    pub(crate) derived: Vec<String>,
    #[pyo3(get)]
    pub(crate) similarity: f64,
    #[pyo3(get)]
    pub(crate) depth: f64,
    #[pyo3(get)]
    pub(crate) commonness: f64,
    #[pyo3(get)]
    pub(crate) size: f64,
}

#[pyclass(name = "Session")]
pub struct PySession {
    session: InductionSession,
    // Bubbles of the last `propose` call, by id, so `apply` can find them.
    last_bubbles: FxHashMap<String, Bubble>,
}

impl PySession {
    fn propose_internal(&mut self, trees: &[ParseNode]) -> InductionResult<Vec<ProposalView>> {
        let pass = self.session.enumerate(trees)?;
        let views: Vec<ProposalView> = self
            .session
            .rank(&pass)
            .iter()
            .map(|ranked| {
                let bubbles = ranked.proposal.bubbles();
                ProposalView {
                    is_pair: ranked.proposal.is_pair(),
                    ids: bubbles.iter().map(|bubble| bubble.id.clone()).collect(),
                    elements: bubbles
                        .iter()
                        .map(|bubble| {
                            bubble
                                .elements
                                .iter()
                                .map(|element| element.payload.clone())
                                .collect()
                        })
                        .collect(),
                    derived: bubbles.iter().map(|bubble| bubble.derived_string()).collect(),
                    similarity: ranked.score.similarity,
                    depth: ranked.score.depth,
                    commonness: ranked.score.commonness,
                    size: ranked.score.size,
                }
            })
            .collect();

        self.last_bubbles = pass
            .bubbles
            .into_values()
            .map(|bubble| (bubble.id.clone(), bubble))
            .collect();
        Ok(views)
    }
}

#[pymethods]
impl PySession {
    #[new]
    #[pyo3(signature = (
        max_len=4,
        min_len=1,
        span_step="unit",
        pair_depth="larger",
        pair_size="larger",
        max_proposals=100,
    ))]
    fn new(
        max_len: usize,
        min_len: usize,
        span_step: &str,
        pair_depth: &str,
        pair_size: &str,
        max_proposals: usize,
    ) -> PyResult<Self> {
        let config = GroupingConfig {
            min_len,
            max_len,
            span_step: SpanStep::parse(span_step)?,
            pair_depth: PairPolicy::parse(pair_depth)?,
            pair_size: PairPolicy::parse(pair_size)?,
            max_proposals,
            ..GroupingConfig::default()
        };
        Ok(Self {
            session: InductionSession::new(config)?,
            last_bubbles: FxHashMap::default(),
        })
    }

    #[staticmethod]
    fn from_toml(source: &str) -> PyResult<Self> {
        Ok(Self {
            session: InductionSession::new(GroupingConfig::from_toml_str(source)?)?,
            last_bubbles: FxHashMap::default(),
        })
    }

    fn set_span_bounds(&mut self, min_len: usize, max_len: usize) -> PyResult<()> {
        Ok(self.session.set_span_bounds(min_len, max_len)?)
    }

    fn naive_trees<'py>(
        &mut self,
        py: Python<'py>,
        examples: Vec<Vec<String>>,
    ) -> PyResult<Bound<'py, PyList>> {
        let trees = self.session.naive_trees(&examples);
        forest_to_py(py, &trees)
    }

    fn propose(&mut self, py: Python<'_>, trees: Vec<ParseNode>) -> PyResult<Vec<ProposalView>> {
        let result = py.allow_threads(|| {
            catch_unwind(AssertUnwindSafe(|| self.propose_internal(&trees)))
                .map_err(panic_payload_to_string)
        });
        let views = result.map_err(|message| {
            PyRuntimeError::new_err(format!(
                "grouping session panicked during propose(): {message}"
            ))
        })?;
        Ok(views?)
    }

    fn apply<'py>(
        &self,
        py: Python<'py>,
        trees: Vec<ParseNode>,
        ids: Vec<String>,
    ) -> PyResult<Bound<'py, PyList>> {
        let mut current = trees;
        for id in &ids {
            let Some(bubble) = self.last_bubbles.get(id) else {
                return Err(PyValueError::new_err(format!(
                    "unknown bubble id {id:?}; call propose() first"
                )));
            };
            current = apply_bubble(&current, bubble);
        }
        forest_to_py(py, &current)
    }

    fn clear_cache(&self) {
        self.session.clear_cache();
    }

    fn reset(&mut self) {
        self.session.reset();
        self.last_bubbles.clear();
    }
}

#[pymodule(gil_used = true)]
fn _core(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PySession>()?;
    module.add_class::<ProposalView>()?;
    module.add("CONTEXT_WIDTH", crate::types::CONTEXT_WIDTH)?;
    Ok(())
}
