//! Python bindings for treerewrite
//!
//! This module provides PyO3-based Python bindings for the Rust core.

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use std::path::PathBuf;

use crate::config::Config;
use crate::conllu::{CoNLLUReader, ParseError};
use crate::error::RewriteError;
use crate::pipeline::{Rewrite, Rewriter};
use crate::tree::Tree;

/// Convert ParseError to Python exception
impl From<ParseError> for PyErr {
    fn from(err: ParseError) -> PyErr {
        match err {
            ParseError::Io { .. } => PyIOError::new_err(err.to_string()),
            ParseError::Syntax { .. } => PyValueError::new_err(err.to_string()),
        }
    }
}

impl From<RewriteError> for PyErr {
    fn from(err: RewriteError) -> PyErr {
        PyValueError::new_err(format!("Rewrite error: {}", err))
    }
}

/// One occurrence of the target word after rewriting.
#[pyclass(name = "Rewrite")]
#[derive(Clone)]
pub struct PyRewrite {
    #[pyo3(get)]
    sentence: Option<String>,
    /// Word ID (1-based) of the focus token
    #[pyo3(get)]
    focus: usize,
    #[pyo3(get)]
    labels: Vec<String>,
    #[pyo3(get)]
    rules: Vec<String>,
    /// Bracketed rendering of the rewritten tree
    #[pyo3(get)]
    tree: String,
}

impl PyRewrite {
    fn new(sentence: Option<String>, rewrite: Rewrite) -> Self {
        let Rewrite {
            focus,
            tree,
            outcome,
        } = rewrite;
        PyRewrite {
            sentence,
            focus: tree[focus].index,
            labels: outcome.labels.iter().map(str::to_string).collect(),
            rules: outcome.firings.iter().map(str::to_string).collect(),
            tree: tree.to_bracketed(outcome.root),
        }
    }
}

#[pymethods]
impl PyRewrite {
    fn __repr__(&self) -> String {
        format!(
            "<Rewrite focus={} labels={:?} rules={:?}>",
            self.focus, self.labels, self.rules
        )
    }
}

fn rewrite_trees(
    trees: impl Iterator<Item = Result<Tree, ParseError>>,
    word: &str,
    max_iterations: usize,
) -> PyResult<Vec<PyRewrite>> {
    let rewriter = Rewriter::new(Config::default().with_max_iterations(max_iterations));
    let mut results = Vec::new();
    for tree in trees {
        let tree = tree?;
        for rewrite in rewriter.rewrite_occurrences(&tree, word)? {
            results.push(PyRewrite::new(tree.sentence_text.clone(), rewrite));
        }
    }
    Ok(results)
}

/// Rewrite every occurrence of `word` in a CoNLL-U string.
///
/// Args:
///     text: CoNLL-U formatted text
///     word: Surface form of the focus predicate
///
/// Returns:
///     List of Rewrite objects, one per occurrence
///
/// Example:
///     >>> for r in rewrite(text, "improves"):
///     ...     print(r.labels, r.rules)
#[pyfunction]
#[pyo3(signature = (text, word, max_iterations=crate::config::DEFAULT_MAX_ITERATIONS))]
fn rewrite(text: &str, word: &str, max_iterations: usize) -> PyResult<Vec<PyRewrite>> {
    rewrite_trees(CoNLLUReader::from_str(text), word, max_iterations)
}

/// Rewrite every occurrence of `word` in a CoNLL-U file.
///
/// Automatically detects and handles gzip-compressed files (.conllu.gz).
#[pyfunction]
#[pyo3(signature = (path, word, max_iterations=crate::config::DEFAULT_MAX_ITERATIONS))]
fn rewrite_file(path: &str, word: &str, max_iterations: usize) -> PyResult<Vec<PyRewrite>> {
    let reader = CoNLLUReader::from_file(&PathBuf::from(path))
        .map_err(|e| PyIOError::new_err(format!("Failed to open file {}: {}", path, e)))?;
    rewrite_trees(reader, word, max_iterations)
}

#[pyfunction]
fn __version__() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn treerewrite(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRewrite>()?;

    m.add_function(wrap_pyfunction!(rewrite, m)?)?;
    m.add_function(wrap_pyfunction!(rewrite_file, m)?)?;
    m.add_function(wrap_pyfunction!(__version__, m)?)?;

    Ok(())
}
