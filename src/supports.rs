//! Query object for a single `@supports` condition.

use log::{debug, warn};
use thiserror::Error;

use crate::ast::{normalize_key, SupportsAst};
use crate::config::QueryConfig;
use crate::evaluator::evaluate;
use crate::parser::{parse, ParseError};

const SUPPORTS_PREFIX: &str = "@supports";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupportsError {
    #[error("Empty condition provided")]
    EmptyCondition,

    /// Nothing left after stripping the `@supports` prefix.
    #[error("Invalid condition syntax")]
    MissingCondition,

    #[error("Empty feature provided")]
    EmptyFeature,

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A parsed `@supports` condition that answers feature queries.
///
/// The tree is built once in the constructor and never mutated, so a
/// `SupportsCondition` can be shared between threads and queried concurrently.
///
/// ```
/// use supports_query::SupportsCondition;
///
/// let condition = SupportsCondition::new("(color: #FFAA) and (display: flex)").unwrap();
/// assert_eq!(condition.check_property("display: flex").unwrap(), Some(true));
/// assert_eq!(condition.check_property("display: grid").unwrap(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportsCondition {
    root: SupportsAst,
    silent: bool,
}

impl SupportsCondition {
    /// Parses `condition` in strict mode.
    pub fn new(condition: &str) -> Result<Self, SupportsError> {
        Self::with_config(condition, &QueryConfig::default())
    }

    /// Parses `condition`, honouring `config.silent`.
    ///
    /// In silent mode a malformed condition is replaced by a tree that no
    /// feature can match, so every query answers undetermined.
    pub fn with_config(condition: &str, config: &QueryConfig) -> Result<Self, SupportsError> {
        let root = match parse_condition(condition) {
            Ok(root) => root,
            Err(e) if config.silent => {
                warn!("ignoring invalid @supports condition {:?}: {}", condition, e);
                SupportsAst::Declaration(String::new())
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            root,
            silent: config.silent,
        })
    }

    pub fn ast(&self) -> &SupportsAst {
        &self.root
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Checks whether `feature` would pass the condition.
    ///
    /// `feature` is either `property: value` or a function such as
    /// `selector(h2 > p)`; whitespace and case are ignored. Returns
    /// `Some(false)` if the feature is required to fail, `Some(true)` if it
    /// satisfies the part of the condition that mentions it, and `None` when
    /// that cannot be decided from the condition alone.
    pub fn check_property(&self, feature: &str) -> Result<Option<bool>, SupportsError> {
        match self.try_check(feature) {
            Ok(answer) => Ok(answer),
            Err(e) if self.silent => {
                debug!("ignoring feature query error: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn try_check(&self, feature: &str) -> Result<Option<bool>, SupportsError> {
        let feature = normalize_key(feature);
        if feature.is_empty() {
            return Err(SupportsError::EmptyFeature);
        }

        let outcomes = evaluate(&self.root, &feature);
        debug!("feature {:?} reached {:?}", feature, outcomes);
        Ok(outcomes.resolve())
    }
}

/// Strips an optional `@supports` prefix and parses what remains.
fn parse_condition(condition: &str) -> Result<SupportsAst, SupportsError> {
    let condition = condition.trim();
    if condition.is_empty() {
        return Err(SupportsError::EmptyCondition);
    }

    let condition = condition
        .strip_prefix(SUPPORTS_PREFIX)
        .unwrap_or(condition)
        .trim();
    if condition.is_empty() {
        return Err(SupportsError::MissingCondition);
    }

    Ok(parse(condition)?)
}
