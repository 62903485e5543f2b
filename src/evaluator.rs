//! Evaluates a parsed `@supports` tree against a single feature key.
//!
//! The question answered is "would this one feature, on its own, satisfy the
//! part of the condition that mentions it", not "is the whole condition
//! true". A feature that appears inside an `or` group (or a group mixing
//! `and` and `or`) cannot fix the outcome by itself, so those groups never
//! contribute an outcome.

use crate::ast::SupportsAst;

/// The set of boolean outcomes a feature key reaches in a tree.
///
/// An empty set means the key was not found anywhere it could decide the
/// result, which is different from the key being required to be false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcomes {
    pass: bool,
    fail: bool,
}

impl Outcomes {
    /// The empty set.
    pub const NONE: Outcomes = Outcomes { pass: false, fail: false };

    /// A set holding exactly `value`.
    pub fn only(value: bool) -> Self {
        let mut outcomes = Self::NONE;
        outcomes.insert(value);
        outcomes
    }

    pub fn insert(&mut self, value: bool) {
        if value {
            self.pass = true;
        } else {
            self.fail = true;
        }
    }

    pub fn contains(&self, value: bool) -> bool {
        if value {
            self.pass
        } else {
            self.fail
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.pass && !self.fail
    }

    /// Negates every element: `{true}` becomes `{false}` and vice versa.
    pub fn negate(self) -> Self {
        Self {
            pass: self.fail,
            fail: self.pass,
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            pass: self.pass || other.pass,
            fail: self.fail || other.fail,
        }
    }

    /// Iterates the contained values, `false` first.
    pub fn iter(&self) -> impl Iterator<Item = bool> {
        [(false, self.fail), (true, self.pass)]
            .into_iter()
            .filter_map(|(value, present)| present.then_some(value))
    }

    /// Collapses the set into a single answer.
    ///
    /// `false` wins over `true` when a key is reachable through conflicting
    /// paths; an empty set is undetermined (`None`).
    pub fn resolve(&self) -> Option<bool> {
        if self.fail {
            Some(false)
        } else if self.pass {
            Some(true)
        } else {
            None
        }
    }
}

impl FromIterator<bool> for Outcomes {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut outcomes = Outcomes::NONE;
        for value in iter {
            outcomes.insert(value);
        }
        outcomes
    }
}

impl Extend<Outcomes> for Outcomes {
    fn extend<I: IntoIterator<Item = Outcomes>>(&mut self, iter: I) {
        for other in iter {
            *self = self.union(other);
        }
    }
}

/// Walks `node` and collects the outcomes `feature` contributes to.
///
/// `feature` must already be normalized the same way leaf keys are
/// (whitespace removed, lowercase).
pub fn evaluate(node: &SupportsAst, feature: &str) -> Outcomes {
    match node {
        SupportsAst::Declaration(key) | SupportsAst::Function(key) => {
            if key == feature {
                Outcomes::only(true)
            } else {
                Outcomes::NONE
            }
        }
        SupportsAst::Not(child) => evaluate(child, feature).negate(),
        SupportsAst::And(children) => children
            .iter()
            .map(|child| evaluate(child, feature))
            .fold(Outcomes::NONE, Outcomes::union),
        SupportsAst::Or(_) | SupportsAst::InvalidGroup(_) | SupportsAst::InvalidAtom(_) => {
            Outcomes::NONE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(condition: &str, feature: &str) -> Outcomes {
        let ast = parse(condition).unwrap();
        evaluate(&ast, feature)
    }

    #[test]
    fn test_single_declaration() {
        assert_eq!(check("(color: #FFAA)", "color:#ffaa"), Outcomes::only(true));
        assert_eq!(check("(color: #FFAA)", "color:#ffbb"), Outcomes::NONE);
    }

    #[test]
    fn test_and_group() {
        let ast = parse("(color: #FFAA) and (display: flex)").unwrap();
        assert_eq!(evaluate(&ast, "color:#ffaa").resolve(), Some(true));
        assert_eq!(evaluate(&ast, "display:flex").resolve(), Some(true));
        assert_eq!(evaluate(&ast, "display:grid").resolve(), None);
    }

    #[test]
    fn test_or_group_is_undetermined() {
        let ast = parse("(display:flex) or (display:grid)").unwrap();
        assert!(evaluate(&ast, "display:flex").is_empty());
        assert!(evaluate(&ast, "display:grid").is_empty());
        assert!(evaluate(&ast, "display:block").is_empty());
    }

    #[test]
    fn test_or_nested_inside_and() {
        let ast = parse(
            "(color: #FFAA) and ((display: flex) or (display: grid)) and (font-tech(color-COLRv1))",
        )
        .unwrap();
        assert_eq!(evaluate(&ast, "color:#ffaa"), Outcomes::only(true));
        assert_eq!(evaluate(&ast, "font-tech(color-colrv1)"), Outcomes::only(true));
        assert!(evaluate(&ast, "display:flex").is_empty());
        assert!(evaluate(&ast, "display:grid").is_empty());
    }

    #[test]
    fn test_and_nested_inside_and() {
        let ast = parse("(a:1) and ((b:2) and (not (c:3)))").unwrap();
        assert_eq!(evaluate(&ast, "b:2"), Outcomes::only(true));
        assert_eq!(evaluate(&ast, "c:3"), Outcomes::only(false));
    }

    #[test]
    fn test_negation() {
        assert_eq!(check("not (display:flex)", "display:flex"), Outcomes::only(false));
        assert_eq!(check("not (not (display:flex))", "display:flex"), Outcomes::only(true));
        assert_eq!(
            check("(color: #FFAA) and (not (not ( not ( not ( display: flex) ))))", "display:flex").resolve(),
            Some(true)
        );
        assert_eq!(
            check("(color: #FFAA) and (not (not ( not ( display: flex) )))", "display:flex").resolve(),
            Some(false)
        );
        assert!(check("not (display:flex)", "display:grid").is_empty());
    }

    #[test]
    fn test_negated_or_stays_undetermined() {
        assert!(check("not ((a:1) or (b:2))", "a:1").is_empty());
    }

    #[test]
    fn test_conflicting_paths_prefer_false() {
        let outcomes = check("(a:1) and (not (a:1))", "a:1");
        assert!(outcomes.contains(true));
        assert!(outcomes.contains(false));
        assert_eq!(outcomes.resolve(), Some(false));
        assert_eq!(outcomes.iter().collect::<Vec<_>>(), vec![false, true]);
    }

    #[test]
    fn test_invalid_nodes_are_undetermined() {
        assert!(check("(a:1) and (b:2) or (c:3)", "a:1").is_empty());
        assert!(check("(demo)", "demo").is_empty());
    }

    #[test]
    fn test_function_leaf() {
        assert_eq!(check("selector(h2 > p)", "selector(h2>p)"), Outcomes::only(true));
    }

    #[test]
    fn test_outcome_set_operations() {
        let both: Outcomes = [true, false, true].into_iter().collect();
        assert_eq!(both, Outcomes::only(true).union(Outcomes::only(false)));
        assert_eq!(both.negate(), both);
        assert_eq!(Outcomes::NONE.negate(), Outcomes::NONE);
        assert_eq!(Outcomes::NONE.resolve(), None);

        let mut acc = Outcomes::NONE;
        acc.extend([Outcomes::NONE, Outcomes::only(true)]);
        assert_eq!(acc, Outcomes::only(true));
    }
}
