//! The predicate tree behind WHERE clauses.
//!
//! A [`ConditionNode`] is one parenthesized group of predicates joined by a
//! single conjunction. Groups nest to arbitrary depth, which is the only way
//! to mix AND and OR: each node applies its own conjunction uniformly
//! between all of its direct children.
//!
//! Rendering and argument collection walk the children in the same
//! depth-first, left-to-right order, so the collected values line up
//! positionally with the placeholders in the rendered fragment.

use crate::value::{Arg, Value};

/// Conjunction joining sibling predicates within one group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    /// The SQL keyword for this conjunction.
    pub fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

/// One child of a condition group: a rendered leaf predicate with its bound
/// values, or a nested sub-group.
#[derive(Clone, Debug)]
enum Child {
    Predicate { sql: String, args: Vec<Value> },
    Group(ConditionNode),
}

/// One predicate or parenthesized group of predicates.
///
/// Rendering never mutates the node, so a tree may be rendered repeatedly.
#[derive(Clone, Debug)]
pub struct ConditionNode {
    conjunction: Conjunction,
    children: Vec<Child>,
}

impl ConditionNode {
    /// Create an empty group with the given conjunction.
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            conjunction,
            children: Vec::new(),
        }
    }

    /// Create an empty AND group.
    pub fn and() -> Self {
        Self::new(Conjunction::And)
    }

    /// Create an empty OR group.
    pub fn or() -> Self {
        Self::new(Conjunction::Or)
    }

    /// The conjunction applied between this group's direct children.
    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    /// Whether the group has no children.
    ///
    /// An empty group still renders (as the degenerate `" (  )"`), so
    /// callers assembling a WHERE clause must skip empty roots.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a leaf predicate `field operator <value>`.
    ///
    /// Bound arguments emit a `?` placeholder and are collected by
    /// [`ConditionNode::arguments`]; literal arguments are inlined.
    pub fn predicate(&mut self, field: &str, operator: &str, arg: Arg) -> &mut Self {
        let (rendered, args) = match arg {
            Arg::Literal(value) => (value.to_literal(), Vec::new()),
            Arg::Bound(value) => ("?".to_string(), vec![value]),
        };
        self.children.push(Child::Predicate {
            sql: format!("{field} {operator} {rendered}"),
            args,
        });
        self
    }

    /// Append a nested sub-group and return it for further construction.
    pub fn group(&mut self, conjunction: Conjunction) -> &mut ConditionNode {
        self.children.push(Child::Group(ConditionNode::new(conjunction)));
        match self.children.last_mut() {
            Some(Child::Group(node)) => node,
            _ => unreachable!("a group was just pushed"),
        }
    }

    /// Append a bound equality predicate: `field = ?`
    pub fn eq(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.predicate(field, "=", Arg::Bound(value.into()))
    }

    /// Append a bound inequality predicate: `field != ?`
    pub fn ne(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.predicate(field, "!=", Arg::Bound(value.into()))
    }

    /// Append a bound greater-than predicate: `field > ?`
    pub fn gt(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.predicate(field, ">", Arg::Bound(value.into()))
    }

    /// Append a bound greater-than-or-equal predicate: `field >= ?`
    pub fn gte(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.predicate(field, ">=", Arg::Bound(value.into()))
    }

    /// Append a bound less-than predicate: `field < ?`
    pub fn lt(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.predicate(field, "<", Arg::Bound(value.into()))
    }

    /// Append a bound less-than-or-equal predicate: `field <= ?`
    pub fn lte(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.predicate(field, "<=", Arg::Bound(value.into()))
    }

    /// Append a bound LIKE predicate: `field LIKE ?`
    pub fn like(&mut self, field: &str, pattern: impl Into<Value>) -> &mut Self {
        self.predicate(field, "LIKE", Arg::Bound(pattern.into()))
    }

    /// Render this group as a parenthesized SQL fragment.
    ///
    /// Produces `" ( " + <children joined by the conjunction> + " )"`;
    /// nested groups are rendered recursively before joining. A group with
    /// no children renders as `" (  )"`.
    pub fn render(&self) -> String {
        let parts: Vec<String> = self
            .children
            .iter()
            .map(|child| match child {
                Child::Predicate { sql, .. } => sql.clone(),
                Child::Group(node) => node.render(),
            })
            .collect();
        let separator = format!(" {} ", self.conjunction.as_str());
        format!(" ( {} )", parts.join(&separator))
    }

    /// Collect every bound value in the tree, depth-first, left-to-right.
    ///
    /// The order matches the left-to-right placeholder order in
    /// [`ConditionNode::render`] output.
    pub fn arguments(&self) -> Vec<Value> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<Value>) {
        for child in &self.children {
            match child {
                Child::Predicate { args, .. } => out.extend(args.iter().cloned()),
                Child::Group(node) => node.collect_into(out),
            }
        }
    }
}

impl Default for ConditionNode {
    fn default() -> Self {
        Self::and()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_group_renders_degenerate_parens() {
        let node = ConditionNode::and();
        assert_eq!(node.render(), " (  )");
        assert!(node.arguments().is_empty());
    }

    #[test]
    fn bound_predicate_reserves_placeholder() {
        let mut node = ConditionNode::and();
        node.eq("status", "active");
        assert_eq!(node.render(), " ( status = ? )");
        assert_eq!(node.arguments(), vec![Value::Text("active".into())]);
    }

    #[test]
    fn literal_numeric_is_inlined() {
        let mut node = ConditionNode::and();
        node.predicate("age", ">", Arg::literal(18));
        assert_eq!(node.render(), " ( age > 18 )");
        assert!(node.arguments().is_empty());
    }

    #[test]
    fn literal_text_is_escaped_and_quoted() {
        let mut node = ConditionNode::and();
        node.predicate("name", "=", Arg::literal("O'Brien"));
        assert_eq!(node.render(), " ( name = 'O''Brien' )");
    }

    #[test]
    fn siblings_join_on_the_group_conjunction() {
        let mut node = ConditionNode::or();
        node.predicate("a", "=", Arg::literal(1));
        node.predicate("b", "=", Arg::literal(2));
        assert_eq!(node.render(), " ( a = 1 OR b = 2 )");
    }

    #[test]
    fn nested_group_renders_recursively() {
        let mut root = ConditionNode::and();
        root.predicate("a", "=", Arg::literal(1));
        let sub = root.group(Conjunction::Or);
        sub.predicate("b", "=", Arg::literal(2));
        sub.predicate("c", "=", Arg::literal(3));
        assert_eq!(root.render(), " ( a = 1 AND  ( b = 2 OR c = 3 ) )");
    }

    #[test]
    fn arguments_match_placeholder_order() {
        let mut root = ConditionNode::and();
        root.eq("a", 1i64);
        let sub = root.group(Conjunction::Or);
        sub.eq("b", 2i64);
        sub.eq("c", 3i64);
        root.eq("d", 4i64);

        assert_eq!(root.render(), " ( a = ? AND  ( b = ? OR c = ? ) AND d = ? )");
        assert_eq!(
            root.arguments(),
            vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
                Value::Int(4),
            ]
        );
    }

    #[test]
    fn mixed_literal_and_bound_collects_only_bound() {
        let mut node = ConditionNode::and();
        node.predicate("type", "=", Arg::literal("page"));
        node.eq("status", 1i64);
        assert_eq!(node.render(), " ( type = 'page' AND status = ? )");
        assert_eq!(node.arguments(), vec![Value::Int(1)]);
    }

    #[test]
    fn render_is_repeatable() {
        let mut node = ConditionNode::and();
        node.eq("a", 1i64);
        assert_eq!(node.render(), node.render());
        assert_eq!(node.arguments(), node.arguments());
    }
}
