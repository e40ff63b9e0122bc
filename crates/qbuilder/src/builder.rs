//! SELECT statement assembly.
//!
//! [`QueryBuilder`] accumulates a statement's clauses through fluent
//! `&mut self` chaining and compiles them on demand: [`QueryBuilder::to_sql`]
//! renders the statement, [`QueryBuilder::arguments`] returns the flat
//! argument list aligned with the placeholders left-to-right. Rendering is
//! idempotent and side-effect-free.
//!
//! Apart from the duplicate join alias check there is no validation:
//! unknown columns, bad operators and empty condition groups pass through
//! and surface at the database layer.

use crate::condition::{ConditionNode, Conjunction};
use crate::error::{QbError, QbResult};
use crate::value::{Arg, Value};

/// Join flavor. INNER is the default everywhere an alias-only variant exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

#[derive(Clone, Debug)]
struct Join {
    kind: JoinKind,
    table: String,
    alias: String,
    on: String,
}

/// The FROM source: a named table or a derived table built from another
/// builder, each carrying the alias it is referenced by.
#[derive(Clone, Debug)]
enum Source {
    Table { name: String, alias: String },
    Subquery { query: Box<QueryBuilder>, alias: String },
}

/// Key of one projection entry: a table alias, or the pseudo-entry for raw
/// expressions that are emitted unqualified.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ProjectionKey {
    Alias(String),
    Expression,
}

/// Accumulates one SELECT statement's clauses and compiles them into a SQL
/// string plus an ordered argument list.
///
/// # Example
/// ```ignore
/// let mut qb = qbuilder::select("node");
/// qb.fields("node", &["nid", "title"])
///     .eq("node.status", 1i64)
///     .order_by_desc("node.created");
/// let sql = qb.to_sql();
/// let args = qb.arguments();
/// ```
#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    source: Option<Source>,
    /// Arguments inherited from a subquery source, captured at merge time.
    source_args: Vec<Value>,
    joins: Vec<Join>,
    projections: Vec<(ProjectionKey, Vec<String>)>,
    root: ConditionNode,
    order_clauses: Vec<String>,
    group_clauses: Vec<String>,
}

impl QueryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== FROM ====================

    /// Set a named table source, aliased by its own name.
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.from_as(table, table)
    }

    /// Set a named table source with an explicit alias.
    pub fn from_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.source = Some(Source::Table {
            name: table.to_string(),
            alias: alias.to_string(),
        });
        self.source_args.clear();
        self
    }

    /// Use another builder as a derived-table source under `alias`.
    ///
    /// The subquery's accumulated arguments are merged into this builder's
    /// argument list now, ahead of this builder's own WHERE arguments, so
    /// the flat list keeps subquery-then-outer order.
    pub fn from_subquery(&mut self, query: QueryBuilder, alias: &str) -> &mut Self {
        self.source_args = query.arguments();
        self.source = Some(Source::Subquery {
            query: Box::new(query),
            alias: alias.to_string(),
        });
        self
    }

    // ==================== Projection ====================

    /// Register projected columns under a table alias.
    ///
    /// Repeated calls for the same alias are additive. No registered
    /// fields at all means `SELECT *`.
    pub fn fields(&mut self, alias: &str, columns: &[&str]) -> &mut Self {
        self.push_projection(
            ProjectionKey::Alias(alias.to_string()),
            columns.iter().map(|c| c.to_string()),
        );
        self
    }

    /// Register a raw expression projected as `expression AS alias`.
    pub fn expression(&mut self, expression: &str, alias: &str) -> &mut Self {
        self.push_projection(
            ProjectionKey::Expression,
            std::iter::once(format!("{expression} AS {alias}")),
        );
        self
    }

    fn push_projection(&mut self, key: ProjectionKey, columns: impl Iterator<Item = String>) {
        if let Some((_, existing)) = self.projections.iter_mut().find(|(k, _)| *k == key) {
            existing.extend(columns);
        } else {
            self.projections.push((key, columns.collect()));
        }
    }

    // ==================== JOIN ====================

    /// Add an INNER JOIN, synthesizing an alias from the table name.
    pub fn join(&mut self, table: &str, on: &str) -> QbResult<&mut Self> {
        self.add_join(JoinKind::Inner, table, None, on)
    }

    /// Add an INNER JOIN under an explicit alias.
    pub fn join_as(&mut self, table: &str, alias: &str, on: &str) -> QbResult<&mut Self> {
        self.add_join(JoinKind::Inner, table, Some(alias), on)
    }

    /// Add a LEFT JOIN, synthesizing an alias from the table name.
    pub fn left_join(&mut self, table: &str, on: &str) -> QbResult<&mut Self> {
        self.add_join(JoinKind::Left, table, None, on)
    }

    /// Add a LEFT JOIN under an explicit alias.
    pub fn left_join_as(&mut self, table: &str, alias: &str, on: &str) -> QbResult<&mut Self> {
        self.add_join(JoinKind::Left, table, Some(alias), on)
    }

    /// Add a RIGHT JOIN, synthesizing an alias from the table name.
    pub fn right_join(&mut self, table: &str, on: &str) -> QbResult<&mut Self> {
        self.add_join(JoinKind::Right, table, None, on)
    }

    /// Add a RIGHT JOIN under an explicit alias.
    pub fn right_join_as(&mut self, table: &str, alias: &str, on: &str) -> QbResult<&mut Self> {
        self.add_join(JoinKind::Right, table, Some(alias), on)
    }

    /// Register a join.
    ///
    /// Without an explicit alias the table name is used, probing `_1`,
    /// `_2`, ... until free. A duplicate final alias (only reachable with
    /// an explicit alias) is a configuration error; the join list is left
    /// unmodified.
    fn add_join(
        &mut self,
        kind: JoinKind,
        table: &str,
        alias: Option<&str>,
        on: &str,
    ) -> QbResult<&mut Self> {
        let alias = match alias {
            Some(alias) => alias.to_string(),
            None => {
                let mut candidate = table.to_string();
                let mut count = 1;
                while self.has_join_alias(&candidate) {
                    candidate = format!("{table}_{count}");
                    count += 1;
                }
                candidate
            }
        };
        if self.has_join_alias(&alias) {
            return Err(QbError::DuplicateAlias { alias });
        }

        self.joins.push(Join {
            kind,
            table: table.to_string(),
            alias,
            on: on.to_string(),
        });
        Ok(self)
    }

    fn has_join_alias(&self, alias: &str) -> bool {
        self.joins.iter().any(|join| join.alias == alias)
    }

    // ==================== WHERE ====================

    /// Append a predicate to the root condition group (conjunction AND).
    pub fn condition(&mut self, field: &str, operator: &str, arg: Arg) -> &mut Self {
        self.root.predicate(field, operator, arg);
        self
    }

    /// Append a sub-group to the root condition and return it, for building
    /// nested AND/OR combinations.
    pub fn condition_group(&mut self, conjunction: Conjunction) -> &mut ConditionNode {
        self.root.group(conjunction)
    }

    /// Add WHERE: field = ? (bound)
    pub fn eq(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.condition(field, "=", Arg::Bound(value.into()))
    }

    /// Add WHERE: field != ? (bound)
    pub fn ne(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.condition(field, "!=", Arg::Bound(value.into()))
    }

    /// Add WHERE: field > ? (bound)
    pub fn gt(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.condition(field, ">", Arg::Bound(value.into()))
    }

    /// Add WHERE: field >= ? (bound)
    pub fn gte(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.condition(field, ">=", Arg::Bound(value.into()))
    }

    /// Add WHERE: field < ? (bound)
    pub fn lt(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.condition(field, "<", Arg::Bound(value.into()))
    }

    /// Add WHERE: field <= ? (bound)
    pub fn lte(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.condition(field, "<=", Arg::Bound(value.into()))
    }

    /// Add WHERE: field LIKE ? (bound)
    pub fn like(&mut self, field: &str, pattern: impl Into<Value>) -> &mut Self {
        self.condition(field, "LIKE", Arg::Bound(pattern.into()))
    }

    // ==================== Ordering & Grouping ====================

    /// Append ORDER BY field ASC.
    pub fn order_by(&mut self, field: &str) -> &mut Self {
        self.order_clauses.push(format!("{field} ASC"));
        self
    }

    /// Append ORDER BY field DESC.
    pub fn order_by_desc(&mut self, field: &str) -> &mut Self {
        self.order_clauses.push(format!("{field} DESC"));
        self
    }

    /// Append a GROUP BY field.
    pub fn group_by(&mut self, field: &str) -> &mut Self {
        self.group_clauses.push(field.to_string());
        self
    }

    // ==================== Compilation ====================

    /// Render the accumulated statement.
    ///
    /// Every clause section is omitted entirely when empty; there are no
    /// dangling keywords.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {}", self.compile_fields());

        if let Some(source) = &self.source {
            sql.push_str(" FROM ");
            match source {
                Source::Table { name, alias } => {
                    sql.push_str(name);
                    sql.push(' ');
                    sql.push_str(alias);
                }
                Source::Subquery { query, alias } => {
                    sql.push('(');
                    sql.push_str(&query.to_sql());
                    sql.push_str(") ");
                    sql.push_str(alias);
                }
            }
        }

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.kind.as_str());
            sql.push(' ');
            sql.push_str(&join.table);
            sql.push(' ');
            sql.push_str(&join.alias);
            sql.push_str(" ON (");
            sql.push_str(&join.on);
            sql.push(')');
        }

        if !self.root.is_empty() {
            sql.push_str(" WHERE");
            sql.push_str(&self.root.render());
        }

        if !self.group_clauses.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_clauses.join(", "));
        }

        if !self.order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clauses.join(", "));
        }

        sql
    }

    fn compile_fields(&self) -> String {
        if self.projections.is_empty() {
            return "*".to_string();
        }
        let mut rendered = Vec::new();
        for (key, columns) in &self.projections {
            for column in columns {
                match key {
                    ProjectionKey::Alias(alias) => rendered.push(format!("{alias}.{column}")),
                    ProjectionKey::Expression => rendered.push(column.clone()),
                }
            }
        }
        rendered.join(", ")
    }

    /// The flat ordered argument list matching [`QueryBuilder::to_sql`]:
    /// subquery-source arguments first, then the root condition's
    /// depth-first collection.
    pub fn arguments(&self) -> Vec<Value> {
        let mut args = self.source_args.clone();
        args.extend(self.root.arguments());
        args
    }

    /// The same SQL with line breaks before FROM, INNER JOIN, WHERE and
    /// every AND. Cosmetic only; argument order is unchanged.
    pub fn to_pretty_sql(&self) -> String {
        self.to_sql()
            .replace("FROM", "\nFROM")
            .replace("INNER JOIN", "\n  INNER JOIN")
            .replace("WHERE", "\nWHERE")
            .replace("AND", "\n  AND")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn empty_builder_selects_star() {
        let mut qb = QueryBuilder::new();
        qb.from("t");
        assert_eq!(qb.to_sql(), "SELECT * FROM t t");
        assert!(qb.arguments().is_empty());
    }

    #[test]
    fn from_with_explicit_alias() {
        let mut qb = QueryBuilder::new();
        qb.from_as("node", "n");
        assert_eq!(qb.to_sql(), "SELECT * FROM node n");
    }

    #[test]
    fn fields_merge_for_same_alias() {
        let mut qb = QueryBuilder::new();
        qb.from_as("t", "a").fields("a", &["x"]).fields("a", &["y"]);
        assert_eq!(qb.to_sql(), "SELECT a.x, a.y FROM t a");
    }

    #[test]
    fn fields_keep_alias_insertion_order() {
        let mut qb = QueryBuilder::new();
        qb.from_as("t", "a")
            .fields("a", &["x"])
            .fields("b", &["z"])
            .fields("a", &["y"]);
        assert_eq!(qb.to_sql(), "SELECT a.x, a.y, b.z FROM t a");
    }

    #[test]
    fn expression_is_emitted_unqualified() {
        let mut qb = QueryBuilder::new();
        qb.from_as("node", "n")
            .fields("n", &["nid"])
            .expression("COUNT(c.cid)", "comment_count");
        assert_eq!(
            qb.to_sql(),
            "SELECT n.nid, COUNT(c.cid) AS comment_count FROM node n"
        );
    }

    #[test]
    fn join_synthesizes_aliases_with_numeric_suffix() {
        let mut qb = QueryBuilder::new();
        qb.from("node");
        qb.join("t", "a").unwrap();
        qb.join("t", "b").unwrap();
        qb.join("t", "c").unwrap();
        assert_eq!(
            qb.to_sql(),
            "SELECT * FROM node node \
             INNER JOIN t t ON (a) \
             INNER JOIN t t_1 ON (b) \
             INNER JOIN t t_2 ON (c)"
        );
    }

    #[test]
    fn duplicate_explicit_alias_is_an_error_and_leaves_joins_unmodified() {
        let mut qb = QueryBuilder::new();
        qb.from("node");
        qb.join_as("users", "u", "node.uid = u.uid").unwrap();
        let before = qb.to_sql();

        let err = qb.join_as("profile", "u", "node.uid = u.uid").unwrap_err();
        assert!(err.is_duplicate_alias());
        assert_eq!(qb.to_sql(), before);
    }

    #[test]
    fn left_and_right_joins_render_their_kind() {
        let mut qb = QueryBuilder::new();
        qb.from("node");
        qb.left_join_as("users", "u", "node.uid = u.uid").unwrap();
        qb.right_join_as("comment", "c", "node.nid = c.nid").unwrap();
        assert_eq!(
            qb.to_sql(),
            "SELECT * FROM node node \
             LEFT JOIN users u ON (node.uid = u.uid) \
             RIGHT JOIN comment c ON (node.nid = c.nid)"
        );
    }

    #[test]
    fn where_clause_wraps_the_root_group() {
        let mut qb = QueryBuilder::new();
        qb.from("node").eq("status", 1i64);
        assert_eq!(qb.to_sql(), "SELECT * FROM node node WHERE ( status = ? )");
        assert_eq!(qb.arguments(), vec![Value::Int(1)]);
    }

    #[test]
    fn where_clause_is_omitted_when_root_is_empty() {
        let mut qb = QueryBuilder::new();
        qb.from("node").order_by("created");
        assert_eq!(qb.to_sql(), "SELECT * FROM node node ORDER BY created ASC");
    }

    #[test]
    fn condition_group_nests_under_the_root() {
        let mut qb = QueryBuilder::new();
        qb.from("node").eq("status", 1i64);
        let group = qb.condition_group(Conjunction::Or);
        group.eq("type", "page");
        group.eq("type", "story");

        assert_eq!(
            qb.to_sql(),
            "SELECT * FROM node node WHERE ( status = ? AND  ( type = ? OR type = ? ) )"
        );
        assert_eq!(
            qb.arguments(),
            vec![
                Value::Int(1),
                Value::Text("page".into()),
                Value::Text("story".into()),
            ]
        );
    }

    #[test]
    fn group_and_order_clauses_render_in_call_order() {
        let mut qb = QueryBuilder::new();
        qb.from("node")
            .group_by("type")
            .group_by("status")
            .order_by("created")
            .order_by_desc("nid");
        assert_eq!(
            qb.to_sql(),
            "SELECT * FROM node node GROUP BY type, status ORDER BY created ASC, nid DESC"
        );
    }

    #[test]
    fn subquery_source_renders_inner_sql_under_alias() {
        let mut inner = QueryBuilder::new();
        inner.from("users").eq("status", "active");

        let mut outer = QueryBuilder::new();
        outer.from_subquery(inner, "sub");
        assert_eq!(
            outer.to_sql(),
            "SELECT * FROM (SELECT * FROM users users WHERE ( status = ? )) sub"
        );
    }

    #[test]
    fn subquery_arguments_come_before_outer_arguments() {
        let mut inner = QueryBuilder::new();
        inner.from("users").eq("status", "active").gt("age", 18i64);

        let mut outer = QueryBuilder::new();
        outer.from_subquery(inner, "sub").eq("sub.name", "kamal");

        assert_eq!(
            outer.arguments(),
            vec![
                Value::Text("active".into()),
                Value::Int(18),
                Value::Text("kamal".into()),
            ]
        );
    }

    #[test]
    fn compilation_is_idempotent() {
        let mut qb = QueryBuilder::new();
        qb.from("node").eq("status", 1i64).order_by("created");
        qb.join_as("users", "u", "node.uid = u.uid").unwrap();

        assert_eq!(qb.to_sql(), qb.to_sql());
        assert_eq!(qb.arguments(), qb.arguments());
    }

    #[test]
    fn pretty_sql_breaks_before_major_keywords() {
        let mut qb = QueryBuilder::new();
        qb.from("node").eq("status", 1i64).eq("type", "page");
        qb.join_as("users", "u", "node.uid = u.uid").unwrap();

        let pretty = qb.to_pretty_sql();
        assert!(pretty.contains("\nFROM"));
        assert!(pretty.contains("\n  INNER JOIN"));
        assert!(pretty.contains("\nWHERE"));
        assert!(pretty.contains("\n  AND"));
        // Cosmetic only: stripping the formatting restores the plain SQL.
        assert_eq!(pretty.replace("\n  ", "").replace('\n', ""), qb.to_sql());
    }
}
