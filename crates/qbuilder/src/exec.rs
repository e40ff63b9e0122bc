//! Execution adapter: hands a compiled statement to a client.
//!
//! The builder renders `?` placeholders; Postgres wants numbered `$n`
//! parameters. [`QueryBuilder::to_numbered_sql`] converts positionally,
//! left-to-right, so the numbering lines up with [`QueryBuilder::arguments`]
//! — including across a subquery source, whose placeholders appear (and are
//! numbered) before the outer WHERE clause's.

use crate::builder::QueryBuilder;
use crate::client::GenericClient;
use crate::error::QbResult;
use crate::row::FromRow;
use crate::value::Value;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Replace each `?` with `$1`, `$2`, ... in order of appearance.
///
/// Question marks inside single-quoted string literals (including the
/// doubled-quote escape form) are left untouched.
fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut index = 0usize;
    let mut in_literal = false;
    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                out.push(ch);
            }
            '?' if !in_literal => {
                index += 1;
                out.push('$');
                out.push_str(&index.to_string());
            }
            _ => out.push(ch),
        }
    }
    out
}

impl QueryBuilder {
    /// The compiled SQL with `?` placeholders numbered to `$n` form.
    pub fn to_numbered_sql(&self) -> String {
        number_placeholders(&self.to_sql())
    }

    fn compile(&self) -> (String, Vec<Value>) {
        let sql = self.to_numbered_sql();
        let args = self.arguments();
        tracing::debug!(target: "qbuilder.sql", %sql, params = args.len());
        (sql, args)
    }

    /// Execute and return all matching rows (empty vec on no matches).
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> QbResult<Vec<Row>> {
        let (sql, args) = self.compile();
        let params: Vec<&(dyn ToSql + Sync)> =
            args.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        conn.query(&sql, &params).await
    }

    /// Execute and return the first row, erroring when there is none.
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> QbResult<Row> {
        let (sql, args) = self.compile();
        let params: Vec<&(dyn ToSql + Sync)> =
            args.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        conn.query_one(&sql, &params).await
    }

    /// Execute and return the first row, if any.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> QbResult<Option<Row>> {
        let (sql, args) = self.compile();
        let params: Vec<&(dyn ToSql + Sync)> =
            args.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        conn.query_opt(&sql, &params).await
    }

    /// Execute and map all rows to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> QbResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute and map the first row to `T`, erroring when there is none.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> QbResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute and map the first row to `T`, if any.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> QbResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_placeholders_left_to_right() {
        assert_eq!(
            number_placeholders("a = ? AND b = ? AND c = ?"),
            "a = $1 AND b = $2 AND c = $3"
        );
    }

    #[test]
    fn leaves_sql_without_placeholders_alone() {
        assert_eq!(number_placeholders("SELECT * FROM t t"), "SELECT * FROM t t");
    }

    #[test]
    fn skips_question_marks_inside_string_literals() {
        assert_eq!(
            number_placeholders("a = 'what?' AND b = ?"),
            "a = 'what?' AND b = $1"
        );
    }

    #[test]
    fn handles_doubled_quote_escapes() {
        assert_eq!(
            number_placeholders("a = 'it''s?' AND b = ?"),
            "a = 'it''s?' AND b = $1"
        );
    }

    #[test]
    fn builder_numbering_spans_subquery_then_outer() {
        let mut inner = QueryBuilder::new();
        inner.from("users").eq("status", "active");

        let mut outer = QueryBuilder::new();
        outer.from_subquery(inner, "sub").eq("sub.name", "kamal");

        assert_eq!(
            outer.to_numbered_sql(),
            "SELECT * FROM (SELECT * FROM users users WHERE ( status = $1 )) sub \
             WHERE ( sub.name = $2 )"
        );
        assert_eq!(outer.arguments().len(), 2);
    }
}
