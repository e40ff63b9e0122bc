//! # qbuilder
//!
//! A small fluent SELECT builder for Postgres.
//!
//! ## Features
//!
//! - **Accumulate, then render**: builders collect sources, joins, fields,
//!   conditions, grouping and ordering; compilation is lazy and repeatable
//! - **Nested conditions**: AND/OR groups nest to arbitrary depth, with the
//!   argument list collected in placeholder order
//! - **Explicit formatting choice**: each predicate value is either a bound
//!   parameter or an inlined (escaped) literal, tagged at the call site
//! - **Derived tables**: a builder can be another builder's FROM source;
//!   subquery arguments keep their position ahead of the outer clause's
//! - **Thin execution layer**: `fetch_*` methods hand the compiled statement
//!   to any `GenericClient` (clients, transactions, pooled clients)
//!
//! ## Usage
//!
//! ```ignore
//! use qbuilder::Conjunction;
//!
//! let mut qb = qbuilder::select("node");
//! qb.fields("node", &["nid", "title"])
//!     .eq("node.status", 1i64)
//!     .order_by_desc("node.created");
//! qb.join_as("users", "u", "node.uid = u.uid")?;
//!
//! let group = qb.condition_group(Conjunction::Or);
//! group.eq("node.type", "page");
//! group.eq("node.type", "story");
//!
//! let rows = qb.fetch_all(&client).await?;
//! ```

pub mod builder;
pub mod client;
pub mod condition;
pub mod error;
pub mod row;
pub mod value;

mod exec;

pub use builder::{JoinKind, QueryBuilder};
pub use client::GenericClient;
pub use condition::{ConditionNode, Conjunction};
pub use error::{QbError, QbResult};
pub use row::{FromRow, RowExt};
pub use value::{Arg, Value, escape_text};

/// Create a builder over the given table, aliased by its own name.
///
/// # Example
/// ```ignore
/// let mut qb = qbuilder::select("users");
/// qb.eq("status", "active");
/// ```
pub fn select(table: &str) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.from(table);
    qb
}

/// Create a builder over the given table with an explicit alias.
///
/// # Example
/// ```ignore
/// let mut qb = qbuilder::select_as("users", "u");
/// qb.fields("u", &["uid", "name"]);
/// ```
pub fn select_as(table: &str, alias: &str) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.from_as(table, alias);
    qb
}
