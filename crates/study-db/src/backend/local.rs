//! Embedded libSQL backend.
//!
//! Lowers [`Query`] into parameterized SQL against the local schema:
//!
//! - predicates become `"table"."column" <op> ?` conditions,
//! - inner embeds become `EXISTS (...)` (children) or `fk IN (SELECT id ...)`
//!   (parent) conditions on the outer query,
//! - embedded rows are loaded with one follow-up `IN (...)` select per embed
//!   and grouped onto their outer rows client-side,
//! - writes use `RETURNING *`, and bulk inserts run in one transaction.
//!
//! Every statement runs on one connection behind an async mutex. A bulk
//! insert holds it for the whole transaction, so concurrent callers never
//! see each other inside a transaction and a rollback only undoes its own rows.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use libsql::Builder;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use super::{BackendError, QueryBackend};
use crate::error::DatabaseError;
use crate::query::{Embedding, Join, Op, Order, Predicate, Query, Relation, Row};

/// libSQL database plus the single connection all queries run on.
pub struct LocalBackend {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: Mutex<libsql::Connection>,
}

impl LocalBackend {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Migration(format!("open '{path}': {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Migration(format!("connect '{path}': {e}")))?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let backend = Self {
            db,
            conn: Mutex::new(conn),
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Lock the underlying libSQL connection for direct queries.
    ///
    /// Backend calls wait while the guard is held; drop it before calling
    /// back into the backend.
    pub async fn conn(&self) -> MutexGuard<'_, libsql::Connection> {
        self.conn.lock().await
    }

    async fn fetch(&self, sql: &str, params: Vec<libsql::Value>) -> Result<Vec<Row>, BackendError> {
        let conn = self.conn.lock().await;
        let rows = conn.query(sql, libsql::params_from_iter(params)).await?;
        collect_rows(rows).await
    }

    /// Load each embed onto `rows`, one follow-up select per embed.
    async fn populate(&self, rows: &mut [Row], embeds: &[Embedding]) -> Result<(), BackendError> {
        for embed in embeds {
            match embed.relation {
                Relation::Children { foreign_key } => {
                    self.embed_children(rows, embed, foreign_key).await?;
                }
                Relation::Parent { foreign_key } => {
                    self.embed_parent(rows, embed, foreign_key).await?;
                }
            }
        }
        Ok(())
    }

    async fn embed_children(
        &self,
        rows: &mut [Row],
        embed: &Embedding,
        foreign_key: &'static str,
    ) -> Result<(), BackendError> {
        let ids = distinct_values(rows.iter().filter_map(|row| row.get("id")));
        let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();

        if !ids.is_empty() {
            let mut predicates = embed.predicates.clone();
            predicates.push(Predicate {
                column: foreign_key,
                op: Op::In,
                value: Value::Array(ids),
            });
            let query = Query {
                table: embed.table,
                predicates,
                embeds: embed.embeds.clone(),
                order: embed.order.clone(),
                limit: None,
            };
            for child in self.select(&query).await? {
                let key = child.get(foreign_key).map(value_key).unwrap_or_default();
                grouped.entry(key).or_default().push(Value::Object(child));
            }
        }

        for row in rows.iter_mut() {
            let children = row
                .get("id")
                .and_then(|id| grouped.remove(&value_key(id)))
                .unwrap_or_default();
            row.insert(embed.table.to_string(), Value::Array(children));
        }
        Ok(())
    }

    async fn embed_parent(
        &self,
        rows: &mut [Row],
        embed: &Embedding,
        foreign_key: &'static str,
    ) -> Result<(), BackendError> {
        let ids = distinct_values(
            rows.iter()
                .filter_map(|row| row.get(foreign_key))
                .filter(|v| !v.is_null()),
        );
        let mut parents: HashMap<String, Value> = HashMap::new();

        if !ids.is_empty() {
            let mut predicates = embed.predicates.clone();
            predicates.push(Predicate {
                column: "id",
                op: Op::In,
                value: Value::Array(ids),
            });
            let query = Query {
                table: embed.table,
                predicates,
                embeds: embed.embeds.clone(),
                order: Vec::new(),
                limit: None,
            };
            for parent in self.select(&query).await? {
                let key = parent.get("id").map(value_key).unwrap_or_default();
                parents.insert(key, Value::Object(parent));
            }
        }

        for row in rows.iter_mut() {
            let parent = row
                .get(foreign_key)
                .and_then(|fk| parents.get(&value_key(fk)))
                .cloned()
                .unwrap_or(Value::Null);
            row.insert(embed.table.to_string(), parent);
        }
        Ok(())
    }
}

#[async_trait]
impl QueryBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn select(&self, query: &Query) -> Result<Vec<Row>, BackendError> {
        let mut sql = SqlBuilder::default();
        let table = ident(query.table)?;
        let conditions = sql.conditions(query.table, &query.predicates, &query.embeds)?;
        let mut text = format!("SELECT {table}.* FROM {table}{}", where_clause(&conditions));
        text.push_str(&order_clause(query.table, &query.order)?);
        if let Some(limit) = query.limit {
            text.push_str(&format!(" LIMIT {limit}"));
        }

        tracing::debug!(backend = "local", table = query.table, sql = %text, "select");
        let mut rows = self.fetch(&text, sql.params).await?;
        self.populate(&mut rows, &query.embeds).await?;
        Ok(rows)
    }

    async fn count(&self, query: &Query) -> Result<u64, BackendError> {
        let mut sql = SqlBuilder::default();
        let table = ident(query.table)?;
        let conditions = sql.conditions(query.table, &query.predicates, &query.embeds)?;
        let text = format!("SELECT COUNT(*) FROM {table}{}", where_clause(&conditions));

        tracing::debug!(backend = "local", table = query.table, sql = %text, "count");
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(&text, libsql::params_from_iter(sql.params))
            .await?;
        let row = rows.next().await?.ok_or(BackendError::NoRows)?;
        let count = row.get::<i64>(0)?;
        u64::try_from(count).map_err(|e| BackendError::Decode(format!("negative count: {e}")))
    }

    async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<Vec<Row>, BackendError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(backend = "local", table, rows = rows.len(), "insert");

        let conn = self.conn.lock().await;
        let tx = conn.transaction().await?;
        let result = insert_all(&tx, table, rows).await;
        match result {
            Ok(inserted) => {
                tx.commit().await?;
                Ok(inserted)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(table, %rollback, "rollback after failed insert failed");
                }
                Err(e)
            }
        }
    }

    async fn update(
        &self,
        table: &'static str,
        predicates: &[Predicate],
        values: Row,
    ) -> Result<Vec<Row>, BackendError> {
        if values.is_empty() {
            return Err(BackendError::InvalidQuery(format!(
                "update of '{table}' has no columns to set"
            )));
        }
        let mut sql = SqlBuilder::default();
        let quoted = ident(table)?;
        let mut sets = Vec::with_capacity(values.len());
        for (column, value) in values {
            sets.push(format!("{} = ?", ident(&column)?));
            sql.params.push(json_to_sql(value));
        }
        let conditions = sql.conditions(table, predicates, &[])?;
        let text = format!(
            "UPDATE {quoted} SET {}{} RETURNING *",
            sets.join(", "),
            where_clause(&conditions)
        );

        tracing::debug!(backend = "local", table, sql = %text, "update");
        self.fetch(&text, sql.params).await
    }

    async fn delete(
        &self,
        table: &'static str,
        predicates: &[Predicate],
    ) -> Result<Vec<Row>, BackendError> {
        let mut sql = SqlBuilder::default();
        let quoted = ident(table)?;
        let conditions = sql.conditions(table, predicates, &[])?;
        let text = format!(
            "DELETE FROM {quoted}{} RETURNING *",
            where_clause(&conditions)
        );

        tracing::debug!(backend = "local", table, sql = %text, "delete");
        self.fetch(&text, sql.params).await
    }
}

async fn insert_all(
    tx: &libsql::Transaction,
    table: &'static str,
    rows: Vec<Row>,
) -> Result<Vec<Row>, BackendError> {
    let quoted = ident(table)?;
    let mut inserted = Vec::with_capacity(rows.len());
    for row in rows {
        let text = if row.is_empty() {
            format!("INSERT INTO {quoted} DEFAULT VALUES RETURNING *")
        } else {
            let columns = row
                .keys()
                .map(|c| ident(c))
                .collect::<Result<Vec<_>, _>>()?;
            let placeholders = vec!["?"; columns.len()].join(", ");
            format!(
                "INSERT INTO {quoted} ({}) VALUES ({placeholders}) RETURNING *",
                columns.join(", ")
            )
        };
        let params: Vec<libsql::Value> = row.into_iter().map(|(_, v)| json_to_sql(v)).collect();
        let result = tx.query(&text, libsql::params_from_iter(params)).await?;
        inserted.extend(collect_rows(result).await?);
    }
    Ok(inserted)
}

/// Accumulates positional parameters while SQL text is assembled left to right.
#[derive(Default)]
struct SqlBuilder {
    params: Vec<libsql::Value>,
}

impl SqlBuilder {
    /// Conditions for `table`: its predicates, then one per inner embed.
    fn conditions(
        &mut self,
        table: &str,
        predicates: &[Predicate],
        embeds: &[Embedding],
    ) -> Result<Vec<String>, BackendError> {
        let mut conditions = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            conditions.push(self.predicate(table, predicate)?);
        }
        for embed in embeds {
            if embed.join == Join::Inner {
                conditions.push(self.inner_embed(table, embed)?);
            }
        }
        Ok(conditions)
    }

    fn predicate(&mut self, table: &str, predicate: &Predicate) -> Result<String, BackendError> {
        let column = format!("{}.{}", ident(table)?, ident(predicate.column)?);
        let binary = |sql: &mut Self, op: &str| {
            sql.params.push(json_to_sql(predicate.value.clone()));
            format!("{column} {op} ?")
        };
        Ok(match predicate.op {
            Op::Eq => binary(self, "="),
            Op::Neq => binary(self, "!="),
            Op::Gt => binary(self, ">"),
            Op::Gte => binary(self, ">="),
            Op::Lt => binary(self, "<"),
            Op::Lte => binary(self, "<="),
            Op::IsNull => format!("{column} IS NULL"),
            Op::NotNull => format!("{column} IS NOT NULL"),
            Op::In => {
                let Value::Array(values) = &predicate.value else {
                    return Err(BackendError::InvalidQuery(format!(
                        "IN on '{}' expects an array",
                        predicate.column
                    )));
                };
                if values.is_empty() {
                    return Ok("0".to_string());
                }
                self.params.extend(values.iter().cloned().map(json_to_sql));
                format!("{column} IN ({})", vec!["?"; values.len()].join(", "))
            }
        })
    }

    fn inner_embed(&mut self, outer: &str, embed: &Embedding) -> Result<String, BackendError> {
        let outer_q = ident(outer)?;
        let table_q = ident(embed.table)?;
        match embed.relation {
            Relation::Children { foreign_key } => {
                let mut conditions = vec![format!(
                    "{table_q}.{} = {outer_q}.\"id\"",
                    ident(foreign_key)?
                )];
                conditions.extend(self.conditions(embed.table, &embed.predicates, &embed.embeds)?);
                Ok(format!(
                    "EXISTS (SELECT 1 FROM {table_q} WHERE {})",
                    conditions.join(" AND ")
                ))
            }
            Relation::Parent { foreign_key } => {
                let conditions = self.conditions(embed.table, &embed.predicates, &embed.embeds)?;
                Ok(format!(
                    "{outer_q}.{} IN (SELECT {table_q}.\"id\" FROM {table_q}{})",
                    ident(foreign_key)?,
                    where_clause(&conditions)
                ))
            }
        }
    }
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// `ORDER BY` for the given clauses, with `rowid` as the final tie-breaker so
/// rows written in the same millisecond keep insertion order.
fn order_clause(table: &str, order: &[Order]) -> Result<String, BackendError> {
    let table_q = ident(table)?;
    let mut terms = Vec::with_capacity(order.len() + 1);
    for clause in order {
        let direction = if clause.ascending { "ASC" } else { "DESC" };
        terms.push(format!("{table_q}.{} {direction}", ident(clause.column)?));
    }
    let tie = match order.first() {
        Some(first) if !first.ascending => "DESC",
        _ => "ASC",
    };
    terms.push(format!("{table_q}.rowid {tie}"));
    Ok(format!(" ORDER BY {}", terms.join(", ")))
}

/// Quote a table or column name, rejecting anything but `[A-Za-z_][A-Za-z0-9_]*`.
fn ident(name: &str) -> Result<String, BackendError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(format!("\"{name}\""))
    } else {
        Err(BackendError::InvalidQuery(format!("invalid identifier '{name}'")))
    }
}

fn json_to_sql(value: Value) -> libsql::Value {
    match value {
        Value::Null => libsql::Value::Null,
        Value::Bool(b) => libsql::Value::Integer(i64::from(b)),
        Value::Number(n) => n.as_i64().map_or_else(
            || libsql::Value::Real(n.as_f64().unwrap_or_default()),
            libsql::Value::Integer,
        ),
        Value::String(s) => libsql::Value::Text(s),
        other => libsql::Value::Text(other.to_string()),
    }
}

fn sql_to_json(value: libsql::Value) -> Value {
    match value {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(i) => Value::from(i),
        libsql::Value::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        libsql::Value::Text(s) => Value::String(s),
        libsql::Value::Blob(bytes) => Value::Array(bytes.into_iter().map(Value::from).collect()),
    }
}

async fn collect_rows(mut rows: libsql::Rows) -> Result<Vec<Row>, BackendError> {
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        let mut map = Row::new();
        for idx in 0..row.column_count() {
            let name = row
                .column_name(idx)
                .ok_or_else(|| BackendError::Decode(format!("unnamed column {idx}")))?
                .to_string();
            map.insert(name, sql_to_json(row.get_value(idx)?));
        }
        out.push(map);
    }
    Ok(out)
}

/// Grouping key for an id or foreign key value.
fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn distinct_values<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(value_key(v)))
        .cloned()
        .collect()
}
