//! SQLite-backed document store.
//!
//! # Responsibility
//! - Map keyed collections onto the single `documents` table.
//! - Translate `Filter`/`Update` values into bound JSON1 expressions.
//!
//! # Invariants
//! - Field paths are validated before they reach SQL and are always bound as
//!   parameters, never interpolated.
//! - Every update is a single `UPDATE` statement, so increments never lose
//!   writes against the same document.

use super::{
    json_path, Collection, Document, DocumentStore, Filter, StoreError, StoreResult, Update,
    ID_FIELD,
};
use crate::db::migrations::latest_version;
use crate::model::id::DocumentId;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use serde_json::Value;

/// Document store over a migrated SQLite connection.
#[derive(Clone, Copy, Debug)]
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn insert(&self, collection: Collection, doc: &Document) -> StoreResult<DocumentId> {
        let id = DocumentId::generate();
        let mut body = doc.clone();
        body.remove(ID_FIELD);
        let body = serde_json::to_string(&body)?;

        self.conn
            .execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3);",
                params![collection.as_str(), id.as_str(), body],
            )
            .map_err(|err| map_write_error(collection, err))?;

        Ok(id)
    }

    fn find_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> StoreResult<Option<Document>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2;",
                params![collection.as_str(), id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|body| parse_document(id.as_str(), &body))
            .transpose()
    }

    fn find(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>> {
        let (clause, binds) = where_clause(collection, filter)?;
        let sql = format!("SELECT id, body FROM documents WHERE {clause} ORDER BY rowid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut docs = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let body: String = row.get(1)?;
            docs.push(parse_document(&id, &body)?);
        }

        Ok(docs)
    }

    fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<usize> {
        let (clause, binds) = where_clause(collection, filter)?;
        let sql = format!("SELECT COUNT(*) FROM documents WHERE {clause};");
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count `{count}`")))
    }

    fn update_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
        delta: &Update,
    ) -> StoreResult<bool> {
        if delta.is_empty() {
            return Ok(self.find_by_id(collection, id)?.is_some());
        }

        let mut expr = String::from("body");
        let mut binds: Vec<SqlValue> = Vec::new();

        for (field, value) in delta.assignments() {
            if field == ID_FIELD {
                return Err(StoreError::InvalidQuery(
                    "document key cannot be reassigned".to_string(),
                ));
            }
            expr = format!("json_set({expr}, ?, json(?))");
            binds.push(SqlValue::Text(json_path(field)?));
            binds.push(SqlValue::Text(serde_json::to_string(value)?));
        }

        for (field, step) in delta.increments() {
            if field == ID_FIELD {
                return Err(StoreError::InvalidQuery(
                    "document key cannot be incremented".to_string(),
                ));
            }
            let path = json_path(field)?;
            expr = format!("json_set({expr}, ?, COALESCE(json_extract(body, ?), 0) + ?)");
            binds.push(SqlValue::Text(path.clone()));
            binds.push(SqlValue::Text(path));
            binds.push(SqlValue::Integer(*step));
        }

        binds.push(SqlValue::Text(collection.as_str().to_string()));
        binds.push(SqlValue::Text(id.as_str().to_string()));

        let sql = format!("UPDATE documents SET body = {expr} WHERE collection = ? AND id = ?;");
        let changed = self
            .conn
            .execute(&sql, params_from_iter(binds))
            .map_err(|err| map_write_error(collection, err))?;

        Ok(changed > 0)
    }

    fn delete_by_id(&self, collection: Collection, id: &DocumentId) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection.as_str(), id.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn delete_many(&self, collection: Collection, filter: &Filter) -> StoreResult<usize> {
        let (clause, binds) = where_clause(collection, filter)?;
        let sql = format!("DELETE FROM documents WHERE {clause};");
        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        Ok(changed)
    }
}

fn where_clause(collection: Collection, filter: &Filter) -> StoreResult<(String, Vec<SqlValue>)> {
    let mut clause = String::from("collection = ?");
    let mut binds = vec![SqlValue::Text(collection.as_str().to_string())];

    for (field, value) in filter.conditions() {
        let bound = to_sql_value(field, value)?;
        if field == ID_FIELD {
            clause.push_str(" AND id = ?");
        } else {
            clause.push_str(" AND json_extract(body, ?) = ?");
            binds.push(SqlValue::Text(json_path(field)?));
        }
        binds.push(bound);
    }

    Ok((clause, binds))
}

fn to_sql_value(field: &str, value: &Value) -> StoreResult<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        // json_extract yields 0/1 for JSON booleans.
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(SqlValue::Integer(int))
            } else if let Some(real) = number.as_f64() {
                Ok(SqlValue::Real(real))
            } else {
                Err(StoreError::InvalidQuery(format!(
                    "unsupported number `{number}` for field `{field}`"
                )))
            }
        }
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Array(_) | Value::Object(_) => Err(StoreError::InvalidQuery(format!(
            "field `{field}` can only be compared against scalar values"
        ))),
    }
}

fn parse_document(id: &str, body: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(mut map) => {
            map.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
            Ok(map)
        }
        _ => Err(StoreError::InvalidData(format!(
            "document `{id}` body is not a JSON object"
        ))),
    }
}

fn map_write_error(collection: Collection, err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict {
                collection,
                message: message.unwrap_or_else(|| failure.to_string()),
            }
        }
        other => other.into(),
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'documents'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(StoreError::MissingRequiredTable("documents"));
    }

    Ok(())
}
