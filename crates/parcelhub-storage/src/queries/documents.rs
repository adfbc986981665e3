// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document CRUD over the `documents` table.
//!
//! Filters compile to `json_extract` predicates with the same meaning as
//! [`Filter::matches`]: a missing field reads as `NULL`, JSON types are
//! compared strictly (`7` never equals `"7"`, `true` never equals `1`), and
//! case-insensitive matching folds ASCII only, like SQLite's `lower()`.

use parcelhub_core::document::{self, Condition};
use parcelhub_core::{
    Collection, Document, Filter, ID_FIELD, ParcelError, Sort, SortDirection, UpdateResult,
};
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::database::{Database, map_tr_err};

/// A compiled `WHERE` clause plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompiledFilter {
    pub clause: String,
    pub params: Vec<SqlValue>,
}

/// JSON path literal for a validated field name.
fn path(field: &str) -> String {
    format!("'$.{field}'")
}

fn extract(field: &str) -> String {
    format!("json_extract(body, {})", path(field))
}

fn json_type(field: &str) -> String {
    format!("json_type(body, {})", path(field))
}

/// Equality predicate for one value, appending its parameter.
fn equality(field: &str, value: &Value, params: &mut Vec<SqlValue>) -> String {
    if field == ID_FIELD {
        if let Value::String(id) = value {
            params.push(SqlValue::Text(id.clone()));
            return "id = ?".to_string();
        }
    }
    match value {
        Value::Null => format!("{} IS NULL", extract(field)),
        Value::Bool(b) => format!(
            "{} = '{}'",
            json_type(field),
            if *b { "true" } else { "false" }
        ),
        Value::Number(n) => {
            params.push(match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
            });
            format!(
                "({} IN ('integer', 'real') AND {} = ?)",
                json_type(field),
                extract(field)
            )
        }
        Value::String(s) => {
            params.push(SqlValue::Text(s.clone()));
            format!("({} = 'text' AND {} = ?)", json_type(field), extract(field))
        }
        Value::Array(_) | Value::Object(_) => {
            params.push(SqlValue::Text(value.to_string()));
            format!(
                "({} IN ('array', 'object') AND {} = json(?))",
                json_type(field),
                extract(field)
            )
        }
    }
}

/// Compiles a filter scoped to one collection.
pub(crate) fn compile_filter(
    collection: Collection,
    filter: &Filter,
) -> Result<CompiledFilter, ParcelError> {
    filter.validate()?;

    let mut params = vec![SqlValue::Text(collection.as_ref().to_string())];
    let mut parts = vec!["collection = ?".to_string()];

    for condition in filter.conditions() {
        let part = match condition {
            Condition::Eq { field, value } => equality(field, value, &mut params),
            Condition::EqIgnoreCase { field, value } => {
                params.push(SqlValue::Text(value.clone()));
                format!(
                    "({} = 'text' AND lower({}) = lower(?))",
                    json_type(field),
                    extract(field)
                )
            }
            Condition::OneOf { values, .. } if values.is_empty() => "0".to_string(),
            Condition::OneOf { field, values } => {
                let alternatives: Vec<String> = values
                    .iter()
                    .map(|value| equality(field, value, &mut params))
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
        };
        parts.push(part);
    }

    Ok(CompiledFilter {
        clause: parts.join(" AND "),
        params,
    })
}

/// `ORDER BY` clause. Containers sort after scalars, ties keep insertion order.
pub(crate) fn order_by(sort: Option<&Sort>) -> Result<String, ParcelError> {
    let Some(sort) = sort else {
        return Ok("seq ASC".to_string());
    };
    if !document::is_valid_field(&sort.field) {
        return Err(ParcelError::InvalidArgument(format!(
            "invalid sort field `{}`",
            sort.field
        )));
    }
    let dir = match sort.direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    };
    Ok(format!(
        "CASE WHEN {ty} IN ('array', 'object') THEN 1 ELSE 0 END {dir}, {ex} {dir}, seq ASC",
        ty = json_type(&sort.field),
        ex = extract(&sort.field),
    ))
}

fn decode(body: &str) -> Result<Document, rusqlite::Error> {
    serde_json::from_str(body).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn encode(doc: &Document) -> Result<String, rusqlite::Error> {
    serde_json::to_string(doc).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Returns matching documents in the requested order.
pub async fn find(
    db: &Database,
    collection: Collection,
    filter: &Filter,
    sort: Option<&Sort>,
) -> Result<Vec<Document>, ParcelError> {
    let compiled = compile_filter(collection, filter)?;
    let sql = format!(
        "SELECT body FROM documents WHERE {} ORDER BY {}",
        compiled.clause,
        order_by(sort)?
    );
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(compiled.params.iter()), |row| {
                row.get::<_, String>(0)
            })?;
            let mut docs = Vec::new();
            for body in rows {
                docs.push(decode(&body?)?);
            }
            Ok(docs)
        })
        .await
        .map_err(map_tr_err)
}

/// Inserts a document, generating `_id` when absent.
///
/// Returns `Conflict` when the identity is already taken in the collection.
pub async fn insert_one(
    db: &Database,
    collection: Collection,
    mut doc: Document,
) -> Result<String, ParcelError> {
    let id = match doc.get(ID_FIELD) {
        None | Some(Value::Null) => {
            let id = parcelhub_core::types::new_id();
            doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            id
        }
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(_) => {
            return Err(ParcelError::InvalidArgument(
                "document identity must be a non-empty string".to_string(),
            ));
        }
    };
    let body = serde_json::to_string(&doc)?;
    let name = collection.as_ref().to_string();
    let row_id = id.clone();

    let inserted = db
        .connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
                rusqlite::params![name, row_id, body],
            );
            match result {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    if inserted {
        Ok(id)
    } else {
        Err(ParcelError::Conflict(format!(
            "{collection} document `{id}` already exists"
        )))
    }
}

/// Applies `set` to the first matching document inside one transaction.
pub async fn update_one(
    db: &Database,
    collection: Collection,
    filter: &Filter,
    set: Document,
) -> Result<UpdateResult, ParcelError> {
    document::validate_set(&set)?;
    let compiled = compile_filter(collection, filter)?;
    let select = format!(
        "SELECT seq, body FROM documents WHERE {} ORDER BY seq ASC LIMIT 1",
        compiled.clause
    );

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let found = {
                let mut stmt = tx.prepare(&select)?;
                let mut rows = stmt.query(params_from_iter(compiled.params.iter()))?;
                match rows.next()? {
                    Some(row) => Some((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
                    None => None,
                }
            };

            let Some((seq, body)) = found else {
                tx.commit()?;
                return Ok(UpdateResult::default());
            };

            let mut doc = decode(&body)?;
            let modified = if document::apply_set(&mut doc, &set) {
                tx.execute(
                    "UPDATE documents SET body = ?1 WHERE seq = ?2",
                    rusqlite::params![encode(&doc)?, seq],
                )?;
                1
            } else {
                0
            };
            tx.commit()?;
            Ok(UpdateResult {
                matched: 1,
                modified,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Deletes the first matching document; returns 0 or 1.
pub async fn delete_one(
    db: &Database,
    collection: Collection,
    filter: &Filter,
) -> Result<u64, ParcelError> {
    let compiled = compile_filter(collection, filter)?;
    let sql = format!(
        "DELETE FROM documents WHERE seq = \
         (SELECT seq FROM documents WHERE {} ORDER BY seq ASC LIMIT 1)",
        compiled.clause
    );
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(&sql, params_from_iter(compiled.params.iter()))?;
            Ok(deleted as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Counts documents in a collection; used by health reporting.
pub async fn count(db: &Database, collection: Collection) -> Result<u64, ParcelError> {
    let name = collection.as_ref().to_string();
    db.connection()
        .call(move |conn| {
            let n: i64 = conn.query_row(
                "SELECT count(*) FROM documents WHERE collection = ?1",
                [name],
                |row| row.get(0),
            )?;
            Ok(n as u64)
        })
        .await
        .map_err(map_tr_err)
}
