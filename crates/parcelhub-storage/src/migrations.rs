// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations.
//!
//! SQL files under `migrations/` are compiled into the binary. The applied
//! version is tracked in `PRAGMA user_version`; migrations run on open.

use tracing::info;

/// Ordered migrations. Version N is `MIGRATIONS[N - 1]`.
const MIGRATIONS: &[(&str, &str)] = &[
    ("V1__documents", include_str!("../migrations/V1__documents.sql")),
    (
        "V2__lookup_indexes",
        include_str!("../migrations/V2__lookup_indexes.sql"),
    ),
];

/// Latest schema version known to this build.
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

/// Run all pending migrations against the given connection.
///
/// Each migration and its version bump commit together.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (index, (name, sql)) in MIGRATIONS.iter().enumerate() {
        let version = index as i64 + 1;
        if version <= current {
            continue;
        }
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!(migration = *name, version, "applied schema migration");
    }

    Ok(())
}
