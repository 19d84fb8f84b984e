use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::paths;

use super::{AccountKind, AuthInfo};

const TABLES: [&str; 5] = ["minecraft_users", "users", "auth", "accounts", "user"];
const TOKEN_COLUMNS: [&str; 4] = ["access_token", "accessToken", "token", "minecraft_token"];
const NAME_COLUMNS: [&str; 3] = ["username", "name", "player_name"];
const ID_COLUMNS: [&str; 3] = ["uuid", "id", "player_uuid"];

/// Read the signed-in account from Modrinth's `app.db`.
pub async fn read_app_db(data_dir: &Path) -> LauncherResult<Option<AuthInfo>> {
    let db_path = data_dir.join("app.db");
    if !paths::is_file(&db_path).await {
        return Err(LauncherError::Io {
            path: db_path,
            source: std::io::ErrorKind::NotFound.into(),
        });
    }

    tokio::task::spawn_blocking(move || read_app_db_blocking(db_path))
        .await
        .map_err(|err| LauncherError::Io {
            path: PathBuf::from("app.db"),
            source: std::io::Error::other(err),
        })?
}

fn read_app_db_blocking(db_path: PathBuf) -> LauncherResult<Option<AuthInfo>> {
    let conn = Connection::open_with_flags(
        &db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let existing = table_names(&conn)?;
    for table in TABLES {
        if !existing.iter().any(|t| t == table) {
            continue;
        }
        match read_table(&conn, table) {
            Ok(Some(info)) => {
                debug!("Using Modrinth account from table '{}'", table);
                return Ok(Some(info));
            }
            Ok(None) => {}
            Err(err) => debug!("Cannot read table '{}' (skipping): {}", table, err),
        }
    }
    Ok(None)
}

fn table_names(conn: &Connection) -> LauncherResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn column_names(conn: &Connection, table: &str) -> LauncherResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn pick<'a>(columns: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|c| columns.iter().find(|col| col.as_str() == *c))
        .map(String::as_str)
}

fn read_table(conn: &Connection, table: &str) -> LauncherResult<Option<AuthInfo>> {
    let columns = column_names(conn, table)?;
    let Some(token_col) = pick(&columns, &TOKEN_COLUMNS) else {
        debug!("Table '{}' has no token column (skipping)", table);
        return Ok(None);
    };
    let name_col = pick(&columns, &NAME_COLUMNS);
    let id_col = pick(&columns, &ID_COLUMNS);
    let order = if columns.iter().any(|c| c == "active") {
        " ORDER BY \"active\" DESC"
    } else {
        ""
    };

    let select = |col: Option<&str>| match col {
        Some(c) => format!("CAST(\"{}\" AS TEXT)", c),
        None => "NULL".to_string(),
    };
    let sql = format!(
        "SELECT {}, {}, {} FROM \"{}\"{}",
        select(Some(token_col)),
        select(name_col),
        select(id_col),
        table,
        order
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let token: Option<String> = row.get(0)?;
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        let info = AuthInfo {
            player_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            uuid: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            access_token: token,
            account_kind: AccountKind::Msa,
            xuid: None,
        };
        return Ok(Some(info.sanitized()));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(sql: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("app.db")).unwrap();
        conn.execute_batch(sql).unwrap();
        dir
    }

    #[tokio::test]
    async fn prefers_active_minecraft_user() {
        let dir = fixture(
            "CREATE TABLE minecraft_users (uuid TEXT, username TEXT, access_token TEXT, active INTEGER);
             INSERT INTO minecraft_users VALUES ('u1', 'Alex', 't1', 0);
             INSERT INTO minecraft_users VALUES ('u2', 'Steve', 't2', 1);",
        );

        let info = read_app_db(dir.path()).await.unwrap().unwrap();
        assert_eq!(info.player_name, "Steve");
        assert_eq!(info.uuid, "u2");
        assert_eq!(info.access_token, "t2");
        assert_eq!(info.account_kind, AccountKind::Msa);
    }

    #[tokio::test]
    async fn probes_alternate_tables_and_columns() {
        let dir = fixture(
            "CREATE TABLE settings (key TEXT, value TEXT);
             CREATE TABLE accounts (id TEXT, name TEXT, token TEXT);
             INSERT INTO accounts VALUES ('abc', 'Alex', '');
             INSERT INTO accounts VALUES ('def', 'Steve', 'tok');",
        );

        let info = read_app_db(dir.path()).await.unwrap().unwrap();
        assert_eq!(info.player_name, "Steve");
        assert_eq!(info.uuid, "def");
        assert_eq!(info.access_token, "tok");
    }

    #[tokio::test]
    async fn unreadable_table_falls_through_to_the_next() {
        let dir = fixture(
            "CREATE TABLE minecraft_users (uuid TEXT, username BLOB, access_token TEXT);
             INSERT INTO minecraft_users VALUES ('u1', X'FF', 't1');
             CREATE TABLE users (uuid TEXT, username TEXT, access_token TEXT);
             INSERT INTO users VALUES ('u2', 'Steve', 't2');",
        );

        let info = read_app_db(dir.path()).await.unwrap().unwrap();
        assert_eq!(info.player_name, "Steve");
        assert_eq!(info.access_token, "t2");
    }

    #[tokio::test]
    async fn store_without_accounts_yields_nothing() {
        let dir = fixture("CREATE TABLE settings (key TEXT, value TEXT);");
        assert!(read_app_db(dir.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_app_db(dir.path()).await.is_err());
    }
}
