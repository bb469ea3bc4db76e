use crate::Database;
use crate::models::{PERMISSION_MEMBER, PERMISSION_OWNER, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

/// Handles are capped at this many characters.
pub const MAX_HANDLE_LEN: usize = 20;

const USER_COLUMNS: &str =
    "id, email, handle, name_first, name_last, password, permission_id, created_at";

/// Fields supplied at registration.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name_first: &'a str,
    pub name_last: &'a str,
}

impl Database {
    // -- Users --

    /// Insert a user, deriving a unique handle from their name. The first user
    /// in an empty database becomes the workspace owner.
    pub fn create_user(&self, new: &NewUser<'_>) -> Result<UserRow> {
        self.with_conn(|conn| {
            let existing: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            let permission = if existing == 0 {
                PERMISSION_OWNER
            } else {
                PERMISSION_MEMBER
            };
            let handle = unique_handle(conn, new.name_first, new.name_last)?;

            conn.execute(
                "INSERT INTO users (email, handle, name_first, name_last, password, permission_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    new.email,
                    handle,
                    new.name_first,
                    new.name_last,
                    new.password_hash,
                    permission
                ],
            )?;
            let id = conn.last_insert_rowid();
            info!("User {} registered as '{}'", id, handle);

            query_user(conn, "id", &id)?
                .ok_or_else(|| anyhow::anyhow!("user {} vanished after insert", id))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", &email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", &id))
    }

    pub fn email_taken(&self, email: &str) -> Result<bool> {
        Ok(self.get_user_by_email(email)?.is_some())
    }

    /// Every registered user, oldest first.
    pub fn get_all_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        handle: row.get(2)?,
        name_first: row.get(3)?,
        name_last: row.get(4)?,
        password: row.get(5)?,
        permission_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn query_user(
    conn: &Connection,
    column: &str,
    value: &dyn rusqlite::types::ToSql,
) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([value], user_from_row).optional()?;

    Ok(row)
}

fn handle_in_use(conn: &Connection, handle: &str) -> Result<bool> {
    let hit = conn
        .query_row("SELECT 1 FROM users WHERE handle = ?1", [handle], |_| Ok(()))
        .optional()?;
    Ok(hit.is_some())
}

/// Lowercased first and last name, cut to the handle limit. Collisions get a
/// numeric suffix, trimming the base so the result still fits.
fn unique_handle(conn: &Connection, name_first: &str, name_last: &str) -> Result<String> {
    let base: String = format!("{name_first}{name_last}")
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(MAX_HANDLE_LEN)
        .collect();

    if !handle_in_use(conn, &base)? {
        return Ok(base);
    }

    let mut n: u64 = 1;
    loop {
        let suffix = n.to_string();
        let keep = MAX_HANDLE_LEN.saturating_sub(suffix.len());
        let candidate: String = base.chars().take(keep).chain(suffix.chars()).collect();
        if !handle_in_use(conn, &candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}
