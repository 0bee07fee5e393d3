use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, Result};

use crate::access::Role;
use crate::models::{ChatKind, Message, Profile};

pub struct Database(pub Mutex<Connection>);

pub fn init_database(path: &Path) -> Result<Database> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(Database(Mutex::new(conn)))
}

/// In-memory database, used by tests and ephemeral sessions.
pub fn init_in_memory() -> Result<Database> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(Database(Mutex::new(conn)))
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Direct (1-on-1) conversation messages
        CREATE TABLE IF NOT EXISTS chat_messages (
            id TEXT PRIMARY KEY,
            chat_id TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            from_me INTEGER NOT NULL DEFAULT 0,
            sender_name TEXT,
            timestamp INTEGER,
            edited INTEGER NOT NULL DEFAULT 0,
            reply_to_id TEXT
        );

        -- Group conversation messages (disjoint id namespace from chat_messages)
        CREATE TABLE IF NOT EXISTS group_messages (
            id TEXT PRIMARY KEY,
            group_id TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            from_me INTEGER NOT NULL DEFAULT 0,
            sender_name TEXT,
            timestamp INTEGER,
            edited INTEGER NOT NULL DEFAULT 0,
            reply_to_id TEXT
        );

        -- Portal accounts (the signed-in account carries is_self = 1)
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            first_name TEXT,
            last_name TEXT,
            nickname TEXT,
            avatar_url TEXT,
            role TEXT NOT NULL DEFAULT 'user',
            is_self INTEGER NOT NULL DEFAULT 0
        );

        -- Local device settings (webhook_url lives here)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Best-effort audit trail
        CREATE TABLE IF NOT EXISTS audit_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            actor TEXT,
            action TEXT NOT NULL,
            detail TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chat_messages_chat_id ON chat_messages(chat_id);
        CREATE INDEX IF NOT EXISTS idx_chat_messages_timestamp ON chat_messages(timestamp);
        CREATE INDEX IF NOT EXISTS idx_group_messages_group_id ON group_messages(group_id);
        CREATE INDEX IF NOT EXISTS idx_group_messages_timestamp ON group_messages(timestamp);
        CREATE INDEX IF NOT EXISTS idx_audit_logs_created_at ON audit_logs(created_at);
        ",
    )?;

    // Migration: reply_to_id and edited were added after the first release
    for table in ["chat_messages", "group_messages"] {
        if !has_column(conn, table, "reply_to_id")? {
            conn.execute(&format!("ALTER TABLE {} ADD COLUMN reply_to_id TEXT", table), [])?;
        }
        if !has_column(conn, table, "edited")? {
            conn.execute(
                &format!("ALTER TABLE {} ADD COLUMN edited INTEGER NOT NULL DEFAULT 0", table),
                [],
            )?;
        }
    }

    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        [table, column],
        |row| row.get::<_, i32>(0),
    )
    .map(|count| count > 0)
}

fn id_column(kind: ChatKind) -> &'static str {
    match kind {
        ChatKind::Direct => "chat_id",
        ChatKind::Group => "group_id",
    }
}

pub fn insert_message(conn: &Connection, message: &Message) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} (id, {}, body, from_me, sender_name, timestamp, edited, reply_to_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            message.kind.channel(),
            id_column(message.kind),
        ),
        (
            &message.id,
            &message.chat_id,
            &message.body,
            message.from_me as i32,
            &message.sender_name,
            message.timestamp,
            message.edited as i32,
            &message.reply_to_id,
        ),
    )?;
    Ok(())
}

fn load_table(conn: &Connection, kind: ChatKind) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, {}, body, from_me, sender_name, timestamp, edited, reply_to_id FROM {}",
        id_column(kind),
        kind.channel(),
    ))?;

    let messages = stmt
        .query_map([], |row| {
            Ok(Message {
                id: row.get(0)?,
                kind,
                chat_id: row.get(1)?,
                body: row.get(2)?,
                from_me: row.get::<_, i32>(3)? == 1,
                sender_name: row.get(4)?,
                timestamp: row.get(5)?,
                edited: row.get::<_, i32>(6)? == 1,
                reply_to_id: row.get(7)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(messages)
}

/// Both message tables merged into one flat collection, kind tag set per
/// source table.
pub fn load_all_messages(conn: &Connection) -> Result<Vec<Message>> {
    let mut messages = load_table(conn, ChatKind::Direct)?;
    messages.extend(load_table(conn, ChatKind::Group)?);
    Ok(messages)
}

pub fn find_message(conn: &Connection, kind: ChatKind, id: &str) -> Result<Option<Message>> {
    conn.query_row(
        &format!(
            "SELECT id, {}, body, from_me, sender_name, timestamp, edited, reply_to_id FROM {} WHERE id = ?1",
            id_column(kind),
            kind.channel(),
        ),
        [id],
        |row| {
            Ok(Message {
                id: row.get(0)?,
                kind,
                chat_id: row.get(1)?,
                body: row.get(2)?,
                from_me: row.get::<_, i32>(3)? == 1,
                sender_name: row.get(4)?,
                timestamp: row.get(5)?,
                edited: row.get::<_, i32>(6)? == 1,
                reply_to_id: row.get(7)?,
            })
        },
    )
    .optional()
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    )?;
    Ok(())
}

/// The signed-in account's profile, if one has been stored.
pub fn self_profile(conn: &Connection) -> Result<Option<Profile>> {
    conn.query_row(
        "SELECT id, email, first_name, last_name, nickname, avatar_url, role
         FROM profiles WHERE is_self = 1 LIMIT 1",
        [],
        |row| {
            Ok(Profile {
                id: row.get(0)?,
                email: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                nickname: row.get(4)?,
                avatar_url: row.get(5)?,
                role: Role::parse(&row.get::<_, String>(6)?),
            })
        },
    )
    .optional()
}

pub fn upsert_self_profile(conn: &Connection, profile: &Profile) -> Result<()> {
    conn.execute(
        "INSERT INTO profiles (id, email, first_name, last_name, nickname, avatar_url, role, is_self)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)
         ON CONFLICT(id) DO UPDATE SET
            email = excluded.email,
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            nickname = excluded.nickname,
            avatar_url = excluded.avatar_url,
            role = excluded.role,
            is_self = 1",
        (
            &profile.id,
            &profile.email,
            &profile.first_name,
            &profile.last_name,
            &profile.nickname,
            &profile.avatar_url,
            profile.role.as_str(),
        ),
    )?;
    Ok(())
}
