use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{BookingDialogState, Conversation};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Conversations ──

pub fn get_conversation(conn: &Connection, id: &str) -> rusqlite::Result<Option<Conversation>> {
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();
    let mut stmt = conn.prepare(
        "SELECT id, dialog, last_activity, expires_at FROM conversations WHERE id = ?1 AND expires_at > ?2",
    )?;

    let result = stmt.query_row(params![id, now], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    });

    match result {
        Ok((id, dialog_json, last_activity_str, expires_at_str)) => {
            // An unreadable dialog restarts the conversation instead of wedging it.
            let dialog: Option<BookingDialogState> = serde_json::from_str(&dialog_json)
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, conversation = %id, "discarding unreadable dialog state");
                    None
                });

            let last_activity = NaiveDateTime::parse_from_str(&last_activity_str, TIMESTAMP_FORMAT)
                .unwrap_or_else(|_| Utc::now().naive_utc());
            let expires_at = NaiveDateTime::parse_from_str(&expires_at_str, TIMESTAMP_FORMAT)
                .unwrap_or_else(|_| Utc::now().naive_utc());

            Ok(Some(Conversation {
                id,
                dialog,
                last_activity,
                expires_at,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn save_conversation(conn: &Connection, conv: &Conversation) -> anyhow::Result<()> {
    let dialog_json = serde_json::to_string(&conv.dialog)?;
    let last_activity = conv.last_activity.format(TIMESTAMP_FORMAT).to_string();
    let expires_at = conv.expires_at.format(TIMESTAMP_FORMAT).to_string();

    conn.execute(
        "INSERT INTO conversations (id, dialog, last_activity, expires_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
           dialog = excluded.dialog,
           last_activity = excluded.last_activity,
           expires_at = excluded.expires_at",
        params![conv.id, dialog_json, last_activity, expires_at],
    )?;
    Ok(())
}

pub fn delete_conversation(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let count = conn.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn expire_old_conversations(conn: &Connection) -> rusqlite::Result<usize> {
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();
    let count = conn.execute("DELETE FROM conversations WHERE expires_at <= ?1", params![now])?;
    Ok(count)
}
