use rusqlite::Connection;
use tracing::warn;

/// Best-effort audit trail. A failed write is logged and dropped so it can
/// never take down the action it describes.
pub fn record(conn: &Connection, actor: Option<&str>, action: &str, detail: &str) {
    let now = chrono::Utc::now().timestamp_millis();
    if let Err(e) = conn.execute(
        "INSERT INTO audit_logs (actor, action, detail, created_at) VALUES (?1, ?2, ?3, ?4)",
        (&actor, action, detail, now),
    ) {
        warn!(error = %e, action, "Failed to write audit log entry");
    }
}
