use crate::db::{self, Database};
use crate::models::input::{SetWebhookInput, ValidateExt};

pub const WEBHOOK_URL_KEY: &str = "webhook_url";

/// The configured webhook target, if any. Blank values count as unset.
pub fn webhook_url(db: &Database) -> Result<Option<String>, String> {
    let conn = db.0.lock().map_err(|e| e.to_string())?;
    let value = db::get_setting(&conn, WEBHOOK_URL_KEY).map_err(|e| e.to_string())?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Store the webhook target. An empty URL clears it.
pub fn set_webhook_url(db: &Database, input: SetWebhookInput) -> Result<(), String> {
    input.validate_input()?;
    let conn = db.0.lock().map_err(|e| e.to_string())?;
    db::set_setting(&conn, WEBHOOK_URL_KEY, input.url.trim()).map_err(|e| e.to_string())
}
