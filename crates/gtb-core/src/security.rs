use crate::domain::UserId;

/// Allow-list membership check.
///
/// A missing sender id (e.g. channel posts) and an empty allow-list both
/// deny; the allow-list is validated as non-empty at startup, so the latter
/// only matters for tests and defensive call sites.
pub fn is_authorized(user_id: Option<UserId>, allowed_users: &[i64]) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    if allowed_users.is_empty() {
        return false;
    }
    allowed_users.contains(&user_id.0)
}
