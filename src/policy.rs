//! Pin authorization policy

use crate::client::models::Pin;
use crate::session::Session;

/// Whether `session` may edit or delete `pin`.
///
/// Admins may modify anything; everyone else only their own pins. The
/// anonymous session never may. Call this on every render: both the session
/// and the pin set change independently.
pub fn can_modify(session: &Session, pin: &Pin) -> bool {
    if !session.is_authenticated() {
        return false;
    }
    session.is_admin() || (!pin.owner_user_id.is_empty() && session.user_id == pin.owner_user_id)
}
