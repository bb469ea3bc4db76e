/// Database row types. These map directly to SQLite rows and are kept apart
/// from the huddle-types API models.
use huddle_types::UserId;
use huddle_types::models::UserProfile;

/// Workspace-wide owner. The first registered user gets this.
pub const PERMISSION_OWNER: i64 = 1;
pub const PERMISSION_MEMBER: i64 = 2;

pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub handle: String,
    pub name_first: String,
    pub name_last: String,
    pub password: String,
    pub permission_id: i64,
    pub created_at: String,
}

impl UserRow {
    pub fn u_id(&self) -> UserId {
        self.id as UserId
    }

    pub fn is_global_owner(&self) -> bool {
        self.permission_id == PERMISSION_OWNER
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            u_id: self.u_id(),
            email: self.email.clone(),
            name_first: self.name_first.clone(),
            name_last: self.name_last.clone(),
            handle_str: self.handle.clone(),
        }
    }
}
