use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only projection of a user, as embedded in notification payloads.
///
/// User provisioning happens outside this service; the store only ever reads
/// these three columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
