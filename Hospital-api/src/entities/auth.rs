use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hospital_domain::entities::UserSummary;

/// Payload of a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    /// JWT to send as `Authorization: Bearer <token>`
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserSummary,
}
