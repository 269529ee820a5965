/**
 * Authentication Handler Types
 *
 * Response bodies shared by the session and user handlers.
 */

use serde::{Deserialize, Serialize};

/// `{ "success": true }`, returned by /jwt and /logout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
