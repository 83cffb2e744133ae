use serde::{Deserialize, Serialize};

use crate::users::repo_types::Role;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub access_token: String,
}

/// Response returned by the refresh endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_uses_camel_case() {
        let response = LoginResponse {
            id: 1,
            name: "Admin".into(),
            role: Role::Admin,
            access_token: "tok".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"accessToken\":\"tok\""));
        assert!(json.contains("\"role\":\"ADMIN\""));
    }
}
