use serde::{Deserialize, Serialize};

/// Account profile as returned by `GET /account/profile`.
///
/// Parsing is lenient: every field defaults, and the server's older
/// Go-cased spellings are accepted as aliases. The password never appears
/// here; it only travels outbound in the signup and login request bodies.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Account {
    #[serde(alias = "Id")]
    pub id: i64,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "Name")]
    pub name: String,
    /// Free-form date string; the server does not constrain the format.
    #[serde(alias = "Birth")]
    pub birth: String,
    #[serde(alias = "About")]
    pub about: String,
    /// Unix milliseconds.
    #[serde(rename = "createdTime", alias = "CreatedTime")]
    pub created_time: i64,
    /// Unix milliseconds.
    #[serde(rename = "updatedTime", alias = "UpdatedTime")]
    pub updated_time: i64,
}

/// Body for `POST /account/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for `POST /account/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: &'a str,
}

/// Editable profile fields, the body for `PUT /account/edit`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub birth: String,
    pub about: String,
}

impl Account {
    /// Merge an accepted edit into the displayed record, the way the server
    /// will report it on the next fetch.
    pub fn apply_update(&mut self, update: &ProfileUpdate) {
        self.name = update.name.clone();
        self.birth = update.birth.clone();
        self.about = update.about.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_camel_case() {
        let json = r#"{
            "id": 7,
            "email": "a@b.com",
            "name": "Alice",
            "birth": "1990-01-02",
            "about": "hello",
            "createdTime": 1700000000000,
            "updatedTime": 1700000001000
        }"#;
        let account: Account = serde_json::from_str(json).expect("Failed to parse account JSON");
        assert_eq!(account.id, 7);
        assert_eq!(account.email, "a@b.com");
        assert_eq!(account.name, "Alice");
        assert_eq!(account.birth, "1990-01-02");
        assert_eq!(account.created_time, 1_700_000_000_000);
    }

    #[test]
    fn test_parse_account_go_cased_aliases() {
        let json = r#"{"Id": 3, "Email": "x@y.com", "Name": "Bob", "Birth": "", "About": ""}"#;
        let account: Account = serde_json::from_str(json).expect("Failed to parse account JSON");
        assert_eq!(account.id, 3);
        assert_eq!(account.email, "x@y.com");
        assert_eq!(account.name, "Bob");
        // Missing timestamps default rather than fail
        assert_eq!(account.updated_time, 0);
    }

    #[test]
    fn test_parse_account_ignores_password_field() {
        // Older server builds leaked the hashed password in the profile body;
        // it must not end up anywhere in the parsed record.
        let json = r#"{"id": 1, "email": "a@b.com", "password": "$2a$10$abc"}"#;
        let account: Account = serde_json::from_str(json).expect("Failed to parse account JSON");
        assert_eq!(account.email, "a@b.com");
        let back = serde_json::to_string(&account).expect("Failed to serialize account");
        assert!(!back.contains("$2a$10$abc"));
    }

    #[test]
    fn test_apply_update() {
        let mut account = Account {
            name: "Old".to_string(),
            ..Default::default()
        };
        account.apply_update(&ProfileUpdate {
            name: "New".to_string(),
            birth: "2000-12-31".to_string(),
            about: "bio".to_string(),
        });
        assert_eq!(account.name, "New");
        assert_eq!(account.birth, "2000-12-31");
        assert_eq!(account.about, "bio");
    }

    #[test]
    fn test_signup_request_field_names() {
        let body = SignupRequest {
            email: "a@b.com",
            password: "secret1!",
            confirm_password: "secret1!",
        };
        let json = serde_json::to_string(&body).expect("Failed to serialize signup body");
        assert!(json.contains("\"confirmPassword\""));
        assert!(!json.contains("confirm_password"));
    }
}
