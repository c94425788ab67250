//! Login credentials read at startup

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

/// Account used to sign the kiosk browser into the chat service
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    /// Optional; without it the operator finishes the sign-in by hand
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    /// Read `credentials.json`; absence or malformed content is fatal
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read credentials {}: {}", path.display(), e))
        })?;

        let credentials: Credentials = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Malformed credentials {}: {}", path.display(), e))
        })?;

        if credentials.email.trim().is_empty() {
            return Err(Error::Config(format!(
                "Credentials {} have an empty email",
                path.display()
            )));
        }

        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_email_only() {
        let file = write_temp(r#"{"email": "kiosk@example.com"}"#);
        let credentials = Credentials::from_file(file.path()).unwrap();
        assert_eq!(credentials.email, "kiosk@example.com");
        assert!(credentials.password.is_none());
    }

    #[test]
    fn test_load_with_password_is_redacted_in_debug() {
        let file = write_temp(r#"{"email": "kiosk@example.com", "password": "hunter2"}"#);
        let credentials = Credentials::from_file(file.path()).unwrap();
        assert_eq!(credentials.password.as_deref(), Some("hunter2"));
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Credentials::from_file("/nonexistent/credentials.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let file = write_temp("{ email: ");
        assert!(matches!(
            Credentials::from_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_empty_email_is_config_error() {
        let file = write_temp(r#"{"email": "  "}"#);
        assert!(Credentials::from_file(file.path()).is_err());
    }
}
