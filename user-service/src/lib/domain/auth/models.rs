use std::collections::BTreeMap;
use std::fmt;

use chrono::Duration;
use serde::Serialize;

use crate::domain::user::models::EmailAddress;

/// Mail templates the delivery worker knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    NewAccount,
    ResetPassword,
}

impl EmailTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplate::NewAccount => "new_account",
            EmailTemplate::ResetPassword => "reset_password",
        }
    }
}

impl fmt::Display for EmailTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered-later email: recipient, template name and its variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJob {
    pub to: EmailAddress,
    pub template: EmailTemplate,
    pub variables: BTreeMap<String, String>,
}

impl EmailJob {
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

/// Values every outgoing email is built with.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub project_name: String,
    /// Base URL of the frontend, with trailing slash.
    pub server_host: String,
}

impl EmailSettings {
    pub fn new(project_name: impl Into<String>, server_host: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            server_host: server_host.into(),
        }
    }

    /// Build a job carrying a one-time token and the link that consumes it.
    pub fn token_job(
        &self,
        to: EmailAddress,
        template: EmailTemplate,
        path: &str,
        token: &str,
        valid_hours: i64,
    ) -> EmailJob {
        let link = format!("{}{}?token={}", self.server_host, path, token);

        let mut variables = BTreeMap::new();
        variables.insert("project_name".to_string(), self.project_name.clone());
        variables.insert("email".to_string(), to.as_str().to_string());
        variables.insert("valid_hours".to_string(), valid_hours.to_string());
        variables.insert("token".to_string(), token.to_string());
        variables.insert("link".to_string(), link);

        EmailJob {
            to,
            template,
            variables,
        }
    }
}

/// Whole hours a token stays valid, rounded up so a short TTL never reads as 0.
pub fn valid_hours(ttl: Duration) -> i64 {
    let seconds = ttl.num_seconds().max(0);
    (seconds + 3599) / 3600
}
