use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::auth::models::EmailJob;

/// Serializable email job consumed by the mail worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailJobMessage {
    pub to: String,
    pub template: String,
    pub variables: BTreeMap<String, String>,
    pub queued_at: DateTime<Utc>,
}

impl From<&EmailJob> for EmailJobMessage {
    fn from(job: &EmailJob) -> Self {
        Self {
            to: job.to.as_str().to_string(),
            template: job.template.as_str().to_string(),
            variables: job.variables.clone(),
            queued_at: Utc::now(),
        }
    }
}
