use async_trait::async_trait;

use crate::domain::auth::errors::EmailDispatchError;
use crate::domain::auth::models::EmailJob;
use crate::domain::auth::ports::EmailDispatcher;

/// Dispatcher used when email delivery is disabled. Records that a job would
/// have been sent without its token or link.
#[derive(Debug, Default, Clone)]
pub struct LogEmailDispatcher;

#[async_trait]
impl EmailDispatcher for LogEmailDispatcher {
    async fn send(&self, job: EmailJob) -> Result<(), EmailDispatchError> {
        tracing::info!(
            template = %job.template,
            "Email delivery disabled, dropping job"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::auth::models::EmailTemplate;
    use crate::domain::user::models::EmailAddress;

    #[tokio::test]
    async fn test_disabled_delivery_succeeds() {
        let job = EmailJob {
            to: EmailAddress::new("a@x.com".to_string()).unwrap(),
            template: EmailTemplate::NewAccount,
            variables: BTreeMap::new(),
        };

        assert!(LogEmailDispatcher.send(job).await.is_ok());
    }
}
