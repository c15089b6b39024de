use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenPair;
use auth::TokenPurpose;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::EmailJob;
use crate::domain::auth::models::EmailSettings;
use crate::domain::auth::models::EmailTemplate;
use crate::domain::auth::models::valid_hours;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::EmailDispatcher;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Domain service implementation of the credential flows.
pub struct AuthService<UR, ED>
where
    UR: UserRepository + ?Sized,
    ED: EmailDispatcher + ?Sized,
{
    repository: Arc<UR>,
    dispatcher: Arc<ED>,
    authenticator: Arc<Authenticator>,
    email_settings: EmailSettings,
}

impl<UR, ED> AuthService<UR, ED>
where
    UR: UserRepository + ?Sized,
    ED: EmailDispatcher + ?Sized,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store
    /// * `dispatcher` - Background email delivery
    /// * `authenticator` - Hashing and token issuance with configured lifetimes
    /// * `email_settings` - Project name and link base for outgoing emails
    pub fn new(
        repository: Arc<UR>,
        dispatcher: Arc<ED>,
        authenticator: Arc<Authenticator>,
        email_settings: EmailSettings,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            authenticator,
            email_settings,
        }
    }

    fn parse_email(email: &str) -> Result<EmailAddress, AuthError> {
        EmailAddress::new(email.to_string()).map_err(|e| AuthError::InvalidEmail(e.to_string()))
    }

    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        if password.is_empty() {
            return Err(AuthError::InvalidPassword(
                "Password must not be empty".to_string(),
            ));
        }

        self.authenticator
            .hash_password(password)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Resolve the email carried by a one-time token to its user.
    async fn user_from_email_token(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<User, AuthError> {
        let email = self
            .authenticator
            .parse_token(token, purpose)
            .ok_or(AuthError::InvalidCredentials)?;

        self.repository
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Build and hand off a one-time token email. Delivery is not awaited.
    fn send_token_email(
        &self,
        to: &EmailAddress,
        template: EmailTemplate,
        purpose: TokenPurpose,
        path: &str,
    ) -> Result<(), AuthError> {
        let token = self.authenticator.issue_token(to.as_str(), purpose)?;
        let hours = valid_hours(self.authenticator.lifetimes().for_purpose(purpose));

        let job = self
            .email_settings
            .token_job(to.clone(), template, path, &token, hours);
        self.dispatch(job);

        Ok(())
    }

    fn dispatch(&self, job: EmailJob) {
        let dispatcher = Arc::clone(&self.dispatcher);

        tokio::spawn(async move {
            let template = job.template;
            if let Err(e) = dispatcher.send(job).await {
                tracing::error!(error = %e, %template, "Failed to dispatch email");
            }
        });
    }
}

#[async_trait]
impl<UR, ED> AuthServicePort for AuthService<UR, ED>
where
    UR: UserRepository + ?Sized,
    ED: EmailDispatcher + ?Sized,
{
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            // Pay the same hashing cost as a known account.
            self.authenticator.verify_missing_user(password);
            return Err(AuthError::InvalidCredentials);
        };

        let tokens =
            self.authenticator
                .authenticate(password, &user.password_hash, &user.id.to_string())?;

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let subject = self
            .authenticator
            .parse_token(refresh_token, TokenPurpose::Refresh)
            .ok_or(AuthError::InvalidCredentials)?;
        let user_id = UserId::from_string(&subject).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        tracing::debug!(user_id = %user.id, "Token pair refreshed");
        Ok(self.authenticator.issue_token_pair(&user.id.to_string())?)
    }

    async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Self::parse_email(email)?;
        let password_hash = self.hash_password(password)?;

        let user = match self.repository.find_by_email(email.as_str()).await? {
            Some(existing) if existing.is_active => return Err(AuthError::EmailRegistered),
            Some(existing) => {
                let user = self
                    .repository
                    .replace_pending_password(&existing.id, &password_hash)
                    .await
                    .map_err(|e| match e {
                        UserError::AlreadyActive(_) => AuthError::EmailRegistered,
                        other => other.into(),
                    })?;
                tracing::info!(user_id = %user.id, "Pending registration overwritten");
                user
            }
            None => {
                let user = self
                    .repository
                    .create(User::new(email, password_hash))
                    .await?;
                tracing::info!(user_id = %user.id, "User registered");
                user
            }
        };

        self.send_token_email(
            &user.email,
            EmailTemplate::NewAccount,
            TokenPurpose::Register,
            "register",
        )?;

        Ok(user)
    }

    async fn confirm_registration(&self, token: &str) -> Result<User, AuthError> {
        let user = self
            .user_from_email_token(token, TokenPurpose::Register)
            .await?;

        if user.is_active {
            return Err(AuthError::AlreadyActive);
        }

        let user = self.repository.activate(&user.id).await?;
        tracing::info!(user_id = %user.id, "Registration confirmed");

        Ok(user)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        self.send_token_email(
            &user.email,
            EmailTemplate::ResetPassword,
            TokenPurpose::PasswordReset,
            "reset-password",
        )?;
        tracing::info!(user_id = %user.id, "Password reset requested");

        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .user_from_email_token(token, TokenPurpose::PasswordReset)
            .await?;

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        let password_hash = self.hash_password(new_password)?;
        let user = self
            .repository
            .set_password_hash(&user.id, &password_hash)
            .await?;
        tracing::info!(user_id = %user.id, "Password reset");

        Ok(())
    }

    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let subject = self
            .authenticator
            .parse_token(access_token, TokenPurpose::Access)
            .ok_or(AuthError::Unauthenticated)?;
        let user_id = UserId::from_string(&subject).map_err(|_| AuthError::Unauthenticated)?;

        self.repository
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::auth::errors::EmailDispatchError;
    use crate::outbound::repositories::InMemoryUserRepository;

    const PASSWORD: &str = "pw1";

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserError>;
            async fn update_profile(
                &self,
                id: &UserId,
                first_name: Option<String>,
                last_name: Option<String>,
            ) -> Result<User, UserError>;
            async fn set_password_hash(&self, id: &UserId, password_hash: &str) -> Result<User, UserError>;
            async fn replace_pending_password(&self, id: &UserId, password_hash: &str) -> Result<User, UserError>;
            async fn activate(&self, id: &UserId) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    /// Forwards every job to a channel, optionally reporting failure afterwards.
    struct RecordingDispatcher {
        jobs: mpsc::UnboundedSender<EmailJob>,
        fail: bool,
    }

    #[async_trait]
    impl EmailDispatcher for RecordingDispatcher {
        async fn send(&self, job: EmailJob) -> Result<(), EmailDispatchError> {
            let _ = self.jobs.send(job);
            if self.fail {
                return Err(EmailDispatchError::DeliveryFailed("broker down".to_string()));
            }
            Ok(())
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(
            Authenticator::new(
                b"test_secret_key_at_least_32_bytes!",
                1,
                auth::TokenLifetimes::default(),
            )
            .unwrap(),
        )
    }

    fn service_with<UR: UserRepository>(
        repository: Arc<UR>,
        fail_delivery: bool,
    ) -> (
        AuthService<UR, RecordingDispatcher>,
        mpsc::UnboundedReceiver<EmailJob>,
    ) {
        let (jobs, outbox) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(RecordingDispatcher {
            jobs,
            fail: fail_delivery,
        });
        let settings = EmailSettings::new("Test Project", "http://localhost/");

        (
            AuthService::new(repository, dispatcher, authenticator(), settings),
            outbox,
        )
    }

    fn service() -> (
        AuthService<InMemoryUserRepository, RecordingDispatcher>,
        Arc<InMemoryUserRepository>,
        mpsc::UnboundedReceiver<EmailJob>,
    ) {
        let repository = Arc::new(InMemoryUserRepository::new());
        let (service, outbox) = service_with(Arc::clone(&repository), false);
        (service, repository, outbox)
    }

    async fn next_token(outbox: &mut mpsc::UnboundedReceiver<EmailJob>) -> String {
        let job = outbox.recv().await.unwrap();
        job.variable("token").unwrap().to_string()
    }

    async fn registered_and_confirmed(
        service: &AuthService<InMemoryUserRepository, RecordingDispatcher>,
        outbox: &mut mpsc::UnboundedReceiver<EmailJob>,
        email: &str,
    ) -> User {
        service.register(email, PASSWORD).await.unwrap();
        let token = next_token(outbox).await;
        service.confirm_registration(&token).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_confirm_login() {
        let (service, _, mut outbox) = service();

        let user = service.register("a@x.com", PASSWORD).await.unwrap();
        assert!(!user.is_active);

        let job = outbox.recv().await.unwrap();
        assert_eq!(job.template, EmailTemplate::NewAccount);
        assert_eq!(job.to.as_str(), "a@x.com");
        assert_eq!(job.variable("valid_hours"), Some("24"));
        let token = job.variable("token").unwrap().to_string();
        assert_eq!(
            job.variable("link").unwrap(),
            format!("http://localhost/register?token={token}")
        );

        let confirmed = service.confirm_registration(&token).await.unwrap();
        assert!(confirmed.is_active);

        let tokens = service.login("a@x.com", PASSWORD).await.unwrap();
        let resolved = service.authenticate(&tokens.access_token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_login_before_confirmation_is_inactive() {
        let (service, _, _outbox) = service();

        service.register("a@x.com", PASSWORD).await.unwrap();

        let result = service.login("a@x.com", PASSWORD).await;
        assert!(matches!(result, Err(AuthError::InactiveUser)));
    }

    #[tokio::test]
    async fn test_login_does_not_reveal_which_check_failed() {
        let (service, _, mut outbox) = service();
        registered_and_confirmed(&service, &mut outbox, "a@x.com").await;

        let wrong_password = service.login("a@x.com", "nope").await;
        let unknown_email = service.login("b@x.com", PASSWORD).await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_reregistering_pending_email_overwrites_in_place() {
        let (service, repository, mut outbox) = service();

        let first = service.register("a@x.com", "pw1").await.unwrap();
        let _ = outbox.recv().await.unwrap();
        let second = service.register("a@x.com", "pw2").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repository.list(0, 100).await.unwrap().len(), 1);

        let token = next_token(&mut outbox).await;
        service.confirm_registration(&token).await.unwrap();

        assert!(matches!(
            service.login("a@x.com", "pw1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(service.login("a@x.com", "pw2").await.is_ok());
    }

    #[tokio::test]
    async fn test_registering_active_email_is_rejected() {
        let (service, _, mut outbox) = service();
        registered_and_confirmed(&service, &mut outbox, "a@x.com").await;

        let result = service.register("a@x.com", "other").await;
        assert!(matches!(result, Err(AuthError::EmailRegistered)));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let (service, _, _outbox) = service();

        assert!(matches!(
            service.register("not-an-email", PASSWORD).await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            service.register("a@x.com", "").await,
            Err(AuthError::InvalidPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_second_confirmation_fails() {
        let (service, _, mut outbox) = service();

        service.register("a@x.com", PASSWORD).await.unwrap();
        let token = next_token(&mut outbox).await;

        service.confirm_registration(&token).await.unwrap();
        let again = service.confirm_registration(&token).await;
        assert!(matches!(again, Err(AuthError::AlreadyActive)));
    }

    #[tokio::test]
    async fn test_confirmation_rejects_other_purposes() {
        let (service, _, mut outbox) = service();
        registered_and_confirmed(&service, &mut outbox, "a@x.com").await;

        service.request_password_reset("a@x.com").await.unwrap();
        let reset_token = next_token(&mut outbox).await;

        let result = service.confirm_registration(&reset_token).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_confirmation_for_deleted_user_is_not_found() {
        let (service, repository, mut outbox) = service();

        let user = service.register("a@x.com", PASSWORD).await.unwrap();
        let token = next_token(&mut outbox).await;
        repository.delete(&user.id).await.unwrap();

        let result = service.confirm_registration(&token).await;
        assert!(matches!(result, Err(AuthError::NotFound)));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let (service, _, mut outbox) = service();
        registered_and_confirmed(&service, &mut outbox, "a@x.com").await;

        service.request_password_reset("a@x.com").await.unwrap();
        let job = outbox.recv().await.unwrap();
        assert_eq!(job.template, EmailTemplate::ResetPassword);
        let token = job.variable("token").unwrap().to_string();
        assert!(job.variable("link").unwrap().contains("reset-password?token="));

        service.confirm_password_reset(&token, "pw3").await.unwrap();

        assert!(matches!(
            service.login("a@x.com", PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(service.login("a@x.com", "pw3").await.is_ok());
    }

    #[tokio::test]
    async fn test_password_reset_request_checks_account() {
        let (service, _, _outbox) = service();

        assert!(matches!(
            service.request_password_reset("ghost@x.com").await,
            Err(AuthError::NotFound)
        ));

        service.register("pending@x.com", PASSWORD).await.unwrap();
        assert!(matches!(
            service.request_password_reset("pending@x.com").await,
            Err(AuthError::InactiveUser)
        ));
    }

    #[tokio::test]
    async fn test_password_reset_rejects_register_token() {
        let (service, _, mut outbox) = service();

        service.register("a@x.com", PASSWORD).await.unwrap();
        let register_token = next_token(&mut outbox).await;

        let result = service.confirm_password_reset(&register_token, "pw3").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_issues_new_pair() {
        let (service, _, mut outbox) = service();
        let user = registered_and_confirmed(&service, &mut outbox, "a@x.com").await;

        let tokens = service.login("a@x.com", PASSWORD).await.unwrap();
        let renewed = service.refresh(&tokens.refresh_token).await.unwrap();

        let resolved = service.authenticate(&renewed.access_token).await.unwrap();
        assert_eq!(resolved.id, user.id);

        // The previous refresh token is not revoked.
        assert!(service.refresh(&tokens.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_and_access_tokens_are_not_interchangeable() {
        let (service, _, mut outbox) = service();
        registered_and_confirmed(&service, &mut outbox, "a@x.com").await;

        let tokens = service.login("a@x.com", PASSWORD).await.unwrap();

        assert!(matches!(
            service.authenticate(&tokens.refresh_token).await,
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            service.refresh(&tokens.access_token).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user_is_not_found() {
        let (service, repository, mut outbox) = service();
        let user = registered_and_confirmed(&service, &mut outbox, "a@x.com").await;

        let tokens = service.login("a@x.com", PASSWORD).await.unwrap();
        repository.delete(&user.id).await.unwrap();

        assert!(matches!(
            service.refresh(&tokens.refresh_token).await,
            Err(AuthError::NotFound)
        ));
        assert!(matches!(
            service.authenticate(&tokens.access_token).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let (service, _, _outbox) = service();

        let result = service.authenticate("not.a.token").await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_registration() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let (service, mut outbox) = service_with(Arc::clone(&repository), true);

        let user = service.register("a@x.com", PASSWORD).await.unwrap();
        let token = next_token(&mut outbox).await;

        let stored = repository.find_by_email("a@x.com").await.unwrap();
        assert_eq!(stored.map(|u| u.id), Some(user.id));
        assert!(service.confirm_registration(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));

        let (service, _outbox) = service_with(Arc::new(repository), false);

        let result = service.login("a@x.com", PASSWORD).await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_concurrent_registration_race_maps_to_email_registered() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .times(1)
            .returning(|user| Err(UserError::EmailAlreadyExists(user.email.to_string())));

        let (service, _outbox) = service_with(Arc::new(repository), false);

        let result = service.register("a@x.com", PASSWORD).await;
        assert!(matches!(result, Err(AuthError::EmailRegistered)));
    }

    fn pending_user() -> User {
        User::new(
            EmailAddress::new("a@x.com".to_string()).unwrap(),
            "digest".to_string(),
        )
    }

    #[tokio::test]
    async fn test_reregistration_after_activation_elsewhere_conflicts() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(pending_user())));
        repository
            .expect_replace_pending_password()
            .times(1)
            .returning(|id, _| Err(UserError::AlreadyActive(id.to_string())));

        let (service, mut outbox) = service_with(Arc::new(repository), false);

        let result = service.register("a@x.com", PASSWORD).await;
        assert!(matches!(result, Err(AuthError::EmailRegistered)));
        assert!(outbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_confirmation_that_loses_activation_race_is_already_active() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(pending_user())));
        repository
            .expect_activate()
            .times(1)
            .returning(|id| Err(UserError::AlreadyActive(id.to_string())));

        let (service, _outbox) = service_with(Arc::new(repository), false);
        let token = authenticator()
            .issue_token("a@x.com", TokenPurpose::Register)
            .unwrap();

        let result = service.confirm_registration(&token).await;
        assert!(matches!(result, Err(AuthError::AlreadyActive)));
    }
}
