//! User service implementation.

use std::sync::Arc;

use super::error::UserError;
use super::types::{NewUser, Registered, RegistrationInput, User};
use crate::auth::{hash_password, verify_password};
use crate::validation::validate_fields;

/// Repository trait for user persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait UserRepository: Send + Sync {
    /// Check if a login is already registered.
    fn login_exists(
        &self,
        login: &str,
    ) -> impl std::future::Future<Output = Result<bool, UserError>> + Send;

    /// Check if an e-mail is already registered.
    fn email_exists(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<bool, UserError>> + Send;

    /// Insert a disabled user together with its first confirmation token.
    ///
    /// Both rows are written atomically. A login or e-mail taken in the
    /// meantime fails with `LoginTaken` / `EmailTaken`.
    fn create(
        &self,
        user: NewUser,
    ) -> impl std::future::Future<Output = Result<Registered, UserError>> + Send;

    /// Find a user and its password hash by login.
    fn find_credentials(
        &self,
        login: &str,
    ) -> impl std::future::Future<Output = Result<Option<(User, String)>, UserError>> + Send;

    /// Consume a raw confirmation token and enable its user.
    ///
    /// Returns `None` for unknown, expired or used tokens.
    fn confirm(
        &self,
        raw_token: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, UserError>> + Send;
}

/// User service for registration and sign-in.
pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Register a disabled user and issue its confirmation token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A field fails validation
    /// - Login or e-mail is taken
    /// - Password hashing or database operation fails
    pub async fn register(&self, input: RegistrationInput) -> Result<Registered, UserError> {
        validate_fields(&input).map_err(UserError::Validation)?;

        let login = input.login.trim().to_string();
        let email = input.email.trim().to_string();

        if self.repo.login_exists(&login).await? {
            return Err(UserError::LoginTaken);
        }
        if self.repo.email_exists(&email).await? {
            return Err(UserError::EmailTaken);
        }

        self.repo
            .create(NewUser {
                login,
                name: input.name.trim().to_string(),
                email,
                city: input.city.filter(|c| !c.trim().is_empty()),
                password_hash: hash_password(&input.password)?,
            })
            .await
    }

    /// Enable the user a confirmation token was issued for.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfirmationToken` for unknown, expired or used tokens.
    pub async fn confirm(&self, raw_token: &str) -> Result<User, UserError> {
        self.repo
            .confirm(raw_token)
            .await?
            .ok_or(UserError::InvalidConfirmationToken)
    }

    /// Check credentials of an enabled user.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown login or wrong password,
    /// and `NotConfirmed` while the e-mail is unconfirmed.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<User, UserError> {
        let Some((user, hash)) = self.repo.find_credentials(login).await? else {
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(password, &hash)? {
            return Err(UserError::InvalidCredentials);
        }

        if !user.enabled {
            return Err(UserError::NotConfirmed);
        }

        Ok(user)
    }

    /// Look up an enabled user, e.g. when refreshing its tokens.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the login is unknown and `NotConfirmed` if the
    /// user is disabled.
    pub async fn find_enabled(&self, login: &str) -> Result<User, UserError> {
        let (user, _) = self
            .repo
            .find_credentials(login)
            .await?
            .ok_or_else(|| UserError::NotFound(login.to_string()))?;

        if user.enabled {
            Ok(user)
        } else {
            Err(UserError::NotConfirmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Mock repository for testing.
    ///
    /// With `stale_reads` the existence checks always miss, as they do for
    /// two registrations racing each other.
    #[derive(Default)]
    struct MockUserRepository {
        users: Mutex<Vec<(User, String)>>,
        tokens: Mutex<Vec<(String, i32)>>,
        stale_reads: bool,
    }

    impl UserRepository for MockUserRepository {
        async fn login_exists(&self, login: &str) -> Result<bool, UserError> {
            Ok(!self.stale_reads
                && self.users.lock().unwrap().iter().any(|(u, _)| u.login == login))
        }

        async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
            Ok(!self.stale_reads
                && self.users.lock().unwrap().iter().any(|(u, _)| u.email == email))
        }

        async fn create(&self, user: NewUser) -> Result<Registered, UserError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|(u, _)| u.login == user.login) {
                return Err(UserError::LoginTaken);
            }
            if users.iter().any(|(u, _)| u.email == user.email) {
                return Err(UserError::EmailTaken);
            }
            let created = User {
                id: i32::try_from(users.len()).unwrap() + 1,
                login: user.login,
                name: user.name,
                email: user.email,
                city: user.city,
                enabled: false,
                created_at: Utc::now(),
            };
            users.push((created.clone(), user.password_hash));
            drop(users);

            let token = format!("token-{}", created.id);
            self.tokens.lock().unwrap().push((token.clone(), created.id));
            Ok(Registered {
                user: created,
                confirmation_token: token,
            })
        }

        async fn find_credentials(&self, login: &str) -> Result<Option<(User, String)>, UserError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|(u, _)| u.login == login)
                .cloned())
        }

        async fn confirm(&self, raw_token: &str) -> Result<Option<User>, UserError> {
            let mut tokens = self.tokens.lock().unwrap();
            let Some(pos) = tokens.iter().position(|(t, _)| t == raw_token) else {
                return Ok(None);
            };
            let (_, user_id) = tokens.remove(pos);

            let mut users = self.users.lock().unwrap();
            Ok(users.iter_mut().find(|(u, _)| u.id == user_id).map(|(u, _)| {
                u.enabled = true;
                u.clone()
            }))
        }
    }

    fn registration(login: &str, email: &str) -> RegistrationInput {
        RegistrationInput {
            name: "Бот".to_string(),
            login: login.to_string(),
            password: "123456".to_string(),
            password_confirm: "123456".to_string(),
            email: email.to_string(),
            city: None,
        }
    }

    fn service() -> UserService<MockUserRepository> {
        UserService::new(Arc::new(MockUserRepository::default()))
    }

    #[tokio::test]
    async fn test_register_creates_disabled_user() {
        let service = service();

        let registered = service
            .register(registration("bot", "bot@example.com"))
            .await
            .unwrap();

        assert_eq!(registered.user.login, "bot");
        assert!(!registered.user.enabled);
        assert_eq!(registered.confirmation_token, "token-1");

        let (_, hash) = service.repo.find_credentials("bot").await.unwrap().unwrap();
        assert_ne!(hash, "123456");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let mut input = registration("bot", "bot@example.com");
        input.password_confirm = "654321".to_string();

        let result = service().register(input).await;

        assert!(matches!(
            result,
            Err(UserError::Validation(messages)) if messages == vec!["passwordConfirm: Пароли не совпадают".to_string()]
        ));
    }

    #[tokio::test]
    async fn test_register_duplicates() {
        let service = service();
        service
            .register(registration("bot", "bot@example.com"))
            .await
            .unwrap();

        let result = service.register(registration("bot", "other@example.com")).await;
        assert!(matches!(result, Err(UserError::LoginTaken)));

        let result = service.register(registration("alex", "bot@example.com")).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Пользователь с таким email уже существует"
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_missed_by_existence_check() {
        let service = UserService::new(Arc::new(MockUserRepository {
            stale_reads: true,
            ..MockUserRepository::default()
        }));
        service
            .register(registration("bot", "bot@example.com"))
            .await
            .unwrap();

        let result = service.register(registration("bot", "other@example.com")).await;
        assert!(matches!(result, Err(UserError::LoginTaken)));

        let result = service.register(registration("alex", "bot@example.com")).await;
        assert!(matches!(result, Err(UserError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_authenticate_requires_confirmation() {
        let service = service();
        let registered = service
            .register(registration("bot", "bot@example.com"))
            .await
            .unwrap();

        let result = service.authenticate("bot", "123456").await;
        assert!(matches!(result, Err(UserError::NotConfirmed)));

        let confirmed = service.confirm(&registered.confirmation_token).await.unwrap();
        assert!(confirmed.enabled);

        let user = service.authenticate("bot", "123456").await.unwrap();
        assert_eq!(user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_credentials() {
        let service = service();
        service
            .register(registration("bot", "bot@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            service.authenticate("bot", "wrong-password").await,
            Err(UserError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate("ghost", "123456").await,
            Err(UserError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_confirm_token_used_once() {
        let service = service();
        let registered = service
            .register(registration("bot", "bot@example.com"))
            .await
            .unwrap();

        service.confirm(&registered.confirmation_token).await.unwrap();
        let result = service.confirm(&registered.confirmation_token).await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "Ссылка подтверждения недействительна"
        );
    }

    #[tokio::test]
    async fn test_find_enabled() {
        let service = service();
        let registered = service
            .register(registration("bot", "bot@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            service.find_enabled("bot").await,
            Err(UserError::NotConfirmed)
        ));
        assert!(matches!(
            service.find_enabled("ghost").await,
            Err(UserError::NotFound(_))
        ));

        service.confirm(&registered.confirmation_token).await.unwrap();
        assert!(service.find_enabled("bot").await.is_ok());
    }
}
