//! User types and data structures.

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::validation::not_blank;

/// Registration form.
#[derive(Debug, Clone, Default, Validate)]
pub struct RegistrationInput {
    /// Display name.
    #[validate(custom(
        function = "not_blank",
        message = "Имя должно содержать хотя бы один видимый символ"
    ))]
    pub name: String,
    /// Unique login.
    #[validate(custom(
        function = "not_blank",
        message = "Логин должен содержать хотя бы один видимый символ"
    ))]
    pub login: String,
    /// Plain-text password.
    #[validate(
        custom(
            function = "not_blank",
            message = "Пароль должен содержать хотя бы один видимый символ"
        ),
        length(min = 6, message = "Пароль должен содержать больше 6 символов")
    )]
    pub password: String,
    /// Must repeat `password`.
    #[validate(must_match(other = "password", message = "Пароли не совпадают"))]
    pub password_confirm: String,
    /// Unique e-mail address.
    #[validate(email(message = "Некорректный почтовый адрес"))]
    pub email: String,
    /// City, optional.
    pub city: Option<String>,
}

/// A registered user. The password hash never leaves the repository
/// except through the credential lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Generated identifier.
    pub id: i32,
    /// Unique login.
    pub login: String,
    /// Display name.
    pub name: String,
    /// Unique e-mail address.
    pub email: String,
    /// City.
    pub city: Option<String>,
    /// Set once the e-mail address is confirmed.
    pub enabled: bool,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// User row ready to be stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login.
    pub login: String,
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// City.
    pub city: Option<String>,
    /// Argon2id PHC string.
    pub password_hash: String,
}

/// Outcome of a registration.
#[derive(Debug, Clone)]
pub struct Registered {
    /// The new, still disabled user.
    pub user: User,
    /// Raw confirmation token to e-mail to the user.
    pub confirmation_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_fields;

    fn valid() -> RegistrationInput {
        RegistrationInput {
            name: "Бот".to_string(),
            login: "bot".to_string(),
            password: "123456".to_string(),
            password_confirm: "123456".to_string(),
            email: "bot@example.com".to_string(),
            city: Some("Москва".to_string()),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_fields(&valid()).is_ok());
    }

    #[test]
    fn test_password_mismatch() {
        let input = RegistrationInput {
            password_confirm: "1234567".to_string(),
            ..valid()
        };
        assert_eq!(
            validate_fields(&input).unwrap_err(),
            vec!["passwordConfirm: Пароли не совпадают".to_string()]
        );
    }

    #[test]
    fn test_every_field_reported() {
        let input = RegistrationInput {
            name: " ".to_string(),
            login: String::new(),
            password: "12345".to_string(),
            password_confirm: "12345".to_string(),
            email: "not-an-email".to_string(),
            city: None,
        };
        assert_eq!(
            validate_fields(&input).unwrap_err(),
            vec![
                "email: Некорректный почтовый адрес".to_string(),
                "login: Логин должен содержать хотя бы один видимый символ".to_string(),
                "name: Имя должно содержать хотя бы один видимый символ".to_string(),
                "password: Пароль должен содержать больше 6 символов".to_string(),
            ]
        );
    }
}
