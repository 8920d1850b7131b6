//! Field validation helpers shared by the input types.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

/// Rejects strings without a single visible character.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("not_blank"))
    } else {
        Ok(())
    }
}

/// Flattens field errors into sorted `field: message` lines.
///
/// Field names are reported in camelCase, as clients send them.
#[must_use]
pub fn field_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = camel_case(&field);
            errs.iter().map(move |e| {
                let message = e.message.clone().unwrap_or_else(|| Cow::Owned(e.code.to_string()));
                format!("{field}: {message}")
            })
        })
        .collect();
    messages.sort();
    messages
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Runs the derived rules of `input` and reports every failing field.
pub fn validate_fields(input: &impl Validate) -> Result<(), Vec<String>> {
    input.validate().map_err(|errors| field_messages(&errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(custom(function = "not_blank", message = "пусто"))]
        first: String,
        #[validate(custom(function = "not_blank"))]
        second: String,
    }

    #[test]
    fn test_messages_sorted_with_field_prefix() {
        let probe = Probe {
            first: " ".to_string(),
            second: String::new(),
        };
        assert_eq!(
            validate_fields(&probe).unwrap_err(),
            vec!["first: пусто".to_string(), "second: not_blank".to_string()]
        );
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("password_confirm"), "passwordConfirm");
        assert_eq!(camel_case("year_of_publishing"), "yearOfPublishing");
        assert_eq!(camel_case("title"), "title");
    }

    #[test]
    fn test_valid_input() {
        let probe = Probe {
            first: "a".to_string(),
            second: " b ".to_string(),
        };
        assert!(validate_fields(&probe).is_ok());
    }

    proptest! {
        #[test]
        fn prop_whitespace_is_blank(s in "[ \t\r\n]*") {
            prop_assert!(not_blank(&s).is_err());
        }

        #[test]
        fn prop_visible_char_is_not_blank(prefix in "[ \t]*", c in "[a-zA-Zа-яА-Я0-9]", suffix in "[ \t]*") {
            let value = format!("{prefix}{c}{suffix}");
            prop_assert!(not_blank(&value).is_ok());
        }
    }
}
