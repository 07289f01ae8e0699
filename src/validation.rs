use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::{Failure, FieldViolation};

pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldViolation>>;
}

/// JSON body that has been deserialized and passed [`Validate`].
///
/// Both a malformed body and a failed check surface as
/// [`Failure::Validation`], so handlers only see valid input.
pub struct Validated<T>(pub T);

impl<S, T> FromRequest<S> for Validated<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Failure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                Failure::Validation(vec![FieldViolation::new("body", rejection.body_text())])
            })?;
        value.validate().map_err(Failure::Validation)?;
        Ok(Validated(value))
    }
}

// collects violations for one payload
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.0.push(FieldViolation::new(field, message));
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.push(FieldViolation::new(field, "is required"));
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.0
                .push(FieldViolation::new(field, format!("must be at most {max} characters")));
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.0
                .push(FieldViolation::new(field, format!("must be at least {min} characters")));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !looks_like_email(value) {
            self.0.push(FieldViolation::new(field, "must be a valid email address"));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<FieldViolation>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.0))
        }
    }
}

// shape check only; deliverability is not our problem
fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_violation() {
        let errors = Violations::new()
            .required("name", " ")
            .email("email", "nope")
            .max_len("message", "abcdef", 3)
            .finish()
            .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[1].field, "email");
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(looks_like_email("jane@example.com"));
        assert!(!looks_like_email("jane@"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("jane@example"));
    }
}
