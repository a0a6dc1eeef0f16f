//! Assertions that fail a case with an error instead of a panic

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Debug;

use crate::error::{E2eError, E2eResult};
use crate::http::ApiResponse;
use crate::schema::ValidationOutcome;

pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(EMAIL_PATTERN).ok());

/// `true` when `email` is a plausible address.
pub fn validate_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

pub fn expect_email(email: &str) -> E2eResult<()> {
    if email.trim().is_empty() {
        return Err(E2eError::Assertion("Email cannot be null or empty".to_string()));
    }
    if !validate_email(email) {
        return Err(E2eError::Assertion(format!("Invalid email format: {}", email)));
    }
    Ok(())
}

pub fn expect_status(response: &ApiResponse, expected: u16) -> E2eResult<()> {
    if response.status == expected {
        return Ok(());
    }
    Err(E2eError::Assertion(format!(
        "Expected status {} from {} {}, got {}",
        expected, response.method, response.endpoint, response.status
    )))
}

pub fn expect_eq<T: PartialEq + Debug + ?Sized>(what: &str, expected: &T, actual: &T) -> E2eResult<()> {
    if expected == actual {
        return Ok(());
    }
    Err(E2eError::Assertion(format!(
        "{}: expected {:?}, got {:?}",
        what, expected, actual
    )))
}

pub fn expect_valid(outcome: ValidationOutcome) -> E2eResult<()> {
    if outcome.valid {
        Ok(())
    } else {
        Err(E2eError::Validation {
            violations: outcome.errors,
        })
    }
}
