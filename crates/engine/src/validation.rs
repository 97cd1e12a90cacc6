//! Input rules for accounts and stores.
//!
//! Each check returns the message of the first rule that fails, in the order
//! name, email, address, password.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 60;
const EMAIL_MAX: usize = 100;
const ADDRESS_MAX: usize = 400;
const PASSWORD_MIN: usize = 8;
const STORE_NAME_MAX: usize = 100;
const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").ok());

fn invalid(message: &str) -> EngineError {
    EngineError::InvalidInput(message.to_string())
}

/// Trim, NFKC-normalize and lowercase an email so lookups and the unique
/// index agree on one spelling.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().nfkc().collect::<String>().to_lowercase()
}

pub fn validate_name(name: &str) -> ResultEngine<String> {
    let name = name.trim();
    let len = name.chars().count();
    if len < NAME_MIN {
        return Err(invalid("Name must be at least 3 characters."));
    }
    if len > NAME_MAX {
        return Err(invalid("Name must be at most 60 characters."));
    }
    Ok(name.to_string())
}

/// Returns the normalized email.
pub fn validate_email(email: &str) -> ResultEngine<String> {
    let email = normalize_email(email);
    let matches = EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(&email));
    if !matches || email.chars().count() > EMAIL_MAX {
        return Err(invalid("Invalid email format."));
    }
    Ok(email)
}

pub fn validate_address(address: &str) -> ResultEngine<String> {
    let address = address.trim();
    if address.is_empty() || address.chars().count() > ADDRESS_MAX {
        return Err(invalid("Address is required and must be at most 400 characters."));
    }
    Ok(address.to_string())
}

pub fn validate_password(password: &str) -> ResultEngine<()> {
    let long_enough = password.chars().count() >= PASSWORD_MIN;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if !(long_enough && has_upper && has_special) {
        return Err(invalid(
            "Password must be 8+ chars with uppercase and special char.",
        ));
    }
    Ok(())
}

pub fn validate_store_name(name: &str) -> ResultEngine<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > STORE_NAME_MAX {
        return Err(invalid(
            "Store name is required and must be at most 100 characters.",
        ));
    }
    Ok(name.to_string())
}

/// Validated account fields, ready to be stored.
#[derive(Debug, PartialEq)]
pub(crate) struct Profile {
    pub name: String,
    pub email: String,
    pub address: String,
}

pub(crate) fn validate_profile(name: &str, email: &str, address: &str) -> ResultEngine<Profile> {
    Ok(Profile {
        name: validate_name(name)?,
        email: validate_email(email)?,
        address: validate_address(address)?,
    })
}
