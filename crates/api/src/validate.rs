//! Request-shape validation for the account endpoints.

use regex::Regex;
use std::sync::OnceLock;

const EMAIL_MAX_LEN: usize = 254;
const PASSWORD_MIN_CHARS: usize = 6;
const PASSWORD_MAX_CHARS: usize = 80;

pub fn email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email is required".to_string());
    }
    if email.len() > EMAIL_MAX_LEN {
        return Err("email is too long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email regex must compile")
    });

    if !regex.is_match(email) {
        return Err("invalid email format".to_string());
    }

    Ok(())
}

/// Bounds are counted in characters, not bytes.
pub fn password(password: &str) -> Result<(), String> {
    let chars = password.chars().count();
    if chars < PASSWORD_MIN_CHARS {
        return Err("password must be at least 6 characters long".to_string());
    }
    if chars > PASSWORD_MAX_CHARS {
        return Err("password must be at most 80 characters long".to_string());
    }
    Ok(())
}
