//! Structural check for visitor identifiers.
//!
//! Foreign passports and national IDs must pass, so only the shape is
//! checked: after trimming the ends, 4 to 20 characters drawn from ASCII
//! letters, digits, `-` and `.`.

use crate::{Error, Result};

pub const MIN_LEN: usize = 4;
pub const MAX_LEN: usize = 20;

fn allowed(c: char) -> bool { c.is_ascii_alphanumeric() || c == '-' || c == '.' }

/// `true` if `identifier` satisfies the rule.
pub fn is_valid(identifier: &str) -> bool {
  let trimmed = identifier.trim();
  // All allowed characters are ASCII, so byte length equals char count here.
  (MIN_LEN..=MAX_LEN).contains(&trimmed.len()) && trimmed.chars().all(allowed)
}

/// Validate `identifier` and return its trimmed form.
pub fn validate(identifier: &str) -> Result<&str> {
  if is_valid(identifier) {
    Ok(identifier.trim())
  } else {
    Err(Error::InvalidIdentifier(identifier.to_owned()))
  }
}
