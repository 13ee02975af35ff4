//! Credential handling
//!
//! Handles:
//! - Password policy validation
//! - bcrypt hashing and verification

mod password;

pub use password::{
    MIN_PASSWORD_LEN, SPECIAL_CHARS, hash_password, validate_password, verify_password,
};
