//! Password digest expected by the gateway's login routes.
//!
//! The gateway accepts `md5_password` = lowercase hex MD5 of the UTF-8
//! password. This only matches a legacy parameter format; it gives no
//! confidentiality.

use md5::{Digest, Md5};

/// Lowercase hex MD5 digest of `password`.
pub fn md5_hex(password: &str) -> String {
    format!("{:x}", Md5::digest(password.as_bytes()))
}
