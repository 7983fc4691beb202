//! Login helpers.
//!
//! All auth routes force a `timestamp` argument so the gateway's GET cache
//! is bypassed.
//!
//! | Method                                   | Route               |
//! |------------------------------------------|---------------------|
//! | [`ApiClient::login`]                     | `/login`            |
//! | [`ApiClient::login_cellphone`]           | `/login/cellphone`  |
//! | [`ApiClient::login_qr_key`]              | `/login/qr/key`     |
//! | [`ApiClient::login_qr_create`]           | `/login/qr/create`  |
//!
//! `logout`, `login_status`, `login_refresh` and `login_qr_check` have no
//! extra logic and are generated from the endpoint table.
//!
//! QR login flow:
//!
//! 1. `login_qr_key` → `unikey`
//! 2. `login_qr_create(unikey, ..)` → URL, base64 PNG, or terminal art
//! 3. poll `login_qr_check(unikey)` until `code` is `803` (authorized) or
//!    `800` (expired). `801` means waiting for scan, `802` scanned but not
//!    confirmed.

use crate::client::ApiClient;
use crate::crypto::md5_hex;
use crate::error::{NcmApiError, Result};
use crate::qr;
use crate::types::{Args, Scalar};
use serde_json::Value;

/// `login_qr_check` code: waiting for scan.
pub const QR_WAITING: i64 = 801;
/// `login_qr_check` code: scanned, waiting for confirmation.
pub const QR_SCANNED: i64 = 802;
/// `login_qr_check` code: authorized, cookies are now set.
pub const QR_AUTHORIZED: i64 = 803;
/// `login_qr_check` code: key expired.
pub const QR_EXPIRED: i64 = 800;

impl ApiClient {
    /// Email login.
    ///
    /// `md5_password`, when given, is sent as is and `password` is ignored.
    pub fn login(
        &self,
        email: &str,
        password: &str,
        md5_password: Option<&str>,
        mut args: Args,
    ) -> Result<Value> {
        args.insert("email", email);
        args.insert("md5_password", password_digest(password, md5_password));
        self.call_api("/login", args, true)
    }

    /// Phone login. `countrycode` is only sent when given (e.g. `1` for US
    /// numbers); the gateway assumes `86` otherwise.
    pub fn login_cellphone(
        &self,
        phone: impl Into<Scalar>,
        password: &str,
        countrycode: Option<u32>,
        md5_password: Option<&str>,
        mut args: Args,
    ) -> Result<Value> {
        args.insert("phone", phone);
        args.insert_opt("countrycode", countrycode);
        args.insert("md5_password", password_digest(password, md5_password));
        self.call_api("/login/cellphone", args, true)
    }

    /// Fetch a fresh QR login key (`data.unikey`).
    pub fn login_qr_key(&self, args: Args) -> Result<String> {
        let resp = self.call_api("/login/qr/key", args, true)?;
        resp["data"]["unikey"]
            .as_str()
            .map(String::from)
            .ok_or(NcmApiError::UnexpectedResponse("data.unikey"))
    }

    /// Create the QR code for `key`.
    ///
    /// - `qrimg_str`: return the code as terminal art (see [`qr::render_data_url`])
    /// - else `qrimg`: return the `data:image/png;base64,...` URL
    /// - else: return the plain login URL that the QR encodes
    pub fn login_qr_create(
        &self,
        key: &str,
        qrimg: bool,
        qrimg_str: bool,
        mut args: Args,
    ) -> Result<String> {
        args.insert("key", key);
        if qrimg || qrimg_str {
            // The gateway only tests `qrimg` for truthiness; `false` would
            // still ask for an image.
            args.insert("qrimg", true);
        }
        let resp = self.call_api("/login/qr/create", args, true)?;
        let data = &resp["data"];

        if qrimg_str {
            let img = data["qrimg"]
                .as_str()
                .ok_or(NcmApiError::UnexpectedResponse("data.qrimg"))?;
            return qr::render_data_url(img);
        }
        let (field, missing) = if qrimg {
            ("qrimg", "data.qrimg")
        } else {
            ("qrurl", "data.qrurl")
        };
        data[field]
            .as_str()
            .map(String::from)
            .ok_or(NcmApiError::UnexpectedResponse(missing))
    }
}

fn password_digest(password: &str, precomputed: Option<&str>) -> String {
    precomputed.map_or_else(|| md5_hex(password), str::to_owned)
}
