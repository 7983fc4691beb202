//! User playlists.
//!
//! Endpoint: `GET /user/playlist?uid=...[&limit=...][&offset=...]`
//!
//! Response:
//! ```json
//! {
//!   "code": 200,
//!   "more": true,
//!   "playlist": [{ "id": 1, "name": "...", "trackCount": 12, "creator": {...} }]
//! }
//! ```
//!
//! The first entry is the user's "liked songs" playlist.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{Args, Scalar};
use serde_json::Value;

impl ApiClient {
    /// Playlists created or subscribed by `uid`. `limit` defaults to 30 and
    /// `offset` to 0 on the gateway side; `None` leaves them unset.
    pub fn user_playlist(
        &self,
        uid: impl Into<Scalar>,
        limit: Option<u32>,
        offset: Option<u32>,
        mut args: Args,
    ) -> Result<Value> {
        args.insert("uid", uid);
        args.insert_opt("limit", limit);
        args.insert_opt("offset", offset);
        self.call_api("/user/playlist", args, false)
    }
}
