//! Playlist detail.
//!
//! Endpoint: `GET /playlist/detail?id=...[&s=...]`
//!
//! `s` is how many recent subscribers to include (gateway default 8). It is
//! only sent when given and non-zero.
//!
//! Response:
//! ```json
//! {
//!   "code": 200,
//!   "playlist": {
//!     "id": 24381616,
//!     "name": "...",
//!     "trackCount": 50,
//!     "creator": { "userId": 789, "nickname": "..." },
//!     "trackIds": [{ "id": 1 }, ...],
//!     "subscribers": [...]
//!   }
//! }
//! ```
//!
//! Private playlists require login.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{Args, Scalar};
use serde_json::Value;

impl ApiClient {
    pub fn playlist_detail(
        &self,
        id: impl Into<Scalar>,
        s: Option<u32>,
        mut args: Args,
    ) -> Result<Value> {
        args.insert("id", id);
        args.insert_opt("s", s.filter(|&n| n != 0));
        self.call_api("/playlist/detail", args, false)
    }
}
