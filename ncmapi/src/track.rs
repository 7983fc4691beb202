//! Song endpoints that take id lists.
//!
//! The gateway expects ids comma-joined (`ids=1,2,3`) whether one id or many
//! are requested. [`Ids`] accepts a single `u64` or any collection and
//! normalizes both to that one encoding.
//!
//! ## `song_detail` — `GET /song/detail?ids=...`
//!
//! ```json
//! {
//!   "code": 200,
//!   "songs": [{ "id": 347230, "name": "...", "ar": [...], "al": {...}, "dt": 326000 }],
//!   "privileges": [...]
//! }
//! ```
//!
//! ## `song_url` — `GET /song/url?id=...&br=...`
//!
//! `data[].url` is `null` when the track needs VIP or is region-locked.
//!
//! ## `check_music` — `GET /check/music?id=...`
//!
//! `{ "success": true, "message": "ok" }`

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{Args, Ids};
use serde_json::Value;

impl ApiClient {
    /// Song metadata for one or more ids.
    pub fn song_detail(&self, ids: impl Into<Ids>, mut args: Args) -> Result<Value> {
        let ids: Ids = ids.into();
        args.insert("ids", ids);
        self.call_api("/song/detail", args, false)
    }

    /// Playback URLs. Pass `br` (e.g. `320000`) in `args` to pick a bitrate.
    pub fn song_url(&self, ids: impl Into<Ids>, mut args: Args) -> Result<Value> {
        let ids: Ids = ids.into();
        args.insert("id", ids);
        self.call_api("/song/url", args, false)
    }

    /// Whether a song is playable.
    pub fn check_music(&self, id: impl Into<Ids>, mut args: Args) -> Result<Value> {
        let id: Ids = id.into();
        args.insert("id", id);
        self.call_api("/check/music", args, false)
    }
}
