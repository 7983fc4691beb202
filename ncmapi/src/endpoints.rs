//! Table-driven endpoints.
//!
//! Most gateway routes take a few required query parameters and accept any
//! number of optional ones. They are declared once below: each line gives
//! the method name, the required parameters (optionally with the query key
//! when it is not the parameter name), the route, and whether the call must
//! carry a `timestamp`. The macro turns every line into
//!
//! - an entry in [`ENDPOINTS`], used by [`ApiClient::call_endpoint`], and
//! - a method `fn name(&self, required.., args: Args) -> Result<Value>`
//!   that copies the required values into `args` and calls the route.
//!
//! ```no_run
//! use ncmapi::{ApiClient, Args};
//!
//! let api = ApiClient::new(3000, "localhost")?;
//! let hot = api.comment_hot(186_016_u64, 0, Args::new().with("limit", 5))?;
//! let same = api.call_endpoint(
//!     "comment_hot",
//!     Args::new().with("id", 186_016_u64).with("type", 0).with("limit", 5),
//! )?;
//! # Ok::<(), ncmapi::NcmApiError>(())
//! ```
//!
//! Routes that need extra logic (password hashing, id lists, QR rendering,
//! optional parameters) are written by hand and listed in [`HELPER_ROUTES`].

use crate::client::ApiClient;
use crate::error::{NcmApiError, Result};
use crate::types::{Args, Scalar};
use serde_json::Value;

/// One gateway route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Method name on [`ApiClient`].
    pub name: &'static str,
    /// Route path, e.g. `/song/detail`.
    pub path: &'static str,
    /// Query keys that must be present.
    pub required: &'static [&'static str],
    /// Whether a `timestamp` is always added.
    pub timestamp: bool,
}

impl Endpoint {
    /// Fail with [`NcmApiError::MissingParam`] on the first required key
    /// absent from `args`.
    pub fn check(&self, args: &Args) -> Result<()> {
        match self.required.iter().copied().find(|k| !args.contains_key(k)) {
            Some(param) => Err(NcmApiError::MissingParam {
                endpoint: self.name,
                param,
            }),
            None => Ok(()),
        }
    }
}

macro_rules! endpoints {
    (@ts) => { false };
    (@ts timestamp) => { true };
    (@key $param:ident) => { stringify!($param) };
    (@key $param:ident = $key:literal) => { $key };
    ($(
        $(#[$doc:meta])*
        $name:ident($($param:ident $(= $key:literal)?),*) => $path:literal $(, $ts:ident)?;
    )*) => {
        /// Every table-driven endpoint, in declaration order.
        pub static ENDPOINTS: &[Endpoint] = &[
            $(Endpoint {
                name: stringify!($name),
                path: $path,
                required: &[$(endpoints!(@key $param $(= $key)?)),*],
                timestamp: endpoints!(@ts $($ts)?),
            },)*
        ];

        impl ApiClient {
            $(
                $(#[$doc])*
                #[doc = concat!("\n\nRoute: `", $path, "`")]
                #[allow(unused_mut)]
                pub fn $name(&self, $($param: impl Into<Scalar>,)* mut args: Args) -> Result<Value> {
                    $(args.insert(endpoints!(@key $param $(= $key)?), $param);)*
                    self.call_api($path, args, endpoints!(@ts $($ts)?))
                }
            )*
        }
    };
}

/// Hand-written routes, for lookup and generic dispatch.
pub static HELPER_ROUTES: &[Endpoint] = &[
    Endpoint { name: "login", path: "/login", required: &["email", "md5_password"], timestamp: true },
    Endpoint {
        name: "login_cellphone",
        path: "/login/cellphone",
        required: &["phone", "md5_password"],
        timestamp: true,
    },
    Endpoint { name: "login_qr_key", path: "/login/qr/key", required: &[], timestamp: true },
    Endpoint { name: "login_qr_create", path: "/login/qr/create", required: &["key"], timestamp: true },
    Endpoint { name: "song_detail", path: "/song/detail", required: &["ids"], timestamp: false },
    Endpoint { name: "song_url", path: "/song/url", required: &["id"], timestamp: false },
    Endpoint { name: "check_music", path: "/check/music", required: &["id"], timestamp: false },
    Endpoint { name: "playlist_detail", path: "/playlist/detail", required: &["id"], timestamp: false },
    Endpoint { name: "user_playlist", path: "/user/playlist", required: &["uid"], timestamp: false },
];

/// Look an endpoint up by method name, table routes first.
pub fn endpoint(name: &str) -> Option<&'static Endpoint> {
    all_endpoints().find(|e| e.name == name)
}

/// Look an endpoint up by route path.
pub fn endpoint_by_path(path: &str) -> Option<&'static Endpoint> {
    all_endpoints().find(|e| e.path == path)
}

/// Table routes followed by hand-written ones.
pub fn all_endpoints() -> impl Iterator<Item = &'static Endpoint> {
    ENDPOINTS.iter().chain(HELPER_ROUTES)
}

impl ApiClient {
    /// Call an endpoint by method name with all parameters in `args`.
    ///
    /// Required keys are checked before anything is sent. Hand-written
    /// routes dispatch without their extra logic: `login` expects an
    /// `md5_password`, `song_detail` an already comma-joined `ids`.
    pub fn call_endpoint(&self, name: &str, args: Args) -> Result<Value> {
        let ep = endpoint(name).ok_or_else(|| NcmApiError::UnknownEndpoint(name.to_owned()))?;
        ep.check(&args)?;
        self.call_api(ep.path, args, ep.timestamp)
    }
}

endpoints! {
    // ── login / account ──

    /// Refresh the login cookie.
    login_refresh() => "/login/refresh", timestamp;
    /// Login status of the current session. Requires login.
    login_status() => "/login/status", timestamp;
    /// Poll a QR login key. See [`crate::auth`] for the status codes.
    login_qr_check(key) => "/login/qr/check", timestamp;
    /// Log out. Also called automatically when the client is closed.
    logout() => "/logout", timestamp;
    register_cellphone(phone, password, captcha, nickname) => "/register/cellphone", timestamp;
    /// Send an SMS verification code.
    captcha_sent(phone) => "/captcha/sent";
    captcha_verify(phone, captcha) => "/captcha/verify";
    cellphone_existence_check(phone) => "/cellphone/existence/check";
    /// Set the nickname of a freshly registered account.
    activate_init_profile(nickname) => "/activate/init/profile";
    nickname_check(nickname) => "/nickname/check";
    rebind(phone, oldcaptcha, captcha) => "/rebind";
    countries_code_list() => "/countries/code/list";

    // ── user ──

    /// Profile of any user.
    user_detail(uid) => "/user/detail";
    /// Account of the logged-in user.
    user_account() => "/user/account";
    /// Playlist, radio and MV counts of the logged-in user.
    user_subcount() => "/user/subcount";
    user_level() => "/user/level";
    user_binding(uid) => "/user/binding";
    /// Update profile fields (`gender`, `birthday`, `nickname`, `province`,
    /// `city`, `signature` in `args`).
    user_update() => "/user/update";
    user_dj(uid) => "/user/dj";
    user_follows(uid) => "/user/follows";
    user_followeds(uid) => "/user/followeds";
    user_follow_mixed() => "/user/follow/mixed";
    user_mutualfollow_get(uid) => "/user/mutualfollow/get";
    user_event(uid) => "/user/event";
    /// Listening history; `type=1` for last week, `0` for all time.
    user_record(uid) => "/user/record";
    user_cloud() => "/user/cloud";
    user_cloud_detail(id) => "/user/cloud/detail";
    user_cloud_del(id) => "/user/cloud/del";
    user_audio(uid) => "/user/audio";
    user_comment_history(uid) => "/user/comment/history";
    /// Follow (`t=1`) or unfollow (`t=0`) a user.
    follow(id, t) => "/follow";
    setting() => "/setting";
    daily_signin() => "/daily_signin";
    vip_info() => "/vip/info";
    vip_growthpoint() => "/vip/growthpoint";
    vip_tasks() => "/vip/tasks";
    creator_authinfo_get() => "/creator/authinfo/get";

    // ── events / messages ──

    event() => "/event";
    event_forward(uid, ev_id = "evId", forwards) => "/event/forward";
    event_del(ev_id = "evId") => "/event/del";
    share_resource(id) => "/share/resource";
    hot_topic() => "/hot/topic";
    topic_detail(actid) => "/topic/detail";
    topic_detail_event_hot(actid) => "/topic/detail/event/hot";
    topic_sublist() => "/topic/sublist";
    send_text(user_ids, msg) => "/send/text";
    send_song(user_ids, id, msg) => "/send/song";
    send_playlist(user_ids, playlist, msg) => "/send/playlist";
    msg_private() => "/msg/private";
    msg_private_history(uid) => "/msg/private/history";
    msg_recentcontact() => "/msg/recentcontact";
    msg_comments(uid) => "/msg/comments";
    msg_forwards() => "/msg/forwards";
    msg_notices() => "/msg/notices";

    // ── recommendations ──

    banner() => "/banner";
    /// Personal FM, three tracks per call.
    personal_fm() => "/personal_fm";
    fm_trash(id) => "/fm_trash";
    /// Daily recommended playlists. Requires login.
    recommend_resource() => "/recommend/resource";
    /// Daily recommended songs. Requires login.
    recommend_songs() => "/recommend/songs";
    history_recommend_songs() => "/history/recommend/songs";
    history_recommend_songs_detail(date) => "/history/recommend/songs/detail";
    personalized() => "/personalized";
    personalized_newsong() => "/personalized/newsong";
    personalized_djprogram() => "/personalized/djprogram";
    personalized_mv() => "/personalized/mv";
    personalized_privatecontent() => "/personalized/privatecontent";
    personalized_privatecontent_list() => "/personalized/privatecontent/list";
    program_recommend() => "/program/recommend";
    calendar() => "/calendar";
    homepage_block_page() => "/homepage/block/page";
    homepage_dragon_ball() => "/homepage/dragon/ball";
    playmode_intelligence_list(id, pid) => "/playmode/intelligence/list";
    recent_listen_list() => "/recent/listen/list";
    record_recent_song() => "/record/recent/song";
    record_recent_album() => "/record/recent/album";
    record_recent_playlist() => "/record/recent/playlist";
    record_recent_video() => "/record/recent/video";
    record_recent_voice() => "/record/recent/voice";
    record_recent_dj() => "/record/recent/dj";

    // ── songs ──

    /// Playback URL at a quality `level` (`standard`, `exhigh`, `lossless`,
    /// `hires`, ...).
    song_url_v1(id, level) => "/song/url/v1";
    song_download_url(id) => "/song/download/url";
    lyric(id) => "/lyric";
    lyric_new(id) => "/lyric/new";
    /// Like (`like=true`) or unlike (`like=false`) a song.
    like(id) => "/like";
    likelist(uid) => "/likelist";
    song_like_check(ids) => "/song/like/check";
    song_purchased() => "/song/purchased";
    song_wiki_summary(id) => "/song/wiki/summary";
    song_music_detail(id) => "/song/music/detail";
    song_order_update(pid, ids) => "/song/order/update";
    /// Report a finished play.
    scrobble(id, sourceid) => "/scrobble";
    simi_song(id) => "/simi/song";
    simi_playlist(id) => "/simi/playlist";
    simi_user(id) => "/simi/user";
    simi_mv(mvid) => "/simi/mv";
    simi_artist(id) => "/simi/artist";
    /// New songs by area: `0` all, `7` Chinese, `96` Western, `8` Japanese,
    /// `16` Korean.
    top_song(kind = "type") => "/top/song";

    // ── playlists ──

    playlist_catlist() => "/playlist/catlist";
    playlist_hot() => "/playlist/hot";
    top_playlist() => "/top/playlist";
    top_playlist_highquality() => "/top/playlist/highquality";
    playlist_highquality_tags() => "/playlist/highquality/tags";
    related_playlist(id) => "/related/playlist";
    playlist_detail_dynamic(id) => "/playlist/detail/dynamic";
    playlist_track_all(id) => "/playlist/track/all";
    playlist_update_playcount(id) => "/playlist/update/playcount";
    playlist_subscribers(id) => "/playlist/subscribers";
    /// Subscribe (`t=1`) or unsubscribe (`t=2`).
    playlist_subscribe(t, id) => "/playlist/subscribe";
    playlist_create(name) => "/playlist/create";
    playlist_delete(id) => "/playlist/delete";
    /// Add (`op=add`) or remove (`op=del`) comma-joined `tracks`.
    playlist_tracks(op, pid, tracks) => "/playlist/tracks";
    playlist_track_add(pid, ids) => "/playlist/track/add";
    playlist_track_delete(pid, ids) => "/playlist/track/delete";
    playlist_update(id, name) => "/playlist/update";
    playlist_name_update(id, name) => "/playlist/name/update";
    playlist_desc_update(id, desc) => "/playlist/desc/update";
    playlist_tags_update(id, tags) => "/playlist/tags/update";
    playlist_order_update(ids) => "/playlist/order/update";
    playlist_mylike() => "/playlist/mylike";
    playlist_video_recent() => "/playlist/video/recent";

    // ── charts ──

    toplist() => "/toplist";
    toplist_detail() => "/toplist/detail";
    toplist_artist() => "/toplist/artist";
    top_list(id) => "/top/list";
    top_album() => "/top/album";
    top_artists() => "/top/artists";
    top_mv() => "/top/mv";

    // ── albums ──

    album(id) => "/album";
    album_detail(id) => "/album/detail";
    album_detail_dynamic(id) => "/album/detail/dynamic";
    album_privilege(id) => "/album/privilege";
    album_sub(t, id) => "/album/sub";
    album_sublist() => "/album/sublist";
    album_new() => "/album/new";
    album_newest() => "/album/newest";
    album_list() => "/album/list";
    album_list_style() => "/album/list/style";
    album_songsaleboard() => "/album/songsaleboard";
    digital_album_purchased() => "/digitalAlbum/purchased";
    digital_album_ordering(id, payment, quantity) => "/digitalAlbum/ordering";

    // ── artists ──

    /// Artist info and top 50 songs.
    artists(id) => "/artists";
    artist_detail(id) => "/artist/detail";
    artist_desc(id) => "/artist/desc";
    artist_album(id) => "/artist/album";
    artist_mv(id) => "/artist/mv";
    artist_video(id) => "/artist/video";
    artist_songs(id) => "/artist/songs";
    artist_top_song(id) => "/artist/top/song";
    artist_fans(id) => "/artist/fans";
    artist_list() => "/artist/list";
    artist_sub(id, t) => "/artist/sub";
    artist_sublist() => "/artist/sublist";
    artist_new_song() => "/artist/new/song";
    artist_new_mv() => "/artist/new/mv";
    fanscenter_overview_get(artist_id = "artistId") => "/fanscenter/overview/get";

    // ── search ──

    /// Search. `type`: `1` song, `10` album, `100` artist, `1000` playlist,
    /// `1002` user, `1004` MV, `1006` lyric, `1009` radio, `1014` video.
    search(keywords) => "/search";
    /// Like [`search`](Self::search) but with richer song data.
    cloudsearch(keywords) => "/cloudsearch";
    search_default() => "/search/default";
    search_hot() => "/search/hot";
    search_hot_detail() => "/search/hot/detail";
    search_suggest(keywords) => "/search/suggest";
    search_multimatch(keywords) => "/search/multimatch";

    // ── comments ──

    comment_music(id) => "/comment/music";
    comment_album(id) => "/comment/album";
    comment_playlist(id) => "/comment/playlist";
    comment_mv(id) => "/comment/mv";
    comment_dj(id) => "/comment/dj";
    comment_video(id) => "/comment/video";
    comment_event(thread_id = "threadId") => "/comment/event";
    /// Hot comments. `type`: `0` song, `1` MV, `2` playlist, `3` album,
    /// `4` radio, `5` video.
    comment_hot(id, kind = "type") => "/comment/hot";
    comment_new(id, kind = "type") => "/comment/new";
    comment_floor(parent_comment_id = "parentCommentId", id, kind = "type") => "/comment/floor";
    comment_like(id, cid, t, kind = "type") => "/comment/like";
    /// Post (`t=1`), reply (`t=2`, with `commentId`) or delete (`t=0`).
    comment(t, kind = "type", id) => "/comment";
    hug_comment(uid, cid, sid) => "/hug/comment";
    comment_hug_list(uid, cid, sid) => "/comment/hug/list";
    resource_like(t, kind = "type", id) => "/resource/like";

    // ── MV / video ──

    mv_all() => "/mv/all";
    mv_first() => "/mv/first";
    mv_exclusive_rcmd() => "/mv/exclusive/rcmd";
    mv_detail(mvid) => "/mv/detail";
    mv_detail_info(mvid) => "/mv/detail/info";
    mv_url(id) => "/mv/url";
    mv_sub(t, mvid) => "/mv/sub";
    mv_sublist() => "/mv/sublist";
    video_group_list() => "/video/group/list";
    video_category_list() => "/video/category/list";
    video_group(id) => "/video/group";
    video_timeline_all() => "/video/timeline/all";
    video_timeline_recommend() => "/video/timeline/recommend";
    related_allvideo(id) => "/related/allvideo";
    video_detail(id) => "/video/detail";
    video_detail_info(vid) => "/video/detail/info";
    video_url(id) => "/video/url";
    video_sub(t, id) => "/video/sub";
    mlog_url(id) => "/mlog/url";
    mlog_to_video(id) => "/mlog/to/video";

    // ── DJ / radio ──

    dj_banner() => "/dj/banner";
    dj_hot() => "/dj/hot";
    dj_catelist() => "/dj/catelist";
    dj_recommend() => "/dj/recommend";
    dj_recommend_type(kind = "type") => "/dj/recommend/type";
    dj_category_excludehot() => "/dj/category/excludehot";
    dj_category_recommend() => "/dj/category/recommend";
    dj_today_perfered() => "/dj/today/perfered";
    dj_personalize_recommend() => "/dj/personalize/recommend";
    dj_radio_hot(cate_id = "cateId") => "/dj/radio/hot";
    dj_detail(rid) => "/dj/detail";
    dj_program(rid) => "/dj/program";
    dj_program_detail(id) => "/dj/program/detail";
    /// Subscribe (`t=1`) or unsubscribe (`t=0`) a radio.
    dj_sub(rid, t) => "/dj/sub";
    dj_sublist() => "/dj/sublist";
    dj_paygift() => "/dj/paygift";
    dj_toplist() => "/dj/toplist";
    dj_toplist_pay() => "/dj/toplist/pay";
    dj_toplist_hours() => "/dj/toplist/hours";
    dj_toplist_newcomer() => "/dj/toplist/newcomer";
    dj_toplist_popular() => "/dj/toplist/popular";
    dj_program_toplist() => "/dj/program/toplist";
    dj_program_toplist_hours() => "/dj/program/toplist/hours";

    // ── styles ──

    style_list() => "/style/list";
    style_preference() => "/style/preference";
    style_detail(tag_id = "tagId") => "/style/detail";
    style_song(tag_id = "tagId") => "/style/song";
    style_album(tag_id = "tagId") => "/style/album";
    style_playlist(tag_id = "tagId") => "/style/playlist";
    style_artist(tag_id = "tagId") => "/style/artist";

    // ── cloud beans (yunbei) ──

    /// Cloud bean balance.
    yunbei() => "/yunbei";
    yunbei_info() => "/yunbei/info";
    yunbei_today() => "/yunbei/today";
    yunbei_sign() => "/yunbei/sign";
    yunbei_tasks() => "/yunbei/tasks";
    yunbei_tasks_todo() => "/yunbei/tasks/todo";
    yunbei_task_finish(user_task_id = "userTaskId") => "/yunbei/task/finish";
    yunbei_tasks_receipt() => "/yunbei/tasks/receipt";
    yunbei_tasks_expense() => "/yunbei/tasks/expense";
    yunbei_receipt() => "/yunbei/receipt";
    yunbei_expense() => "/yunbei/expense";
    /// Recommend a song with cloud beans.
    yunbei_rcmd_song(id) => "/yunbei/rcmd/song";
    yunbei_rcmd_song_history() => "/yunbei/rcmd/song/history";

    // ── musician ──

    musician_data_overview() => "/musician/data/overview";
    musician_play_trend(start_time = "startTime", end_time = "endTime") => "/musician/play/trend";
    musician_tasks() => "/musician/tasks";
    musician_cloudbean() => "/musician/cloudbean";
    musician_cloudbean_obtain(id, period) => "/musician/cloudbean/obtain";
    musician_sign() => "/musician/sign";
    sign_happy_info() => "/sign/happy/info";
    signin_progress() => "/signin/progress";
    listen_together_status() => "/listen/together/status";
}
