//! Wire types of the song-detail lookup service.

use serde::{Deserialize, Serialize};

/// Details returned by `GET /info?group=..&song=..`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SongDetail {
    #[serde(rename = "releaseDate", default)]
    pub release_date: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
}
