//! Shared constants for end-to-end tests
//!
//! When seeded test data changes, update only this file.

// ============================================================================
// Seeded Songs
// ============================================================================

pub const GROUP_MUSE: &str = "Muse";
pub const GROUP_RADIOHEAD: &str = "Radiohead";

/// Songs inserted by `TestServer::spawn_seeded`, in id order.
pub const SEEDED_SONGS: &[(&str, &str)] = &[
    (GROUP_MUSE, "Supermassive Black Hole"),
    (GROUP_RADIOHEAD, "Karma Police"),
    (GROUP_MUSE, "Hysteria"),
    (GROUP_RADIOHEAD, "No Surprises"),
    (GROUP_MUSE, "Starlight"),
];

/// Lyrics given to every seeded song: four verses.
pub const SEEDED_TEXT: &str = "verse one\nline two\n\nverse two\n\nverse three\n\nverse four";

pub const SEEDED_RELEASE_DATE: &str = "19.06.2006";

// ============================================================================
// Song Detail Lookup
// ============================================================================

/// Nothing listens here, so every lookup against it fails.
pub const UNREACHABLE_DETAILS_URL: &str = "http://127.0.0.1:1";

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for the server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout applied to every test client request
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delay between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
