// handlers/protected/mod.rs - Protected handlers (session required)
//
// Security Level: valid session token (cookie or bearer)
// Route Prefix: /api/*
// Database access goes through a client scoped to the session's principal, so
// handlers only ever reach the caller's own rows.

pub mod dashboard; // GET /api/dashboard/metrics
pub mod debug;     // /api/debug/*
pub mod import;    // POST /api/import/csv
pub mod profile;   // GET /api/test-artist-profile

pub use dashboard::metrics_get;
pub use debug::{fan_engagement_get, sync_history_post, test_db_get};
pub use import::import_csv_post;
pub use profile::test_artist_profile_get;
