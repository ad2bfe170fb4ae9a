// handlers/public/mod.rs - Public handlers (no session required)
//
// Security Level: None
// Route Prefix: /, /health, /auth/*, and the public /api/* endpoints

pub mod analysis; // POST /api/artist-ai/analyze, GET /api/artist-ai/status/:analysis_id
pub mod callback; // GET /auth/callback
pub mod status;   // GET /, GET /health
pub mod template; // GET /api/import/template

pub use analysis::{analyze_post, status_get};
pub use callback::callback_get;
pub use status::{health, root};
pub use template::template_get;
