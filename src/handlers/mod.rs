// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no session) → Protected (session required) → Elevated (superadmin
// profile plus the service-role credential)
//
// Every tier sees the `Session` resolved by `middleware::session_middleware`.
pub mod public;    // Tier 1: health, analysis polling, CSV templates, auth callback
pub mod protected; // Tier 2: dashboard metrics, imports, diagnostics
pub mod elevated;  // Tier 3: operator endpoints
