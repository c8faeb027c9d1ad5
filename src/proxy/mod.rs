// Proxy module - HTTP server fronting the upstream chat API
//
// One path (`/api/chat`) is proxied with CORS and a per-client daily quota;
// every other path is served from the static asset store.

mod cors;
mod error;
mod handlers;
mod helpers;
mod server;
mod state;
pub mod upstream;


pub use server::start_proxy;

/// The single proxied API path; everything else is a static asset
pub const CHAT_PATH: &str = "/api/chat";
