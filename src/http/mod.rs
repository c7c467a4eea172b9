//! HTTP control surface
//!
//! Exposes the session and recording operations as a small JSON API:
//! - `POST /sessions` - create a session
//! - `GET /sessions` - list sessions
//! - `POST /sessions/:name/select` - select a session
//! - `DELETE /sessions/:name` - delete a session
//! - `DELETE /sessions` - clear all sessions
//! - `GET /sessions/:name/transcript` - accumulated transcript text
//! - `POST /record/start` / `POST /record/stop` - recording control
//! - `POST /analyze` - run condition analysis on the current session
//! - `GET /status` - current session and recording flag

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
