//! Native messaging host for LinkMate.
//!
//! The browser launches this binary when the extension connects to
//! `com.linkmate.host` and talks to it over stdin/stdout using
//! length-prefixed JSON frames. Logs go to stderr only.

pub mod cli;
pub mod frame_io;
pub mod host;
pub mod logging;
pub mod snapshot;
