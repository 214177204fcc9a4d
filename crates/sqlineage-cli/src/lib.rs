//! sqlineage tool dispatch
//!
//! Maps JSON tool calls onto the database layer and the lineage service, and
//! serves them as newline-delimited JSON over any reader/writer pair.

pub mod toolbox;
pub mod server;

pub use toolbox::{ToolCall, Toolbox};
pub use server::{handle_line, load_lineage, serve, ToolRequest, ToolResponse};
