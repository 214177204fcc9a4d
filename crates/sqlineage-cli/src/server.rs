//! Newline-delimited JSON transport
//!
//! One request per line in, one response per line out. Requests are handled
//! in order; a line that cannot be parsed produces an error response and the
//! loop carries on. EOF ends the session.

use crate::toolbox::Toolbox;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use sqlineage_core::LineageRecord;
use sqlineage_lineage::SharedRegistry;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// `{"id"?, "tool", "arguments"?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Echoed back untouched
    #[serde(default)]
    pub id: Option<Json>,

    pub tool: String,

    #[serde(default)]
    pub arguments: Option<Json>,
}

/// `{"id", "tool", "output"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: Option<Json>,
    pub tool: String,
    pub output: String,
}

impl ToolResponse {
    fn rejected(id: Option<Json>, tool: String, output: String) -> Self {
        tracing::warn!(tool = %tool, "{}", output);
        Self { id, tool, output }
    }
}

/// Answer one raw request line
pub fn handle_line(toolbox: &Toolbox, line: &str) -> ToolResponse {
    let request: ToolRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return ToolResponse::rejected(None, String::new(), format!("Invalid request: {}", e)),
    };

    match toolbox.call(&request.tool, request.arguments) {
        Ok(output) => ToolResponse {
            id: request.id,
            tool: request.tool,
            output,
        },
        Err(e) => {
            let output = format!("Invalid call to {}: {}", request.tool, e);
            ToolResponse::rejected(request.id, request.tool, output)
        }
    }
}

/// Registry pre-populated from a JSON array of lineage records
///
/// Records are declared in file order, so a later entry for the same field
/// replaces an earlier one.
pub fn load_lineage(path: &Path) -> Result<SharedRegistry> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lineage file {}", path.display()))?;
    let records: Vec<LineageRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse lineage file {}", path.display()))?;

    let registry = SharedRegistry::new();
    for record in records {
        registry.declare(record);
    }

    tracing::info!(path = %path.display(), records = registry.len(), "loaded lineage");
    Ok(registry)
}

/// Serve requests from `reader` until EOF, returning how many were answered
pub fn serve<R: BufRead, W: Write>(toolbox: &Toolbox, reader: R, mut writer: W) -> io::Result<usize> {
    let mut answered = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(toolbox, &line);
        serde_json::to_writer(&mut writer, &response)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        answered += 1;
    }

    tracing::info!(answered, "session ended");
    Ok(answered)
}
