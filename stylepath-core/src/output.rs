//! Streaming output helpers (made by FontLab https://www.fontlab.com/)

use std::io::Write;

use anyhow::Result;

use crate::rewrite::{RewriteEvent, RewriteReport};

/// Write the whole report as a prettified JSON object.
pub fn write_json_pretty(report: &RewriteReport, mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write events as newline-delimited JSON (NDJSON).
pub fn write_ndjson(events: &[RewriteEvent], mut w: impl Write) -> Result<()> {
    for event in events {
        let line = serde_json::to_string(event)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
