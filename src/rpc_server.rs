//! ReviewBadge RPC server: JSON-RPC over stdin/stdout for a host browser shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"page.open", "params":{"url":"...","html":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! The settings file location follows `REVIEWBADGE_CONFIG_DIR`; the API root can
//! be overridden with `REVIEWBADGE_API_BASE`.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Mutex;

use reviewbadge::app::App;
use reviewbadge::rpc_handler::handle_request;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

fn emit(value: &Value) {
    let mut out = io::stdout().lock();
    if writeln!(out, "{}", value).and_then(|_| out.flush()).is_err() {
        log::error!("stdout closed");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let api_base = std::env::var("REVIEWBADGE_API_BASE").ok();
    let app = match App::new(None, api_base) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            log::error!("failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Signal ready
    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                log::error!("stdin read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_request(&app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                log::debug!("{} failed: {}", method, err);
                json!({"id": id, "error": err})
            }
        };
        emit(&response);
    }

    ExitCode::SUCCESS
}
