//! RPC method handler for the ReviewBadge JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches synchronous calls to the `App`; `handle_request`
//! adds the methods that have to wait on badge tasks.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::badge_scanner;
use crate::types::command::{CommandOutcome, ConfigCommand};
use crate::types::errors::CommandError;

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn run_command(app: &Mutex<App>, command: ConfigCommand) -> Result<Value, String> {
    let mut a = app.lock().map_err(|e| e.to_string())?;
    let outcome: CommandOutcome = a.execute(command).map_err(|e| e.to_string())?;
    Ok(json!({
        "changed": outcome.changed,
        "reload_required": outcome.reload_required,
        "active": a.is_active(),
    }))
}

fn parse_command(name: &str, value: &str) -> Result<ConfigCommand, String> {
    ConfigCommand::parse(name, value).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let settings = a.settings();
            Ok(json!({
                "token_set": !settings.token.is_empty(),
                "username": settings.username,
                "display_mode": settings.display_mode,
                "scope": settings.scope,
                "configured": settings.is_configured(),
            }))
        }
        "settings.set_token" => {
            let token = str_param(params, "token")?;
            run_command(app, parse_command("set-token", token)?)
        }
        "settings.set_username" => {
            let username = str_param(params, "username")?;
            run_command(app, parse_command("set-username", username)?)
        }
        "settings.set_display" => {
            let mode = str_param(params, "mode")?;
            run_command(app, parse_command("display", mode)?)
        }
        "settings.set_scope" => {
            let scope = str_param(params, "scope")?;
            run_command(app, parse_command("scope", scope)?)
        }

        // ─── Page ───
        "page.open" => {
            let url = str_param(params, "url")?;
            let html = str_param(params, "html")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let active = a.open_page(url, html).map_err(|e| e.to_string())?;
            Ok(json!({"active": active}))
        }
        "page.append" => {
            let selector = str_param(params, "selector")?;
            let html = str_param(params, "html")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let appended = a.append_html(selector, html).map_err(|e| e.to_string())?;
            Ok(json!({"appended": appended}))
        }
        "page.remove" => {
            let selector = str_param(params, "selector")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let removed = a.remove_matching(selector).map_err(|e| e.to_string())?;
            Ok(json!({"removed": removed}))
        }
        "page.rescan" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let attached = match a.session() {
                Some(session) => session.rescan().map_err(|e| e.to_string())?,
                None => 0,
            };
            Ok(json!({"attached": attached}))
        }
        "page.snapshot" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let html = a.snapshot().map_err(|e| e.to_string())?;
            Ok(json!({"html": html}))
        }
        "page.badges" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let badges = a.badges().map_err(|e| e.to_string())?;
            let arr: Vec<Value> = badges
                .iter()
                .map(|b| json!({"text": b.text, "title": b.title, "class": b.class_attr()}))
                .collect();
            Ok(json!(arr))
        }
        "page.close" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.close_page();
            Ok(json!({"ok": true}))
        }

        _ => Err(CommandError::UnknownCommand(method.to_string()).to_string()),
    }
}

/// Like [`handle_method`], plus `page.settle`, which waits for every badge on
/// the active page to resolve. The app lock is released while waiting.
pub async fn handle_request(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "page.settle" => {
            let scanner = app.lock().map_err(|e| e.to_string())?.scanner();
            if let Some(scanner) = scanner {
                badge_scanner::settle(&scanner).await;
            }
            let a = app.lock().map_err(|e| e.to_string())?;
            let badges = a.badges().map(|b| b.len()).unwrap_or(0);
            Ok(json!({"badges": badges}))
        }
        _ => handle_method(app, method, params),
    }
}
