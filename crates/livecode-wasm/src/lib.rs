//! livecode as a WASM module for browser environments.
//!
//! This crate exposes the playground pipeline via `wasm-bindgen`. Results
//! cross the boundary as JSON strings, with the rendered result expanded to
//! markup.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { execute } from 'livecode-wasm';
//!
//! await init();
//!
//! const out = JSON.parse(execute("<b>{name}</b>", JSON.stringify({ name: "Ada" })));
//! // { success: true, result: { kind: "node", markup: "<b>Ada</b>" }, error: null, ... }
//! ```

use livecode::{render_markup, Execution, LiveError, Renderable, Scope, Stage, Uncaught};
use livecode_eval::{inspect, ConsoleLevel};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Result of one execution, serialized as JSON for JavaScript.
#[derive(Debug, Serialize)]
pub struct ExecuteOutput {
    /// No error and no uncaught value.
    pub success: bool,
    pub result: Option<RenderedResult>,
    pub error: Option<ErrorOutput>,
    /// A thrown non-error value, printed.
    pub uncaught: Option<String>,
    pub console: Vec<ConsoleLine>,
}

#[derive(Debug, Serialize)]
pub struct RenderedResult {
    /// `node`, `component` or `text`.
    pub kind: &'static str,
    pub markup: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    /// The error as shown in a status line, excerpts included.
    pub display: String,
    #[serde(flatten)]
    pub detail: LiveError,
}

impl From<LiveError> for ErrorOutput {
    fn from(detail: LiveError) -> Self {
        Self {
            display: detail.to_string(),
            detail,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConsoleLine {
    pub level: &'static str,
    pub message: String,
}

fn level_name(level: ConsoleLevel) -> &'static str {
    match level {
        ConsoleLevel::Log => "log",
        ConsoleLevel::Info => "info",
        ConsoleLevel::Debug => "debug",
        ConsoleLevel::Warn => "warn",
        ConsoleLevel::Error => "error",
    }
}

fn failed(error: LiveError) -> ExecuteOutput {
    ExecuteOutput {
        success: false,
        result: None,
        error: Some(error.into()),
        uncaught: None,
        console: Vec::new(),
    }
}

/// Run `code` against `scope` and expand the result to markup.
pub fn run(code: &str, scope: &Scope) -> ExecuteOutput {
    let mut runner = livecode::Runner::new();
    let outcome = runner.execute(code, scope);
    let console = runner
        .sandbox()
        .console()
        .iter()
        .map(|entry| ConsoleLine {
            level: level_name(entry.level),
            message: entry.message.clone(),
        })
        .collect();

    let mut output = match outcome {
        Ok(execution) => from_execution(execution),
        Err(Uncaught(value)) => ExecuteOutput {
            success: false,
            result: None,
            error: None,
            uncaught: Some(inspect(&value)),
            console: Vec::new(),
        },
    };
    output.console = console;
    output
}

fn from_execution(execution: Execution) -> ExecuteOutput {
    if let Some(error) = execution.error {
        return failed(error);
    }
    let Some(result) = execution.result else {
        return ExecuteOutput {
            success: true,
            result: None,
            error: None,
            uncaught: None,
            console: Vec::new(),
        };
    };
    match render(&result) {
        Ok(rendered) => ExecuteOutput {
            success: true,
            result: Some(rendered),
            error: None,
            uncaught: None,
            console: Vec::new(),
        },
        Err(error) => failed(error),
    }
}

fn render(result: &Renderable) -> Result<RenderedResult, LiveError> {
    Ok(RenderedResult {
        kind: result.kind(),
        markup: render_markup(result)?,
    })
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"result":null,"error":{{"display":"Serialization error: {e}"}},"uncaught":null,"console":[]}}"#
        )
    })
}

fn scope_error(message: String) -> ExecuteOutput {
    failed(LiveError::new(Stage::Evaluate, message))
}

/// Execute `code` with a scope given as JSON text (`""` for none).
///
/// Returns a JSON string containing an `ExecuteOutput`:
/// ```json
/// { "success": true, "result": { "kind": "node", "markup": "<div>Hi</div>" },
///   "error": null, "uncaught": null, "console": [] }
/// ```
#[wasm_bindgen]
pub fn execute(code: &str, scope_json: &str) -> String {
    let output = if scope_json.trim().is_empty() {
        run(code, &Scope::new())
    } else {
        match serde_json::from_str::<serde_json::Value>(scope_json)
            .map_err(|e| e.to_string())
            .and_then(|json| Scope::from_json(json).map_err(|e| e.to_string()))
        {
            Ok(scope) => run(code, &scope),
            Err(message) => scope_error(message),
        }
    };
    to_json(&output)
}

/// Execute `code` with a scope passed as a plain JavaScript object. The
/// output is a plain object with `null` for absent fields.
#[wasm_bindgen]
pub fn execute_with_scope(code: &str, scope: JsValue) -> Result<JsValue, JsValue> {
    let output = if scope.is_undefined() || scope.is_null() {
        run(code, &Scope::new())
    } else {
        let json: serde_json::Value = serde_wasm_bindgen::from_value(scope)?;
        match Scope::from_json(json) {
            Ok(scope) => run(code, &scope),
            Err(e) => scope_error(e.to_string()),
        }
    };
    output
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Add the `export default` marker the way `execute` does, for editors
/// that show the normalized source.
#[wasm_bindgen]
pub fn normalize(code: &str) -> String {
    livecode::normalize(code).into_owned()
}

/// Transpile `code` with the default options.
///
/// Returns `{ "success": true, "code": "..." }` or
/// `{ "success": false, "error": { ... } }`.
#[wasm_bindgen]
pub fn transpile(code: &str) -> String {
    #[derive(Serialize)]
    struct TranspileOutput {
        success: bool,
        code: Option<String>,
        error: Option<ErrorOutput>,
    }

    let adapter = livecode::TransformAdapter::default();
    let output = match adapter.transform(&livecode::normalize(code)) {
        Ok(code) => TranspileOutput {
            success: true,
            code: Some(code),
            error: None,
        },
        Err(error) => TranspileOutput {
            success: false,
            code: None,
            error: Some(error.into()),
        },
    };
    to_json(&output)
}

/// Return the livecode version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_execute_renders_markup() {
        let out = parse(&execute("<b>{name}</b>", r#"{ "name": "Ada" }"#));
        assert_eq!(out["success"], json!(true));
        assert_eq!(out["result"], json!({ "kind": "node", "markup": "<b>Ada</b>" }));
        assert_eq!(out["error"], Value::Null);
    }

    #[test]
    fn test_execute_empty_scope_and_code() {
        let out = parse(&execute("", ""));
        assert_eq!(out["success"], json!(true));
        assert_eq!(out["result"], Value::Null);
    }

    #[test]
    fn test_execute_reports_errors() {
        let out = parse(&execute("null.x;", "{}"));
        assert_eq!(out["success"], json!(false));
        assert_eq!(out["error"]["stage"], json!("evaluate"));
        assert!(out["error"]["message"].as_str().unwrap().starts_with("TypeError"));
        assert!(out["error"]["display"].as_str().unwrap().starts_with("evaluate error: TypeError"));
    }

    #[test]
    fn test_execute_bad_scope() {
        let out = parse(&execute("<b/>", "[1]"));
        assert_eq!(out["success"], json!(false));
        assert_eq!(
            out["error"]["message"],
            json!("scope must be a JSON object, got an array")
        );
    }

    #[test]
    fn test_uncaught_and_console() {
        let out = parse(&execute("console.warn('careful');\nthrow 'nope';", ""));
        assert_eq!(out["uncaught"], json!("'nope'"));
        assert_eq!(out["console"], json!([{ "level": "warn", "message": "careful" }]));
    }

    #[test]
    fn test_transpile_and_normalize() {
        assert_eq!(normalize("<i/>"), "export default <i/>");
        let out = parse(&transpile("<i/>"));
        assert_eq!(out["code"], json!("exports.default = React.createElement(\"i\", null);\n"));
        let out = parse(&transpile("<i>"));
        assert_eq!(out["success"], json!(false));
        assert_eq!(out["error"]["stage"], json!("transform"));
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
