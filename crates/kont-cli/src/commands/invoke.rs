//! `kont invoke` — interactive call with server-initiated callbacks.
//!
//! Callbacks come from two flags:
//!   --answer NAME=JSON   always answer NAME with the given JSON value
//!   --ask NAME           show the server's args and prompt the terminal user

use console::style;
use dialoguer::Input;
use kont_core::{Bindings, Callback, FaultSide};
use serde_json::Value;

use super::{connect, parse_json_arg, parse_positional_args, print_json, ConnectionArgs};

pub struct InvokeArgs<'a> {
    pub method: &'a str,
    pub args: &'a str,
    pub values: Option<&'a str>,
    pub answers: &'a [String],
    pub asks: &'a [String],
}

pub async fn run(conn: &ConnectionArgs, invoke: InvokeArgs<'_>) -> Result<(), String> {
    let positional = parse_positional_args(invoke.args)?;
    let bindings = build_bindings(invoke.values, invoke.answers, invoke.asks, ask_callback)?;
    let client = connect(conn)?;

    tracing::info!(
        "[kont invoke] {} with {} binding(s)",
        invoke.method,
        bindings.len()
    );

    match client
        .invoke_interactive(invoke.method, positional, bindings)
        .await
    {
        Ok(answer) => {
            print_json(&answer);
            Ok(())
        }
        Err(e) => {
            let side = match e.side() {
                FaultSide::Server => "server",
                FaultSide::Callback => "callback",
                FaultSide::Caller => "caller",
            };
            Err(format!("{} failed ({} problem): {}", invoke.method, side, e))
        }
    }
}

/// Split `NAME=JSON` into its name and parsed value.
pub fn parse_answer_spec(spec: &str) -> Result<(String, Value), String> {
    let (name, raw) = spec
        .split_once('=')
        .ok_or_else(|| format!("--answer expects NAME=JSON, got '{}'", spec))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("--answer has an empty callback name: '{}'", spec));
    }
    let value = parse_json_arg(&format!("answer {}", name), raw)?;
    Ok((name.to_string(), value))
}

/// Assemble the binding map for an interactive call.
///
/// `values` must be a JSON object; each of its entries becomes a plain value.
/// `make_ask` builds the callback used for every `--ask` name. A name may only
/// be bound once across all three sources.
pub fn build_bindings(
    values: Option<&str>,
    answers: &[String],
    asks: &[String],
    make_ask: impl Fn(String) -> Callback,
) -> Result<Bindings, String> {
    let mut bindings = Bindings::new();

    let bind = |bindings: &mut Bindings, name: String, binding: kont_core::Binding| {
        if bindings.get(&name).is_some() {
            return Err(format!("'{}' is bound more than once", name));
        }
        bindings.insert(name, binding);
        Ok(())
    };

    if let Some(raw) = values {
        match parse_json_arg("values", raw)? {
            Value::Object(map) => {
                for (name, value) in map {
                    bind(&mut bindings, name, value.into())?;
                }
            }
            other => return Err(format!("--values must be a JSON object, got {}", other)),
        }
    }

    for spec in answers {
        let (name, value) = parse_answer_spec(spec)?;
        let callback = Callback::sync(move |_| Ok(value.clone()));
        bind(&mut bindings, name, callback.into())?;
    }

    for name in asks {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err("--ask expects a callback name".into());
        }
        let callback = make_ask(name.clone());
        bind(&mut bindings, name, callback.into())?;
    }

    Ok(bindings)
}

/// Callback that prompts on the terminal. Runs on the blocking pool so the
/// runtime stays responsive while waiting for input.
fn ask_callback(name: String) -> Callback {
    Callback::new(move |args| {
        let name = name.clone();
        async move {
            match tokio::task::spawn_blocking(move || prompt_answer(&name, &args)).await {
                Ok(result) => result,
                Err(e) => Err(format!("prompt task failed: {}", e)),
            }
        }
    })
}

fn prompt_answer(name: &str, args: &[Value]) -> Result<Value, String> {
    println!();
    println!(
        "{} {}",
        style("Server asks for").cyan().bold(),
        style(name).yellow().bold()
    );
    for (i, arg) in args.iter().enumerate() {
        println!("  arg[{}] = {}", i, arg);
    }

    let raw: String = Input::new()
        .with_prompt("Answer (JSON)")
        .validate_with(|input: &String| -> Result<(), String> {
            serde_json::from_str::<Value>(input)
                .map(|_| ())
                .map_err(|e| format!("not valid JSON: {}", e))
        })
        .interact_text()
        .map_err(|e| format!("failed to read answer for '{}': {}", name, e))?;

    serde_json::from_str(&raw).map_err(|e| format!("not valid JSON: {}", e))
}
