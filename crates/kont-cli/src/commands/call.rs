//! `kont call` — single request/response call.

use super::{connect, parse_json_arg, print_json, ConnectionArgs};

pub async fn run(conn: &ConnectionArgs, method: &str, params: &str) -> Result<(), String> {
    let params = parse_json_arg("args", params)?;
    let client = connect(conn)?;

    let result = client
        .call(method, params)
        .await
        .map_err(|e| format!("{} failed: {}", method, e))?;

    print_json(&result);
    Ok(())
}
