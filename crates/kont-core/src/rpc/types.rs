//! Wire types for the interactive call protocol.
//!
//! ```text
//! client                                   server
//!   POST /method  [..args, values, methods] ->
//!               <- { "t": "Kont", "m": "getHand", "kid": "k1", "args": [] }
//!   POST /kont    ["k1", 1]                 ->
//!               <- { "t": "Done", "ans": "ok" }
//! ```

use serde_json::{Map, Value};

use crate::error::ClientError;

/// Endpoint receiving continuation replies.
pub const KONT_PATH: &str = "/kont";
/// Leading separator every method path is normalized to.
pub const PATH_SEPARATOR: char = '/';

pub const TAG_DONE: &str = "Done";
pub const TAG_KONT: &str = "Kont";

pub const FIELD_TAG: &str = "t";
pub const FIELD_ANSWER: &str = "ans";
pub const FIELD_METHOD: &str = "m";
pub const FIELD_KID: &str = "kid";
pub const FIELD_ARGS: &str = "args";

/// Normalize a method path: trim whitespace and ensure a leading `/`.
pub fn normalize_method(method: &str) -> Result<String, ClientError> {
    let trimmed = method.trim();
    if trimmed.trim_start_matches(PATH_SEPARATOR).is_empty() {
        return Err(ClientError::InvalidArgument(format!(
            "method path must not be empty (got {:?})",
            method
        )));
    }
    if trimmed.starts_with(PATH_SEPARATOR) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}{}", PATH_SEPARATOR, trimmed))
    }
}

/// Everything sent with the opening request of an interactive call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    pub method: String,
    pub positional_args: Vec<Value>,
    /// Plain data bindings.
    pub values: Map<String, Value>,
    /// Callback names, each mapped to `true`.
    pub methods: Map<String, Value>,
}

impl CallDescriptor {
    /// Wire params: the positional args followed by `values` and `methods`.
    pub fn to_params(&self) -> Value {
        let mut params = Vec::with_capacity(self.positional_args.len() + 2);
        params.extend(self.positional_args.iter().cloned());
        params.push(Value::Object(self.values.clone()));
        params.push(Value::Object(self.methods.clone()));
        Value::Array(params)
    }
}

/// A server request to run a callback.
#[derive(Debug, Clone, PartialEq)]
pub struct KontRequest {
    pub callback: String,
    /// Correlation token, string or number, echoed verbatim.
    pub kid: Value,
    pub args: Vec<Value>,
}

/// One step of an interactive call as seen from the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Done { answer: Value },
    Kont(KontRequest),
}

impl ServerMessage {
    pub fn parse(value: Value) -> Result<Self, ClientError> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(ClientError::Protocol(format!(
                    "expected a message object, got {}",
                    other
                )))
            }
        };

        let tag = match obj.get(FIELD_TAG) {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => {
                return Err(ClientError::Protocol(format!(
                    "message tag must be a string, got {}",
                    other
                )))
            }
            None => return Err(ClientError::Protocol("message has no tag".into())),
        };

        match tag.as_str() {
            TAG_DONE => Ok(ServerMessage::Done {
                answer: obj.remove(FIELD_ANSWER).unwrap_or(Value::Null),
            }),
            TAG_KONT => {
                let callback = match obj.remove(FIELD_METHOD) {
                    Some(Value::String(name)) => name,
                    _ => {
                        return Err(ClientError::Protocol(
                            "Kont message without a callback name".into(),
                        ))
                    }
                };
                let kid = match obj.remove(FIELD_KID) {
                    Some(kid @ (Value::String(_) | Value::Number(_))) => kid,
                    other => {
                        return Err(ClientError::Protocol(format!(
                            "Kont message has invalid correlation id: {}",
                            other.unwrap_or(Value::Null)
                        )))
                    }
                };
                let args = match obj.remove(FIELD_ARGS) {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(args)) => args,
                    Some(other) => {
                        return Err(ClientError::Protocol(format!(
                            "Kont args must be an array, got {}",
                            other
                        )))
                    }
                };
                Ok(ServerMessage::Kont(KontRequest {
                    callback,
                    kid,
                    args,
                }))
            }
            other => Err(ClientError::Protocol(format!(
                "unrecognized message tag '{}'",
                other
            ))),
        }
    }
}

/// A callback's result, sent back under the triggering `kid`.
#[derive(Debug, Clone, PartialEq)]
pub struct KontReply {
    pub kid: Value,
    pub answer: Value,
}

impl KontReply {
    pub fn to_params(&self) -> Value {
        Value::Array(vec![self.kid.clone(), self.answer.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_method() {
        assert_eq!(normalize_method("m").unwrap(), "/m");
        assert_eq!(normalize_method("/m").unwrap(), "/m");
        assert_eq!(normalize_method("  rps/play ").unwrap(), "/rps/play");
        assert!(matches!(
            normalize_method(""),
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            normalize_method("/"),
            Err(ClientError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_descriptor_params_end_with_values_and_methods() {
        let mut values = Map::new();
        values.insert("player".into(), json!("alice"));
        let mut methods = Map::new();
        methods.insert("getHand".into(), json!(true));
        let descriptor = CallDescriptor {
            method: "/play".into(),
            positional_args: vec![json!(1), json!("two")],
            values,
            methods,
        };
        assert_eq!(
            descriptor.to_params(),
            json!([1, "two", {"player": "alice"}, {"getHand": true}])
        );
    }

    #[test]
    fn test_parse_done() {
        let msg = ServerMessage::parse(json!({"t": "Done", "ans": 42})).unwrap();
        assert_eq!(msg, ServerMessage::Done { answer: json!(42) });

        let msg = ServerMessage::parse(json!({"t": "Done"})).unwrap();
        assert_eq!(msg, ServerMessage::Done { answer: Value::Null });
    }

    #[test]
    fn test_parse_kont() {
        let msg = ServerMessage::parse(json!({
            "t": "Kont", "m": "getHand", "kid": 7, "args": ["round", 1]
        }))
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::Kont(KontRequest {
                callback: "getHand".into(),
                kid: json!(7),
                args: vec![json!("round"), json!(1)],
            })
        );

        let msg = ServerMessage::parse(json!({"t": "Kont", "m": "f", "kid": "k"})).unwrap();
        let ServerMessage::Kont(req) = msg else {
            panic!("expected Kont");
        };
        assert!(req.args.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_messages() {
        for bad in [
            json!({"t": "Weird"}),
            json!({"ans": 1}),
            json!({"t": 3}),
            json!([1, 2]),
            json!({"t": "Kont", "kid": "k"}),
            json!({"t": "Kont", "m": "f"}),
            json!({"t": "Kont", "m": "f", "kid": {"nested": true}}),
            json!({"t": "Kont", "m": "f", "kid": "k", "args": "oops"}),
        ] {
            assert!(
                matches!(ServerMessage::parse(bad.clone()), Err(ClientError::Protocol(_))),
                "expected protocol violation for {}",
                bad
            );
        }
    }

    #[test]
    fn test_kont_reply_params() {
        let reply = KontReply {
            kid: json!("k1"),
            answer: json!({"hand": "rock"}),
        };
        assert_eq!(reply.to_params(), json!(["k1", {"hand": "rock"}]));
    }
}
