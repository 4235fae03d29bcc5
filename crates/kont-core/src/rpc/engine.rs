//! Continuation engine — drives one interactive call to completion.
//!
//! An interactive call may suspend on the server, which then asks the client
//! to run one of its registered callbacks. The engine runs the callback, sends
//! the result back under the server's correlation id, and keeps going until the
//! server answers `Done`.
//!
//! ```text
//! Sending ──► AwaitingServer ──Done──► Done
//!                ▲      │
//!                │     Kont
//!                │      ▼
//!                └── Dispatching ──error──► Failed
//! ```
//!
//! Exactly one exchange is outstanding at any time. Dropping the returned
//! future stops the loop; nothing further is sent.

use std::collections::HashSet;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tracing::Instrument;

use super::client::RpcClient;
use super::registry::{self, Bindings, CallbackTable};
use super::transport::Transport;
use super::types::{
    normalize_method, CallDescriptor, KontReply, KontRequest, ServerMessage, KONT_PATH,
};
use crate::error::ClientError;

/// Exchange currently on the wire.
type InFlight<'a> = BoxFuture<'a, Result<Value, ClientError>>;

enum State<'a> {
    /// Opening request not yet sent.
    Sending,
    /// Waiting on the response to the opening request or a continuation.
    AwaitingServer(InFlight<'a>),
    /// The server asked for a callback.
    Dispatching(KontRequest),
    Done(Value),
    Failed(ClientError),
}

impl State<'_> {
    fn name(&self) -> &'static str {
        match self {
            State::Sending => "Sending",
            State::AwaitingServer(_) => "AwaitingServer",
            State::Dispatching(_) => "Dispatching",
            State::Done(_) => "Done",
            State::Failed(_) => "Failed",
        }
    }
}

/// Runs interactive calls over a `RpcClient`.
pub struct KontEngine<T> {
    rpc: RpcClient<T>,
    kont_path: String,
}

impl<T> Clone for KontEngine<T> {
    fn clone(&self) -> Self {
        Self {
            rpc: self.rpc.clone(),
            kont_path: self.kont_path.clone(),
        }
    }
}

impl<T: Transport> KontEngine<T> {
    pub fn new(rpc: RpcClient<T>) -> Self {
        Self {
            rpc,
            kont_path: KONT_PATH.to_string(),
        }
    }

    /// Send continuations somewhere other than `/kont`.
    pub fn with_kont_path(mut self, kont_path: impl Into<String>) -> Self {
        self.kont_path = kont_path.into();
        self
    }

    pub fn rpc(&self) -> &RpcClient<T> {
        &self.rpc
    }

    /// Call `method` with `positional_args`, answering server callbacks from
    /// `bindings` until the server produces a final answer.
    pub async fn invoke_interactive(
        &self,
        method: &str,
        positional_args: Vec<Value>,
        bindings: Bindings,
    ) -> Result<Value, ClientError> {
        let method = normalize_method(method)?;
        let kont_path = normalize_method(&self.kont_path)?;

        let split = registry::split(bindings);
        let descriptor = CallDescriptor {
            method,
            positional_args,
            values: split.values,
            methods: split.methods,
        };

        let call = Interaction {
            rpc: &self.rpc,
            kont_path,
            table: split.table,
            answered: HashSet::new(),
        };

        let span = tracing::debug_span!(
            "kont_call",
            call_id = %uuid::Uuid::new_v4(),
            method = %descriptor.method
        );
        call.run(descriptor).instrument(span).await
    }
}

/// State owned by a single interactive call.
struct Interaction<'a, T> {
    rpc: &'a RpcClient<T>,
    kont_path: String,
    table: CallbackTable,
    /// Correlation ids already replied to.
    answered: HashSet<String>,
}

impl<'a, T: Transport> Interaction<'a, T> {
    async fn run(mut self, descriptor: CallDescriptor) -> Result<Value, ClientError> {
        let mut state = State::Sending;
        loop {
            tracing::trace!("[KontEngine] state = {}", state.name());
            state = match state {
                State::Sending => State::AwaitingServer(
                    self.send(descriptor.method.clone(), descriptor.to_params()),
                ),
                State::AwaitingServer(in_flight) => match in_flight.await {
                    Ok(response) => self.interpret(response),
                    Err(e) => State::Failed(e),
                },
                State::Dispatching(request) => self.dispatch(request).await,
                State::Done(answer) => {
                    tracing::debug!(
                        "[KontEngine] {} done after {} continuation(s)",
                        descriptor.method,
                        self.answered.len()
                    );
                    return Ok(answer);
                }
                State::Failed(err) => {
                    tracing::warn!("[KontEngine] {} failed: {}", descriptor.method, err);
                    return Err(err);
                }
            };
        }
    }

    /// Start one exchange. Nothing is sent until the returned future is polled.
    fn send(&self, path: String, params: Value) -> InFlight<'a> {
        let rpc = self.rpc;
        async move { rpc.call(&path, params).await }.boxed()
    }

    fn interpret(&self, response: Value) -> State<'a> {
        match ServerMessage::parse(response) {
            Ok(ServerMessage::Done { answer }) => State::Done(answer),
            Ok(ServerMessage::Kont(request)) => {
                if self.answered.contains(&kid_key(&request.kid)) {
                    return State::Failed(ClientError::Protocol(format!(
                        "correlation id {} was already answered",
                        request.kid
                    )));
                }
                State::Dispatching(request)
            }
            Err(e) => State::Failed(e),
        }
    }

    async fn dispatch(&mut self, request: KontRequest) -> State<'a> {
        let KontRequest {
            callback: name,
            kid,
            args,
        } = request;

        let Some(callback) = self.table.get(&name) else {
            return State::Failed(ClientError::UnknownCallback(format!(
                "server requested '{}', registered: [{}]",
                name,
                self.table.names().join(", ")
            )));
        };

        tracing::debug!(
            "[KontEngine] Kont '{}' (kid={}, {} arg(s))",
            name,
            kid,
            args.len()
        );

        let answer = match callback.invoke(args).await {
            Ok(answer) => answer,
            Err(message) => return State::Failed(ClientError::Callback { name, message }),
        };

        self.answered.insert(kid_key(&kid));
        let reply = KontReply { kid, answer };
        State::AwaitingServer(self.send(self.kont_path.clone(), reply.to_params()))
    }
}

/// `"1"` and `1` are distinct ids, so key on the JSON text.
fn kid_key(kid: &Value) -> String {
    kid.to_string()
}
