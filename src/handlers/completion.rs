//! Completion handle used to finish a single invocation.
//!
//! A [`Completion`] is a builder: status, body and token setters return the
//! handle, and the terminal calls [`Completion::next`] or
//! [`Completion::done`] consume it into a [`Completed`]. Handlers must return
//! that value, so every invocation produces exactly one terminal call.

use axum::http::StatusCode;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct Completion {
    status: StatusCode,
    body: Option<Value>,
    token: Option<String>,
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl Completion {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
            token: None,
        }
    }

    pub fn set_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn set_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn ok(self) -> Self {
        self.status(StatusCode::OK)
    }

    pub fn created(self) -> Self {
        self.status(StatusCode::CREATED)
    }

    pub fn accepted(self) -> Self {
        self.status(StatusCode::ACCEPTED)
    }

    pub fn bad_request(self) -> Self {
        self.status(StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(self) -> Self {
        self.status(StatusCode::UNAUTHORIZED)
    }

    pub fn forbidden(self) -> Self {
        self.status(StatusCode::FORBIDDEN)
    }

    pub fn not_found(self) -> Self {
        self.status(StatusCode::NOT_FOUND)
    }

    pub fn not_allowed(self) -> Self {
        self.status(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn not_implemented(self) -> Self {
        self.status(StatusCode::NOT_IMPLEMENTED)
    }

    pub fn runtime_error(self) -> Self {
        self.status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Finish and let the rest of the hook chain run
    pub fn next(self) -> Completed {
        self.finish(true)
    }

    /// Finish and stop the hook chain
    pub fn done(self) -> Completed {
        self.finish(false)
    }

    fn finish(self, continue_chain: bool) -> Completed {
        Completed {
            status: self.status,
            body: merge_token(self.body, self.token.as_deref()),
            token: self.token,
            continue_chain,
        }
    }
}

fn merge_token(body: Option<Value>, token: Option<&str>) -> Option<Value> {
    let Some(token) = token else {
        return body;
    };

    let mut object = match body {
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut map = Map::new();
            map.insert("body".to_string(), other);
            map
        }
        None => Map::new(),
    };
    object.insert("token".to_string(), Value::String(token.to_string()));
    Some(Value::Object(object))
}

/// Result of the single terminal call on a [`Completion`]
#[derive(Debug, Clone)]
pub struct Completed {
    status: StatusCode,
    body: Option<Value>,
    token: Option<String>,
    continue_chain: bool,
}

impl Completed {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn continues_chain(&self) -> bool {
        self.continue_chain
    }

    pub fn into_parts(self) -> (StatusCode, Option<Value>, bool) {
        (self.status, self.body, self.continue_chain)
    }
}
