//! Cache key derivation.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Keys longer than this collapse to a digest.
pub const MAX_KEY_LENGTH: usize = 200;

/// Rendering of an absent optional argument.
const NONE: &str = "None";

/// Stringified arguments of one invocation.
///
/// Positional arguments keep call order; named arguments are ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    positional: Vec<String>,
    named: BTreeMap<String, String>,
}

impl CallArgs {
    /// Positional arguments in call order.
    #[must_use]
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Named arguments, ordered by name.
    #[must_use]
    pub const fn named(&self) -> &BTreeMap<String, String> {
        &self.named
    }

    /// Positional argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Named argument `name`.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }
}

/// An operation invocation: the name plus its arguments. The receiver is
/// never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    operation: &'static str,
    args: CallArgs,
}

impl Call {
    /// Starts a call description for `operation`.
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            args: CallArgs::default(),
        }
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Display) -> Self {
        self.args.positional.push(value.to_string());
        self
    }

    /// Appends an optional positional argument, `None` when absent.
    #[must_use]
    pub fn opt<T: Display>(self, value: Option<T>) -> Self {
        match value {
            Some(value) => self.arg(value),
            None => self.arg(NONE),
        }
    }

    /// Appends a positional argument rendered as compact JSON.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        let rendered = serde_json::to_string(value).unwrap_or_else(|_| NONE.to_string());
        self.arg(rendered)
    }

    /// Sets a named argument.
    #[must_use]
    pub fn named(mut self, name: &str, value: impl Display) -> Self {
        self.args.named.insert(name.to_string(), value.to_string());
        self
    }

    /// The operation name.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// The stringified arguments.
    #[must_use]
    pub const fn args(&self) -> &CallArgs {
        &self.args
    }
}

/// Derives the cache key for `call` under `prefix`.
///
/// `prefix:operation:pos1:pos2:...:name1:value1:...`, with named arguments
/// sorted by name. Keys over [`MAX_KEY_LENGTH`] characters become
/// `prefix:operation:hash:<md5 hex>` of the full key. Arguments whose text
/// forms are equal yield the same key.
#[must_use]
pub fn build_key(prefix: &str, call: &Call) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(2 + call.args.positional.len());
    parts.push(prefix);
    parts.push(call.operation);
    parts.extend(call.args.positional.iter().map(String::as_str));

    let named: Vec<String> = call
        .args
        .named
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value))
        .collect();
    parts.extend(named.iter().map(String::as_str));

    let key = parts.join(":");
    if key.chars().count() > MAX_KEY_LENGTH {
        return format!(
            "{}:{}:hash:{:x}",
            prefix,
            call.operation,
            md5::compute(key.as_bytes())
        );
    }
    key
}

/// Prefix-qualified form of a literal key or glob pattern.
#[must_use]
pub fn qualify(prefix: &str, pattern: &str) -> String {
    format!("{}:{}", prefix, pattern)
}
