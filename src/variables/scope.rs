//! Layered variable scopes with ambient read fallback.

use im::HashMap;
use serde::{Deserialize, Serialize};

/// A variable value. Substitution is textual; the engine never interprets
/// expressions, so the only distinction that matters is scalar vs list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    /// Text form used when a value is substituted into scalar position.
    pub fn as_text(&self) -> String {
        match self {
            Value::Scalar(s) => s.clone(),
            Value::List(items) => format!("[{}]", items.join(", ")),
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            Value::Scalar(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

type Frame = HashMap<String, Value>;

/// A stack of variable frames. The bottom frame is the ambient scope; one
/// additional frame is opened per table expansion and discarded afterwards,
/// restoring the ambient scope exactly.
///
/// Opening a frame snapshots all currently-visible bindings into it, so a
/// scenario body can reference outer-scope variables alongside example
/// columns. The snapshot is a structural copy of the innermost frame, which
/// `im::HashMap` makes O(1).
#[derive(Debug, Clone)]
pub struct Variables {
    frames: Vec<Frame>,
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

impl Variables {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new()],
        }
    }

    /// Bind one variable in the innermost frame.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.innermost_mut().insert(name.into(), value.into());
    }

    /// Bind every entry of a record into the innermost frame. Every key is
    /// overwritten unconditionally; reusing one frame across rows is only
    /// sound because the full record is re-bound for every row.
    pub fn bind_all<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let frame = self.innermost_mut();
        for (name, value) in entries {
            frame.insert(name.to_string(), Value::Scalar(value.to_string()));
        }
    }

    /// Look up a variable, innermost frame first, falling back outward.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Open a new frame pre-populated with everything currently visible.
    pub fn start_frame(&mut self) {
        let snapshot = self.innermost().clone();
        self.frames.push(snapshot);
    }

    /// Discard the innermost frame, restoring the scope that was visible
    /// before the matching `start_frame`. The ambient frame is never popped.
    pub fn end_frame(&mut self) {
        debug_assert!(
            self.frames.len() > 1,
            "end_frame without a matching start_frame"
        );
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Number of open frames, including the ambient frame.
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    fn innermost(&self) -> &Frame {
        self.frames.last().expect("frame stack is never empty")
    }

    fn innermost_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("frame stack is never empty")
    }
}
