//! Per-evaluation scope: root context, current ("this") context, global
//! variable bindings and the local variable frame.

use std::collections::HashMap;

use crate::engine::ds::value::Value;

/// Caller-supplied global variable bindings. Read-only from the engine's
/// perspective; may hold user-registered extensions and lambdas.
pub type Variables = HashMap<String, Value>;

/// Local variable frame installed while a lambda body runs.
pub type LocalFrame = HashMap<String, Value>;

/// Holds the state of a single top-level evaluation. Created fresh per
/// `get_value`/`set_value` call and never shared between calls.
pub struct EvaluationContext<'a> {
    root: Value,
    this: Value,
    variables: Option<&'a Variables>,
    locals: Option<LocalFrame>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(root: Value, variables: Option<&'a Variables>) -> Self {
        let this = root.clone();
        EvaluationContext {
            root,
            this,
            variables,
            locals: None,
        }
    }

    /// The value evaluation started against. Fixed for the call's lifetime.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The current implicit receiver.
    pub fn this(&self) -> &Value {
        &self.this
    }

    /// Looks up a global variable binding.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.and_then(|vars| vars.get(name))
    }

    /// Looks up a local variable in the active frame.
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.as_ref().and_then(|frame| frame.get(name))
    }

    /// Runs `f` with `this` switched to `value`, restoring the previous
    /// receiver on every exit path.
    pub fn with_this<T>(
        &mut self,
        value: Value,
        f: impl FnOnce(&mut EvaluationContext<'a>) -> T,
    ) -> T {
        let saved = std::mem::replace(&mut self.this, value);
        let result = f(self);
        self.this = saved;
        result
    }

    /// Runs `f` with `frame` installed as the local variable frame, restoring
    /// the previous frame on every exit path. Frames replace each other
    /// wholesale; they are never merged.
    pub fn with_locals<T>(
        &mut self,
        frame: LocalFrame,
        f: impl FnOnce(&mut EvaluationContext<'a>) -> T,
    ) -> T {
        let saved = self.locals.replace(frame);
        let result = f(self);
        self.locals = saved;
        result
    }
}
