//! Narrow interfaces onto the validator engine.
//!
//! The full engine - schema expansion, attribute walking, skip-on-empty
//! handling - lives outside this crate. These traits are the only surface the
//! adapter and the lifecycle orchestrator depend on.

use crate::dataset::Dataset;
use crate::message::PendingMessage;

/// Opaque reference to the active validator, as seen by rule adapters.
///
/// Validator-aware rules receive a shared handle to this context before each
/// check, and data-aware rules receive a snapshot of [`data`](Self::data).
/// The handle is request-scoped: it must not be cached past the check it was
/// injected for.
pub trait ValidatorContext {
    /// The full dataset currently under validation.
    fn data(&self) -> &Dataset;
}

/// A hook appended to a validator, run after rule evaluation completes.
pub type AfterValidationHook = Box<dyn FnOnce(&mut dyn Validator)>;

/// The validator instance contract the lifecycle orchestrator consumes.
///
/// Instances are built by the out-of-scope engine, bound to one object's data
/// and declared rules, and owned by exactly one orchestration run.
pub trait Validator {
    /// Runs rule evaluation and reports whether any rule failed.
    fn fails(&mut self) -> bool;

    /// Appends an after-validation hook.
    ///
    /// Hooks already present must be retained; appended hooks run after them
    /// in registration order.
    fn after(&mut self, hook: AfterValidationHook);

    /// The pending messages collected by the most recent evaluation.
    fn messages(&self) -> Vec<PendingMessage>;
}
