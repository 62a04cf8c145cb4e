use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::dataset::Dataset;
use crate::message::{FailSignal, PendingMessage, ValidationOutcome};
use crate::rule::RuleInvokable;
use crate::validator::ValidatorContext;

/// Adapts one user-authored rule object to the uniform execution contract the
/// validator engine consumes.
///
/// An adapter wraps exactly one [`RuleInvokable`] for its whole lifetime. It
/// normalizes capability injection (dataset and validator context), dispatches
/// to whichever call convention the rule implements, and reduces everything a
/// rule can do to a single contract: `passes` returns `false` exactly when
/// the rule invoked its fail signal, and [`message`](Self::message) exposes
/// the pending messages that call produced.
///
/// The engine treats an adapter as if it were itself a primitive rule. One
/// adapter is typically created per rule declaration and reused across every
/// attribute/value pair the schema applies it to; it is also cheap enough to
/// construct per run, which is the recommended pattern when sharing across
/// threads would otherwise be needed.
///
/// # Examples
///
/// ```
/// use rule_core::{FailSignal, RuleAdapter, RuleCapabilities, RuleInvokable, ValidationRule};
/// use serde_json::{json, Value};
///
/// struct NonEmpty;
///
/// impl RuleCapabilities for NonEmpty {}
///
/// impl ValidationRule for NonEmpty {
///     fn validate(&self, _attribute: &str, value: &Value, fail: &mut FailSignal<'_>) {
///         if value.as_str().map_or(true, str::is_empty) {
///             fail.fail().message("must not be empty");
///         }
///     }
/// }
///
/// let mut adapter = RuleAdapter::make(RuleInvokable::Validate(Box::new(NonEmpty)));
///
/// assert!(adapter.passes("name", &json!("Alice")));
/// assert!(!adapter.passes("name", &json!("")));
/// assert_eq!(adapter.message()[0].template.as_deref(), Some("must not be empty"));
/// ```
pub struct RuleAdapter {
    invokable: RuleInvokable,
    implicit: bool,
    data: Dataset,
    validator: Option<Arc<dyn ValidatorContext>>,
    last_outcome: ValidationOutcome,
}

impl RuleAdapter {
    /// Wraps a rule object, fixing its implicit tag for the adapter's
    /// lifetime.
    ///
    /// The rule's implicit flag is read exactly once, here. An adapter tagged
    /// implicit must be invoked by the consuming engine even when the
    /// attribute's value is absent or empty; a plain adapter follows the
    /// engine's default skip-on-empty policy. The tag is exposed through
    /// [`is_implicit`](Self::is_implicit) for the engine to branch on - the
    /// adapter itself never skips.
    pub fn make(invokable: impl Into<RuleInvokable>) -> Self {
        let invokable = invokable.into();
        let implicit = invokable.implicit();

        Self {
            invokable,
            implicit,
            data: Dataset::new(),
            validator: None,
            last_outcome: ValidationOutcome::new(),
        }
    }

    /// Runs the wrapped rule against one attribute/value pair.
    ///
    /// Failure state is reset at the start of every call; the previous call's
    /// messages are discarded. Capability injection happens on every call,
    /// immediately before dispatch, so data-aware rules always observe the
    /// current dataset.
    ///
    /// Returns `true` when the rule never invoked its fail signal. The
    /// messages collected by this call are available from
    /// [`message`](Self::message) until the next call.
    ///
    /// # Panics
    ///
    /// A panic inside the rule's entrypoint is not caught: a misbehaving rule
    /// aborts the validation run rather than being mistaken for a passing or
    /// failing check.
    pub fn passes(&mut self, attribute: &str, value: &Value) -> bool {
        let outcome = self.evaluate(attribute, value);
        let passed = outcome.passed();
        self.last_outcome = outcome;
        passed
    }

    /// The value-returning core of [`passes`](Self::passes).
    ///
    /// Produces a fresh [`ValidationOutcome`] for this check and leaves the
    /// adapter's recorded messages untouched. Because every call builds its
    /// own outcome, failure state cannot leak between checks by construction.
    pub fn evaluate(&mut self, attribute: &str, value: &Value) -> ValidationOutcome {
        self.inject_context();

        trace!(attribute = %attribute, implicit = self.implicit, "dispatching rule invokable");

        let mut outcome = ValidationOutcome::new();
        let mut fail = FailSignal::new(attribute, &mut outcome);
        self.invokable.call(attribute, value, &mut fail);

        outcome
    }

    /// The underlying rule object.
    pub fn invokable(&self) -> &RuleInvokable {
        &self.invokable
    }

    /// Whether this adapter participates in implicit-rule semantics.
    ///
    /// Fixed at [`make`](Self::make) time; the consuming engine must invoke
    /// implicit adapters even for absent or empty attribute values.
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// The pending messages collected during the most recent
    /// [`passes`](Self::passes) call, in fail-call order.
    pub fn message(&self) -> &[PendingMessage] {
        self.last_outcome.messages()
    }

    /// Sets the dataset injected into data-aware rules when no validator
    /// context is attached.
    ///
    /// Idempotent and callable any number of times before each check. When a
    /// validator context is attached, its live dataset takes precedence.
    pub fn set_data(&mut self, data: Dataset) -> &mut Self {
        self.data = data;
        self
    }

    /// Attaches the active validator context.
    ///
    /// Idempotent and callable any number of times before each check. The
    /// context is request-scoped and supplies both the dataset injected into
    /// data-aware rules and the handle injected into validator-aware rules.
    pub fn set_validator(&mut self, validator: Arc<dyn ValidatorContext>) -> &mut Self {
        self.validator = Some(validator);
        self
    }

    /// Injects declared capabilities, immediately before dispatch.
    ///
    /// Data-aware rules receive a snapshot of the validator context's dataset
    /// (or of the adapter's own stored dataset when no context is attached);
    /// validator-aware rules receive the context handle itself.
    fn inject_context(&mut self) {
        let Self {
            invokable,
            data,
            validator,
            ..
        } = self;

        if let Some(aware) = invokable.as_data_aware() {
            let snapshot = match validator {
                Some(ctx) => ctx.data().clone(),
                None => data.clone(),
            };
            aware.set_data(snapshot);
        }

        if let Some(aware) = invokable.as_validator_aware() {
            if let Some(ctx) = validator {
                aware.set_validator(Arc::clone(ctx));
            }
        }
    }
}

impl fmt::Debug for RuleAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleAdapter")
            .field("invokable", &self.invokable)
            .field("implicit", &self.implicit)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}
