use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::dataset::Dataset;
use crate::message::FailSignal;
use crate::validator::ValidatorContext;

/// Optional capabilities a rule object may declare.
///
/// This is the supertrait of both call-shape traits. The capability set is
/// closed and checkable: the adapter discovers capabilities through these
/// methods instead of probing for them at runtime. The defaults declare
/// nothing, so a plain rule only has to write an empty impl:
///
/// ```
/// use rule_core::{FailSignal, RuleCapabilities, ValidationRule};
/// use serde_json::Value;
///
/// struct Uppercase;
///
/// impl RuleCapabilities for Uppercase {}
///
/// impl ValidationRule for Uppercase {
///     fn validate(&self, _attribute: &str, value: &Value, fail: &mut FailSignal<'_>) {
///         match value.as_str() {
///             Some(s) if s.chars().all(char::is_uppercase) => {}
///             _ => {
///                 fail.fail().message("must be uppercase");
///             }
///         }
///     }
/// }
/// ```
pub trait RuleCapabilities {
    /// Whether this rule must run even when the attribute's value is absent
    /// or empty, bypassing the validator's skip-on-empty optimization.
    ///
    /// Read exactly once, when the rule is wrapped by
    /// [`RuleAdapter::make`](crate::RuleAdapter::make); later changes have no
    /// effect on the adapter.
    fn implicit(&self) -> bool {
        false
    }

    /// Declares the data-aware capability: rules that override this to return
    /// `Some(self)` receive the dataset under validation before every check.
    fn as_data_aware(&mut self) -> Option<&mut dyn DataAwareRule> {
        None
    }

    /// Declares the validator-aware capability: rules that override this to
    /// return `Some(self)` receive the active validator context before every
    /// check.
    fn as_validator_aware(&mut self) -> Option<&mut dyn ValidatorAwareRule> {
        None
    }
}

/// The named-method call convention for rule objects.
///
/// The entrypoint's name is part of the convention: a `validate` method
/// taking the attribute, the value, and the fail signal. Its return value is
/// deliberately `()` - whether the check failed is determined solely by
/// whether `fail` was invoked.
pub trait ValidationRule: RuleCapabilities {
    /// Runs the rule against one attribute/value pair.
    ///
    /// `value` is `Value::Null` when the attribute is absent from the
    /// dataset, which only implicit rules ever observe.
    fn validate(&self, attribute: &str, value: &Value, fail: &mut FailSignal<'_>);
}

/// The generic-invoke call convention for rule objects.
///
/// Semantically identical to [`ValidationRule`]; the two exist so that both
/// rule-authoring conventions adapt to the same execution contract.
pub trait InvokableRule: RuleCapabilities {
    /// Runs the rule against one attribute/value pair.
    fn invoke(&self, attribute: &str, value: &Value, fail: &mut FailSignal<'_>);
}

/// Capability for rules that need the full dataset under validation.
///
/// The adapter injects an owned snapshot before every check, so the rule sees
/// the current data even when the dataset changed between checks.
pub trait DataAwareRule {
    /// Receives the dataset the current check runs against.
    fn set_data(&mut self, data: Dataset);
}

/// Capability for rules that need the active validator context.
///
/// The injected handle is request-scoped; rules must not cache it past the
/// check it was injected for.
pub trait ValidatorAwareRule {
    /// Receives the active validator context for the current check.
    fn set_validator(&mut self, validator: Arc<dyn ValidatorContext>);
}

/// A user-authored rule object, resolved to one of the two recognized call
/// conventions.
///
/// The variant is decided once, when the rule is wrapped, and never
/// re-checked per call. A type implementing both conventions should be
/// wrapped as `Validate`: the named method is the preferred call shape.
pub enum RuleInvokable {
    /// A rule exposing the named `validate` entrypoint.
    Validate(Box<dyn ValidationRule>),
    /// A rule exposing the generic `invoke` entrypoint.
    Invoke(Box<dyn InvokableRule>),
}

impl RuleInvokable {
    /// Whether the wrapped rule declares the implicit flag.
    pub fn implicit(&self) -> bool {
        match self {
            Self::Validate(rule) => rule.implicit(),
            Self::Invoke(rule) => rule.implicit(),
        }
    }

    /// The wrapped rule's data-aware capability, if declared.
    pub fn as_data_aware(&mut self) -> Option<&mut dyn DataAwareRule> {
        match self {
            Self::Validate(rule) => rule.as_data_aware(),
            Self::Invoke(rule) => rule.as_data_aware(),
        }
    }

    /// The wrapped rule's validator-aware capability, if declared.
    pub fn as_validator_aware(&mut self) -> Option<&mut dyn ValidatorAwareRule> {
        match self {
            Self::Validate(rule) => rule.as_validator_aware(),
            Self::Invoke(rule) => rule.as_validator_aware(),
        }
    }

    /// Dispatches to the resolved entrypoint with `(attribute, value, fail)`.
    pub(crate) fn call(&self, attribute: &str, value: &Value, fail: &mut FailSignal<'_>) {
        match self {
            Self::Validate(rule) => rule.validate(attribute, value, fail),
            Self::Invoke(rule) => rule.invoke(attribute, value, fail),
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Self::Validate(_) => "Validate",
            Self::Invoke(_) => "Invoke",
        }
    }
}

impl fmt::Debug for RuleInvokable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(self.variant_name()).field(&"..").finish()
    }
}

impl From<Box<dyn ValidationRule>> for RuleInvokable {
    fn from(rule: Box<dyn ValidationRule>) -> Self {
        Self::Validate(rule)
    }
}

impl From<Box<dyn InvokableRule>> for RuleInvokable {
    fn from(rule: Box<dyn InvokableRule>) -> Self {
        Self::Invoke(rule)
    }
}
