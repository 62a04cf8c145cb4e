//! Rule adapter and validation lifecycle core.
//!
//! This crate adapts heterogeneous, user-authored validation-rule objects
//! into one uniform execution contract, and orchestrates the
//! authorize -> validate -> react lifecycle for objects that validate
//! themselves as soon as they are resolved:
//!
//! - **Rule contracts**: the two recognized call conventions
//!   ([`ValidationRule`], [`InvokableRule`]) and the closed set of optional
//!   capabilities a rule may declare ([`RuleCapabilities`], [`DataAwareRule`],
//!   [`ValidatorAwareRule`])
//! - [`RuleAdapter`]: wraps one rule object, normalizes capability injection
//!   and invocation, and reduces every rule to a `passes`/`message` contract
//! - [`LifecycleOrchestrator`]: sequences prepare, authorization (fail
//!   closed, always before any rule), validator construction, optional
//!   precognitive-hook attachment, evaluation, and outcome hooks
//! - [`Error`]: the two terminal signals ([`Error::AuthorizationDenied`],
//!   [`Error::ValidationFailed`]) the framework boundary matches on
//!
//! The validator engine itself - schema expansion, attribute walking,
//! skip-on-empty handling - lives outside this crate and consumes these types
//! through the narrow [`Validator`]/[`ValidatorContext`] interfaces.
//!
//! # Examples
//!
//! ```
//! use rule_core::{FailSignal, RuleAdapter, RuleCapabilities, RuleInvokable, ValidationRule};
//! use serde_json::{json, Value};
//!
//! struct AdultAge;
//!
//! impl RuleCapabilities for AdultAge {}
//!
//! impl ValidationRule for AdultAge {
//!     fn validate(&self, _attribute: &str, value: &Value, fail: &mut FailSignal<'_>) {
//!         if value.as_u64().map_or(true, |age| age < 18) {
//!             fail.fail().message("must be at least :min").param("min", "18");
//!         }
//!     }
//! }
//!
//! let mut adapter = RuleAdapter::make(RuleInvokable::Validate(Box::new(AdultAge)));
//!
//! assert!(adapter.passes("age", &json!(21)));
//! assert!(!adapter.passes("age", &json!(12)));
//! assert_eq!(adapter.message()[0].attribute, "age");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod dataset;
mod error;
mod lifecycle;
mod message;
mod rule;
mod validator;

pub use adapter::RuleAdapter;
pub use dataset::Dataset;
pub use error::{Error, FailedValidation};
pub use lifecycle::{
    validate_resolved, LifecycleOrchestrator, LifecycleState, PrecognitiveHooks,
    ValidatesWhenResolved,
};
pub use message::{FailSignal, MessageBuilder, PendingMessage, ValidationOutcome};
pub use rule::{
    DataAwareRule, InvokableRule, RuleCapabilities, RuleInvokable, ValidationRule,
    ValidatorAwareRule,
};
pub use validator::{AfterValidationHook, Validator, ValidatorContext};
