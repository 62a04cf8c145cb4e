use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An unrendered, attribute-scoped validation failure description.
///
/// Pending messages are produced by [`FailSignal`] calls and carried in a
/// [`ValidationOutcome`]. Rendering and translation happen downstream; this
/// crate only records the attribute, an optional message template, and any
/// placeholder parameters bound by the rule.
///
/// A `template` of `None` means "use the rule's own default message key",
/// which the downstream translator resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMessage {
    /// The attribute this message is scoped to.
    pub attribute: String,
    /// Message template, or `None` for the rule's default message key.
    pub template: Option<String>,
    /// Placeholder parameters bound through the message builder.
    pub parameters: BTreeMap<String, String>,
}

impl PendingMessage {
    /// Creates a pending message scoped to `attribute` with the default
    /// template and no parameters.
    pub(crate) fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            template: None,
            parameters: BTreeMap::new(),
        }
    }
}

/// The result of running one rule check against one attribute/value pair.
///
/// An outcome is constructed fresh for every check, so failure state and
/// messages can never leak between checks or between concurrent reuses of a
/// rule. `failed` is `true` exactly when the rule invoked its fail signal at
/// least once during that check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    failed: bool,
    messages: Vec<PendingMessage>,
}

impl ValidationOutcome {
    /// Creates a passing outcome with no messages.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the fail signal was invoked at least once.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Returns `true` if the fail signal was never invoked.
    pub fn passed(&self) -> bool {
        !self.failed
    }

    /// The pending messages collected during the check, in fail-call order.
    pub fn messages(&self) -> &[PendingMessage] {
        &self.messages
    }

    /// Consumes the outcome and returns its messages.
    pub fn into_messages(self) -> Vec<PendingMessage> {
        self.messages
    }
}

/// The callback handle a rule invokes to report problems.
///
/// A `FailSignal` is created by the rule adapter for each check and passed to
/// the rule's entrypoint. It cannot be constructed outside this crate, so a
/// fail signal always belongs to exactly one in-flight check.
///
/// Calling [`fail`](Self::fail) marks the check failed and appends one
/// [`PendingMessage`]; it may be called any number of times to report
/// multiple independent problems, and every message is retained in call
/// order. The returned [`MessageBuilder`] can override the attribute, set a
/// message template, and bind parameters; callers that want the rule's
/// default message can ignore it.
#[derive(Debug)]
pub struct FailSignal<'a> {
    attribute: &'a str,
    outcome: &'a mut ValidationOutcome,
}

impl<'a> FailSignal<'a> {
    /// Creates a fail signal scoped to `attribute`, recording into `outcome`.
    ///
    /// This is `pub(crate)` - only the rule adapter creates fail signals.
    pub(crate) fn new(attribute: &'a str, outcome: &'a mut ValidationOutcome) -> Self {
        Self { attribute, outcome }
    }

    /// The attribute currently under validation.
    pub fn attribute(&self) -> &str {
        self.attribute
    }

    /// Reports one problem with the attribute under validation.
    ///
    /// Marks the check failed and appends a pending message whose attribute
    /// defaults to the attribute being checked and whose template defaults to
    /// the rule's own message key. Use the returned builder to override
    /// either, or to bind message parameters.
    pub fn fail(&mut self) -> MessageBuilder<'_> {
        self.outcome.failed = true;
        self.outcome.messages.push(PendingMessage::new(self.attribute));

        let message = self
            .outcome
            .messages
            .last_mut()
            .expect("a message was just appended");

        MessageBuilder { message }
    }
}

/// Chainable builder over the pending message appended by a
/// [`FailSignal::fail`] call.
///
/// # Examples
///
/// ```
/// use rule_core::{FailSignal, InvokableRule, RuleCapabilities};
/// use serde_json::Value;
///
/// struct ReservedName;
///
/// impl RuleCapabilities for ReservedName {}
///
/// impl InvokableRule for ReservedName {
///     fn invoke(&self, _attribute: &str, value: &Value, fail: &mut FailSignal<'_>) {
///         if value.as_str() == Some("admin") {
///             fail.fail()
///                 .message("the name :name is reserved")
///                 .param("name", "admin");
///         }
///     }
/// }
/// ```
#[derive(Debug)]
pub struct MessageBuilder<'a> {
    message: &'a mut PendingMessage,
}

impl MessageBuilder<'_> {
    /// Scopes the message to a different attribute than the one under check.
    pub fn attribute(self, attribute: impl Into<String>) -> Self {
        self.message.attribute = attribute.into();
        self
    }

    /// Sets the message template, replacing the rule's default message key.
    pub fn message(self, template: impl Into<String>) -> Self {
        self.message.template = Some(template.into());
        self
    }

    /// Binds a placeholder parameter for downstream rendering.
    pub fn param(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.message
            .parameters
            .insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_starts_passing_and_empty() {
        let outcome = ValidationOutcome::new();

        assert!(outcome.passed());
        assert!(!outcome.failed());
        assert!(outcome.messages().is_empty());
    }

    #[test]
    fn fail_marks_outcome_and_defaults_message() {
        let mut outcome = ValidationOutcome::new();
        let mut fail = FailSignal::new("email", &mut outcome);

        fail.fail();

        assert!(outcome.failed());
        assert_eq!(outcome.messages().len(), 1);
        assert_eq!(outcome.messages()[0].attribute, "email");
        assert_eq!(outcome.messages()[0].template, None);
        assert!(outcome.messages()[0].parameters.is_empty());
    }

    #[test]
    fn fail_retains_every_call_in_order() {
        let mut outcome = ValidationOutcome::new();
        let mut fail = FailSignal::new("age", &mut outcome);

        fail.fail().attribute("age").message("must be adult");
        fail.fail().attribute("age").message("must be employed");
        fail.fail().attribute("age");

        let messages = outcome.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].template.as_deref(), Some("must be adult"));
        assert_eq!(messages[1].template.as_deref(), Some("must be employed"));
        assert_eq!(messages[2].template, None);
        assert!(messages.iter().all(|m| m.attribute == "age"));
    }

    #[test]
    fn builder_overrides_attribute_and_binds_params() {
        let mut outcome = ValidationOutcome::new();
        let mut fail = FailSignal::new("items.0.sku", &mut outcome);

        fail.fail()
            .attribute("items.0")
            .message("unknown sku :sku")
            .param("sku", "XYZ-1");

        let message = &outcome.messages()[0];
        assert_eq!(message.attribute, "items.0");
        assert_eq!(message.template.as_deref(), Some("unknown sku :sku"));
        assert_eq!(message.parameters.get("sku").map(String::as_str), Some("XYZ-1"));
    }

    #[test]
    fn ignoring_the_builder_still_records_the_failure() {
        let mut outcome = ValidationOutcome::new();
        let mut fail = FailSignal::new("name", &mut outcome);

        let _ = fail.fail();

        assert!(outcome.failed());
        assert_eq!(outcome.messages().len(), 1);
    }
}
