use std::fmt;

use tracing::{debug, warn};

use crate::error::{Error, FailedValidation};
use crate::validator::{AfterValidationHook, Validator};

/// The states an orchestration run moves through.
///
/// ```text
/// Created -> Prepared -> Authorized -> Validating -> Passed
///                    \                          \
///                     +--> Failed <-------------+
/// ```
///
/// `Failed` is reached either through authorization denial or through
/// validation failure; both are terminal, as is `Passed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Run constructed, nothing executed yet.
    Created,
    /// The object normalized its own input.
    Prepared,
    /// The authorization predicate passed.
    Authorized,
    /// Rule evaluation is in flight.
    Validating,
    /// Terminal: every rule passed.
    Passed,
    /// Terminal: authorization was denied or a rule failed.
    Failed,
}

/// An object that validates itself immediately after being resolved.
///
/// Typically an inbound request-shaped object carrying its own rule
/// declarations and, optionally, an authorization predicate. Every hook has a
/// no-op or permissive default except [`validator`](Self::validator), which
/// must build the validator bound to the object's current data and declared
/// rules.
///
/// # Examples
///
/// ```
/// use rule_core::{
///     validate_resolved, AfterValidationHook, Error, PendingMessage, ValidatesWhenResolved,
///     Validator,
/// };
///
/// struct AlwaysValid;
///
/// impl Validator for AlwaysValid {
///     fn fails(&mut self) -> bool {
///         false
///     }
///     fn after(&mut self, _hook: AfterValidationHook) {}
///     fn messages(&self) -> Vec<PendingMessage> {
///         Vec::new()
///     }
/// }
///
/// struct SignupRequest {
///     authorized: bool,
/// }
///
/// impl ValidatesWhenResolved for SignupRequest {
///     fn validator(&mut self) -> Box<dyn Validator> {
///         Box::new(AlwaysValid)
///     }
///
///     fn authorize(&self) -> bool {
///         self.authorized
///     }
/// }
///
/// let mut request = SignupRequest { authorized: true };
/// assert!(validate_resolved(&mut request).is_ok());
///
/// let mut request = SignupRequest { authorized: false };
/// assert!(matches!(
///     validate_resolved(&mut request),
///     Err(Error::AuthorizationDenied)
/// ));
/// ```
pub trait ValidatesWhenResolved {
    /// Builds the validator bound to this object's current data and declared
    /// rules. Called at most once per run, and never when authorization was
    /// denied.
    fn validator(&mut self) -> Box<dyn Validator>;

    /// The validator the run will actually use.
    ///
    /// Defaults to [`validator`](Self::validator); override to decorate or
    /// cache the instance without changing how it is built.
    fn validator_instance(&mut self) -> Box<dyn Validator> {
        self.validator()
    }

    /// Normalizes the object's own input before any check runs.
    fn prepare_for_validation(&mut self) {}

    /// The authorization predicate. Defaults to `true`: an object that does
    /// not declare one authorizes every caller.
    fn authorize(&self) -> bool {
        true
    }

    /// Whether this run is a preflight: full rule evaluation whose side
    /// effects are expected to be short-circuited on success.
    fn is_precognitive(&self) -> bool {
        false
    }

    /// Reaction to a run in which every rule passed.
    fn passed_validation(&mut self) {}

    /// Reaction to a failed run; produces the signal to propagate.
    ///
    /// The default carries the validator's collected messages in an
    /// [`Error::ValidationFailed`]. Overrides may inspect the live validator
    /// and build a different signal, but the decision point is fixed: this is
    /// called exactly once, if and only if evaluation failed.
    fn failed_validation(&mut self, validator: &mut dyn Validator) -> Error {
        Error::ValidationFailed(FailedValidation::new(validator.messages()))
    }

    /// Reaction to a denied authorization; produces the signal to propagate.
    fn failed_authorization(&self) -> Error {
        Error::AuthorizationDenied
    }
}

/// Supplier of the preflight after-validation hook.
///
/// Engaged only for precognitive runs; the returned hook is appended to the
/// validator's existing after-hooks, never replacing them.
pub trait PrecognitiveHooks<T: ?Sized> {
    /// Builds the hook to append for a precognitive run over `target`.
    fn after_validation_hook(&self, target: &T) -> AfterValidationHook;
}

/// Sequences authorization, validator construction, precognitive-hook
/// attachment, rule evaluation, and terminal outcome handling for one
/// resolved object.
///
/// An orchestrator is transient: create it for one object, call
/// [`run`](Self::run) exactly once (enforced by consuming `self`), and let it
/// go. There are no retries anywhere; the only recovery is re-running the
/// whole lifecycle from scratch.
///
/// Authorization always runs, and always fails closed, before any rule
/// evaluation begins: on denial no validator is built and no rule executes.
pub struct LifecycleOrchestrator<'a, T: ValidatesWhenResolved> {
    target: &'a mut T,
    precognition: Option<&'a dyn PrecognitiveHooks<T>>,
    state: LifecycleState,
}

impl<'a, T: ValidatesWhenResolved> LifecycleOrchestrator<'a, T> {
    /// Creates an orchestration run over one resolved object.
    pub fn new(target: &'a mut T) -> Self {
        Self {
            target,
            precognition: None,
            state: LifecycleState::Created,
        }
    }

    /// Attaches the precognition collaborator consulted for preflight runs.
    pub fn with_precognition(mut self, hooks: &'a dyn PrecognitiveHooks<T>) -> Self {
        self.precognition = Some(hooks);
        self
    }

    /// The current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Runs the lifecycle: prepare, authorize, build, evaluate, react.
    ///
    /// Strictly sequential, single attempt. Exactly one of the object's
    /// `passed_validation` / `failed_validation` hooks fires, matching the
    /// validator's verdict - unless authorization is denied first, in which
    /// case neither fires and no validator is ever built.
    ///
    /// # Errors
    ///
    /// Returns the signal produced by `failed_authorization` (by default
    /// [`Error::AuthorizationDenied`]) or by `failed_validation` (by default
    /// [`Error::ValidationFailed`] carrying the collected messages).
    pub fn run(mut self) -> Result<(), Error> {
        self.target.prepare_for_validation();
        self.advance(LifecycleState::Prepared);

        if !self.target.authorize() {
            warn!("authorization denied; halting before any rule runs");
            self.advance(LifecycleState::Failed);
            return Err(self.target.failed_authorization());
        }
        self.advance(LifecycleState::Authorized);

        let mut validator = self.target.validator_instance();

        if self.target.is_precognitive() {
            if let Some(hooks) = self.precognition {
                validator.after(hooks.after_validation_hook(self.target));
            }
        }

        self.advance(LifecycleState::Validating);

        if validator.fails() {
            self.advance(LifecycleState::Failed);
            return Err(self.target.failed_validation(&mut *validator));
        }

        self.target.passed_validation();
        self.advance(LifecycleState::Passed);
        Ok(())
    }

    fn advance(&mut self, next: LifecycleState) {
        debug!(from = ?self.state, to = ?next, "lifecycle transition");
        self.state = next;
    }
}

impl<T: ValidatesWhenResolved> fmt::Debug for LifecycleOrchestrator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleOrchestrator")
            .field("state", &self.state)
            .field("precognition", &self.precognition.is_some())
            .finish_non_exhaustive()
    }
}

/// One-shot convenience over [`LifecycleOrchestrator`]: validates a resolved
/// object with no precognition collaborator attached.
pub fn validate_resolved<T: ValidatesWhenResolved>(target: &mut T) -> Result<(), Error> {
    LifecycleOrchestrator::new(target).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::PendingMessage;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type EventLog = Rc<RefCell<Vec<String>>>;

    fn log(events: &EventLog, event: &str) {
        events.borrow_mut().push(event.to_string());
    }

    /// Validator double that runs its after-hooks during `fails()`, so hook
    /// presence and ordering show up in the shared event log.
    struct StubValidator {
        failing: bool,
        hooks: Vec<AfterValidationHook>,
        events: EventLog,
    }

    impl StubValidator {
        fn new(failing: bool, events: EventLog) -> Self {
            let hook_events = Rc::clone(&events);
            Self {
                failing,
                hooks: vec![Box::new(move |_| log(&hook_events, "existing-hook"))],
                events,
            }
        }
    }

    impl Validator for StubValidator {
        fn fails(&mut self) -> bool {
            log(&self.events, "fails");
            let hooks = std::mem::take(&mut self.hooks);
            for hook in hooks {
                hook(&mut *self);
            }
            self.failing
        }

        fn after(&mut self, hook: AfterValidationHook) {
            log(&self.events, "after-appended");
            self.hooks.push(hook);
        }

        fn messages(&self) -> Vec<PendingMessage> {
            Vec::new()
        }
    }

    struct TestRequest {
        authorized: bool,
        precognitive: bool,
        failing: bool,
        builds: Rc<Cell<usize>>,
        events: EventLog,
    }

    impl TestRequest {
        fn new(events: &EventLog) -> Self {
            Self {
                authorized: true,
                precognitive: false,
                failing: false,
                builds: Rc::new(Cell::new(0)),
                events: Rc::clone(events),
            }
        }
    }

    impl ValidatesWhenResolved for TestRequest {
        fn validator(&mut self) -> Box<dyn Validator> {
            self.builds.set(self.builds.get() + 1);
            log(&self.events, "build-validator");
            Box::new(StubValidator::new(self.failing, Rc::clone(&self.events)))
        }

        fn prepare_for_validation(&mut self) {
            log(&self.events, "prepare");
        }

        fn authorize(&self) -> bool {
            log(&self.events, "authorize");
            self.authorized
        }

        fn is_precognitive(&self) -> bool {
            self.precognitive
        }

        fn passed_validation(&mut self) {
            log(&self.events, "passed");
        }

        fn failed_validation(&mut self, validator: &mut dyn Validator) -> Error {
            log(&self.events, "failed");
            Error::ValidationFailed(FailedValidation::new(validator.messages()))
        }
    }

    struct StubPrecognition;

    impl PrecognitiveHooks<TestRequest> for StubPrecognition {
        fn after_validation_hook(&self, target: &TestRequest) -> AfterValidationHook {
            let events = Rc::clone(&target.events);
            Box::new(move |_| log(&events, "precognition-hook"))
        }
    }

    #[test]
    fn denied_authorization_builds_no_validator() {
        let events: EventLog = Rc::default();
        let mut request = TestRequest::new(&events);
        request.authorized = false;
        let builds = Rc::clone(&request.builds);

        let result = validate_resolved(&mut request);

        assert!(matches!(result, Err(Error::AuthorizationDenied)));
        assert_eq!(builds.get(), 0);
        // Halted right after the predicate: no fails(), no outcome hooks.
        assert_eq!(*events.borrow(), vec!["prepare", "authorize"]);
    }

    #[test]
    fn passing_run_fires_passed_validation_exactly_once() {
        let events: EventLog = Rc::default();
        let mut request = TestRequest::new(&events);

        let result = validate_resolved(&mut request);

        assert!(result.is_ok());
        assert_eq!(
            *events.borrow(),
            vec![
                "prepare",
                "authorize",
                "build-validator",
                "fails",
                "existing-hook",
                "passed"
            ]
        );
    }

    #[test]
    fn failing_run_fires_failed_validation_exactly_once() {
        let events: EventLog = Rc::default();
        let mut request = TestRequest::new(&events);
        request.failing = true;

        let result = validate_resolved(&mut request);

        assert!(matches!(result, Err(Error::ValidationFailed(_))));
        let events = events.borrow();
        assert_eq!(events.iter().filter(|e| *e == "failed").count(), 1);
        assert!(!events.iter().any(|e| e == "passed"));
    }

    #[test]
    fn precognitive_run_appends_one_hook_after_existing_ones() {
        let events: EventLog = Rc::default();
        let mut request = TestRequest::new(&events);
        request.precognitive = true;

        let result = LifecycleOrchestrator::new(&mut request)
            .with_precognition(&StubPrecognition)
            .run();

        assert!(result.is_ok());
        let events = events.borrow();
        assert_eq!(
            events.iter().filter(|e| *e == "after-appended").count(),
            1
        );
        // The appended hook runs after the validator's pre-existing one.
        let existing = events.iter().position(|e| e == "existing-hook");
        let appended = events.iter().position(|e| e == "precognition-hook");
        assert!(existing.is_some() && appended.is_some());
        assert!(existing < appended);
    }

    #[test]
    fn non_precognitive_run_never_consults_the_collaborator() {
        let events: EventLog = Rc::default();
        let mut request = TestRequest::new(&events);

        let result = LifecycleOrchestrator::new(&mut request)
            .with_precognition(&StubPrecognition)
            .run();

        assert!(result.is_ok());
        let events = events.borrow();
        assert!(!events.iter().any(|e| e == "after-appended"));
        assert!(!events.iter().any(|e| e == "precognition-hook"));
    }

    #[test]
    fn orchestrator_starts_in_created_state() {
        let events: EventLog = Rc::default();
        let mut request = TestRequest::new(&events);

        let orchestrator = LifecycleOrchestrator::new(&mut request);

        assert_eq!(orchestrator.state(), LifecycleState::Created);
    }

    #[test]
    fn custom_failure_reaction_replaces_the_default_signal() {
        struct Custom {
            events: EventLog,
        }

        impl ValidatesWhenResolved for Custom {
            fn validator(&mut self) -> Box<dyn Validator> {
                Box::new(StubValidator::new(true, Rc::clone(&self.events)))
            }

            fn failed_validation(&mut self, _validator: &mut dyn Validator) -> Error {
                Error::AuthorizationDenied // deliberately unusual reaction
            }
        }

        let mut custom = Custom { events: Rc::default() };

        assert!(matches!(
            validate_resolved(&mut custom),
            Err(Error::AuthorizationDenied)
        ));
    }
}
