//! Roles - autonomous agents with an observe/think/act cycle
//!
//! A role watches the bus for message kinds in its watch set, selects an
//! action for the observed message by routing-table lookup (think is pure;
//! no I/O), runs the action against its own completion provider, and
//! publishes the result. Each role owns its provider exclusively and its
//! cycle is strictly sequential; the only suspension point is the action's
//! completion call.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::core::{Result, TroupeError};
use crate::llm::CompletionProvider;
use crate::runtime::action::Action;
use crate::runtime::bus::Bus;
use crate::runtime::message::{Message, MessageKind};

/// Where a role is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState {
    /// No unconsumed matching message
    Idle,
    /// A matching message has been consumed and is held for think()
    Observed,
    /// An action has been selected (or explicitly declined)
    Thought,
    /// The action ran and its result was published
    Acted,
}

/// What happens to the observed message when an action fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Put the message back at the front of the inbox for retry
    Retain,
    /// The message stays consumed; the trigger is lost
    Discard,
}

/// Non-error outcome of a role turn
///
/// "Nothing to do" must stay distinguishable from failure, so declining
/// to act and finding no input are outcomes, not errors.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The cycle ran to completion and published this message
    Published(Message),
    /// think() found no action for the observed message's kind
    Declined,
    /// observe() found no unconsumed matching message and no seed was given
    NoObservableInput,
}

impl TurnOutcome {
    /// The published message, if the turn produced one
    pub fn message(&self) -> Option<&Message> {
        match self {
            TurnOutcome::Published(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, TurnOutcome::Published(_))
    }
}

/// An action selected by think(), waiting for act()
struct PendingAction {
    action_index: usize,
    instruction: String,
}

/// An autonomous agent wrapping one completion provider
pub struct Role {
    identity: String,
    profile: String,
    actions: Vec<Arc<dyn Action>>,
    /// Capability table: incoming message kind to action index
    routes: HashMap<MessageKind, usize>,
    watch: HashSet<MessageKind>,
    llm: Arc<dyn CompletionProvider>,
    failure_policy: FailurePolicy,
    state: RoleState,
    observed: Option<Message>,
    pending: Option<PendingAction>,
}

impl Role {
    /// Start building a role
    pub fn builder(identity: impl Into<String>, profile: impl Into<String>) -> RoleBuilder {
        RoleBuilder::new(identity, profile)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn state(&self) -> RoleState {
        self.state
    }

    /// Kinds this role subscribes to
    pub fn watch_set(&self) -> &HashSet<MessageKind> {
        &self.watch
    }

    /// Model identifier of the bound provider
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Register this role's watch set with a bus
    pub fn attach(&self, bus: &mut Bus) {
        bus.register(self.identity.as_str(), self.watch.clone());
    }

    /// Probe the bound provider for liveness
    pub async fn preflight(&self) -> Result<()> {
        self.llm.probe().await
    }

    /// Consume the oldest unconsumed message matching the watch set
    ///
    /// Transitions Idle to Observed; with nothing to consume the role stays
    /// Idle. Already-consumed messages are never re-selected.
    pub fn observe(&mut self, bus: &mut Bus) -> Option<&Message> {
        if self.state != RoleState::Idle {
            return self.observed.as_ref();
        }

        // The bus only delivers kinds in our watch set, so the front of
        // the inbox is always eligible.
        let message = bus.take_next(&self.identity)?;
        self.observed = Some(message);
        self.state = RoleState::Observed;
        self.observed.as_ref()
    }

    /// Select an action for the observed message
    ///
    /// Pure table lookup, no I/O. Returns the selected action's name, or
    /// None when no route applies (the explicit decline outcome).
    pub fn think(&mut self) -> Option<&str> {
        let observed = self.observed.as_ref()?;

        self.pending = self.routes.get(&observed.kind).map(|&index| PendingAction {
            action_index: index,
            instruction: observed.content.clone(),
        });
        self.state = RoleState::Thought;

        self.pending
            .as_ref()
            .map(|p| self.actions[p.action_index].name())
    }

    /// Run the pending action and publish its result
    ///
    /// Errors with `ActionNotPending` when called without a prior think()
    /// selection. On action failure nothing is published, the failure
    /// policy is applied to the observed message, and the role returns to
    /// Idle with the error surfaced verbatim.
    pub async fn act(&mut self, bus: &mut Bus) -> Result<Message> {
        let Some(pending) = self.pending.take() else {
            return Err(TroupeError::ActionNotPending {
                role: self.identity.clone(),
            });
        };

        let action = Arc::clone(&self.actions[pending.action_index]);
        let result = action.run(self.llm.as_ref(), &pending.instruction).await;

        match result {
            Ok(text) => {
                let parent = self.observed.take().map(|m| m.id);
                let message = bus.publish(Message::action_output(
                    MessageKind::new(action.name()),
                    text,
                    self.identity.as_str(),
                    parent,
                ));
                self.state = RoleState::Acted;
                self.finish_cycle();
                Ok(message)
            }
            Err(e) => {
                if let Some(observed) = self.observed.take() {
                    if self.failure_policy == FailurePolicy::Retain {
                        bus.unconsume(&self.identity, observed);
                    }
                }
                self.finish_cycle();
                Err(e)
            }
        }
    }

    /// One full observe-think-act cycle
    ///
    /// A seed instruction bootstraps a role with an empty inbox: the seed
    /// is stamped by the bus and observed directly, bypassing watch
    /// matching. Without a seed the cycle draws from the inbox.
    pub async fn run(&mut self, bus: &mut Bus, seed: Option<&str>) -> Result<TurnOutcome> {
        if let Some(seed) = seed {
            let message = bus.record(Message::user(seed));
            self.observed = Some(message);
            self.state = RoleState::Observed;
        } else if self.observe(bus).is_none() {
            return Ok(TurnOutcome::NoObservableInput);
        }

        if self.think().is_none() {
            self.finish_cycle();
            return Ok(TurnOutcome::Declined);
        }

        let message = self.act(bus).await?;
        Ok(TurnOutcome::Published(message))
    }

    /// Reset per-cycle state back to Idle
    fn finish_cycle(&mut self) {
        self.observed = None;
        self.pending = None;
        self.state = RoleState::Idle;
    }
}

/// Builder for [`Role`]
///
/// A role cannot be built without a provider; actions are never invoked
/// without a bound backend.
pub struct RoleBuilder {
    identity: String,
    profile: String,
    actions: Vec<Arc<dyn Action>>,
    routes: Vec<(MessageKind, String)>,
    extra_watch: Vec<MessageKind>,
    llm: Option<Arc<dyn CompletionProvider>>,
    failure_policy: FailurePolicy,
}

impl RoleBuilder {
    fn new(identity: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            profile: profile.into(),
            actions: Vec::new(),
            routes: Vec::new(),
            extra_watch: Vec::new(),
            llm: None,
            failure_policy: FailurePolicy::Retain,
        }
    }

    /// Bind the completion provider (required)
    pub fn provider(mut self, llm: Arc<dyn CompletionProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Add an action to the role's action set
    pub fn action(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Arc::new(action));
        self
    }

    /// Route an incoming message kind to one of the role's actions
    ///
    /// Routed kinds are added to the watch set automatically.
    pub fn route(mut self, kind: impl Into<MessageKind>, action_name: impl Into<String>) -> Self {
        self.routes.push((kind.into(), action_name.into()));
        self
    }

    /// Subscribe to a kind without routing it to an action
    ///
    /// Messages of such kinds are observed and then declined.
    pub fn watch(mut self, kind: impl Into<MessageKind>) -> Self {
        self.extra_watch.push(kind.into());
        self
    }

    /// Set the consumed-message-on-failure policy (default: retain)
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Finish building, validating the routing table and provider binding
    pub fn build(self) -> Result<Role> {
        let llm = self.llm.ok_or_else(|| {
            TroupeError::config(format!("Role '{}' has no completion provider", self.identity))
        })?;

        let mut routes = HashMap::new();
        let mut watch: HashSet<MessageKind> = self.extra_watch.into_iter().collect();

        for (kind, action_name) in self.routes {
            let index = self
                .actions
                .iter()
                .position(|a| a.name() == action_name)
                .ok_or_else(|| TroupeError::UnknownAction {
                    role: self.identity.clone(),
                    action: action_name.clone(),
                })?;
            watch.insert(kind.clone());
            routes.insert(kind, index);
        }

        Ok(Role {
            identity: self.identity,
            profile: self.profile,
            actions: self.actions,
            routes,
            watch,
            llm,
            failure_policy: self.failure_policy,
            state: RoleState::Idle,
            observed: None,
            pending: None,
        })
    }
}
