//! Lifecycle event bus with group-scoped registration.
//!
//! Hooks are registered into an [`EventGroup`]. Revoking a group removes all
//! of its hooks at once and leaves every other group untouched, which is how
//! stopping a session switches auto-persistence off.

use crate::host::Document;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Lifecycle moments the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A document became the current one
    DocumentEnter,
    /// A document was read into the host
    DocumentOpen,
    /// A document is leaving its window (closed or hidden)
    DocumentLeave,
    /// The application is about to exit
    AppExit,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::DocumentEnter => "DocumentEnter",
            EventKind::DocumentOpen => "DocumentOpen",
            EventKind::DocumentLeave => "DocumentLeave",
            EventKind::AppExit => "AppExit",
        };
        f.write_str(name)
    }
}

/// A single occurrence of a lifecycle moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// Document the event concerns; for [`EventKind::AppExit`] the current one
    pub document: Option<Document>,
}

impl Event {
    pub fn new(kind: EventKind, document: Option<Document>) -> Self {
        Self { kind, document }
    }
}

/// Opaque handle naming a revocable set of hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventGroup(u32);

type Handler<H> = Rc<dyn Fn(&Event, &mut H)>;

struct Hook<H> {
    group: EventGroup,
    kinds: Vec<EventKind>,
    handler: Handler<H>,
}

/// Registry of lifecycle hooks, dispatched in registration order
pub struct EventBus<H> {
    groups: HashMap<String, EventGroup>,
    hooks: Vec<Hook<H>>,
    next_group: u32,
}

impl<H> Default for EventBus<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> EventBus<H> {
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            hooks: Vec::new(),
            next_group: 0,
        }
    }

    /// Handle for the group called `name`, created on first use
    pub fn group(&mut self, name: &str) -> EventGroup {
        if let Some(group) = self.groups.get(name) {
            return *group;
        }
        let group = EventGroup(self.next_group);
        self.next_group += 1;
        self.groups.insert(name.to_string(), group);
        debug!("Created event group {} ({:?})", name, group);
        group
    }

    /// Register `handler` in `group` for every kind in `kinds`
    pub fn arm<F>(&mut self, group: EventGroup, kinds: &[EventKind], handler: F)
    where
        F: Fn(&Event, &mut H) + 'static,
    {
        self.hooks.push(Hook {
            group,
            kinds: kinds.to_vec(),
            handler: Rc::new(handler),
        });
        trace!("Armed hook in {:?} for {:?}", group, kinds);
    }

    /// Revoke every hook in `group`; returns how many were removed
    pub fn disarm(&mut self, group: EventGroup) -> usize {
        let before = self.hooks.len();
        self.hooks.retain(|hook| hook.group != group);
        let removed = before - self.hooks.len();
        if removed > 0 {
            debug!("Disarmed {} hook(s) in {:?}", removed, group);
        }
        removed
    }

    /// Number of live hooks in `group`
    pub fn hook_count(&self, group: EventGroup) -> usize {
        self.hooks.iter().filter(|hook| hook.group == group).count()
    }

    /// Run every hook registered for `event.kind`, in registration order.
    ///
    /// The matching set is fixed before the first handler runs.
    pub fn emit(&self, event: &Event, host: &mut H) -> usize {
        let handlers: Vec<Handler<H>> = self
            .hooks
            .iter()
            .filter(|hook| hook.kinds.contains(&event.kind))
            .map(|hook| Rc::clone(&hook.handler))
            .collect();

        trace!("Dispatching {} to {} hook(s)", event.kind, handlers.len());
        for handler in &handlers {
            handler(event, host);
        }
        handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<&'static str>;

    fn enter() -> Event {
        Event::new(EventKind::DocumentEnter, None)
    }

    #[test]
    fn test_group_handles_are_stable() {
        let mut bus: EventBus<Log> = EventBus::new();
        let a = bus.group("A");
        let b = bus.group("B");

        assert_eq!(bus.group("A"), a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let mut bus: EventBus<Log> = EventBus::new();
        let group = bus.group("ordered");
        bus.arm(group, &[EventKind::DocumentEnter], |_, log: &mut Log| {
            log.push("first")
        });
        bus.arm(group, &[EventKind::DocumentEnter], |_, log: &mut Log| {
            log.push("second")
        });

        let mut log = Log::new();
        assert_eq!(bus.emit(&enter(), &mut log), 2);
        assert_eq!(log, vec!["first", "second"]);
    }

    #[test]
    fn test_only_matching_kinds_fire() {
        let mut bus: EventBus<Log> = EventBus::new();
        let group = bus.group("kinds");
        bus.arm(
            group,
            &[EventKind::DocumentLeave, EventKind::AppExit],
            |_, log: &mut Log| log.push("leave-or-exit"),
        );

        let mut log = Log::new();
        bus.emit(&enter(), &mut log);
        assert!(log.is_empty());

        bus.emit(&Event::new(EventKind::AppExit, None), &mut log);
        assert_eq!(log, vec!["leave-or-exit"]);
    }

    #[test]
    fn test_disarm_only_touches_its_group() {
        let mut bus: EventBus<Log> = EventBus::new();
        let auto = bus.group("auto");
        let other = bus.group("other");
        bus.arm(auto, &[EventKind::DocumentEnter], |_, log: &mut Log| {
            log.push("auto")
        });
        bus.arm(auto, &[EventKind::AppExit], |_, log: &mut Log| log.push("auto-exit"));
        bus.arm(other, &[EventKind::DocumentEnter], |_, log: &mut Log| {
            log.push("other")
        });

        assert_eq!(bus.disarm(auto), 2);
        assert_eq!(bus.disarm(auto), 0);
        assert_eq!(bus.hook_count(auto), 0);
        assert_eq!(bus.hook_count(other), 1);

        let mut log = Log::new();
        bus.emit(&enter(), &mut log);
        assert_eq!(log, vec!["other"]);
    }

    #[test]
    fn test_disarm_then_arm_does_not_accumulate() {
        let mut bus: EventBus<Log> = EventBus::new();
        let group = bus.group("cycle");

        for _ in 0..5 {
            bus.disarm(group);
            bus.arm(group, &[EventKind::DocumentEnter], |_, log: &mut Log| {
                log.push("save")
            });
        }

        let mut log = Log::new();
        bus.emit(&enter(), &mut log);
        assert_eq!(log.len(), 1);
    }
}
