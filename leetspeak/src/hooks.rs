//! The hook bus: named extension points that message handlers subscribe to.
//!
//! Handlers are pure: they get the message by shared reference and hand back
//! a `HookOutcome` carrying the (possibly rewritten) message and whether it
//! may proceed. The bus threads the message through handlers in registration
//! order and stops at the first one that suppresses it.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::{Arc, PoisonError, RwLock};

/// Points in outgoing message processing where handlers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Before a server-wide announcement is sent.
    PreRconSay,
    /// Before a direct message to one player is sent.
    PreRconTell,
}

impl HookPoint {
    pub const ALL: [HookPoint; 2] = [HookPoint::PreRconSay, HookPoint::PreRconTell];

    /// The name the daemon uses for this hook.
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPoint::PreRconSay => "preRconSay",
            HookPoint::PreRconTell => "preRconTell",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type PlayerId = u32;

/// Who a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Everyone,
    Player(PlayerId),
}

/// What a handler decided about a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutcome {
    pub message: String,
    pub proceed: bool,
}

impl HookOutcome {
    pub fn proceed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            proceed: true,
        }
    }

    pub fn suppress(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            proceed: false,
        }
    }
}

pub trait MessageHook: Send + Sync + Debug {
    /// Identifies the handler on the bus. Unique per hook point.
    fn name(&self) -> &str;

    fn on_message(&self, message: &str, recipient: Recipient) -> HookOutcome;
}

#[derive(Debug, Default)]
pub struct HookBus {
    handlers: RwLock<HashMap<HookPoint, Vec<Arc<dyn MessageHook>>>>,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to `point`. A handler whose name is already
    /// registered at `point` is rejected and `false` is returned.
    pub fn register(&self, point: HookPoint, handler: Arc<dyn MessageHook>) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let at_point = handlers.entry(point).or_default();
        if at_point.iter().any(|h| h.name() == handler.name()) {
            log::warn!("Handler '{}' is already registered for {}", handler.name(), point);
            return false;
        }
        log::info!("Registered handler '{}' for {}", handler.name(), point);
        at_point.push(handler);
        true
    }

    /// Removes the handler called `name` from `point`. Returns whether one was removed.
    pub fn unregister(&self, point: HookPoint, name: &str) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(at_point) = handlers.get_mut(&point) else {
            return false;
        };
        let before = at_point.len();
        at_point.retain(|h| h.name() != name);
        let removed = at_point.len() != before;
        if removed {
            log::info!("Unregistered handler '{}' from {}", name, point);
        }
        removed
    }

    pub fn is_registered(&self, point: HookPoint, name: &str) -> bool {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers
            .get(&point)
            .map_or(false, |at_point| at_point.iter().any(|h| h.name() == name))
    }

    pub fn handler_count(&self, point: HookPoint) -> usize {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers.get(&point).map_or(0, Vec::len)
    }

    /// Runs every handler at `point` over `message`.
    ///
    /// Returns the final message, or `None` if a handler suppressed it.
    pub fn dispatch(&self, point: HookPoint, message: &str, recipient: Recipient) -> Option<String> {
        // Handlers run without the lock held so they may use the bus themselves.
        let at_point: Vec<Arc<dyn MessageHook>> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers.get(&point).cloned().unwrap_or_default()
        };

        let mut current = message.to_string();
        for handler in at_point {
            let outcome = handler.on_message(&current, recipient);
            if !outcome.proceed {
                log::debug!("Message suppressed by '{}' at {}", handler.name(), point);
                return None;
            }
            current = outcome.message;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Suffix(&'static str);

    impl MessageHook for Suffix {
        fn name(&self) -> &str {
            self.0
        }

        fn on_message(&self, message: &str, _recipient: Recipient) -> HookOutcome {
            HookOutcome::proceed(format!("{}{}", message, self.0))
        }
    }

    #[derive(Debug)]
    struct Block;

    impl MessageHook for Block {
        fn name(&self) -> &str {
            "block"
        }

        fn on_message(&self, message: &str, recipient: Recipient) -> HookOutcome {
            match recipient {
                Recipient::Everyone => HookOutcome::suppress(message),
                Recipient::Player(_) => HookOutcome::proceed(message),
            }
        }
    }

    #[test]
    fn test_hook_point_names() {
        assert_eq!(HookPoint::PreRconSay.to_string(), "preRconSay");
        assert_eq!(HookPoint::PreRconTell.to_string(), "preRconTell");
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let bus = HookBus::new();
        assert!(bus.register(HookPoint::PreRconSay, Arc::new(Suffix("a"))));
        assert!(!bus.register(HookPoint::PreRconSay, Arc::new(Suffix("a"))));
        assert!(bus.register(HookPoint::PreRconTell, Arc::new(Suffix("a"))));
        assert_eq!(bus.handler_count(HookPoint::PreRconSay), 1);
    }

    #[test]
    fn test_dispatch_chains_in_registration_order() {
        let bus = HookBus::new();
        bus.register(HookPoint::PreRconSay, Arc::new(Suffix("1")));
        bus.register(HookPoint::PreRconSay, Arc::new(Suffix("2")));
        assert_eq!(
            bus.dispatch(HookPoint::PreRconSay, "msg", Recipient::Everyone),
            Some("msg12".to_string())
        );
        assert_eq!(
            bus.dispatch(HookPoint::PreRconTell, "msg", Recipient::Player(7)),
            Some("msg".to_string())
        );
    }

    #[test]
    fn test_dispatch_stops_at_suppression() {
        let bus = HookBus::new();
        bus.register(HookPoint::PreRconSay, Arc::new(Block));
        bus.register(HookPoint::PreRconSay, Arc::new(Suffix("x")));
        assert_eq!(bus.dispatch(HookPoint::PreRconSay, "msg", Recipient::Everyone), None);
        assert_eq!(
            bus.dispatch(HookPoint::PreRconSay, "msg", Recipient::Player(1)),
            Some("msgx".to_string())
        );
    }

    #[test]
    fn test_unregister_unknown_handler() {
        let bus = HookBus::new();
        assert!(!bus.unregister(HookPoint::PreRconSay, "missing"));
        bus.register(HookPoint::PreRconSay, Arc::new(Suffix("a")));
        assert!(bus.unregister(HookPoint::PreRconSay, "a"));
        assert!(!bus.is_registered(HookPoint::PreRconSay, "a"));
    }
}
