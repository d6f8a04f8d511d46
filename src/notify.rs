//! Typed notification bus with deferred dispatch.
//!
//! One `Notifier` per payload type. Events pushed with [`Notifier::push`]
//! wait in a queue until [`Notifier::flush`], usually once per frame.
//! [`Notifier::push_immediate`] bypasses the queue.

/// Handle returned by `add_listener`, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<E> {
    id: ListenerId,
    callback: Box<dyn FnMut(&E)>,
}

pub struct Notifier<E> {
    listeners: Vec<Listener<E>>,
    queue: Vec<E>,
    /// Payload used by `push_default`.
    default: Option<E>,
    next_id: u64,
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            queue: Vec::new(),
            default: None,
            next_id: 0,
        }
    }

    pub fn with_default(default: E) -> Self {
        Self {
            default: Some(default),
            ..Self::new()
        }
    }

    pub fn set_default(&mut self, default: Option<E>) {
        self.default = default;
    }

    /// Listeners run in registration order.
    pub fn add_listener(&mut self, callback: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Returns false if `id` was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue `event` for the next flush.
    pub fn push(&mut self, event: E) {
        self.queue.push(event);
    }

    /// Dispatch `event` now. It is never queued.
    pub fn push_immediate(&mut self, event: E) {
        self.dispatch(&event);
    }

    /// Dispatch every queued event in push order. Returns how many.
    pub fn flush(&mut self) -> usize {
        if self.queue.is_empty() {
            return 0;
        }
        let mut queued = std::mem::take(&mut self.queue);
        for event in &queued {
            self.dispatch(event);
        }
        let count = queued.len();
        // Keep the allocation.
        queued.clear();
        self.queue = queued;
        count
    }

    fn dispatch(&mut self, event: &E) {
        for listener in &mut self.listeners {
            (listener.callback)(event);
        }
    }
}

impl<E: Clone> Notifier<E> {
    /// Queue a copy of the stored default. False if there is none.
    pub fn push_default(&mut self) -> bool {
        match &self.default {
            Some(default) => {
                let event = default.clone();
                self.queue.push(event);
                true
            }
            None => false,
        }
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Enable {
        time: f32,
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn FnMut(&Enable)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |name: &'static str| -> Box<dyn FnMut(&Enable)> {
            let sink = sink.clone();
            Box::new(move |e: &Enable| sink.borrow_mut().push(format!("{name}:{}", e.time)))
        };
        (log, make)
    }

    #[test]
    fn deferred_until_flush() {
        let (log, make) = recorder();
        let mut bus = Notifier::with_default(Enable { time: 100.0 });
        bus.add_listener(make("player"));
        bus.add_listener(make("enemy"));

        assert!(bus.push_default());
        bus.push(Enable { time: 20.0 });
        assert_eq!(bus.pending(), 2);
        assert!(log.borrow().is_empty());

        assert_eq!(bus.flush(), 2);
        assert_eq!(
            *log.borrow(),
            vec!["player:100", "enemy:100", "player:20", "enemy:20"]
        );
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn immediate_skips_queue() {
        let (log, make) = recorder();
        let mut bus: Notifier<Enable> = Notifier::new();
        bus.add_listener(make("player"));

        bus.push_immediate(Enable { time: 10.0 });
        assert_eq!(*log.borrow(), vec!["player:10"]);
        assert_eq!(bus.flush(), 0);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn no_default_means_nothing_queued() {
        let mut bus: Notifier<Enable> = Notifier::new();
        assert!(!bus.push_default());
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn listener_ids_keep_counting_past_u32() {
        let mut bus: Notifier<Enable> = Notifier::new();
        bus.next_id = u64::from(u32::MAX);
        let first = bus.add_listener(|_| {});
        let second = bus.add_listener(|_| {});
        assert_ne!(first, second);
        assert!(bus.remove_listener(first));
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn removed_listener_is_silent() {
        let (log, make) = recorder();
        let mut bus: Notifier<Enable> = Notifier::new();
        let player = bus.add_listener(make("player"));
        bus.add_listener(make("enemy"));

        assert!(bus.remove_listener(player));
        assert!(!bus.remove_listener(player));
        assert_eq!(bus.listener_count(), 1);

        bus.push(Enable { time: 1.0 });
        bus.flush();
        assert_eq!(*log.borrow(), vec!["enemy:1"]);
    }
}
