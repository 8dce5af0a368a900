// Command bus: a queue of dispatched commands plus prioritized listeners that
// are notified as each command is applied. Listener registrations are scoped
// handles released on drop.

use crossbeam_channel::{Receiver, Sender};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Listener priorities; higher runs first.
pub const PRIORITY_LOW: u8 = 1;
pub const PRIORITY_NORMAL: u8 = 2;
pub const PRIORITY_HIGH: u8 = 3;

type Listener<C> = Box<dyn FnMut(&C) -> bool>;

struct Entry<C> {
    id: u64,
    priority: u8,
    listener: Listener<C>,
}

struct Registry<C> {
    next_id: u64,
    entries: Vec<Entry<C>>,
    /// Set while listeners are out of `entries` being notified.
    notifying: bool,
    /// Ids released during the current notification.
    released: Vec<u64>,
}

impl<C> Registry<C> {
    fn release(&mut self, id: u64) {
        self.entries.retain(|e| e.id != id);
        if self.notifying {
            self.released.push(id);
        }
    }

    fn sort(&mut self) {
        // Stable: equal priorities keep registration order.
        self.entries.sort_by(|a, b| b.priority.cmp(&a.priority));
    }
}

/// Sending half of the bus; cheap to clone and hand to producers.
pub struct Dispatcher<C> {
    tx: Sender<C>,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<C: std::fmt::Debug> Dispatcher<C> {
    /// Queue a command for the bus owner to apply.
    pub fn dispatch(&self, command: C) {
        log::debug!("Dispatching {command:?}");
        if let Err(err) = self.tx.send(command) {
            log::warn!("Command bus closed, dropping {:?}", err.0);
        }
    }
}

/// Keeps a listener registered until released or dropped.
#[must_use = "dropping the handle unregisters the listener"]
pub struct ListenerHandle {
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerHandle {
    /// Unregister now.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.run_release();
    }
}

/// Typed command bus.
pub struct CommandBus<C> {
    tx: Sender<C>,
    rx: Receiver<C>,
    registry: Rc<RefCell<Registry<C>>>,
}

impl<C: 'static> Default for CommandBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> CommandBus<C> {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
                notifying: false,
                released: Vec::new(),
            })),
        }
    }

    pub fn dispatcher(&self) -> Dispatcher<C> {
        Dispatcher {
            tx: self.tx.clone(),
        }
    }

    /// Next queued command, if any.
    pub fn try_next(&self) -> Option<C> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Register a listener. Listeners run highest priority first; one that
    /// returns `true` stops propagation.
    pub fn register<F>(&self, priority: u8, listener: F) -> ListenerHandle
    where
        F: FnMut(&C) -> bool + 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push(Entry {
                id,
                priority,
                listener: Box::new(listener),
            });
            registry.sort();
            id
        };

        let weak: Weak<RefCell<Registry<C>>> = Rc::downgrade(&self.registry);
        ListenerHandle {
            release: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().release(id);
                }
            })),
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    /// Notify listeners of an applied command. Returns whether one of them
    /// handled it. Listeners may register or release others while running.
    pub fn notify(&self, command: &C) -> bool {
        let mut running = {
            let mut registry = self.registry.borrow_mut();
            if registry.notifying {
                log::warn!("Nested command notification ignored");
                return false;
            }
            registry.notifying = true;
            std::mem::take(&mut registry.entries)
        };

        let mut handled = false;
        for entry in running.iter_mut() {
            if self.registry.borrow().released.contains(&entry.id) {
                continue;
            }
            if (entry.listener)(command) {
                handled = true;
                break;
            }
        }

        let mut registry = self.registry.borrow_mut();
        let released = std::mem::take(&mut registry.released);
        running.retain(|e| !released.contains(&e.id));
        let added = std::mem::take(&mut registry.entries);
        running.extend(added);
        registry.entries = running;
        registry.sort();
        registry.notifying = false;
        handled
    }
}
