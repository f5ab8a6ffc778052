use std::sync::{Arc, Mutex, Weak};

pub(crate) type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    items: Vec<(u64, Listener<T>)>,
}

/// Callback registry with explicit subscribe / unsubscribe.
pub(crate) struct Listeners<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 1,
                items: Vec::new(),
            })),
        }
    }
}

impl<T: 'static> Listeners<T> {
    pub fn subscribe(&self, listener: Listener<T>) -> Subscription {
        let mut reg = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        let id = reg.next_id;
        reg.next_id += 1;
        reg.items.push((id, listener));

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    let mut reg = registry.lock().unwrap_or_else(|e| e.into_inner());
                    reg.items.retain(|(i, _)| *i != id);
                }
            })),
        }
    }

    pub fn emit(&self, value: &T) {
        // Snapshot first so a listener may subscribe/unsubscribe without deadlocking.
        let snapshot: Vec<Listener<T>> = {
            let reg = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            reg.items.iter().map(|(_, l)| l.clone()).collect()
        };
        for l in snapshot {
            l(value);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .items
            .len()
    }
}

/// Unsubscribes when dropped.
pub(crate) struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    #[cfg(test)]
    pub fn unsubscribe(mut self) {
        if let Some(c) = self.cancel.take() {
            c();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(c) = self.cancel.take() {
            c();
        }
    }
}
