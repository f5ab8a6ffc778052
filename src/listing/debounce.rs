use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) const SEARCH_DEBOUNCE_MS: u32 = 500;

/// One-shot timers. Dropping the returned handle cancels the task if it has not run.
pub(crate) trait Scheduler {
    type Handle;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// `setTimeout` via gloo.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct GlooScheduler;

impl Scheduler for GlooScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, task)
    }
}

/// Collapses a burst of values into one call with the last value, `delay_ms` after the burst
/// ends. At most one timer is pending; rescheduling replaces (and cancels) it.
pub(crate) struct Debouncer<T: 'static, S: Scheduler> {
    scheduler: S,
    delay_ms: u32,
    on_fire: Rc<dyn Fn(T)>,
    pending: RefCell<Option<S::Handle>>,
}

impl<T: 'static, S: Scheduler> Debouncer<T, S> {
    pub fn new(scheduler: S, delay_ms: u32, on_fire: impl Fn(T) + 'static) -> Self {
        Self {
            scheduler,
            delay_ms,
            on_fire: Rc::new(on_fire),
            pending: RefCell::new(None),
        }
    }

    pub fn schedule(&self, value: T) {
        let on_fire = self.on_fire.clone();
        let handle = self
            .scheduler
            .schedule(self.delay_ms, Box::new(move || on_fire(value)));
        // Replacing drops the previous handle, which cancels it.
        self.pending.replace(Some(handle));
    }

    pub fn cancel(&self) {
        self.pending.replace(None);
    }
}


#[cfg(test)]
mod tests {
    use super::manual::ManualScheduler;
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(String) + 'static) {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let sink = fired.clone();
        (fired, move |v: String| sink.borrow_mut().push(v))
    }

    #[test]
    fn test_burst_fires_once_with_last_value() {
        let clock = ManualScheduler::default();
        let (fired, on_fire) = recorder();
        let d = Debouncer::new(clock.clone(), SEARCH_DEBOUNCE_MS, on_fire);

        for term in ["i", "in", "ind"] {
            d.schedule(term.to_string());
        }
        assert_eq!(clock.last_delay(), Some(500));
        assert!(fired.borrow().is_empty());

        assert_eq!(clock.advance(), 1);
        assert_eq!(*fired.borrow(), vec!["ind".to_string()]);
    }

    #[test]
    fn test_separate_bursts_fire_separately() {
        let clock = ManualScheduler::default();
        let (fired, on_fire) = recorder();
        let d = Debouncer::new(clock.clone(), SEARCH_DEBOUNCE_MS, on_fire);

        d.schedule("fr".to_string());
        clock.advance();
        d.schedule("ger".to_string());
        clock.advance();

        assert_eq!(*fired.borrow(), vec!["fr".to_string(), "ger".to_string()]);
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let clock = ManualScheduler::default();
        let (fired, on_fire) = recorder();
        let d = Debouncer::new(clock.clone(), SEARCH_DEBOUNCE_MS, on_fire);

        d.schedule("pending".to_string());
        d.cancel();

        assert_eq!(clock.advance(), 0);
        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn test_dropping_debouncer_cancels() {
        let clock = ManualScheduler::default();
        let (fired, on_fire) = recorder();
        let d = Debouncer::new(clock.clone(), SEARCH_DEBOUNCE_MS, on_fire);

        d.schedule("gone".to_string());
        drop(d);

        assert_eq!(clock.advance(), 0);
        assert!(fired.borrow().is_empty());
    }
}
