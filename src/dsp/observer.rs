//! Fixed-slot event subscription.

/*
Observers
=========

Envelopes and oscillators announce three state transitions each (start, a
phase boundary, stop). Anything that wants to follow them - a voice meter,
a GUI preview, a test - registers a callback for one event kind.

The callbacks run inside the audio callback, so the storage is a fixed grid:

    event kind →  [ slot 0 | slot 1 | slot 2 | slot 3 ]
    ─────────────────────────────────────────────────
    0 (start)     [  fn+ctx |  None  |  None  |  None  ]
    1 (phase)     [  None   |  None  |  None  |  None  ]
    2 (stop)      [  fn+ctx |  fn+ctx|  None  |  None  ]

Each slot holds a plain `fn` pointer and an opaque `usize` context chosen by
the subscriber (an index into its own table, a voice id, ...). Nothing is
captured by reference and nothing is boxed, so notifying is a short loop over
at most four entries with no allocation. An empty slot is a no-op.
*/

use std::fmt;

use crate::error::{Error, Result};

/// Subscriber slots per event kind.
pub const MAX_SUBSCRIBERS: usize = 4;

/// Event kinds per observed type.
const EVENT_KINDS: usize = 3;

/// An event kind that maps onto one of the three slot rows.
pub trait EventKind: Copy {
    /// Name used in error messages.
    const NAME: &'static str;

    /// Row index in `0..3`.
    fn slot(self) -> usize;
}

/// Callback signature: the observed object and the subscriber's context.
pub type Callback<T> = fn(&T, usize);

/// A registered callback together with its opaque context value.
pub struct Subscriber<T> {
    pub callback: Callback<T>,
    pub context: usize,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Subscriber<T> {}

/// Fixed grid of subscribers, one row per event kind.
pub struct Observers<T> {
    slots: [[Option<Subscriber<T>>; MAX_SUBSCRIBERS]; EVENT_KINDS],
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self {
            slots: [[None; MAX_SUBSCRIBERS]; EVENT_KINDS],
        }
    }

    /// Register `callback` for `event`. Returns the slot index, which can be
    /// passed to [`Observers::unsubscribe`].
    pub fn subscribe<E: EventKind>(
        &mut self,
        event: E,
        callback: Callback<T>,
        context: usize,
    ) -> Result<usize> {
        let row = &mut self.slots[event.slot()];
        let index = row
            .iter()
            .position(Option::is_none)
            .ok_or(Error::SubscribersFull(E::NAME))?;
        row[index] = Some(Subscriber { callback, context });
        Ok(index)
    }

    /// Remove the subscriber in `slot`, returning it if there was one.
    pub fn unsubscribe<E: EventKind>(&mut self, event: E, slot: usize) -> Option<Subscriber<T>> {
        self.slots[event.slot()].get_mut(slot).and_then(Option::take)
    }

    pub fn clear(&mut self) {
        self.slots = [[None; MAX_SUBSCRIBERS]; EVENT_KINDS];
    }

    /// Number of live subscribers for `event`.
    pub fn count<E: EventKind>(&self, event: E) -> usize {
        self.slots[event.slot()].iter().flatten().count()
    }

    #[inline]
    pub fn notify<E: EventKind>(&self, event: E, subject: &T) {
        for subscriber in self.slots[event.slot()].iter().flatten() {
            (subscriber.callback)(subject, subscriber.context);
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Self { slots: self.slots }
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: [usize; EVENT_KINDS] =
            std::array::from_fn(|row| self.slots[row].iter().flatten().count());
        f.debug_struct("Observers").field("subscribers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Clone, Copy)]
    enum Ping {
        A,
        C,
    }

    impl EventKind for Ping {
        const NAME: &'static str = "ping";

        fn slot(self) -> usize {
            match self {
                Ping::A => 0,
                Ping::C => 2,
            }
        }
    }

    struct Subject(u32);

    thread_local! {
        static SEEN: RefCell<Vec<(u32, usize)>> = const { RefCell::new(Vec::new()) };
    }

    fn record(subject: &Subject, context: usize) {
        SEEN.with(|seen| seen.borrow_mut().push((subject.0, context)));
    }

    #[test]
    fn empty_observers_do_nothing() {
        SEEN.with(|seen| seen.borrow_mut().clear());
        let observers: Observers<Subject> = Observers::new();
        observers.notify(Ping::A, &Subject(1));
        SEEN.with(|seen| assert!(seen.borrow().is_empty()));
    }

    #[test]
    fn notify_reaches_only_matching_kind() {
        SEEN.with(|seen| seen.borrow_mut().clear());
        let mut observers = Observers::new();
        observers.subscribe(Ping::A, record, 7).unwrap();
        observers.subscribe(Ping::C, record, 9).unwrap();

        observers.notify(Ping::C, &Subject(42));

        SEEN.with(|seen| assert_eq!(*seen.borrow(), vec![(42, 9)]));
    }

    #[test]
    fn slots_fill_up_and_free_again() {
        let mut observers: Observers<Subject> = Observers::new();
        for context in 0..MAX_SUBSCRIBERS {
            assert_eq!(observers.subscribe(Ping::A, record, context), Ok(context));
        }
        assert_eq!(
            observers.subscribe(Ping::A, record, 99),
            Err(Error::SubscribersFull("ping"))
        );

        let removed = observers.unsubscribe(Ping::A, 1).expect("slot 1 was taken");
        assert_eq!(removed.context, 1);
        assert_eq!(observers.count(Ping::A), MAX_SUBSCRIBERS - 1);
        assert_eq!(observers.subscribe(Ping::A, record, 99), Ok(1));

        observers.clear();
        assert_eq!(observers.count(Ping::A), 0);
    }
}
