//! FIFO mutual exclusion.
//!
//! `std::sync::Mutex` makes no promise about which waiter runs next. Two
//! callers writing to the LED must be served in the order they asked, so
//! the transmitter sits behind a ticket lock instead.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Tickets {
    next: u64,
    serving: u64,
}

/// Mutex granting access in ticket order.
pub struct FifoMutex<T> {
    tickets: Mutex<Tickets>,
    turn: Condvar,
    data: UnsafeCell<T>,
}

// SAFETY: `data` is only reachable through a FifoGuard, and at most one
// guard exists at a time (the holder of ticket `serving`).
unsafe impl<T: Send> Send for FifoMutex<T> {}
unsafe impl<T: Send> Sync for FifoMutex<T> {}

impl<T> FifoMutex<T> {
    pub fn new(data: T) -> Self {
        Self {
            tickets: Mutex::new(Tickets::default()),
            turn: Condvar::new(),
            data: UnsafeCell::new(data),
        }
    }

    // The ticket counters are updated in single statements, so a panic
    // elsewhere cannot leave them inconsistent; poisoning is ignored.
    fn tickets(&self) -> MutexGuard<'_, Tickets> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until every earlier caller has released, then lock.
    pub fn lock(&self) -> FifoGuard<'_, T> {
        let mut tickets = self.tickets();
        let mine = tickets.next;
        tickets.next += 1;

        while tickets.serving != mine {
            tickets = self.turn.wait(tickets).unwrap_or_else(PoisonError::into_inner);
        }

        FifoGuard { lock: self }
    }

    /// Callers holding or waiting for the lock.
    pub fn queued(&self) -> u64 {
        let tickets = self.tickets();
        tickets.next - tickets.serving
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

/// Exclusive access, released on drop.
pub struct FifoGuard<'a, T> {
    lock: &'a FifoMutex<T>,
}

impl<T> Deref for FifoGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this guard holds the current ticket.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for FifoGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: this guard holds the current ticket.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for FifoGuard<'_, T> {
    fn drop(&mut self) {
        let mut tickets = self.lock.tickets();
        tickets.serving += 1;
        drop(tickets);
        self.lock.turn.notify_all();
    }
}
