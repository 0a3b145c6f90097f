// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Multiplex many software timer tasks onto one hardware tick source.
//!
//! The scheduler owns a fixed arena of task slots. Registration
//! returns a [`TaskHandle`] naming the claimed slot; the handle stays
//! valid until the task is removed or, for one-shot tasks, until it
//! fires. Each hardware tick decrements every active counter and runs
//! the callbacks of the tasks that reach zero, in slot order.

use core::cell::Cell;

use tickbus_kernel::hil::time::{TickClient, TickSource};
use tickbus_kernel::utilities::cells::OptionalCell;
use tickbus_kernel::ErrorCode;

/// Whether a task fires once or rearms itself after every expiry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    OneShot,
    Repeat,
}

/// Names one registered task.
///
/// Handles are generation-tagged: once the task is removed the handle
/// goes stale and every later use reports `ErrorCode::InvalidTask`
/// instead of touching whatever claimed the slot next.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHandle {
    index: usize,
    generation: u32,
}

/// Implemented by whoever registers a task.
pub trait TaskClient {
    /// Called in interrupt context when the task's interval elapses.
    ///
    /// The client may add or remove tasks from here; mutations take
    /// effect for this tick's not-yet-fired tasks, and tasks added
    /// here fire no earlier than the next tick. A repeating task
    /// rearms after this returns, so `time_remaining` on `handle`
    /// reads 0 from inside the callback and the full interval once
    /// the tick completes.
    fn fired(&self, handle: TaskHandle);
}

struct TaskSlot<'a> {
    interval: Cell<u32>,
    remaining: Cell<u32>,
    mode: Cell<Mode>,
    client: OptionalCell<&'a dyn TaskClient>,
    active: Cell<bool>,
    due: Cell<bool>,
    generation: Cell<u32>,
}

impl<'a> TaskSlot<'a> {
    const EMPTY: TaskSlot<'a> = TaskSlot {
        interval: Cell::new(0),
        remaining: Cell::new(0),
        mode: Cell::new(Mode::OneShot),
        client: OptionalCell::empty(),
        active: Cell::new(false),
        due: Cell::new(false),
        generation: Cell::new(0),
    };

    fn release(&self) {
        self.active.set(false);
        self.due.set(false);
        self.client.clear();
        // Stale handles must miss, even if the slot is reused.
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}

/// A fixed-capacity timer-task scheduler driven by a [`TickSource`].
///
/// The scheduler implements [`TickClient`]; wire it to the tick source
/// with `tick_source.set_client(scheduler)` and the periodic interrupt
/// drives everything else.
pub struct TaskScheduler<'a, T: TickSource<'a>, const N: usize> {
    tick_source: &'a T,
    slots: [TaskSlot<'a>; N],
}

impl<'a, T: TickSource<'a>, const N: usize> TaskScheduler<'a, T, N> {
    pub const fn new(tick_source: &'a T) -> TaskScheduler<'a, T, N> {
        TaskScheduler {
            tick_source,
            slots: [TaskSlot::EMPTY; N],
        }
    }

    /// Register a task firing every `interval` ticks.
    ///
    /// The first expiry happens `interval` ticks from now. Fails with
    /// `ErrorCode::Size` for a zero interval and
    /// `ErrorCode::CapacityExceeded` when every slot is taken; the
    /// table is untouched on failure.
    pub fn add_task(
        &self,
        interval: u32,
        mode: Mode,
        client: &'a dyn TaskClient,
    ) -> Result<TaskHandle, ErrorCode> {
        if interval == 0 {
            return Err(ErrorCode::Size);
        }
        critical_section::with(|_| {
            let (index, slot) = self
                .slots
                .iter()
                .enumerate()
                .find(|(_, slot)| !slot.active.get())
                .ok_or(ErrorCode::CapacityExceeded)?;
            slot.interval.set(interval);
            slot.remaining.set(interval);
            slot.mode.set(mode);
            slot.client.set(client);
            slot.due.set(false);
            slot.active.set(true);
            Ok(TaskHandle {
                index,
                generation: slot.generation.get(),
            })
        })
    }

    /// Remove a registered task.
    ///
    /// Takes effect no later than the next tick; a callback already in
    /// flight for this task is not aborted. Fails with
    /// `ErrorCode::InvalidTask` if the handle is stale or never named
    /// a task.
    pub fn remove_task(&self, handle: TaskHandle) -> Result<(), ErrorCode> {
        critical_section::with(|_| {
            let slot = self.slot_for(handle)?;
            slot.release();
            Ok(())
        })
    }

    /// Enable the underlying tick source. Registered tasks persist
    /// across stop/start.
    pub fn start(&self) -> Result<(), ErrorCode> {
        self.tick_source.start()
    }

    /// Disable the underlying tick source, freezing every counter.
    pub fn stop(&self) -> Result<(), ErrorCode> {
        self.tick_source.stop()
    }

    /// Ticks left until `handle` next fires.
    pub fn time_remaining(&self, handle: TaskHandle) -> Result<u32, ErrorCode> {
        let slot = self.slot_for(handle)?;
        Ok(slot.remaining.get())
    }

    /// Number of currently registered tasks.
    pub fn active_tasks(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active.get()).count()
    }

    fn slot_for(&self, handle: TaskHandle) -> Result<&TaskSlot<'a>, ErrorCode> {
        let slot = self.slots.get(handle.index).ok_or(ErrorCode::InvalidTask)?;
        if !slot.active.get() || slot.generation.get() != handle.generation {
            return Err(ErrorCode::InvalidTask);
        }
        Ok(slot)
    }
}

impl<'a, T: TickSource<'a>, const N: usize> TickClient for TaskScheduler<'a, T, N> {
    fn tick(&self) {
        // Decrement pass: age every active counter and mark the ones
        // expiring on this tick.
        for slot in self.slots.iter() {
            if !slot.active.get() {
                continue;
            }
            let remaining = slot.remaining.get().saturating_sub(1);
            slot.remaining.set(remaining);
            if remaining == 0 {
                slot.due.set(true);
            }
        }

        // Fire pass, in slot order (the tie-break when several tasks
        // expire on the same tick). Flags are re-read per slot, so a
        // callback removing a not-yet-fired task suppresses its
        // callback, and tasks added mid-pass start with `due` clear.
        for index in 0..N {
            let slot = &self.slots[index];
            if !slot.active.get() || !slot.due.get() {
                continue;
            }
            slot.due.set(false);
            let handle = TaskHandle {
                index,
                generation: slot.generation.get(),
            };
            match slot.mode.get() {
                Mode::Repeat => {
                    slot.client.map(|client| client.fired(handle));
                    // The callback ran against the expired counter;
                    // rearm only if it did not remove the task.
                    if slot.active.get() && slot.generation.get() == handle.generation {
                        slot.remaining.set(slot.interval.get());
                    }
                }
                Mode::OneShot => {
                    slot.client.map(|client| client.fired(handle));
                    // The callback may already have removed the task
                    // itself; only retire the slot if it is still the
                    // one we fired.
                    if slot.active.get() && slot.generation.get() == handle.generation {
                        slot.release();
                    }
                }
            }
        }
    }
}
