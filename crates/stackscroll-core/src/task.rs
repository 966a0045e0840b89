//! Request sequencing for async view-model actions.
//!
//! Each action draws a [`TaskId`] from its view-model's [`TaskSeq`] when it
//! starts. A completion is applied only if its id is still the active one, so
//! a late reply to an older request can never overwrite newer state.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// In-flight state of one action (idle when `active` is `None`).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    active: Option<TaskId>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<TaskId> {
        self.active
    }

    /// Marks `id` as the request whose result counts, superseding any other.
    pub fn start(&mut self, id: TaskId) {
        self.active = Some(id);
    }

    /// Returns true (and goes idle) only if `id` is the active request.
    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}
