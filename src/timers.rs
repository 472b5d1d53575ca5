use crate::behaviors::Behavior;

/// One-shot scheduled work. Equal due times run in scheduling (FIFO) order,
/// which the `order` field preserves across removals.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) behavior: Behavior,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TimerQueue {
    tasks: Vec<ScheduledTask>,
    next_id: i64,
    next_order: i64,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            next_order: 0,
        }
    }

    pub(crate) fn schedule(&mut self, now_ms: i64, delay_ms: i64, behavior: Behavior) -> i64 {
        let delay_ms = delay_ms.max(0);
        let id = self.next_id;
        self.next_id += 1;
        let order = self.next_order;
        self.next_order += 1;
        self.tasks.push(ScheduledTask {
            id,
            due_at: now_ms + delay_ms,
            order,
            behavior,
        });
        id
    }

    pub(crate) fn pending(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .tasks
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub(crate) fn clear(&mut self, id: i64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub(crate) fn clear_all(&mut self) -> usize {
        let cleared = self.tasks.len();
        self.tasks.clear();
        cleared
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        let mut best: Option<(usize, i64, i64)> = None;
        for (index, task) in self.tasks.iter().enumerate() {
            if due_limit.is_some_and(|limit| task.due_at > limit) {
                continue;
            }
            let key = (task.due_at, task.order);
            match best {
                Some((_, due, order)) if (due, order) <= key => {}
                _ => best = Some((index, task.due_at, task.order)),
            }
        }
        best.map(|(index, _, _)| index)
    }

    /// Earliest task due at or before `limit`, removed from the queue.
    pub(crate) fn pop_due(&mut self, limit: i64) -> Option<ScheduledTask> {
        let index = self.next_task_index(Some(limit))?;
        Some(self.tasks.remove(index))
    }

    /// Earliest task regardless of due time, removed from the queue.
    pub(crate) fn pop_next(&mut self) -> Option<ScheduledTask> {
        let index = self.next_task_index(None)?;
        Some(self.tasks.remove(index))
    }
}
