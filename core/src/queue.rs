use crate::job::Job;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::binary_heap::PeekMut;
use std::collections::{BinaryHeap, VecDeque};

/// Order in which a server works through its queue.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueueDiscipline {
    /// Strict arrival order.
    #[default]
    #[serde(rename = "fifo")]
    Fifo,
    /// Least remaining work first, preempting among queued jobs.
    #[serde(rename = "preemptive")]
    ShortestRemaining,
}

impl std::fmt::Display for QueueDiscipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueDiscipline::Fifo => f.write_str("fifo"),
            QueueDiscipline::ShortestRemaining => f.write_str("preemptive"),
        }
    }
}

/// Heap entry ranked by remaining work, then by enqueue order.
#[derive(Debug)]
pub(crate) struct Ranked {
    seq: u64,
    job: Job,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Ranked {}
impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.job
            .remaining_work()
            .total_cmp(&other.job.remaining_work())
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug)]
pub(crate) enum JobQueue {
    Fifo(VecDeque<Job>),
    ShortestRemaining {
        heap: BinaryHeap<Reverse<Ranked>>,
        next_seq: u64,
    },
}

impl JobQueue {
    pub fn new(discipline: QueueDiscipline) -> Self {
        match discipline {
            QueueDiscipline::Fifo => JobQueue::Fifo(VecDeque::new()),
            QueueDiscipline::ShortestRemaining => JobQueue::ShortestRemaining {
                heap: BinaryHeap::new(),
                next_seq: 0,
            },
        }
    }

    pub fn push(&mut self, job: Job) {
        match self {
            JobQueue::Fifo(queue) => queue.push_back(job),
            JobQueue::ShortestRemaining { heap, next_seq } => {
                heap.push(Reverse(Ranked { seq: *next_seq, job }));
                *next_seq += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            JobQueue::Fifo(queue) => queue.len(),
            JobQueue::ShortestRemaining { heap, .. } => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining work of the job that would run next.
    pub fn next_remaining(&self) -> Option<f64> {
        match self {
            JobQueue::Fifo(queue) => queue.front().map(Job::remaining_work),
            JobQueue::ShortestRemaining { heap, .. } => {
                heap.peek().map(|entry| entry.0.job.remaining_work())
            }
        }
    }

    /// Runs the next job for at most `budget` starting at `started`.
    /// Returns the time spent and, if it completed, the job itself.
    pub fn run_next(&mut self, budget: f64, started: f64) -> Option<(f64, Option<Job>)> {
        match self {
            JobQueue::Fifo(queue) => {
                let job = queue.front_mut()?;
                let spent = job.process(budget, started);
                if job.is_finished() {
                    Some((spent, queue.pop_front()))
                } else {
                    Some((spent, None))
                }
            }
            JobQueue::ShortestRemaining { heap, .. } => {
                // Work only shrinks the top's key, so it stays on top until popped.
                let mut top = heap.peek_mut()?;
                let spent = top.0.job.process(budget, started);
                if top.0.job.is_finished() {
                    let Reverse(entry) = PeekMut::pop(top);
                    Some((spent, Some(entry.job)))
                } else {
                    Some((spent, None))
                }
            }
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &Job> + '_> {
        match self {
            JobQueue::Fifo(queue) => Box::new(queue.iter()),
            JobQueue::ShortestRemaining { heap, .. } => Box::new(heap.iter().map(|e| &e.0.job)),
        }
    }
}
