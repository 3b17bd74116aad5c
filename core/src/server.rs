use crate::error::{FarmError, Result};
use crate::job::Job;
use crate::queue::{JobQueue, QueueDiscipline};
use crate::traits::ServerLoad;

/// A single-queue processing unit that consumes job work over virtual time.
#[derive(Debug)]
pub struct Server {
    discipline: QueueDiscipline,
    queue: JobQueue,
    clock: f64,
    total_waiting_time: f64,
    remaining_work: f64,
    processed_count: u64,
}

impl Server {
    pub fn new(discipline: QueueDiscipline) -> Self {
        Self {
            discipline,
            queue: JobQueue::new(discipline),
            clock: 0.0,
            total_waiting_time: 0.0,
            remaining_work: 0.0,
            processed_count: 0,
        }
    }

    pub fn fifo() -> Self {
        Self::new(QueueDiscipline::Fifo)
    }

    pub fn preemptive() -> Self {
        Self::new(QueueDiscipline::ShortestRemaining)
    }

    pub fn add_job(&mut self, job: Job) {
        self.remaining_work += job.remaining_work().max(0.0);
        self.queue.push(job);
    }

    pub fn process_to(&mut self, target_time: f64) -> Result<()> {
        self.process_to_with(target_time, |_| {})
    }

    /// Works through the queue until `target_time`, handing each completed job to `on_finish`.
    pub fn process_to_with<F>(&mut self, target_time: f64, mut on_finish: F) -> Result<()>
    where
        F: FnMut(Job),
    {
        if target_time.is_nan() || target_time < self.clock {
            return Err(FarmError::NonMonotonicTime {
                current: self.clock,
                requested: target_time,
            });
        }

        self.run_for(target_time - self.clock, &mut on_finish);
        self.clock = target_time;
        Ok(())
    }

    /// Completes every queued job regardless of how long it takes and returns
    /// the time the last one finished.
    pub fn drain_with<F>(&mut self, mut on_finish: F) -> f64
    where
        F: FnMut(Job),
    {
        self.clock = self.run_for(f64::INFINITY, &mut on_finish);
        self.clock
    }

    /// Spends up to `available` time on the queue and returns the local time reached.
    fn run_for<F>(&mut self, mut available: f64, on_finish: &mut F) -> f64
    where
        F: FnMut(Job),
    {
        let mut now = self.clock;
        while let Some(next) = self.queue.next_remaining() {
            // Zero-length jobs still complete once reached.
            if available <= 0.0 && next > 0.0 {
                break;
            }
            let Some((spent, finished)) = self.queue.run_next(available.max(0.0), now) else {
                break;
            };
            available -= spent;
            now += spent;
            self.remaining_work = (self.remaining_work - spent).max(0.0);

            match finished {
                Some(job) => {
                    self.total_waiting_time += job.time_in_queue().unwrap_or(0.0);
                    self.processed_count += 1;
                    on_finish(job);
                }
                None if spent.is_nan() || spent <= 0.0 => break,
                None => {}
            }
        }

        if self.queue.is_empty() {
            self.remaining_work = 0.0;
        }
        now
    }

    pub fn remaining_work_in_queue(&self) -> f64 {
        self.remaining_work
    }

    pub fn size(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn time(&self) -> f64 {
        self.clock
    }

    pub fn total_waiting_time(&self) -> f64 {
        self.total_waiting_time
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    pub fn discipline(&self) -> QueueDiscipline {
        self.discipline
    }

    /// Jobs still queued, in no particular order for the preemptive discipline.
    pub fn queued_jobs(&self) -> impl Iterator<Item = &Job> + '_ {
        self.queue.iter()
    }

    pub fn load(&self) -> ServerLoad {
        ServerLoad {
            queue_len: self.size(),
            remaining_work: self.remaining_work,
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::fifo()
    }
}
