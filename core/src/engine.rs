use crate::analytics::{FarmReport, WaitingTimes};
use crate::config::FarmConfig;
use crate::error::{FarmError, Result};
use crate::job::Job;
use crate::policy::{DispatchPolicy, Selector};
use crate::server::Server;
use crate::traits::{FarmInspector, ServerLoad};
use log::{debug, trace};
use rand::prelude::*;

/// Owns the server farm, keeps virtual time, and routes each arriving job
/// to a server chosen by its policy.
pub struct Dispatcher {
    config: FarmConfig,
    servers: Vec<Server>,
    selector: Selector,
    time: f64,
    jobs_handled: u64,
    waiting_times: WaitingTimes,
    finished: Vec<Job>,
}

impl Dispatcher {
    pub fn new(config: FarmConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let servers = (0..config.servers)
            .map(|_| Server::new(config.discipline))
            .collect();
        debug!(
            "farm initialized: {} {} servers, policy {}",
            config.servers, config.discipline, config.policy
        );
        Ok(Self {
            selector: Selector::new(config.policy, rng),
            servers,
            time: 0.0,
            jobs_handled: 0,
            waiting_times: WaitingTimes::new()?,
            finished: Vec::new(),
            config,
        })
    }

    pub fn with_policy(servers: usize, policy: DispatchPolicy) -> Result<Self> {
        Self::new(FarmConfig::new(servers, policy))
    }

    pub fn config(&self) -> &FarmConfig {
        &self.config
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.selector.policy()
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Completed jobs in completion order. Empty unless `retain_finished` is set.
    pub fn finished_jobs(&self) -> &[Job] {
        &self.finished
    }

    pub fn advance_time_to(&mut self, time: f64) -> Result<()> {
        if time.is_nan() || time < self.time {
            return Err(FarmError::NonMonotonicTime {
                current: self.time,
                requested: time,
            });
        }
        self.time = time;
        self.process_all_to(time)
    }

    fn process_all_to(&mut self, time: f64) -> Result<()> {
        let Self {
            servers,
            waiting_times,
            finished,
            config,
            ..
        } = self;
        for server in servers.iter_mut() {
            server.process_to_with(time, |job| {
                waiting_times.record(job.time_in_queue().unwrap_or(0.0));
                if config.retain_finished {
                    finished.push(job);
                }
            })?;
        }
        Ok(())
    }

    /// Chooses a destination for `job` without touching any server.
    pub fn pick_server(&mut self, job: &Job) -> usize {
        self.selector.select(&self.servers, job)
    }

    /// Dispatches `job` at its arrival time and returns the chosen server index.
    pub fn handle_job(&mut self, job: Job) -> Result<usize> {
        validate_job(&job)?;
        self.advance_time_to(job.arrival_time())?;
        let idx = self.pick_server(&job);
        trace!(
            "t={:.4} job {} ({:.4}) -> server {}",
            self.time,
            job.id,
            job.processing_time_needed(),
            idx
        );
        self.servers[idx].add_job(job);
        self.jobs_handled += 1;
        Ok(idx)
    }

    /// Drains every queue. Call once after the last job has been handled.
    pub fn finish_up(&mut self) -> Result<()> {
        let max_remaining = self
            .servers
            .iter()
            .map(Server::remaining_work_in_queue)
            .fold(0.0, f64::max);
        let finish_time = self.time + max_remaining;
        self.process_all_to(finish_time)?;
        self.time = finish_time;

        if !self.servers.iter().all(Server::is_idle) {
            // Rounding in the work accumulators left a sliver queued.
            let late = self.drain_stragglers();
            debug!("drain overran by rounding, last job done at t={:.6}", late);
            self.time = self.time.max(late);
            self.process_all_to(self.time)?;
        }
        debug!(
            "farm drained at t={:.4} after {} jobs",
            self.time, self.jobs_handled
        );
        Ok(())
    }

    fn drain_stragglers(&mut self) -> f64 {
        let Self {
            servers,
            waiting_times,
            finished,
            config,
            ..
        } = self;
        let mut latest = f64::MIN;
        for server in servers.iter_mut().filter(|s| !s.is_idle()) {
            let done = server.drain_with(|job| {
                waiting_times.record(job.time_in_queue().unwrap_or(0.0));
                if config.retain_finished {
                    finished.push(job);
                }
            });
            latest = latest.max(done);
        }
        latest
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn jobs_handled(&self) -> u64 {
        self.jobs_handled
    }

    pub fn total_waiting_time(&self) -> f64 {
        self.servers.iter().map(Server::total_waiting_time).sum()
    }

    pub fn jobs_completed(&self) -> u64 {
        self.servers.iter().map(Server::processed_count).sum()
    }

    pub fn average_waiting_time(&self) -> Result<f64> {
        if self.jobs_handled == 0 {
            return Err(FarmError::NoMetricsAvailable);
        }
        Ok(self.total_waiting_time() / self.jobs_handled as f64)
    }

    pub fn report(&self) -> Result<FarmReport> {
        let average_waiting_time = self.average_waiting_time()?;
        let (p50, p99, max) = if self.waiting_times.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                self.waiting_times.quantile(0.5),
                self.waiting_times.quantile(0.99),
                self.waiting_times.max(),
            )
        };
        Ok(FarmReport {
            policy: self.policy(),
            discipline: self.config.discipline,
            servers: self.servers.len(),
            jobs_handled: self.jobs_handled,
            jobs_completed: self.jobs_completed(),
            average_waiting_time,
            p50_waiting_time: p50,
            p99_waiting_time: p99,
            max_waiting_time: max,
            makespan: self.time,
        })
    }

    /// Feeds the whole job sequence, drains the farm and reports.
    pub fn run<I>(&mut self, jobs: I) -> Result<FarmReport>
    where
        I: IntoIterator<Item = Job>,
    {
        for job in jobs {
            self.handle_job(job)?;
        }
        self.finish_up()?;
        self.report()
    }
}

impl FarmInspector for Dispatcher {
    fn time(&self) -> f64 {
        Dispatcher::time(self)
    }

    fn jobs_handled(&self) -> u64 {
        Dispatcher::jobs_handled(self)
    }

    fn server_loads(&self) -> Vec<ServerLoad> {
        self.servers.iter().map(Server::load).collect()
    }
}

fn validate_job(job: &Job) -> Result<()> {
    let reason = if !job.arrival_time().is_finite() {
        "arrival time must be finite"
    } else if !job.processing_time_needed().is_finite() {
        "processing time must be finite"
    } else if job.processing_time_needed() < 0.0 {
        "processing time must not be negative"
    } else {
        return Ok(());
    };
    Err(FarmError::InvalidJob {
        id: job.id,
        reason: reason.to_string(),
    })
}
