use crate::error::FarmError;
use crate::job::Job;
use crate::server::Server;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const DLB_QUEUE_LENGTH_WEIGHT: f64 = 0.5;
const DLB_REMAINING_WORK_WEIGHT: f64 = 0.5;

macro_rules! register_policies {
    ($($(#[$doc:meta])* $tag:literal => $variant:ident),* $(,)?) => {
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub enum DispatchPolicy {
            $(
                $(#[$doc])*
                #[serde(rename = $tag)]
                $variant,
            )*
        }

        impl DispatchPolicy {
            pub const ALL: &'static [DispatchPolicy] = &[$(DispatchPolicy::$variant),*];

            pub fn tag(&self) -> &'static str {
                match self {
                    $(DispatchPolicy::$variant => $tag,)*
                }
            }
        }

        impl FromStr for DispatchPolicy {
            type Err = FarmError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(DispatchPolicy::$variant),)*
                    other => Err(FarmError::UnknownPolicy(other.to_string())),
                }
            }
        }
    };
}

register_policies!(
    /// Uniformly random server.
    "random" => Random,
    /// Cycles through the servers in order.
    "round" => RoundRobin,
    /// Fewest queued jobs.
    "shortest" => ShortestQueue,
    /// Least remaining work.
    "least" => LeastWork,
    /// Lowest average remaining work per queued job; idle servers score zero.
    "timeSensitive" => TimeSensitive,
    /// Weighted blend of queue length and remaining work.
    "dlb" => DynamicLoadBalance,
);

impl Default for DispatchPolicy {
    fn default() -> Self {
        DispatchPolicy::Random
    }
}

impl std::fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Applies a policy to a server list. Holds the only mutable policy state:
/// the round-robin cursor and the random source.
pub struct Selector {
    policy: DispatchPolicy,
    next_rr_idx: usize,
    rng: StdRng,
}

impl Selector {
    pub fn new(policy: DispatchPolicy, rng: StdRng) -> Self {
        Self {
            policy,
            next_rr_idx: 0,
            rng,
        }
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Picks a server index.
    ///
    /// # Panics
    ///
    /// Panics if `servers` is empty. A `Dispatcher` never holds an empty farm.
    pub fn select(&mut self, servers: &[Server], _job: &Job) -> usize {
        match self.policy {
            DispatchPolicy::Random => self.rng.gen_range(0..servers.len()),
            DispatchPolicy::RoundRobin => {
                let idx = self.next_rr_idx % servers.len();
                self.next_rr_idx = (idx + 1) % servers.len();
                idx
            }
            DispatchPolicy::ShortestQueue => first_minimum(servers, |s| s.size() as f64),
            DispatchPolicy::LeastWork => first_minimum(servers, Server::remaining_work_in_queue),
            DispatchPolicy::DynamicLoadBalance => first_minimum(servers, |s| {
                DLB_QUEUE_LENGTH_WEIGHT * s.size() as f64
                    + DLB_REMAINING_WORK_WEIGHT * s.remaining_work_in_queue()
            }),
            DispatchPolicy::TimeSensitive => {
                let mut best: Option<(usize, f64)> = None;
                for (idx, server) in servers.iter().enumerate() {
                    let score = average_work_per_job(server);
                    if score < best.map_or(f64::MAX, |(_, b)| b) {
                        best = Some((idx, score));
                    }
                }
                match best {
                    Some((idx, _)) => idx,
                    None => self.rng.gen_range(0..servers.len()),
                }
            }
        }
    }
}

fn average_work_per_job(server: &Server) -> f64 {
    if server.size() > 0 {
        server.remaining_work_in_queue() / server.size() as f64
    } else {
        0.0
    }
}

/// Index of the lowest score; earlier servers win ties.
fn first_minimum<F>(servers: &[Server], score: F) -> usize
where
    F: Fn(&Server) -> f64,
{
    let mut best_idx = 0;
    let mut best_score = score(&servers[0]);
    for (idx, server) in servers.iter().enumerate().skip(1) {
        let s = score(server);
        if s < best_score {
            best_idx = idx;
            best_score = s;
        }
    }
    best_idx
}
