//! farmsim - compare job dispatch policies on a simulated server farm
//!
//! Feeds a synthetic Poisson job stream through a farm of servers and reports
//! the mean waiting time each dispatch policy achieves.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use farmsim_core::{
    DispatchPolicy, Dispatcher, ExperimentConfig, FarmInspector, FarmReport, JobStream,
    QueueDiscipline,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "farmsim")]
#[command(about = "Discrete-event server farm simulator")]
struct Cli {
    /// Path to a JSON experiment configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate one dispatch policy and print its report
    Run {
        /// Dispatch policy: random, round, shortest, least, timeSensitive, dlb
        #[arg(short, long)]
        policy: Option<DispatchPolicy>,

        /// Log a farm snapshot every N dispatched jobs
        #[arg(long, value_name = "N")]
        watch: Option<u64>,

        #[command(flatten)]
        farm: FarmArgs,
    },

    /// Simulate every policy over the same workload
    Compare {
        #[command(flatten)]
        farm: FarmArgs,
    },

    /// Simulate one policy across a range of server counts
    Sweep {
        #[arg(short, long, default_value = "dlb")]
        policy: DispatchPolicy,

        #[arg(long, default_value_t = 30)]
        min_servers: usize,

        #[arg(long, default_value_t = 40)]
        max_servers: usize,

        #[command(flatten)]
        farm: FarmArgs,
    },
}

#[derive(Args, Debug)]
struct FarmArgs {
    /// Number of servers in the farm
    #[arg(short, long)]
    servers: Option<usize>,

    /// Number of jobs to dispatch
    #[arg(short, long)]
    jobs: Option<u64>,

    /// Mean time between arrivals
    #[arg(long)]
    mean_arrival: Option<f64>,

    /// Mean processing time per job
    #[arg(long)]
    mean_processing: Option<f64>,

    /// Seed for both the job stream and the dispatcher
    #[arg(long)]
    seed: Option<u64>,

    /// Serve shortest remaining work first instead of FIFO
    #[arg(long)]
    preemptive: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

impl FarmArgs {
    fn apply(&self, config: &mut ExperimentConfig) {
        if let Some(servers) = self.servers {
            config.farm.servers = servers;
        }
        if let Some(jobs) = self.jobs {
            config.workload.jobs = jobs;
        }
        if let Some(mean) = self.mean_arrival {
            config.workload.mean_arrival_time = mean;
        }
        if let Some(mean) = self.mean_processing {
            config.workload.mean_processing_time = mean;
        }
        if self.seed.is_some() {
            config.farm.seed = self.seed;
        }
        if self.preemptive {
            config.farm.discipline = QueueDiscipline::ShortestRemaining;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("farmsim=debug,farmsim_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ExperimentConfig::default(),
    };

    match cli.command {
        Commands::Run {
            policy,
            watch,
            farm,
        } => {
            farm.apply(&mut config);
            if let Some(policy) = policy {
                config.farm.policy = policy;
            }
            let report = simulate(&config, watch)?;
            if farm.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
        Commands::Compare { farm } => {
            farm.apply(&mut config);
            // Without a seed every policy would see a different workload.
            config.farm.seed.get_or_insert_with(rand::random);
            let mut reports = Vec::new();
            for &policy in DispatchPolicy::ALL {
                config.farm.policy = policy;
                reports.push(simulate(&config, None)?);
            }
            print_table("Dispatcher Type", &reports, |r| r.policy.to_string(), farm.json)?;
        }
        Commands::Sweep {
            policy,
            min_servers,
            max_servers,
            farm,
        } => {
            farm.apply(&mut config);
            anyhow::ensure!(
                min_servers > 0 && min_servers <= max_servers,
                "server range {min_servers}..={max_servers} is empty"
            );
            config.farm.policy = policy;
            config.farm.seed.get_or_insert_with(rand::random);
            let mut reports = Vec::new();
            for servers in min_servers..=max_servers {
                config.farm.servers = servers;
                reports.push(simulate(&config, None)?);
            }
            print_table("Number of Servers", &reports, |r| r.servers.to_string(), farm.json)?;
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<ExperimentConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}

fn simulate(config: &ExperimentConfig, watch: Option<u64>) -> Result<FarmReport> {
    info!(
        policy = %config.farm.policy,
        servers = config.farm.servers,
        jobs = config.workload.jobs,
        discipline = %config.farm.discipline,
        "Starting simulation"
    );
    let jobs = JobStream::from_config(&config.workload, config.farm.seed)
        .context("Failed to build job stream")?;
    let mut dispatcher = Dispatcher::new(config.farm.clone()).context("Invalid farm")?;

    for job in jobs {
        dispatcher.handle_job(job)?;
        if let Some(every) = watch.filter(|&n| n > 0) {
            if dispatcher.jobs_handled() % every == 0 {
                info!(snapshot = %dispatcher.visual_snapshot(), "Farm state");
            }
        }
    }
    dispatcher.finish_up()?;
    let report = dispatcher.report()?;

    info!(
        policy = %report.policy,
        avg_wait = report.average_waiting_time,
        makespan = report.makespan,
        "Simulation finished"
    );
    Ok(report)
}

fn print_table<F>(label: &str, reports: &[FarmReport], key: F, json: bool) -> Result<()>
where
    F: Fn(&FarmReport) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }
    println!("{label:<20} | Average Waiting Time");
    for report in reports {
        println!("{:<20} | {:.4}", key(report), report.average_waiting_time);
    }
    Ok(())
}
