use crate::common::TestHarness;
use farmsim_core::*;

#[test]
fn test_zero_servers_rejected() {
    let err = Dispatcher::new(FarmConfig::new(0, DispatchPolicy::RoundRobin))
        .err()
        .expect("an empty farm must not be constructed");
    assert!(matches!(err, FarmError::InvalidConfiguration(_)));
}

#[test]
fn test_no_metrics_before_any_job() {
    let mut d = Dispatcher::with_policy(3, DispatchPolicy::LeastWork).unwrap();
    assert_eq!(d.average_waiting_time(), Err(FarmError::NoMetricsAvailable));
    d.finish_up().unwrap();
    assert_eq!(d.report(), Err(FarmError::NoMetricsAvailable));
}

#[test]
fn test_out_of_order_arrival_rejected() {
    let mut h = TestHarness::new(2, DispatchPolicy::RoundRobin);
    h.submit(10.0, 1.0);
    let err = h
        .dispatcher
        .handle_job(Job::new(7, 9.0, 1.0))
        .unwrap_err();
    assert_eq!(
        err,
        FarmError::NonMonotonicTime {
            current: 10.0,
            requested: 9.0
        }
    );
    assert_eq!(h.dispatcher.jobs_handled(), 1);
    assert_eq!(h.dispatcher.time(), 10.0);
}

#[test]
fn test_advance_time_rejects_nan() {
    let mut d = Dispatcher::with_policy(1, DispatchPolicy::Random).unwrap();
    assert!(matches!(
        d.advance_time_to(f64::NAN),
        Err(FarmError::NonMonotonicTime { .. })
    ));
}

#[test]
fn test_invalid_jobs_rejected() {
    let mut d = Dispatcher::with_policy(1, DispatchPolicy::Random).unwrap();
    for job in [
        Job::new(1, 0.0, -1.0),
        Job::new(2, 0.0, f64::NAN),
        Job::new(3, f64::INFINITY, 1.0),
    ] {
        let id = job.id;
        match d.handle_job(job) {
            Err(FarmError::InvalidJob { id: got, .. }) => assert_eq!(got, id),
            other => panic!("job {} should be rejected, got {:?}", id, other),
        }
    }
    assert_eq!(d.jobs_handled(), 0);
}

#[test]
fn test_policy_tags_parse() {
    for &policy in DispatchPolicy::ALL {
        assert_eq!(policy.tag().parse::<DispatchPolicy>(), Ok(policy));
    }
    assert_eq!(
        "timeSensitive".parse::<DispatchPolicy>(),
        Ok(DispatchPolicy::TimeSensitive)
    );
    assert_eq!(
        "fastest".parse::<DispatchPolicy>(),
        Err(FarmError::UnknownPolicy("fastest".to_string()))
    );
}

#[test]
fn test_config_from_json_fills_defaults() {
    let config: ExperimentConfig = serde_json::from_str(
        r#"{
            "farm": { "servers": 34, "policy": "dlb", "discipline": "preemptive" },
            "workload": { "jobs": 100 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.farm.servers, 34);
    assert_eq!(config.farm.policy, DispatchPolicy::DynamicLoadBalance);
    assert_eq!(config.farm.discipline, QueueDiscipline::ShortestRemaining);
    assert_eq!(config.farm.seed, None);
    assert!(!config.farm.retain_finished);
    assert_eq!(config.workload.jobs, 100);
    assert_eq!(config.workload.mean_arrival_time, 3.0);
    assert_eq!(config.workload.mean_processing_time, 100.0);
}
