use crate::common::TestHarness;
use farmsim_core::{DispatchPolicy, FarmError, Job, Server};

#[test]
fn test_fifo_end_to_end() {
    let mut h = TestHarness::new(1, DispatchPolicy::RoundRobin);
    h.submit(0.0, 5.0);
    h.submit(2.0, 3.0);
    h.finish();

    assert_eq!(h.finished(0).finish_time(), Some(5.0));
    assert_eq!(h.finished(0).time_in_queue(), Some(5.0));
    assert_eq!(h.finished(1).finish_time(), Some(8.0));
    assert_eq!(h.finished(1).time_in_queue(), Some(6.0));
    assert_eq!(h.avg_wait(), 5.5);
    assert_eq!(h.dispatcher.time(), 8.0);
}

#[test]
fn test_preemptive_end_to_end() {
    let mut h = TestHarness::preemptive(1, DispatchPolicy::RoundRobin);
    h.submit(0.0, 10.0);
    h.submit(1.0, 2.0);
    h.finish();

    assert_eq!(h.finished(1).finish_time(), Some(3.0));
    assert_eq!(h.finished(1).time_in_queue(), Some(2.0));
    assert_eq!(h.finished(0).finish_time(), Some(12.0));
    assert_eq!(h.finished(0).time_in_queue(), Some(12.0));
    assert_eq!(h.avg_wait(), 7.0);
}

#[test]
fn test_fifo_completes_in_arrival_order() {
    let mut server = Server::fifo();
    server.add_job(Job::new(0, 0.0, 3.0));
    server.add_job(Job::new(1, 0.0, 1.0));
    server.add_job(Job::new(2, 0.0, 2.0));

    let mut done = Vec::new();
    server
        .process_to_with(100.0, |job| done.push((job.id, job.finish_time())))
        .unwrap();

    assert_eq!(
        done,
        vec![(0, Some(3.0)), (1, Some(4.0)), (2, Some(6.0))],
        "FIFO must ignore job length"
    );
    assert_eq!(server.processed_count(), 3);
    assert_eq!(server.total_waiting_time(), 13.0);
}

#[test]
fn test_shorter_late_arrival_preempts() {
    let mut server = Server::preemptive();
    server.add_job(Job::new(0, 0.0, 10.0));
    server.process_to(3.0).unwrap();
    server.add_job(Job::new(1, 3.0, 4.0));

    let mut done = Vec::new();
    server
        .process_to_with(100.0, |job| done.push((job.id, job.finish_time())))
        .unwrap();

    assert_eq!(done, vec![(1, Some(7.0)), (0, Some(14.0))]);
}

#[test]
fn test_longer_late_arrival_does_not_preempt() {
    let mut server = Server::preemptive();
    server.add_job(Job::new(0, 0.0, 10.0));
    server.process_to(3.0).unwrap();
    server.add_job(Job::new(1, 3.0, 8.0));

    let mut done = Vec::new();
    server
        .process_to_with(100.0, |job| done.push(job.id))
        .unwrap();

    assert_eq!(done, vec![0, 1], "remaining 7 beats a fresh 8");
}

#[test]
fn test_preemptive_ties_follow_enqueue_order() {
    let mut server = Server::preemptive();
    for id in 0..4 {
        server.add_job(Job::new(id, 0.0, 5.0));
    }
    let mut done = Vec::new();
    server
        .process_to_with(100.0, |job| done.push(job.id))
        .unwrap();
    assert_eq!(done, vec![0, 1, 2, 3]);
}

#[test]
fn test_zero_length_job_completes_on_arrival() {
    let mut h = TestHarness::new(1, DispatchPolicy::RoundRobin);
    h.submit(2.0, 0.0);
    h.finish();

    assert_eq!(h.finished(0).finish_time(), Some(2.0));
    assert_eq!(h.dispatcher.jobs_completed(), 1);
    assert_eq!(h.avg_wait(), 0.0);
}

#[test]
fn test_zero_length_job_waits_behind_fifo_head() {
    let mut h = TestHarness::new(1, DispatchPolicy::RoundRobin);
    h.submit(0.0, 5.0);
    h.submit(1.0, 0.0);
    h.finish();

    assert_eq!(h.finished(1).finish_time(), Some(5.0));
    assert_eq!(h.finished(1).time_in_queue(), Some(4.0));
}

#[test]
fn test_tied_arrivals_are_enqueued_in_sequence() {
    let mut h = TestHarness::new(1, DispatchPolicy::RoundRobin);
    h.submit(4.0, 2.0);
    h.submit(4.0, 1.0);
    h.finish();

    assert_eq!(h.finished(0).finish_time(), Some(6.0));
    assert_eq!(h.finished(1).finish_time(), Some(7.0));
}

#[test]
fn test_idle_time_passes_without_work() {
    let mut server = Server::fifo();
    server.add_job(Job::new(0, 0.0, 2.0));
    server.process_to(10.0).unwrap();
    assert_eq!(server.time(), 10.0);
    assert!(server.is_idle());

    server.add_job(Job::new(1, 10.0, 1.0));
    let mut waits = Vec::new();
    server
        .process_to_with(20.0, |job| waits.push(job.time_in_queue()))
        .unwrap();
    assert_eq!(waits, vec![Some(1.0)]);
    assert_eq!(server.total_waiting_time(), 3.0);
}

#[test]
fn test_partial_processing_keeps_remaining_work_exact() {
    let mut server = Server::fifo();
    server.add_job(Job::new(0, 0.0, 4.0));
    server.add_job(Job::new(1, 0.0, 6.0));
    assert_eq!(server.remaining_work_in_queue(), 10.0);

    server.process_to(3.0).unwrap();
    let queued: f64 = server.queued_jobs().map(Job::remaining_work).sum();
    assert_eq!(server.remaining_work_in_queue(), 7.0);
    assert_eq!(queued, 7.0);
    assert_eq!(server.size(), 2);

    server.process_to(5.0).unwrap();
    assert_eq!(server.remaining_work_in_queue(), 5.0);
    assert_eq!(server.size(), 1);
}

#[test]
fn test_server_clock_is_monotonic() {
    let mut server = Server::preemptive();
    server.add_job(Job::new(0, 0.0, 7.5));
    server.add_job(Job::new(1, 0.0, 1.25));
    let mut last = server.time();
    for target in [0.0, 0.5, 0.5, 2.0, 6.0, 6.0, 20.0] {
        server.process_to(target).unwrap();
        assert!(server.time() >= last);
        assert_eq!(server.time(), target);
        last = server.time();
    }
}

#[test]
fn test_server_rejects_time_going_backwards() {
    let mut server = Server::fifo();
    server.process_to(5.0).unwrap();
    let err = server.process_to(4.0).unwrap_err();
    assert_eq!(
        err,
        FarmError::NonMonotonicTime {
            current: 5.0,
            requested: 4.0
        }
    );
    assert_eq!(server.time(), 5.0, "a rejected advance must not move the clock");
}
