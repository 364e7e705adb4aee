use std::time::Duration;

use netprobe_common::log::Severity;
use netprobe_core::resolver::LookupFailure;
use netprobe_core::{ProbeError, Stage};
use netprobe_integration_tests::{ADDRESS, HOST, Scenario, TraceScript, URL};

fn successful_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| line.to_lowercase().contains("successfully"))
        .collect()
}

/// example.test resolves, answers ping, is 5 hops away and serves a body.
#[tokio::test]
async fn healthy_path_end_to_end() {
    let harness = Scenario::default().build();

    let result = harness.pipeline.run().await;

    assert!(result.is_ok(), "run failed: {:?}", result.err());
    assert_eq!(harness.journal.invoked(), Stage::ORDER.to_vec());
    assert_eq!(
        successful_lines(harness.log.messages_at(Severity::Info)),
        vec![
            format!("--> Successfully resolved DNS to {ADDRESS}."),
            format!("--> Successfully pinged {ADDRESS}"),
            format!("--> Successfully ran traceroute on {ADDRESS}: 5 hops."),
            "--> Successfully completed https request".to_string(),
        ]
    );
    assert!(harness.log.messages_at(Severity::Critical).is_empty());
    assert!(harness.log.messages_at(Severity::Warning).is_empty());
}

#[tokio::test]
async fn resolved_address_feeds_ping_and_trace() {
    let harness = Scenario::default().build();

    harness.pipeline.run().await.unwrap();

    assert_eq!(*harness.pinged.lock().unwrap(), vec![ADDRESS]);
    assert_eq!(*harness.traced.lock().unwrap(), vec![ADDRESS]);
    assert!(
        harness
            .log
            .messages_at(Severity::Debug)
            .contains(&format!("\"{HOST}\" using address: {ADDRESS}"))
    );
}

#[tokio::test]
async fn resolution_failure_stops_everything() {
    let harness = Scenario {
        dns: Err(LookupFailure::new("ENOTFOUND", "queryA ENOTFOUND example.test")),
        ..Scenario::default()
    }
    .build();

    let err = harness.pipeline.run().await.unwrap_err();

    assert!(
        matches!(&err, ProbeError::Resolution { code, host, .. } if code == "ENOTFOUND" && host == HOST),
        "got {err:?}"
    );
    assert_eq!(harness.journal.invoked(), vec![Stage::Resolve]);
    assert_eq!(harness.journal.count(Stage::Ping), 0);
    assert_eq!(harness.journal.count(Stage::Trace), 0);
    assert_eq!(harness.journal.count(Stage::Endpoint), 0);
}

#[tokio::test]
async fn unreachable_host_skips_trace_and_https() {
    let harness = Scenario {
        alive: false,
        ..Scenario::default()
    }
    .build();

    let err = harness.pipeline.run().await.unwrap_err();

    assert!(matches!(err, ProbeError::Reachability { address } if address == ADDRESS));
    assert!(err.to_string().contains(&ADDRESS.to_string()));
    assert_eq!(harness.journal.invoked(), vec![Stage::Resolve, Stage::Ping]);
}

#[tokio::test]
async fn hop_count_is_exact() {
    for hops in [0, 1, 12, 30] {
        let harness = Scenario {
            trace: TraceScript::Run {
                hops,
                exit_code: Some(0),
            },
            ..Scenario::default()
        }
        .build();

        harness.pipeline.run().await.unwrap();

        let expected = format!("--> Successfully ran traceroute on {ADDRESS}: {hops} hops.");
        assert!(
            harness.log.messages_at(Severity::Info).contains(&expected),
            "missing '{expected}'"
        );
        let hop_lines = harness
            .log
            .messages_at(Severity::Info)
            .iter()
            .filter(|line| line.starts_with("Hop: {"))
            .count();
        assert_eq!(hop_lines, hops as usize);
    }
}

#[tokio::test]
async fn failing_trace_never_reaches_https() {
    let harness = Scenario {
        trace: TraceScript::Run {
            hops: 4,
            exit_code: Some(1),
        },
        ..Scenario::default()
    }
    .build();

    let err = harness.pipeline.run().await.unwrap_err();

    assert!(matches!(err, ProbeError::Trace { hops: Some(4), .. }), "got {err:?}");
    assert_eq!(harness.journal.count(Stage::Endpoint), 0);
}

#[tokio::test]
async fn missing_traceroute_is_a_trace_error() {
    let harness = Scenario {
        trace: TraceScript::Missing,
        ..Scenario::default()
    }
    .build();

    let err = harness.pipeline.run().await.unwrap_err();

    assert!(matches!(err, ProbeError::Trace { hops: None, .. }), "got {err:?}");
    assert_eq!(err.stage(), Stage::Trace);
    assert_eq!(harness.journal.count(Stage::Endpoint), 0);
    assert_eq!(
        harness.log.messages_at(Severity::Critical),
        vec!["--> Failed to traceroute: traceroute: command not found"]
    );
}

#[tokio::test]
async fn https_error_before_data_fails_the_run() {
    let harness = Scenario {
        https: Err("connect ECONNREFUSED 93.184.216.34:443".to_string()),
        ..Scenario::default()
    }
    .build();

    let err = harness.pipeline.run().await.unwrap_err();

    match &err {
        ProbeError::Endpoint { url, source } => {
            assert_eq!(url, URL);
            assert!(source.to_string().contains("ECONNREFUSED"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        harness.log.messages_at(Severity::Warning),
        vec!["--> Failed to make https request."]
    );
    assert_eq!(harness.journal.invoked(), Stage::ORDER.to_vec());
}

#[tokio::test(start_paused = true)]
async fn stage_timeout_is_reported() {
    let harness = Scenario {
        trace: TraceScript::Stall,
        stage_timeout: Some(Duration::from_secs(2)),
        ..Scenario::default()
    }
    .build();

    let err = harness.pipeline.run().await.unwrap_err();

    assert!(
        matches!(err, ProbeError::Timeout { stage: Stage::Trace, after } if after == Duration::from_secs(2)),
        "got {err:?}"
    );
    assert_eq!(harness.journal.count(Stage::Endpoint), 0);
}

#[tokio::test]
async fn trace_stream_without_exit_status_fails() {
    let harness = Scenario {
        trace: TraceScript::Run {
            hops: 2,
            exit_code: None,
        },
        ..Scenario::default()
    }
    .build();

    let err = harness.pipeline.run().await.unwrap_err();

    assert!(matches!(err, ProbeError::Trace { hops: Some(2), .. }), "got {err:?}");
}
