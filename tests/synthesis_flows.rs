use netsynth::{
    DATA_RECEIVED, HttpHeader, LOADING_FAILED, LOADING_FINISHED, LogDecoder, ProtocolEvent,
    REQUEST_SERVED_FROM_CACHE, REQUEST_WILL_BE_SENT, RESPONSE_RECEIVED, ReplayDecoder,
    RequestDescriptor, RequestRecord, SynthOptions, SynthResult, TimingHints, extract_timing,
    normalize_timing, synthesize_log, synthesize_log_with_decoder,
};

fn methods(log: &[ProtocolEvent]) -> Vec<&str> {
    log.iter().map(|event| event.method.as_str()).collect()
}

fn fixture(id: &str) -> RequestDescriptor {
    RequestDescriptor {
        request_id: Some(id.to_string()),
        ..Default::default()
    }
}

#[test]
fn golden_minimal_fixture_cascades_fixed_defaults() {
    let records = vec![RequestDescriptor {
        url: Some("https://testingurl.com/".to_string()),
        status_code: Some(404),
        ..Default::default()
    }];

    // Verification is on by default; the log below already round-tripped.
    let log = synthesize_log(&records, &SynthOptions::default()).expect("synthesize");
    assert_eq!(
        methods(&log),
        vec![
            REQUEST_WILL_BE_SENT,
            RESPONSE_RECEIVED,
            DATA_RECEIVED,
            LOADING_FINISHED
        ]
    );

    assert_eq!(log[0].params["timestamp"], 1.0);
    assert_eq!(log[1].params["timestamp"], 2.0);
    assert_eq!(log[1].params["response"]["status"], 404);
    assert_eq!(log[1].params["response"]["url"], "https://testingurl.com/");
    assert_eq!(log[3].params["timestamp"], 3.0);
}

#[test]
fn redirect_pair_suppresses_the_original_completion() {
    let records = vec![fixture("1"), fixture("1:redirect")];

    let log = synthesize_log(&records, &SynthOptions::default()).expect("synthesize");
    assert_eq!(
        methods(&log),
        vec![
            REQUEST_WILL_BE_SENT,
            REQUEST_WILL_BE_SENT,
            RESPONSE_RECEIVED,
            DATA_RECEIVED,
            LOADING_FINISHED
        ]
    );

    // The wire reuses the original id across the whole chain.
    for event in &log {
        assert_eq!(event.request_id(), Some("1"));
    }

    assert!(log[0].params.get("redirectResponse").is_none());
    let redirect_response = &log[1].params["redirectResponse"];
    assert_eq!(redirect_response["status"], 302);

    // The continuation starts where the original ended.
    assert_eq!(log[1].params["timestamp"], 3.0);
}

#[test]
fn redirect_status_prefers_the_original_declaration() {
    let mut original = fixture("7");
    original.status_code = Some(301);
    original.url = Some("https://example.com/from".to_string());
    let records = vec![original, fixture("7:redirect")];

    let log = synthesize_log(&records, &SynthOptions::default()).expect("synthesize");
    let redirect_response = &log[1].params["redirectResponse"];
    assert_eq!(redirect_response["status"], 301);
    assert_eq!(redirect_response["url"], "https://example.com/from");
}

#[test]
fn two_hop_chain_round_trips() {
    let records = vec![
        fixture("5"),
        fixture("5:redirect"),
        fixture("5:redirect:redirect"),
    ];

    let log = synthesize_log(&records, &SynthOptions::default()).expect("synthesize");
    // One initial request per hop, one completion sequence at the end.
    assert_eq!(log.len(), 6);

    let decoded = ReplayDecoder.decode(&log).expect("decode");
    let ids: Vec<&str> = decoded.iter().map(|r| r.request_id.as_str()).collect();
    assert_eq!(ids, vec!["5", "5:redirect", "5:redirect:redirect"]);
}

#[test]
fn failed_fixture_short_circuits() {
    let records = vec![RequestDescriptor {
        request_id: Some("9".to_string()),
        failed: Some(true),
        localized_fail_description: Some("net::ERR_CONNECTION_RESET".to_string()),
        network_end_time: Some(4500.0),
        ..Default::default()
    }];

    let log = synthesize_log(&records, &SynthOptions::default()).expect("synthesize");
    assert_eq!(methods(&log), vec![REQUEST_WILL_BE_SENT, LOADING_FAILED]);
    assert_eq!(log[1].params["errorText"], "net::ERR_CONNECTION_RESET");
    assert_eq!(log[1].params["timestamp"], 4.5);
}

#[test]
fn cached_fixture_emits_the_cache_marker() {
    let records = vec![RequestDescriptor {
        from_memory_cache: Some(true),
        ..Default::default()
    }];

    let log = synthesize_log(&records, &SynthOptions::default()).expect("synthesize");
    assert_eq!(
        methods(&log),
        vec![
            REQUEST_WILL_BE_SENT,
            REQUEST_SERVED_FROM_CACHE,
            RESPONSE_RECEIVED,
            DATA_RECEIVED,
            LOADING_FINISHED
        ]
    );
}

#[test]
fn rich_fixture_round_trips_every_specified_field() {
    let records = vec![RequestDescriptor {
        request_id: Some("42".to_string()),
        url: Some("https://api.example.org/v1/items".to_string()),
        document_url: Some("https://app.example.org/".to_string()),
        request_method: Some("POST".to_string()),
        resource_type: Some("XHR".to_string()),
        priority: Some("High".to_string()),
        status_code: Some(201),
        response_headers: Some(vec![
            HttpHeader {
                name: "Content-Type".to_string(),
                value: "application/json".to_string(),
            },
            HttpHeader {
                name: "Set-Cookie".to_string(),
                value: "a=1".to_string(),
            },
            HttpHeader {
                name: "Set-Cookie".to_string(),
                value: "b=2".to_string(),
            },
        ]),
        mime_type: Some("application/json".to_string()),
        protocol: Some("h2".to_string()),
        transfer_size: Some(512.0),
        resource_size: Some(2048.0),
        connection_id: Some(9),
        connection_reused: Some(true),
        fetched_via_service_worker: Some(false),
        timing: Some(TimingHints {
            request_time: Some(2.0),
            receive_headers_end: Some(350.0),
            offsets: serde_json::json!({"sendStart": 20.0, "sendEnd": 45.0})
                .as_object()
                .expect("object")
                .clone(),
        }),
        network_request_time: Some(2000.0),
        response_headers_end_time: Some(2350.0),
        network_end_time: Some(2900.0),
        ..Default::default()
    }];

    // The round-trip self-check is the assertion here.
    let log = synthesize_log(&records, &SynthOptions::default()).expect("verified log");

    let decoded = ReplayDecoder.decode(&log).expect("decode");
    let record = &decoded[0];
    assert_eq!(record.request_method, "POST");
    assert_eq!(record.status_code, Some(201));
    assert_eq!(record.transfer_size, Some(512.0));
    assert_eq!(record.network_request_time, Some(2000.0));
    let end = record.network_end_time.expect("end time");
    assert!((end - 2900.0).abs() < 1e-3);
    let timing = record.timing.as_ref().expect("timing block");
    assert_eq!(timing["sendStart"], 20.0);
}

#[test]
fn incomplete_end_sentinel_round_trips() {
    let records = vec![RequestDescriptor {
        request_id: Some("3".to_string()),
        network_request_time: Some(1000.0),
        network_end_time: Some(-1.0),
        ..Default::default()
    }];

    let log = synthesize_log(&records, &SynthOptions::default()).expect("synthesize");
    let finished = log.last().expect("finished event");
    assert_eq!(finished.method, LOADING_FINISHED);
    assert_eq!(finished.params["timestamp"], -0.001);
}

#[test]
fn events_keep_caller_order_not_timestamp_order() {
    let records = vec![
        RequestDescriptor {
            request_id: Some("late".to_string()),
            network_request_time: Some(9000.0),
            ..Default::default()
        },
        RequestDescriptor {
            request_id: Some("early".to_string()),
            network_request_time: Some(1000.0),
            ..Default::default()
        },
    ];

    let log = synthesize_log(&records, &SynthOptions::default()).expect("synthesize");
    assert_eq!(log[0].request_id(), Some("late"));
    assert_eq!(log[4].request_id(), Some("early"));
}

#[test]
fn broken_fixture_reports_the_conflicting_values() {
    let records = vec![RequestDescriptor {
        request_id: Some("bad".to_string()),
        network_request_time: Some(5000.0),
        response_headers_end_time: Some(2000.0),
        ..Default::default()
    }];

    let err = synthesize_log(&records, &SynthOptions::default()).expect_err("must abort");
    let message = err.to_string();
    assert!(message.contains("broken fixture"));
    assert!(message.contains("bad"));
    assert!(message.contains("5000"));
    assert!(message.contains("2000"));
}

#[test]
fn redirect_without_original_is_fatal() {
    let records = vec![fixture("ghost:redirect")];
    let err = synthesize_log(&records, &SynthOptions::default()).expect_err("must abort");
    assert!(err.to_string().contains("no original record ghost"));
}

#[test]
fn verification_runs_through_the_decoder_seam() {
    struct DroppingDecoder;

    impl LogDecoder for DroppingDecoder {
        fn decode(&self, _events: &[ProtocolEvent]) -> SynthResult<Vec<RequestRecord>> {
            Ok(Vec::new())
        }
    }

    let records = vec![RequestDescriptor::default()];
    let err = synthesize_log_with_decoder(&records, &SynthOptions::default(), &DroppingDecoder)
        .expect_err("empty decode must fail verification");
    assert!(err.to_string().contains("round-trip verification failed"));

    // The same seam succeeds when the decoder is honest.
    synthesize_log_with_decoder(&records, &SynthOptions::default(), &ReplayDecoder)
        .expect("honest decoder verifies");
}

#[test]
fn normalized_timing_is_monotonic_for_sparse_fixtures() {
    let sparse_fixtures = vec![
        RequestDescriptor::default(),
        RequestDescriptor {
            network_end_time: Some(8000.0),
            ..Default::default()
        },
        RequestDescriptor {
            renderer_start_time: Some(250.0),
            ..Default::default()
        },
        RequestDescriptor {
            timing: Some(TimingHints {
                request_time: Some(3.0),
                ..Default::default()
            }),
            ..Default::default()
        },
        RequestDescriptor {
            network_request_time: Some(1000.0),
            timing: Some(TimingHints {
                offsets: serde_json::json!({"sendEnd": 450.0})
                    .as_object()
                    .expect("object")
                    .clone(),
                ..Default::default()
            }),
            ..Default::default()
        },
    ];

    for record in &sparse_fixtures {
        let timing = normalize_timing(&extract_timing(record).expect("consistent"));
        assert!(timing.renderer_start_time <= timing.start_time);
        assert!(timing.start_time <= timing.response_received_time);
        if timing.end_time != -1.0 {
            assert!(timing.response_received_time <= timing.end_time);
        }
        assert!((timing.request_time_seconds * 1000.0 - timing.start_time).abs() < 1e-3);
    }
}
