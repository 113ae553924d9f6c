use patchcraft_core::{Change, HandlerId, HandlerState, Patch, SimTick};
use patchcraft_dispatch::{HandlerError, HandlerKind, UpdateDispatcher};
use patchcraft_testkit::{run_tick_trace, JsonlSink};
use std::time::{SystemTime, UNIX_EPOCH};

fn id(raw: &str) -> HandlerId {
    HandlerId::parse(raw).expect("valid id")
}

fn three_servers() -> UpdateDispatcher {
    let mut dispatcher = UpdateDispatcher::new();
    dispatcher
        .register(id("spigot"), HandlerKind::NoOp)
        .expect("register spigot");
    dispatcher
        .register_with_state(
            id("paper"),
            HandlerKind::Incremental,
            HandlerState::default()
                .with_patches([Patch::new("P1", "a"), Patch::new("P2", "b")])
                .with_changes([Change::new("C1", "c")]),
        )
        .expect("register paper");
    dispatcher
        .register(id("yatopia"), HandlerKind::Unstable)
        .expect("register yatopia");
    dispatcher
}

#[test]
fn tick_event_stream_can_be_written() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("patchcraft-eventlog-{nanos:x}.jsonl"));
    let mut sink = JsonlSink::create(&path).expect("can create temp log");
    let mut dispatcher = three_servers();
    let report = dispatcher.tick();
    assert_eq!(report.tick, SimTick::ZERO);
    sink.write_report(&report).expect("can write events");
    sink.flush().expect("can flush");

    let contents = std::fs::read_to_string(&path).expect("log readable");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("server:spigot"));
    assert!(lines[1].contains("\"patch_version\":1"));
    assert!(lines[2].contains("chaos"));
    std::fs::remove_file(&path).ok();
}

#[test]
fn trace_shows_each_server_keeping_its_own_course() {
    let mut dispatcher = three_servers();
    let trace = run_tick_trace("three-servers", &mut dispatcher, 4).expect("trace");

    let spigot: Vec<u64> = trace
        .history(&id("spigot"))
        .map(|s| s.state.patch_version)
        .collect();
    assert_eq!(spigot, [0, 0, 0, 0, 0]);

    let paper: Vec<u64> = trace
        .history(&id("paper"))
        .map(|s| s.state.patch_version)
        .collect();
    assert_eq!(paper, [0, 1, 2, 3, 4]);

    let yatopia = id("yatopia");
    for (index, snapshot) in trace.history(&yatopia).enumerate() {
        assert_eq!(snapshot.state, HandlerState::default());
        let expected = (index > 0).then_some(HandlerError::Chaos);
        assert_eq!(snapshot.last_error, expected);
    }
    assert!(trace.reports.iter().all(|r| r.failed().count() == 1));
}
