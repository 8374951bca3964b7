use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vctools_core::{
    from_async, from_fn, noop, Error, Phase, TaskError, TaskEvent, TaskGraph, TaskRunner,
    TaskState,
};

type Log = Arc<Mutex<Vec<String>>>;

fn recording(log: &Log, name: &'static str) -> Arc<dyn vctools_core::Action> {
    let log = Arc::clone(log);
    from_fn(move || {
        log.lock().unwrap().push(name.to_string());
        Ok(())
    })
}

fn failing(log: &Log, name: &'static str) -> Arc<dyn vctools_core::Action> {
    let log = Arc::clone(log);
    from_fn(move || {
        log.lock().unwrap().push(name.to_string());
        Err(TaskError::message(format!("{} broke", name)))
    })
}

fn diamond(log: &Log) -> TaskGraph {
    let mut graph = TaskGraph::new();
    graph.register_task("a", Vec::<String>::new(), recording(log, "a"));
    graph.register_task("b", ["a"], recording(log, "b"));
    graph.register_task("c", ["a"], recording(log, "c"));
    graph.register_task("d", ["b", "c"], recording(log, "d"));
    graph
}

#[tokio::test]
async fn test_diamond_runs_each_task_once() {
    let log: Log = Arc::default();
    let runner = TaskRunner::new(Arc::new(diamond(&log)));

    let report = runner.run("d").await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.executed(), 4);
    assert_eq!(*log.lock().unwrap(), ["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_failure_halts_dependents() {
    let log: Log = Arc::default();
    let mut graph = diamond(&log);
    graph.register_task("b", ["a"], failing(&log, "b"));
    let runner = TaskRunner::new(Arc::new(graph));

    let report = runner.run("d").await.unwrap();

    assert!(!report.is_success());
    assert_eq!(*log.lock().unwrap(), ["a", "b"]);
    assert_eq!(report.state_of("a"), Some(TaskState::Succeeded));
    assert_eq!(report.state_of("b"), Some(TaskState::Failed));
    assert_eq!(report.state_of("c"), Some(TaskState::Pending));
    assert_eq!(report.state_of("d"), Some(TaskState::Pending));

    let failure = report.failure().unwrap();
    assert_eq!(failure.task, "b");
    assert!(failure.duration.is_some());

    match report.into_result() {
        Err(Error::TaskFailed { task, source, .. }) => {
            assert_eq!(task, "b");
            assert_eq!(source.to_string(), "b broke");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_configuration_errors_run_nothing() {
    let log: Log = Arc::default();
    let mut graph = TaskGraph::new();
    graph.register_task("a", ["b"], recording(&log, "a"));
    graph.register_task("b", ["a"], recording(&log, "b"));
    graph.register_task("c", ["missing"], recording(&log, "c"));
    let runner = TaskRunner::new(Arc::new(graph));

    assert!(matches!(runner.run("a").await, Err(Error::Cycle { .. })));
    assert!(matches!(
        runner.run("c").await,
        Err(Error::UnknownDependency { .. })
    ));
    assert!(matches!(
        runner.run("nope").await,
        Err(Error::UnknownTask { .. })
    ));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_async_action_is_awaited_before_next_task() {
    let log: Log = Arc::default();
    let slow_log = Arc::clone(&log);

    let mut graph = TaskGraph::new();
    graph.register_task(
        "slow",
        Vec::<String>::new(),
        from_async(move || {
            let log = Arc::clone(&slow_log);
            async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                log.lock().unwrap().push("slow".to_string());
                Ok(())
            }
        }),
    );
    graph.register_task("after", ["slow"], recording(&log, "after"));

    let report = TaskRunner::new(Arc::new(graph)).run("after").await.unwrap();

    assert!(report.is_success());
    assert_eq!(*log.lock().unwrap(), ["slow", "after"]);
    let slow = &report.results[0];
    assert!(slow.duration.unwrap() >= Duration::from_millis(30));
}

#[tokio::test]
async fn test_observer_receives_start_and_stop_events() {
    let log: Log = Arc::default();
    let events: Arc<Mutex<Vec<TaskEvent>>> = Arc::default();
    let sink = Arc::clone(&events);

    let mut graph = TaskGraph::new();
    graph.register_task("ok", Vec::<String>::new(), recording(&log, "ok"));
    graph.register_task("bad", ["ok"], failing(&log, "bad"));

    let runner = TaskRunner::new(Arc::new(graph))
        .with_observer(move |event: &TaskEvent| sink.lock().unwrap().push(event.clone()));
    runner.run("bad").await.unwrap();

    let events = events.lock().unwrap();
    let phases: Vec<(&str, Phase)> = events
        .iter()
        .map(|e| (e.task.as_str(), e.phase))
        .collect();
    assert_eq!(
        phases,
        [
            ("ok", Phase::Start),
            ("ok", Phase::Stop),
            ("bad", Phase::Start),
            ("bad", Phase::Error),
        ]
    );
    assert!(events[0].duration.is_none());
    assert!(events[1].duration.is_some());
    assert_eq!(events[3].error.as_deref(), Some("bad broke"));
}

#[tokio::test]
async fn test_reregistered_action_is_used() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut graph = TaskGraph::new();
    graph.register_task(
        "build",
        Vec::<String>::new(),
        from_fn(|| Err(TaskError::message("old definition"))),
    );
    graph.register_task(
        "build",
        Vec::<String>::new(),
        from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );

    let report = TaskRunner::new(Arc::new(graph)).run("build").await.unwrap();
    assert!(report.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_each_invocation_reruns_everything() {
    let log: Log = Arc::default();
    let mut graph = TaskGraph::new();
    graph.register_task("compile", Vec::<String>::new(), recording(&log, "compile"));
    graph.register_task("lint", Vec::<String>::new(), noop());
    graph.register_task("all", ["lint", "compile"], recording(&log, "all"));
    let runner = TaskRunner::new(Arc::new(graph));

    runner.run("all").await.unwrap();
    runner.run("all").await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        ["compile", "all", "compile", "all"]
    );
}
