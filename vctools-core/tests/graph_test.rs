use vctools_core::{noop, Error, TaskGraph};

fn diamond() -> TaskGraph {
    let mut graph = TaskGraph::new();
    graph.register_task("a", Vec::<String>::new(), noop());
    graph.register_task("b", ["a"], noop());
    graph.register_task("c", ["a"], noop());
    graph.register_task("d", ["b", "c"], noop());
    graph
}

#[test]
fn test_diamond_order() {
    let graph = diamond();
    let plan = graph.resolve("d").unwrap();

    assert_eq!(plan.root(), "d");
    assert_eq!(plan.order(), ["a", "b", "c", "d"]);
}

#[test]
fn test_dependencies_follow_registration_order() {
    let mut graph = TaskGraph::new();
    graph.register_task("first", Vec::<String>::new(), noop());
    graph.register_task("second", Vec::<String>::new(), noop());
    graph.register_task("root", ["second", "first"], noop());

    let plan = graph.resolve("root").unwrap();
    assert_eq!(plan.order(), ["first", "second", "root"]);
}

#[test]
fn test_plan_only_contains_closure() {
    let mut graph = diamond();
    graph.register_task("unrelated", Vec::<String>::new(), noop());

    let plan = graph.resolve("b").unwrap();
    assert_eq!(plan.order(), ["a", "b"]);
}

#[test]
fn test_unknown_root() {
    let graph = diamond();
    let err = graph.resolve("missing").unwrap_err();

    match err {
        Error::UnknownTask { name, available } => {
            assert_eq!(name, "missing");
            assert!(available.contains("a"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_dependency_is_detected_at_resolution() {
    let mut graph = TaskGraph::new();
    graph.register_task("build", ["compile"], noop());

    let err = graph.resolve("build").unwrap_err();
    match err {
        Error::UnknownDependency { task, dependency } => {
            assert_eq!(task, "build");
            assert_eq!(dependency, "compile");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_two_task_cycle() {
    let mut graph = TaskGraph::new();
    graph.register_task("a", ["b"], noop());
    graph.register_task("b", ["a"], noop());

    let err = graph.resolve("a").unwrap_err();
    match &err {
        Error::Cycle { members } => {
            assert_eq!(members, &["a", "b"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("a -> b -> a"));
}

#[test]
fn test_cycle_below_root() {
    let mut graph = TaskGraph::new();
    graph.register_task("root", ["x"], noop());
    graph.register_task("x", ["y"], noop());
    graph.register_task("y", ["z"], noop());
    graph.register_task("z", ["x"], noop());

    let err = graph.resolve("root").unwrap_err();
    match err {
        Error::Cycle { members } => {
            assert_eq!(members, ["x", "y", "z"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let mut graph = TaskGraph::new();
    graph.register_task("loop", ["loop"], noop());

    assert!(matches!(
        graph.resolve("loop"),
        Err(Error::Cycle { members }) if members == ["loop"]
    ));
}

#[test]
fn test_reregistration_replaces_dependencies() {
    let mut graph = diamond();
    graph.register_task("d", ["c"], noop());

    let plan = graph.resolve("d").unwrap();
    assert_eq!(plan.order(), ["a", "c", "d"]);
    assert_eq!(graph.len(), 4);
}

#[test]
fn test_reregistration_keeps_position() {
    let mut graph = TaskGraph::new();
    graph.register_task("x", Vec::<String>::new(), noop());
    graph.register_task("y", Vec::<String>::new(), noop());
    graph.register_task("x", Vec::<String>::new(), noop());

    let names: Vec<&str> = graph.tasks().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["x", "y"]);
}

#[test]
fn test_watch_spec_registration() {
    let mut graph = diamond();
    graph.register_watch("d", ["src/**/*.js"], "b");

    let spec = graph.watch_spec("d").unwrap();
    assert_eq!(spec.patterns, ["src/**/*.js"]);
    assert_eq!(spec.target, "b");
    assert!(graph.watch_spec("a").is_none());
}
