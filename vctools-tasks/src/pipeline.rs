//! The component-library task set.

use std::future::Future;
use std::sync::Arc;

use vctools_core::{from_async, from_fn, noop, Action, ActionResult, TaskError, TaskGraph};

use crate::compile::ModuleFormat;
use crate::publish::NPM_ARGV_ENV;
use crate::settings::Settings;
use crate::{bundle, clean, compile, examples, lint, publish};

/// Task names with a one-line summary, in registration order.
pub const TASKS: &[(&str, &str)] = &[
    ("check-deps", "verify installed dependencies"),
    ("js-lint", "lint sources, tests and examples with eslint"),
    ("lint", "run every linter"),
    ("clean", "remove compile and build output"),
    ("cleanCompile", "remove lib, es and compiled css"),
    ("cleanBuild", "remove build"),
    ("webpack", "bundle examples into build/examples"),
    ("dist", "build UMD bundles for config.entry into dist"),
    ("build", "render example pages"),
    ("gh-pages", "publish build to the gh-pages branch"),
    ("css", "compile assets/*.less"),
    ("js", "compile sources to lib (commonjs)"),
    ("es", "compile sources to es (es modules)"),
    ("compile", "compile js, es and css"),
    ("publish", "publish the package to npm"),
    ("pub", "publish, deploy examples and tag the release"),
    ("compile_watch", "compile and copy output to --out-dir"),
    ("watch", "recompile whenever sources change"),
    ("update-self", "update vc-tools in the project"),
    ("guard", "forbid a bare `npm publish`"),
    ("prettier", "format sources with prettier"),
];

pub fn description(task: &str) -> Option<&'static str> {
    TASKS
        .iter()
        .find(|(name, _)| *name == task)
        .map(|(_, summary)| *summary)
}

/// File patterns the `watch` task reacts to.
pub fn watch_patterns(settings: &Settings) -> Vec<String> {
    vec![
        format!("{}/**/*.{{js,jsx,ts,tsx}}", settings.src),
        "assets/**/*.less".to_string(),
    ]
}

fn task<F, Fut>(settings: &Arc<Settings>, f: F) -> Arc<dyn Action>
where
    F: Fn(Arc<Settings>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActionResult> + Send + 'static,
{
    let settings = Arc::clone(settings);
    from_async(move || f(Arc::clone(&settings)))
}

fn blocking<F>(settings: &Arc<Settings>, f: F) -> Arc<dyn Action>
where
    F: Fn(&Settings) -> ActionResult + Send + Sync + 'static,
{
    let settings = Arc::clone(settings);
    from_fn(move || f(&settings))
}

/// Registers every pipeline task onto `graph`.
pub fn register_pipeline(graph: &mut TaskGraph, settings: Arc<Settings>) {
    let none: [&str; 0] = [];
    let s = &settings;

    graph.register_task(
        "check-deps",
        none,
        task(s, |s| async move { lint::check_deps(&s).await }),
    );
    graph.register_task(
        "js-lint",
        ["check-deps"],
        task(s, |s| async move { lint::js_lint(&s).await }),
    );
    graph.register_task("lint", ["js-lint"], noop());

    graph.register_task(
        "clean",
        none,
        blocking(s, |s| clean::clean(s).map_err(TaskError::from)),
    );
    graph.register_task(
        "cleanCompile",
        none,
        blocking(s, |s| clean::clean_compile(s).map_err(TaskError::from)),
    );
    graph.register_task(
        "cleanBuild",
        none,
        blocking(s, |s| clean::clean_build(s).map_err(TaskError::from)),
    );

    graph.register_task(
        "webpack",
        ["cleanBuild"],
        task(s, |s| async move { bundle::bundle_examples(&s).await }),
    );
    graph.register_task(
        "dist",
        none,
        task(s, |s| async move { bundle::build_dist(&s).await }),
    );
    graph.register_task(
        "build",
        ["webpack"],
        blocking(s, |s| examples::build_examples(s).map(|_| ())),
    );
    graph.register_task(
        "gh-pages",
        ["build"],
        task(s, |s| async move { publish::gh_pages(&s).await }),
    );

    graph.register_task(
        "css",
        ["cleanCompile"],
        task(s, |s| async move { compile::compile_css(&s).await }),
    );
    graph.register_task(
        "js",
        ["cleanCompile"],
        task(s, |s| async move { compile::babelify(&s, ModuleFormat::CommonJs).await }),
    );
    graph.register_task(
        "es",
        ["js"],
        task(s, |s| async move { compile::babelify(&s, ModuleFormat::Es).await }),
    );
    graph.register_task("compile", ["es", "css"], noop());

    graph.register_task(
        "publish",
        ["compile", "dist"],
        task(s, |s| async move { publish::publish(&s).await }),
    );
    graph.register_task(
        "pub",
        ["publish", "gh-pages"],
        task(s, |s| async move { publish::tag_release(&s).await }),
    );

    graph.register_task(
        "compile_watch",
        ["compile"],
        blocking(s, |s| compile::copy_to_out_dir(s).map_err(TaskError::from)),
    );
    graph.register_task("watch", ["compile_watch"], noop());
    graph.register_watch("watch", watch_patterns(s), "compile_watch");

    graph.register_task(
        "update-self",
        ["compile"],
        task(s, |s| async move { publish::update_self(&s).await }),
    );
    graph.register_task(
        "guard",
        none,
        from_fn(|| publish::guard(std::env::var(NPM_ARGV_ENV).ok().as_deref())),
    );
    graph.register_task(
        "prettier",
        none,
        task(s, |s| async move { lint::prettier(&s).await }),
    );
}
