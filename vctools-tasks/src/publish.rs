//! Publishing: npm release, git tags, gh-pages and the publish guard.

use semver::Version;
use tracing::{error, info, warn};
use vctools_core::{Action, TaskError};

use crate::clean::{clean_build, clean_compile};
use crate::settings::Settings;

/// Flag `npm publish` must carry when started by the toolchain.
pub const PUBLISH_FLAG: &str = "--with-vc-tools";

/// Environment variable npm uses to expose its own argv as JSON.
pub const NPM_ARGV_ENV: &str = "npm_config_argv";

/// Any prefix of `publish` npm accepts as an alias (`pu`, `pub`, ...).
fn is_publish_alias(arg: &str) -> bool {
    arg.len() >= 2 && "publish".starts_with(arg)
}

/// True for anything but a plain `major.minor.patch` version.
pub fn is_prerelease(version: &str) -> bool {
    Version::parse(version)
        .map(|v| !v.pre.is_empty() || !v.build.is_empty())
        .unwrap_or(true)
}

/// Arguments for the publish command.
pub fn publish_args(version: &str, tag: Option<&str>) -> Vec<String> {
    let mut args = vec!["publish".to_string(), PUBLISH_FLAG.to_string()];
    if is_prerelease(version) {
        args.extend(["--tag".to_string(), "beta".to_string()]);
    } else if let Some(tag) = tag {
        args.extend(["--tag".to_string(), tag.to_string()]);
    }
    args
}

async fn run_script(settings: &Settings, script: &str) {
    if !settings.project.has_script(script) {
        return;
    }
    if let Err(e) = settings.command("npm").args(["run", script]).run().await {
        warn!("Script '{}' failed: {}", script, e);
    }
}

/// `npm publish` with the right dist-tag; compile output is removed
/// afterwards whatever the outcome.
pub async fn publish(settings: &Settings) -> Result<(), TaskError> {
    if !settings.path("lib").exists() || !settings.path("es").exists() {
        return Err(TaskError::message("missing lib/es dir"));
    }
    info!("publishing");

    run_script(settings, "pre-publish").await;

    let args = publish_args(&settings.project.version, settings.tag.as_deref());
    let result = settings.command(settings.npm()).args(args).run().await;

    clean_compile(settings)?;
    result?;
    info!("published");
    Ok(())
}

/// Tags the current version and pushes it with `master`.
pub async fn tag_release(settings: &Settings) -> Result<(), TaskError> {
    info!("tagging");
    let version = settings.project.version.as_str();
    settings.command("git").args(["tag", version]).run().await?;
    settings
        .command("git")
        .args(["push", "origin", format!("{version}:{version}").as_str()])
        .run()
        .await?;
    settings
        .command("git")
        .args(["push", "origin", "master:master"])
        .run()
        .await?;
    info!("tagged");
    Ok(())
}

/// Publishes `build/` to the `gh-pages` branch.
pub async fn gh_pages(settings: &Settings) -> Result<(), TaskError> {
    info!("gh-paging");
    run_script(settings, "pre-gh-pages").await;

    if !settings.path("examples").is_dir() {
        return Ok(());
    }
    settings.npx("gh-pages").args(["--dist", "build"]).run().await?;
    clean_build(settings)?;
    info!("gh-paged");
    Ok(())
}

pub async fn update_self(settings: &Settings) -> Result<(), TaskError> {
    let npm = settings.npm();
    info!("{} updating vc-tools", npm);
    settings.command(npm).args(["update", "vc-tools"]).run().await?;
    info!("{} update vc-tools end", npm);
    Ok(())
}

/// Extracts npm's original argv from `npm_config_argv`.
pub fn npm_args(raw: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
        return Vec::new();
    };
    value
        .get("original")
        .or_else(|| value.get("cooked"))
        .and_then(|v| v.as_array())
        .map(|args| {
            args.iter()
                .filter_map(|a| a.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// True when the arguments contain a bare `npm publish`.
pub fn is_forbidden_publish(args: &[String]) -> bool {
    args.iter().enumerate().any(|(i, arg)| {
        is_publish_alias(arg) && !args[i + 1..].iter().any(|a| a == PUBLISH_FLAG)
    })
}

/// Fails when the package is being published with plain `npm publish`.
pub fn guard(raw_argv: Option<&str>) -> Result<(), TaskError> {
    let args = raw_argv.map(npm_args).unwrap_or_default();
    if is_forbidden_publish(&args) {
        error!("!! `npm publish` is forbidden for this package. !!");
        error!("!! Use `npm run pub` instead.                   !!");
        return Err(TaskError::message(
            "`npm publish` is forbidden for this package, use `npm run pub`",
        ));
    }
    Ok(())
}
