//! `vc-tools run server`.

use std::path::Path;

use anyhow::Result;
use vctools_server::{serve, ServerConfig, TEMPLATE_OVERRIDE};

use crate::formatting::{print_key_value, print_section_header, SectionStyle};
use crate::RunArgs;

use super::load_project;

pub async fn cmd_server(cwd: &Path, args: &RunArgs) -> Result<()> {
    let project = load_project(cwd)?;
    let port = vctools_server::resolve_port(args.port, &project);
    let mut config = ServerConfig::new().with_root(cwd).with_port(port);
    if let Some(template) = &args.template {
        config = config.with_template(template);
    }

    println!("Listening at http://localhost:{}", port);
    print_section_header("Dev Server", SectionStyle::Secondary);
    print_key_value("Root", &cwd.display().to_string());
    match &config.template {
        Some(template) => print_key_value("Template", &template.display().to_string()),
        None if cwd.join(TEMPLATE_OVERRIDE).is_file() => {
            print_key_value("Template", TEMPLATE_OVERRIDE)
        }
        None => {}
    }
    println!();

    serve(config, &project, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(())
}
