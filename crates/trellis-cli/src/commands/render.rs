//! `trellis render`
//!
//! Runs the client-side interpreter once and prints the resolved tree.

use crate::cli::{OutputFormat, RenderArgs};
use crate::exit_codes;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;
use trellis_config::TrellisConfig;
use trellis_core::{
    ContextData, RenderContext, RenderOutput, RenderSession, RenderView, Resolved, ResolvedNode,
    ScreenClient, ScreenLoader, ScreenRequest,
};

pub async fn execute(config: &TrellisConfig, args: RenderArgs) -> Result<ExitCode> {
    let context = match &args.context {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let data: ContextData = serde_json::from_str(&json)
                .with_context(|| format!("invalid context file {}", path.display()))?;
            RenderContext::from_data(data)
        }
        None => RenderContext::builder().build(),
    };

    let session = Arc::new(RenderSession::new(
        super::session_options(&config.render),
        super::style_resolver(&config.style)?,
    ));

    if let Some(path) = &args.screen {
        match super::read_screen(path)? {
            Ok(screen) => {
                session.load_screen(screen);
            }
            Err(err) => {
                eprintln!("{}: invalid screen document: {err}", path.display());
                return Ok(ExitCode::from(exit_codes::INVALID_DOCUMENT));
            }
        }
    } else if let Some(screen_id) = &args.remote {
        let client = ScreenClient::with_timeout(config.client.base_url.as_str(), config.client.timeout())?;
        let mut request = ScreenRequest::new(screen_id.as_str());
        request.user_id = args.user.clone();
        request.route_id = args.route.clone();
        request.locale = args.locale.clone().or_else(|| config.client.locale.clone());
        request.app_version = config.client.app_version.clone();
        request.service_date = Some(chrono::Local::now().fixed_offset());
        ScreenLoader::new(client, Arc::clone(&session)).load(&request).await;
    }

    match session.render(&context) {
        RenderView::Screen(output) => {
            print_output(&output, args.format)?;
            Ok(ExitCode::SUCCESS)
        }
        RenderView::Fallback(output) => {
            warn!("Screen version not supported, showing fallback");
            print_output(&output, args.format)?;
            Ok(ExitCode::from(exit_codes::UNSUPPORTED_VERSION))
        }
        RenderView::Failed(err) => {
            eprintln!("error: {err}");
            Ok(ExitCode::from(exit_codes::FETCH_FAILED))
        }
        RenderView::Loading => {
            eprintln!("error: no screen loaded");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_output(output: &RenderOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(output)?),
        OutputFormat::Tree => print!("{}", outline(output)),
    }
    Ok(())
}

/// Indented outline of the resolved tree followed by its diagnostics.
pub fn outline(output: &RenderOutput) -> String {
    let mut out = String::new();
    match &output.root {
        Some(root) => outline_node(root, 0, &mut out),
        None => out.push_str("(empty)\n"),
    }
    if !output.diagnostics.is_empty() {
        out.push_str("diagnostics:\n");
        for diagnostic in &output.diagnostics {
            let _ = writeln!(out, "  {diagnostic}");
        }
    }
    out
}

fn outline_node(node: &ResolvedNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let detail = match &node.content {
        Resolved::Text { text } => format!("text {text:?}"),
        Resolved::Button { label, .. } => format!("button {label:?}"),
        Resolved::Image { name } => format!("image {name}"),
        Resolved::VStack { .. } => "vstack".to_string(),
        Resolved::HStack { .. } => "hstack".to_string(),
        Resolved::List { rows } => format!("list ({} rows)", rows.len()),
        Resolved::Conditional { .. } => "conditional".to_string(),
        Resolved::Spacer => "spacer".to_string(),
        Resolved::Divider => "divider".to_string(),
        Resolved::Scroll { .. } => "scroll".to_string(),
    };
    let _ = write!(out, "{indent}{} {detail}", node.id);
    if let Some(action) = &node.action {
        let _ = write!(out, " -> {}", action.action_id);
    }
    out.push('\n');
    for child in node.children() {
        outline_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trellis_core::{Component, Screen};

    #[test]
    fn test_outline_lists_rows_and_actions() {
        let session = RenderSession::default();
        session.load_screen(Screen::new(
            1,
            Component::list(
                "jobs",
                "jobs",
                Component::hstack(
                    "row",
                    vec![
                        Component::bound_text("name", "customerName"),
                        Component::button("start", "Start", "startJob"),
                    ],
                ),
            ),
        ));
        let context = RenderContext::builder()
            .collection("jobs", vec![json!({ "customerName": "Harbor Bakery" })])
            .build();
        let RenderView::Screen(output) = session.render(&context) else {
            panic!("screen should render");
        };

        let text = outline(&output);
        assert!(text.starts_with("jobs list (1 rows)\n"));
        assert!(text.contains("    name text \"Harbor Bakery\"\n"));
        assert!(text.contains("start button \"Start\" -> startJob"));
        // startJob has no handler in this context
        assert!(text.contains("diagnostics:\n"));
    }
}
