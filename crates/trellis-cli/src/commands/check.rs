use crate::cli::{CheckArgs, OutputFormat};
use crate::exit_codes;
use anyhow::Result;
use serde_json::json;
use std::process::ExitCode;
use trellis_config::TrellisConfig;
use trellis_core::GateState;

pub fn execute(config: &TrellisConfig, args: CheckArgs) -> Result<ExitCode> {
    let screen = match super::read_screen(&args.screen)? {
        Ok(screen) => screen,
        Err(err) => {
            eprintln!("{}: invalid screen document: {err}", args.screen.display());
            return Ok(ExitCode::from(exit_codes::INVALID_DOCUMENT));
        }
    };

    let gate = super::version_gate(&config.render);
    let supported = matches!(gate.evaluate(&screen), GateState::Accepted);
    let report = screen.validate(config.render.max_depth);

    match args.format {
        OutputFormat::Json => {
            let out = json!({
                "version": screen.version,
                "supported": supported,
                "depth": screen.depth(),
                "nodes": screen.component.node_count(),
                "issues": report.issues,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Tree => {
            println!(
                "{}: version {}, {} nodes, depth {}",
                args.screen.display(),
                screen.version,
                screen.component.node_count(),
                screen.depth()
            );
            if !supported {
                println!("  unsupported: this build accepts up to version {}", gate.max());
            }
            for issue in &report.issues {
                println!("  issue: {issue}");
            }
            if supported && report.is_clean() {
                println!("  ok");
            }
        }
    }

    Ok(if !supported {
        ExitCode::from(exit_codes::UNSUPPORTED_VERSION)
    } else if !report.is_clean() {
        ExitCode::from(exit_codes::INVALID_DOCUMENT)
    } else {
        ExitCode::SUCCESS
    })
}
