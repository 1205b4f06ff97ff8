use super::{json_pretty, spin_fail, spin_ok, spinner, Project, EXIT_SUCCESS};
use console::Style;
use serde::Serialize;
use std::path::PathBuf;
use tokenforge_generate::write_outputs;

#[derive(Debug, Serialize)]
struct ModuleReport {
    module: &'static str,
    files: Vec<PathBuf>,
}

pub fn run(project: &Project, dry_run: bool, json: bool) -> Result<u8, String> {
    if project.config.modules.is_empty() {
        return Err("config error: no [[modules]] configured".to_owned());
    }
    let manager = project.load_tokens()?;

    let mut reports = Vec::new();
    for generator in project.config.generators() {
        let pb = (!json).then(|| spinner(&format!("generating {}...", generator.name())));
        let outputs = match generator.generate(&manager) {
            Ok(outputs) => outputs,
            Err(e) => {
                if let Some(pb) = &pb {
                    spin_fail(pb, &format!("{}: {e}", generator.name()));
                }
                return Err(e.to_string());
            }
        };

        let files = if dry_run {
            outputs.iter().map(|o| project.root.join(&o.path)).collect()
        } else {
            write_outputs(&project.root, &outputs).map_err(|e| e.to_string())?
        };
        if let Some(pb) = &pb {
            spin_ok(pb, &format!("{} ({} files)", generator.name(), files.len()));
        }
        reports.push(ModuleReport {
            module: generator.name(),
            files,
        });
    }

    if json {
        println!("{}", json_pretty(&reports)?);
    } else {
        let dim = Style::new().dim();
        let verb = if dry_run { "would write" } else { "wrote" };
        for report in &reports {
            for file in &report.files {
                println!("{} {}", dim.apply_to(verb), file.display());
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
