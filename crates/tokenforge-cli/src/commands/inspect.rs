use super::{json_pretty, Project, Section, EXIT_SUCCESS};
use console::Style;
use tokenforge_core::tree::count_tokens;
use tokenforge_core::TokenManager;

pub fn run(project: &Project, section: Option<Section>, json: bool) -> Result<u8, String> {
    let manager = project.load_tokens()?;
    let err = |e: tokenforge_core::CoreError| e.to_string();

    match section {
        Some(Section::Manifest) => println!("{}", json_pretty(manager.manifest().map_err(err)?)?),
        Some(Section::Variables) => {
            println!("{}", json_pretty(manager.variables().map_err(err)?)?);
        }
        Some(Section::Styles) => println!("{}", json_pretty(manager.styles().map_err(err)?)?),
        None if json => {
            let all = serde_json::json!({
                "manifest": manager.manifest().map_err(err)?,
                "variables": manager.variables().map_err(err)?,
                "styles": manager.styles().map_err(err)?,
            });
            println!("{}", json_pretty(&all)?);
        }
        None => print_summary(&manager).map_err(err)?,
    }
    Ok(EXIT_SUCCESS)
}

fn print_summary(manager: &TokenManager) -> Result<(), tokenforge_core::CoreError> {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let manifest = manager.manifest()?;

    println!("{}", bold.apply_to(&manifest.name));
    println!("tokens_dir:  {}", manager.tokens_dir().display());
    println!();
    println!("{:<20} {:<8} MODES", "COLLECTION", "TOKENS");
    for collection in &manifest.collections {
        let tokens = manager
            .subgroup(collection.id.as_str())?
            .map_or(0, count_tokens);
        let modes: Vec<&str> = collection.modes.iter().map(|m| m.id.as_str()).collect();
        println!(
            "{:<20} {:<8} {}",
            collection.id.as_str(),
            tokens,
            dim.apply_to(modes.join(", "))
        );
    }

    let styles = manager.styles()?;
    if !styles.is_empty() {
        println!();
        println!("{:<20} TOKENS", "STYLES");
        for (category, tree) in styles {
            println!("{:<20} {}", category.as_str(), count_tokens(tree));
        }
    }
    Ok(())
}
