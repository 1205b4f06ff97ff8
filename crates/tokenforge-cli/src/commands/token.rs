use super::{json_pretty, Project, EXIT_FAILURE, EXIT_SUCCESS};
use console::Style;
use serde_json::Value;

pub fn run(project: &Project, path: &str, mode: Option<&str>, json: bool) -> Result<u8, String> {
    let manager = project.load_tokens()?;

    if let Some(mode) = mode {
        let reference = Value::String(format!("{{{path}}}"));
        let Some(value) = manager
            .resolve_value(&reference, Some(mode))
            .map_err(|e| e.to_string())?
        else {
            eprintln!("no value for '{path}' in mode '{mode}'");
            return Ok(EXIT_FAILURE);
        };
        if json {
            println!("{}", json_pretty(&value)?);
        } else {
            println!("{}", display_value(&value));
        }
        return Ok(EXIT_SUCCESS);
    }

    let Some(token) = manager.token(path).map_err(|e| e.to_string())? else {
        eprintln!("no token at '{path}'");
        return Ok(EXIT_FAILURE);
    };
    if json {
        println!("{}", json_pretty(&token)?);
    } else {
        let dim = Style::new().dim();
        println!("{}  {}", dim.apply_to("type:"), token.token_type);
        match &token.value {
            Value::Object(modes) if modes.values().all(|v| !v.is_object()) => {
                for (mode, value) in modes {
                    println!("{}  {}", dim.apply_to(format!("{mode}:")), display_value(value));
                }
            }
            other => println!("{}  {}", dim.apply_to("value:"), display_value(other)),
        }
        if let Some(description) = &token.description {
            println!("{}  {description}", dim.apply_to("description:"));
        }
    }
    Ok(EXIT_SUCCESS)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
