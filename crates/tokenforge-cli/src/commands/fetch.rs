use super::{json_pretty, spin_fail, spin_ok, spinner, Project, Resource, EXIT_SUCCESS};
use std::path::Path;
use tokenforge_remote::{ApiConfig, DesignApi, HttpDesignApi, RemoteError};

fn api_config(project: &Project) -> Result<ApiConfig, String> {
    let Some(section) = &project.config.api else {
        return Err("config error: no [api] section in the project file".to_owned());
    };
    let mut config = ApiConfig::new(&section.file_id);
    if let Some(url) = &section.base_url {
        config = config.with_base_url(url);
    }
    if let Some(token) = &section.token {
        config = config.with_token(token);
    }
    let config = config.with_env_token();
    config.validate().map_err(|e| format!("config error: {e}"))?;
    Ok(config)
}

pub fn run(
    project: &Project,
    resource: Resource,
    ids: &[String],
    output: Option<&Path>,
    json: bool,
) -> Result<u8, String> {
    if resource == Resource::Nodes && ids.is_empty() {
        return Err("fetch nodes needs at least one node id".to_owned());
    }
    let api = HttpDesignApi::new(api_config(project)?);

    let label = match resource {
        Resource::Styles => "styles",
        Resource::Components => "components",
        Resource::Nodes => "nodes",
    };
    let pb = (!json).then(|| spinner(&format!("fetching {label}...")));
    let result: Result<_, RemoteError> = match resource {
        Resource::Styles => api.get_styles(),
        Resource::Components => api.get_components(),
        Resource::Nodes => api.get_nodes(ids),
    };
    let response = match result {
        Ok(v) => v,
        Err(e) => {
            if let Some(pb) = &pb {
                spin_fail(pb, &format!("fetch {label} failed"));
            }
            return Err(format!("remote error: {e}"));
        }
    };
    if let Some(pb) = &pb {
        spin_ok(pb, &format!("fetched {label}"));
    }

    let body = json_pretty(&response)?;
    match output {
        Some(path) => {
            std::fs::write(path, body)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            if !json {
                println!("wrote {}", path.display());
            }
        }
        None => println!("{body}"),
    }
    Ok(EXIT_SUCCESS)
}
