use crate::cli::{Cli, ConfigAction};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, paint, OutputData, Tone};
use scout_core::config::{credentials_from_env, mask_secret, SettingsStore};
use scout_core::Settings;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

pub async fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => {
            println!("{}", SettingsStore::new_default().path().display());
            Ok(())
        }
        ConfigAction::Init { force } => init_config(force),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::new_default();
    let settings = Settings::load()?;
    let value = config_json(&store, &settings, &credentials_from_env())?;
    format_output(&OutputData::ConfigInfo(value), &cli.output)
}

/// Settings plus masked credentials, flattened for display.
fn config_json(
    store: &SettingsStore,
    settings: &Settings,
    credentials: &HashMap<String, String>,
) -> Result<Value> {
    let mut map = Map::new();
    map.insert(
        "config_file".to_string(),
        json!(store.path().display().to_string()),
    );
    if let Value::Object(fields) = serde_json::to_value(settings)? {
        map.extend(fields);
    }
    map.insert(
        "cache_root".to_string(),
        json!(settings.resolved_cache_dir().display().to_string()),
    );

    let mut names: Vec<&String> = credentials.keys().collect();
    names.sort();
    for name in names {
        map.insert(name.clone(), json!(mask_secret(&credentials[name])));
    }
    Ok(Value::Object(map))
}

fn init_config(force: bool) -> Result<()> {
    let store = SettingsStore::new_default();
    if store.path().exists() && !force {
        return Err(CommandError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        )));
    }
    store.save(&Settings::default())?;
    println!(
        "{} Wrote default settings to {}",
        paint("✓", Tone::Good),
        paint(store.path().display(), Tone::Accent)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_json_masks_credentials() {
        let store = SettingsStore::with_path("/tmp/scout-test/config.yaml");
        let credentials: HashMap<String, String> =
            [("OPENAI_API_KEY".to_string(), "sk-abcdefghijkl".to_string())]
                .into_iter()
                .collect();
        let value = config_json(&store, &Settings::default(), &credentials).unwrap();
        assert_eq!(value["OPENAI_API_KEY"], "sk-a****");
        assert_eq!(value["max_search_results"], 10);
        assert_eq!(value["config_file"], "/tmp/scout-test/config.yaml");
    }
}
