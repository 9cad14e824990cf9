pub mod calories;
pub mod cli;
pub mod config;
pub mod http;
pub mod plans;
pub mod remote;
pub mod report;
pub mod storage;
pub mod tools;

use anyhow::{Context, Result};
use cli::CliArgs;
use config::AppConfig;
use http::{HttpClient, HttpDebugConfig};
use serde_json::{Value, json};
use storage::Storage;
use tools::{ToolCallSpec, ToolContext, dispatch_call, tool_declarations};

pub async fn run(args: CliArgs) -> Result<()> {
    let config = AppConfig::load_with_path(args.config.as_deref())?;
    let output = run_tool(&config, &args).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_tool(config: &AppConfig, args: &CliArgs) -> Result<Value> {
    if args.tool == "list-tools" {
        return Ok(declarations_json());
    }

    let args_json: Value = serde_json::from_str(&args.args)
        .with_context(|| format!("--args is not valid JSON: {}", args.args))?;

    let storage = Storage::new(&config.data_dir);
    let ctx = ToolContext {
        storage: &storage,
        config,
        http: HttpClient::new(
            reqwest::Client::new(),
            HttpDebugConfig::from_verbose(args.verbose),
        ),
    };

    let call = ToolCallSpec {
        name: args.tool.clone(),
        args_json,
    };
    Ok(dispatch_call(&ctx, &call).await)
}

fn declarations_json() -> Value {
    let declared: Vec<Value> = tool_declarations()
        .into_iter()
        .map(|decl| {
            json!({
                "name": decl.name,
                "description": decl.description,
                "parameters": decl.parameters_json_schema
            })
        })
        .collect();
    json!({"tools": declared})
}

#[cfg(test)]
mod tests {
    use super::{config::AppConfig, declarations_json, run_tool};
    use crate::cli::CliArgs;
    use serde_json::json;
    use std::path::PathBuf;

    fn config_for(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            telegram_token: None,
            telegram_chat_id: "999".to_string(),
            api_ninjas_key: None,
            usda_api_key: None,
            usda_base_url: "http://127.0.0.1:1".to_string(),
            ninjas_base_url: "http://127.0.0.1:1".to_string(),
            telegram_base_url: "http://127.0.0.1:1".to_string(),
            data_dir: dir.to_path_buf(),
        }
    }

    fn cli(tool: &str, args: &str) -> CliArgs {
        CliArgs {
            tool: tool.to_string(),
            args: args.to_string(),
            config: None,
            verbose: false,
        }
    }

    #[test]
    fn declarations_json_lists_all_tools() {
        let listed = declarations_json();
        let tools = listed["tools"].as_array().expect("array");
        assert_eq!(tools.len(), 11);
        assert!(tools.iter().all(|t| t["name"].is_string()));
    }

    #[tokio::test]
    async fn run_tool_dispatches_against_the_configured_data_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = config_for(tmp.path());

        let out = run_tool(&config, &cli("log_weight", r#"{"weight": 70}"#))
            .await
            .expect("run");
        assert_eq!(out["ok"], json!(true));
        assert!(tmp.path().join("progreso.json").exists());
    }

    #[tokio::test]
    async fn run_tool_rejects_malformed_args_json() {
        let config = config_for(&PathBuf::from("."));
        let err = run_tool(&config, &cli("log_weight", "{not json"))
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("--args is not valid JSON"));
    }

    #[tokio::test]
    async fn run_tool_lists_declarations() {
        let config = config_for(&PathBuf::from("."));
        let out = run_tool(&config, &cli("list-tools", "{}")).await.expect("run");
        assert!(out["tools"].is_array());
    }
}
