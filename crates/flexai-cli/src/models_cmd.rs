//! `flexai models` — list, inspect and delete models.
//!
//! - `flexai models list` — list available models
//! - `flexai models show <ID>` — show one model and its permissions
//! - `flexai models delete <ID>` — delete a (fine-tuned) model

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use flexai_client::OpenAiApi;
use flexai_core::types::Model;
use flexai_core::utils::{format_unix_date, truncate_string};

use crate::helpers::print_field;

// ─────────────────────────────────────────────
// Subcommand enum
// ─────────────────────────────────────────────

/// Model subcommands.
#[derive(Subcommand)]
pub enum ModelsCommands {
    /// List available models
    List,

    /// Show details of a model
    Show {
        /// Model ID
        id: String,
    },

    /// Delete a model you own
    Delete {
        /// Model ID
        id: String,
    },
}

/// Dispatch a models subcommand.
pub async fn dispatch(api: &dyn OpenAiApi, cmd: ModelsCommands) -> Result<()> {
    match cmd {
        ModelsCommands::List => list_models(api).await,
        ModelsCommands::Show { id } => show_model(api, &id).await,
        ModelsCommands::Delete { id } => delete_model(api, &id).await,
    }
}

// ─────────────────────────────────────────────
// Command implementations
// ─────────────────────────────────────────────

/// `flexai models list`
async fn list_models(api: &dyn OpenAiApi) -> Result<()> {
    let list = api.list_models().await.context("failed to list models")?;

    if list.data.is_empty() {
        println!("  No models available.");
        return Ok(());
    }

    let mut models = list.data;
    models.sort_by(|a, b| a.id.cmp(&b.id));

    println!();
    println!("{}", "  Models".cyan().bold());
    println!();
    println!(
        "  {:<36} {:<24} {}",
        "ID".bold(),
        "Owner".bold(),
        "Created".bold(),
    );
    println!("  {}", "─".repeat(72));

    for model in &models {
        println!("  {}", model_row(model));
    }

    println!();
    if list.has_more {
        println!("  {}", "(more models available)".dimmed());
        println!();
    }
    Ok(())
}

/// One row of the model table.
fn model_row(model: &Model) -> String {
    format!(
        "{:<36} {:<24} {}",
        truncate_string(&model.id, 36),
        truncate_string(&model.owned_by, 24),
        format_unix_date(model.created)
    )
}

/// `flexai models show <ID>`
async fn show_model(api: &dyn OpenAiApi, id: &str) -> Result<()> {
    let model = api
        .retrieve_model(id)
        .await
        .with_context(|| format!("failed to retrieve model '{id}'"))?;

    println!();
    println!("{}", format!("  {}", model.id).cyan().bold());
    println!();
    print_field("Owner:", &model.owned_by);
    print_field("Created:", format_unix_date(model.created));
    if let Some(root) = &model.root {
        print_field("Root:", root);
    }
    if let Some(parent) = &model.parent {
        print_field("Parent:", parent);
    }

    for perm in &model.permission {
        println!();
        print_field("Permission:", &perm.id);
        print_field("  sampling:", flag(perm.allow_sampling));
        print_field("  logprobs:", flag(perm.allow_logprobs));
        print_field("  fine-tuning:", flag(perm.allow_fine_tuning));
        print_field("  view:", flag(perm.allow_view));
        if perm.is_blocking {
            print_field("  blocking:", "yes".yellow());
        }
    }
    println!();
    Ok(())
}

fn flag(allowed: bool) -> String {
    if allowed {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

/// `flexai models delete <ID>`
async fn delete_model(api: &dyn OpenAiApi, id: &str) -> Result<()> {
    let deleted = api
        .delete_model(id)
        .await
        .with_context(|| format!("failed to delete model '{id}'"))?;

    if deleted.deleted {
        println!("  {} deleted {}", "✓".green(), deleted.id);
    } else {
        println!("  {} {} was not deleted", "✗".red(), deleted.id);
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use flexai_client::FlexAiClient;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model(id: &str, created: i64) -> Model {
        serde_json::from_value(json!({
            "id": id, "object": "model", "created": created, "owned_by": "org"
        }))
        .unwrap()
    }

    #[test]
    fn row_formats_date_and_truncates() {
        let row = model_row(&model("gpt-4", 1_687_882_411));
        assert!(row.starts_with("gpt-4 "));
        assert!(row.ends_with("2023-06-27"));

        let long = "x".repeat(50);
        let row = model_row(&model(&long, 0));
        assert!(row.contains("..."));
        assert!(row.ends_with('-'));
    }

    #[tokio::test]
    async fn list_and_show_hit_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "b", "object": "model", "owned_by": "org"},
                         {"id": "a", "object": "model", "owned_by": "org"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/models/a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "a", "object": "model", "created": 1, "owned_by": "org",
                "permission": [{
                    "id": "p", "object": "model_permission", "created": 1,
                    "allow_create_engine": false, "allow_sampling": true,
                    "allow_logprobs": true, "allow_search_indices": false,
                    "allow_view": true, "allow_fine_tuning": false,
                    "organization": "*", "group": null, "is_blocking": false
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = FlexAiClient::new(format!("{}/v1", server.uri()), "sk-test").unwrap();
        dispatch(&client, ModelsCommands::List).await.unwrap();
        dispatch(&client, ModelsCommands::Show { id: "a".into() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_reports_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/models/ft-1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such model"))
            .mount(&server)
            .await;

        let client = FlexAiClient::new(format!("{}/v1", server.uri()), "sk-test").unwrap();
        let err = dispatch(&client, ModelsCommands::Delete { id: "ft-1".into() })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ft-1"));
        assert!(format!("{err:#}").contains("404"));
    }
}
