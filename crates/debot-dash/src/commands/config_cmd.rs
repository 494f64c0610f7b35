//! Gateway config command handlers.
//!
//! Every subcommand loads the full document first; edits go through the
//! controller's in-memory copy and are saved one section at a time.

use serde::Serialize;
use serde_json::{Map, Value};
use tabled::Tabled;

use debot_core::{ConfigDocument, DashboardController};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util::{self, cell};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Section")]
    name: String,
    #[tabled(rename = "Keys")]
    keys: String,
}

/// One entry of the `providers` section.
#[derive(Serialize)]
struct ProviderEntry {
    name: String,
    #[serde(flatten)]
    settings: Map<String, Value>,
}

#[derive(Tabled)]
struct ProviderRow {
    #[tabled(rename = "Provider")]
    name: String,
    #[tabled(rename = "API Key")]
    api_key: String,
    #[tabled(rename = "API Base")]
    api_base: String,
}

impl From<&ProviderEntry> for ProviderRow {
    fn from(p: &ProviderEntry) -> Self {
        let field = |key: &str| p.settings.get(key).map_or_else(|| "-".into(), cell);
        Self {
            name: p.name.clone(),
            api_key: field("api_key"),
            api_base: field("api_base"),
        }
    }
}

fn section_rows(doc: &ConfigDocument) -> Vec<SectionRow> {
    doc.sections
        .iter()
        .map(|(name, body)| SectionRow {
            name: name.clone(),
            keys: body.as_object().map_or_else(
                || cell(body),
                |obj| obj.keys().cloned().collect::<Vec<_>>().join(", "),
            ),
        })
        .collect()
}

fn providers(controller: &DashboardController) -> Result<Vec<ProviderEntry>, CliError> {
    let body = controller.section("providers")?;
    let Value::Object(map) = body else {
        return Ok(Vec::new());
    };
    // Key order matches `provider_names()`.
    Ok(map
        .into_iter()
        .map(|(name, settings)| ProviderEntry {
            name,
            settings: match settings {
                Value::Object(obj) => obj,
                _ => Map::new(),
            },
        })
        .collect())
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &DashboardController,
    args: ConfigArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.fetch_config().await?;

    match args.command {
        ConfigCommand::Show { section: None } => {
            let doc = controller.config_document().unwrap_or_default();
            let out = output::render_single(
                global.output,
                &doc,
                |d| output::render_table(&section_rows(d)),
                |d| d.section_names().collect::<Vec<_>>().join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Show {
            section: Some(section),
        } => {
            let body = controller.section(&section)?;
            let out = output::render_single(global.output, &body, pretty, cell)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Providers => {
            let entries = providers(controller)?;
            let out = output::render_list(
                global.output,
                &entries,
                |p| ProviderRow::from(p),
                |p| p.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { section, from_file } => {
            let body = util::read_json_file(&from_file)?;
            controller.replace_section(&section, body)?;
            save(controller, &section, global).await
        }

        ConfigCommand::SetField {
            section,
            key,
            value,
        } => {
            controller.set_field(&section, &key, util::parse_field_value(&value))?;
            save(controller, &section, global).await
        }
    }
}

/// Save `section`, echo the confirmation toast and print what the gateway
/// stored.
async fn save(
    controller: &DashboardController,
    section: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let saved = controller.save_section(section).await?;

    if let Some(toast) = controller.current_toast() {
        output::print_notice(
            &toast.message,
            output::should_color(global.color),
            global.quiet,
        );
    }
    let out = output::render_single(global.output, &saved, pretty, cell)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
