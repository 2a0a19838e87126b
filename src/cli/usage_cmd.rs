use anyhow::{bail, Result};

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::aggregator::Aggregator;
use crate::core::config::AppConfig;
use crate::core::models::usage::AggregatedSnapshot;
use crate::core::providers::Provider;

/// Run a single aggregation pass and display the snapshot, optionally
/// narrowed to one provider.
pub async fn run(
    provider_filter: Option<&str>,
    opts: &OutputOptions,
    debug_override: bool,
) -> Result<()> {
    let filter = match provider_filter {
        Some(id) => match Provider::from_id(id) {
            Some(provider) => Some(provider),
            None => bail!("unknown provider '{}' (try claude, codex or gemini)", id),
        },
        None => None,
    };

    let mut config = AppConfig::load().unwrap_or_default();
    if debug_override {
        config.debug = true;
    }

    let aggregator = Aggregator::new();
    let mut snapshot = aggregator.run_pass_with(&config).await;
    if let Some(provider) = filter {
        retain_only(&mut snapshot, provider);
    }

    match opts.format {
        OutputFormat::Text => {
            let text = renderer::render_snapshot(&snapshot, opts.use_color);
            if text.is_empty() {
                eprintln!(
                    "No provider data. Configure credentials with `limitmon config set`."
                );
            } else {
                println!("{}", text);
            }
        }
        OutputFormat::Json => {
            let json = if opts.pretty {
                serde_json::to_string_pretty(&snapshot)?
            } else {
                serde_json::to_string(&snapshot)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}

fn retain_only(snapshot: &mut AggregatedSnapshot, provider: Provider) {
    if provider != Provider::Anthropic {
        snapshot.anthropic = None;
    }
    if provider != Provider::OpenAi {
        snapshot.openai = None;
    }
    if provider != Provider::Gemini {
        snapshot.gemini = None;
    }
}
