//! One-shot `suggest` / `lookup` commands and the `tui` entry point

use crate::client::{MoveApi, PokeApiClient};
use crate::coordinator::RequestCoordinator;
use crate::index::NameIndex;
use crate::render::Card;
use crate::suggest::suggest;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;

/// How long `lookup` waits for a session before giving up
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Args, Debug, Clone, Default)]
pub struct ApiOptions {
    /// PokeAPI base URL (defaults to $POKEAPI_URL, then https://pokeapi.co/api/v2)
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,
}

impl ApiOptions {
    pub fn base_url(&self) -> String {
        crate::resolve_api_base_url(self.api_url.as_deref())
    }

    fn client(&self) -> Result<Arc<dyn MoveApi>> {
        let client = PokeApiClient::new(self.base_url())?;
        Ok(Arc::new(client))
    }
}

#[derive(Args, Debug)]
pub struct TuiArgs {
    #[command(flatten)]
    pub api: ApiOptions,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Partial move name
    pub prefix: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub api: ApiOptions,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Move name, e.g. "thunderbolt"
    #[arg(value_name = "MOVE")]
    pub name: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub api: ApiOptions,
}

pub fn execute_tui(args: TuiArgs) -> Result<()> {
    crate::tui::run(args.api.base_url())
}

pub fn execute_suggest(args: SuggestArgs) -> Result<()> {
    let api = args.api.client()?;
    let index = load_index(api.as_ref())?;
    let suggestions = suggest(&args.prefix, &index);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("{}", "No matching moves".dimmed());
    }
    for name in suggestions {
        println!("{}", name);
    }
    Ok(())
}

pub fn execute_lookup(args: LookupArgs) -> Result<()> {
    if args.name.trim().is_empty() {
        anyhow::bail!("Move name is required");
    }

    let api = args.api.client()?;
    let cards = lookup(api, &args.name, LOOKUP_TIMEOUT)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    for card in &cards {
        for line in card.to_cli_lines() {
            println!("{}", line);
        }
    }
    println!(
        "{}",
        format!("{} Pokémon can learn {}", cards.len(), args.name.trim()).dimmed()
    );
    Ok(())
}

/// Run a single session to completion and return its cards
pub fn lookup(api: Arc<dyn MoveApi>, name: &str, timeout: Duration) -> Result<Vec<Card>> {
    let mut coordinator = RequestCoordinator::new(api);
    coordinator.select(name);

    if !coordinator.wait_settled(timeout) {
        anyhow::bail!("Timed out looking up {}", name.trim());
    }

    let area = coordinator.area();
    if let Some(ref err) = area.error {
        anyhow::bail!("{}", err);
    }
    Ok(area.cards.clone())
}

fn load_index(api: &dyn MoveApi) -> Result<NameIndex> {
    NameIndex::load(api).map_err(|e| {
        let message = e.user_message();
        anyhow::Error::new(e).context(message)
    })
}
