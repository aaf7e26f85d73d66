pub mod client;
pub mod coordinator;
pub mod debounce;
pub mod index;
pub mod lookup;
pub mod nav;
pub mod render;
pub mod session;
pub mod suggest;
pub mod tui;

pub use client::{ApiError, MoveApi, MoveDetail, MoveList, NamedResource, PokeApiClient, Pokemon};
pub use coordinator::{RequestCoordinator, ResultArea};
pub use debounce::Debouncer;
pub use index::{LoadError, NameIndex};
pub use lookup::{
    execute_lookup, execute_suggest, execute_tui, LookupArgs, SuggestArgs, TuiArgs,
};
pub use nav::{Focus, NavKey, NavOutcome, SuggestionBox};
pub use render::{render_cards, Badge, Card, TypeColor};
pub use session::{CancelToken, SessionError, SessionOutcome, SessionState};
pub use suggest::{suggest, SUGGESTION_LIMIT};

const DEFAULT_API_URL: &str = "https://pokeapi.co/api/v2";

fn get_api_base_url() -> String {
    if let Ok(url) = std::env::var("POKEAPI_URL") {
        return url;
    }

    DEFAULT_API_URL.to_string()
}

/// Resolve the API base URL: explicit override, then `POKEAPI_URL`, then the public PokeAPI.
pub fn resolve_api_base_url(explicit: Option<&str>) -> String {
    let url = match explicit {
        Some(url) => url.to_string(),
        None => get_api_base_url(),
    };
    url.trim_end_matches('/').to_string()
}
