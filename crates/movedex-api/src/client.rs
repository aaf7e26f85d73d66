//! PokeAPI client and wire types

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

/// Upper bound on the move list request (`/move?limit=N`)
pub const MOVE_LIST_LIMIT: usize = 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// `{ name, url }` pair used throughout PokeAPI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveList {
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveDetail {
    pub learned_by_pokemon: Vec<NamedResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    pub sprites: Sprites,
    pub types: Vec<TypeSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: TypeName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeName {
    pub name: String,
}

impl Pokemon {
    /// Official artwork if present, otherwise the default front sprite
    pub fn image_url(&self) -> Option<&str> {
        self.sprites
            .other
            .as_ref()
            .and_then(|o| o.official_artwork.as_ref())
            .and_then(|a| a.front_default.as_deref())
            .or(self.sprites.front_default.as_deref())
    }

    /// Type names in slot order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.kind.name.as_str())
    }
}

/// Read-only access to the three PokeAPI endpoints the lookup needs.
///
/// Implementations must be shareable across session threads.
pub trait MoveApi: Send + Sync {
    /// `GET <base>/move?limit=1000`
    fn move_list(&self) -> Result<MoveList, ApiError>;

    /// `GET <base>/move/{name}`; `name` is passed through as given
    fn move_detail(&self, name: &str) -> Result<MoveDetail, ApiError>;

    /// `GET <url>` for a `learned_by_pokemon` entry
    fn pokemon(&self, url: &str) -> Result<Pokemon, ApiError>;
}

/// Blocking HTTP implementation of [`MoveApi`]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("movedex/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let transport = |source| ApiError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().map_err(transport)?;
        serde_json::from_str(&body).map_err(|source| ApiError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

impl MoveApi for PokeApiClient {
    #[instrument(name = "fetch_move_list", skip_all)]
    fn move_list(&self) -> Result<MoveList, ApiError> {
        let url = format!("{}/move?limit={}", self.base_url, MOVE_LIST_LIMIT);
        self.get_json(&url)
    }

    #[instrument(name = "fetch_move", skip_all, fields(name = %name))]
    fn move_detail(&self, name: &str) -> Result<MoveDetail, ApiError> {
        let url = format!("{}/move/{}", self.base_url, name);
        self.get_json(&url)
    }

    #[instrument(name = "fetch_pokemon", skip_all, fields(url = %url))]
    fn pokemon(&self, url: &str) -> Result<Pokemon, ApiError> {
        self.get_json(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIKACHU: &str = r#"{
        "id": 25,
        "name": "pikachu",
        "base_experience": 112,
        "sprites": {
            "front_default": "https://img/sprites/25.png",
            "back_default": null,
            "other": {
                "official-artwork": { "front_default": "https://img/artwork/25.png" },
                "home": { "front_default": null }
            }
        },
        "types": [
            { "slot": 1, "type": { "name": "electric", "url": "https://pokeapi.co/api/v2/type/13/" } }
        ]
    }"#;

    #[test]
    fn test_pokemon_prefers_official_artwork() {
        let p: Pokemon = serde_json::from_str(PIKACHU).unwrap();
        assert_eq!(p.id, 25);
        assert_eq!(p.image_url(), Some("https://img/artwork/25.png"));
        assert_eq!(p.type_names().collect::<Vec<_>>(), vec!["electric"]);
    }

    #[test]
    fn test_pokemon_falls_back_to_front_sprite() {
        let json = r#"{
            "id": 10001,
            "name": "deoxys-attack",
            "sprites": {
                "front_default": "https://img/sprites/10001.png",
                "other": { "official-artwork": { "front_default": null } }
            },
            "types": [{ "type": { "name": "psychic" } }]
        }"#;
        let p: Pokemon = serde_json::from_str(json).unwrap();
        assert_eq!(p.image_url(), Some("https://img/sprites/10001.png"));
    }

    #[test]
    fn test_pokemon_without_any_sprite() {
        let json = r#"{
            "id": 1,
            "name": "missingno",
            "sprites": { "front_default": null, "other": null },
            "types": []
        }"#;
        let p: Pokemon = serde_json::from_str(json).unwrap();
        assert_eq!(p.image_url(), None);
        assert_eq!(p.type_names().count(), 0);
    }

    #[test]
    fn test_move_detail_requires_learned_by_pokemon() {
        let ok: MoveDetail = serde_json::from_str(
            r#"{ "name": "tackle", "learned_by_pokemon": [{ "name": "bulbasaur", "url": "u/1" }] }"#,
        )
        .unwrap();
        assert_eq!(ok.learned_by_pokemon.len(), 1);

        assert!(serde_json::from_str::<MoveDetail>(r#"{ "name": "tackle" }"#).is_err());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = PokeApiClient::new("https://pokeapi.co/api/v2/").unwrap();
        assert_eq!(client.base_url(), "https://pokeapi.co/api/v2");
    }
}
