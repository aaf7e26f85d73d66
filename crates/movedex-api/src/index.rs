//! Move name index, loaded once at startup

use crate::client::{ApiError, MoveApi};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to load moves: {0}")]
    Api(#[from] ApiError),

    #[error("Failed to load moves: the move list was empty")]
    Empty,
}

impl LoadError {
    /// Message shown to the user in place of search
    pub fn user_message(&self) -> &'static str {
        "Failed to load moves. Please check your connection and retry."
    }
}

/// Ordered, immutable list of candidate move names.
///
/// A `NameIndex` only exists after a successful load, so it is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameIndex {
    names: Vec<String>,
}

impl NameIndex {
    /// Fetch the full move list. No retry; call again to retry.
    pub fn load(api: &dyn MoveApi) -> Result<Self, LoadError> {
        let list = api.move_list()?;
        let names: Vec<String> = list.results.into_iter().map(|m| m.name).collect();
        log::debug!("Loaded {} move names", names.len());
        Self::from_names(names)
    }

    pub fn from_names(names: Vec<String>) -> Result<Self, LoadError> {
        if names.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MoveDetail, MoveList, NamedResource, Pokemon};

    struct StaticList(Result<Vec<&'static str>, u16>);

    impl MoveApi for StaticList {
        fn move_list(&self) -> Result<MoveList, ApiError> {
            match &self.0 {
                Ok(names) => Ok(MoveList {
                    results: names
                        .iter()
                        .map(|n| NamedResource {
                            name: n.to_string(),
                            url: format!("https://pokeapi.co/api/v2/move/{n}/"),
                        })
                        .collect(),
                }),
                Err(code) => Err(ApiError::Status {
                    url: "https://pokeapi.co/api/v2/move?limit=1000".to_string(),
                    status: reqwest::StatusCode::from_u16(*code).unwrap(),
                }),
            }
        }

        fn move_detail(&self, _name: &str) -> Result<MoveDetail, ApiError> {
            unreachable!()
        }

        fn pokemon(&self, _url: &str) -> Result<Pokemon, ApiError> {
            unreachable!()
        }
    }

    #[test]
    fn test_load_keeps_response_order() {
        let index = NameIndex::load(&StaticList(Ok(vec!["pound", "karate-chop", "double-slap"])))
            .unwrap();
        assert_eq!(index.names(), ["pound", "karate-chop", "double-slap"]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_load_fails_on_error_status() {
        let err = NameIndex::load(&StaticList(Err(503))).unwrap_err();
        assert!(matches!(err, LoadError::Api(ApiError::Status { .. })));
        assert!(err.user_message().contains("retry"));
    }

    #[test]
    fn test_load_rejects_empty_list() {
        let err = NameIndex::load(&StaticList(Ok(vec![]))).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }
}
