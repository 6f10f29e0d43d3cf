//! Query layer: GraphQL documents, the data source seam, and result normalization

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::state::{DetailRecord, StatEntry, SummaryRecord};

pub const LIST_OPERATION: &str = "GetPokemons";
pub const DETAIL_OPERATION: &str = "GetPokemonDetails";

pub const LIST_QUERY: &str = r#"
query GetPokemons($search: String) {
  pokemon(
    limit: 151
    order_by: { id: asc }
    where: {
      pokemonspecy: {
        pokemonspeciesnames: { language: { name: { _eq: "en" } }, name: { _regex: $search } }
      }
    }
  ) {
    id
    pokemonspecy {
      pokemonspeciesnames(where: { language: { name: { _eq: "en" } } }) {
        name
      }
    }
    pokemonsprites {
      sprites(path: "other.official-artwork.front_default")
    }
    pokemontypes {
      type {
        typenames(where: { language: { name: { _eq: "en" } } }) {
          name
        }
      }
    }
  }
}
"#;

pub const DETAIL_QUERY: &str = r#"
query GetPokemonDetails($id: Int!) {
  pokemon(where: { id: { _eq: $id } }) {
    id
    pokemonspecy {
      pokemonspeciesnames(where: { language: { name: { _eq: "en" } } }) {
        name
      }
      capture_rate
    }
    pokemonsprites {
      sprites(path: "other.official-artwork.front_default")
    }
    pokemontypes {
      type {
        typenames(where: { language: { name: { _eq: "en" } } }) {
          name
        }
      }
    }
    weight
    height
    pokemonstats {
      base_stat
      stat {
        name
      }
    }
  }
}
"#;

/// How the committed search text is placed into the `_regex` filter
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Interpolate the text as-is; metacharacters keep their regex meaning
    #[default]
    Pattern,
    /// Escape regex metacharacters so the text matches literally
    Literal,
}

/// Case-insensitive substring pattern for the list query.
///
/// An empty term yields `(?i).*.*`, which matches every name.
pub fn search_pattern(term: &str, mode: SearchMode) -> String {
    match mode {
        SearchMode::Pattern => format!("(?i).*{term}.*"),
        SearchMode::Literal => format!("(?i).*{}.*", regex::escape(term)),
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with {0}")]
    Status(String),
    #[error("{0}")]
    Graphql(String),
    #[error("response parse error: {0}")]
    Decode(String),
    #[error("invalid pokemon id: {0}")]
    InvalidId(String),
}

/// One GraphQL operation with its variables
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub operation_name: &'static str,
    pub query: &'static str,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn summaries(pattern: &str) -> Self {
        Self {
            operation_name: LIST_OPERATION,
            query: LIST_QUERY,
            variables: json!({ "search": pattern }),
        }
    }

    pub fn detail(id: i64) -> Self {
        Self {
            operation_name: DETAIL_OPERATION,
            query: DETAIL_QUERY,
            variables: json!({ "id": id }),
        }
    }
}

/// Executes a GraphQL document and hands back its `data` member
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn execute(&self, request: &GraphqlRequest) -> Result<Value, QueryError>;
}

// ============================================================================
// Raw response shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct PokemonData {
    pokemon: Option<Vec<RawPokemon>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Int(id) => id.to_string(),
            RawId::Text(id) => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPokemon {
    id: RawId,
    pokemonspecy: Option<RawSpecies>,
    pokemonsprites: Option<Vec<RawSprites>>,
    pokemontypes: Option<Vec<RawTypeSlot>>,
    weight: Option<u32>,
    height: Option<u32>,
    pokemonstats: Option<Vec<RawStat>>,
}

#[derive(Debug, Deserialize)]
struct RawSpecies {
    pokemonspeciesnames: Option<Vec<RawName>>,
    capture_rate: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawName {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSprites {
    sprites: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawTypeSlot {
    #[serde(rename = "type")]
    type_info: Option<RawType>,
}

#[derive(Debug, Deserialize)]
struct RawType {
    typenames: Option<Vec<RawName>>,
}

#[derive(Debug, Deserialize)]
struct RawStat {
    base_stat: Option<u32>,
    stat: Option<RawName>,
}

fn first_name(names: Option<&Vec<RawName>>) -> Option<String> {
    names?.first()?.name.clone()
}

impl RawPokemon {
    fn species_name(&self) -> Option<String> {
        first_name(self.pokemonspecy.as_ref()?.pokemonspeciesnames.as_ref())
    }

    /// One entry per type association, gaps included
    fn type_names(&self) -> Vec<Option<String>> {
        self.pokemontypes
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|slot| first_name(slot.type_info.as_ref()?.typenames.as_ref()))
            .collect()
    }

    fn sprite(&self) -> Option<String> {
        self.pokemonsprites
            .as_ref()?
            .first()?
            .sprites
            .as_ref()?
            .as_str()
            .map(|s| s.to_string())
    }

    fn into_summary(self) -> SummaryRecord {
        SummaryRecord {
            name: self.species_name(),
            types: self.type_names(),
            sprite: self.sprite(),
            id: self.id.into_string(),
        }
    }

    fn into_detail(self) -> DetailRecord {
        let name = self.species_name();
        let types = self.type_names();
        let sprite = self.sprite();
        let capture_rate = self.pokemonspecy.as_ref().and_then(|s| s.capture_rate);
        let stats = self
            .pokemonstats
            .unwrap_or_default()
            .into_iter()
            .map(|stat| StatEntry {
                name: stat.stat.and_then(|s| s.name),
                base_stat: stat.base_stat,
            })
            .collect();
        DetailRecord {
            id: self.id.into_string(),
            name,
            types,
            sprite,
            weight: self.weight.unwrap_or_default(),
            height: self.height.unwrap_or_default(),
            capture_rate,
            stats,
        }
    }
}

fn decode_pokemon(data: Value) -> Result<Vec<RawPokemon>, QueryError> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    let data: PokemonData =
        serde_json::from_value(data).map_err(|e| QueryError::Decode(e.to_string()))?;
    Ok(data.pokemon.unwrap_or_default())
}

// ============================================================================
// Operations
// ============================================================================

/// Runs the list query with `pattern` as the `search` variable.
///
/// The variable is always sent; build it with [`search_pattern`].
pub async fn fetch_summaries<S>(source: &S, pattern: &str) -> Result<Vec<SummaryRecord>, QueryError>
where
    S: DataSource + ?Sized,
{
    debug!(pattern, "fetching summaries");
    let data = source
        .execute(&GraphqlRequest::summaries(pattern))
        .await
        .inspect_err(|err| warn!(pattern, error = %err, "summary query failed"))?;
    let records: Vec<SummaryRecord> = decode_pokemon(data)?
        .into_iter()
        .map(RawPokemon::into_summary)
        .collect();
    debug!(pattern, count = records.len(), "summaries loaded");
    Ok(records)
}

/// Runs the detail query for `id`.
///
/// Without an id nothing is sent and the result is empty.
pub async fn fetch_detail<S>(source: &S, id: Option<&str>) -> Result<Vec<DetailRecord>, QueryError>
where
    S: DataSource + ?Sized,
{
    let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok(Vec::new());
    };
    let numeric: i64 = id
        .parse()
        .map_err(|_| QueryError::InvalidId(id.to_string()))?;
    debug!(id, "fetching detail");
    let data = source
        .execute(&GraphqlRequest::detail(numeric))
        .await
        .inspect_err(|err| warn!(id, error = %err, "detail query failed"))?;
    Ok(decode_pokemon(data)?
        .into_iter()
        .map(RawPokemon::into_detail)
        .collect())
}
