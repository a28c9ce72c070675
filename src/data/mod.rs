//! Core data models for the Pokedex CLI
//!
//! This module contains the PokeAPI response shapes the REPL works with, and
//! the client that fetches them through the response cache.

pub mod pokeapi;

pub use pokeapi::{ApiError, PokeApiClient, DEFAULT_BASE_URL};

use serde::{Deserialize, Serialize};

/// A name/URL pair, the API's generic reference to another resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One page of the `location-area` listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationAreaPage {
    /// Total number of areas across all pages
    pub count: u32,
    /// URL of the next page, absent on the last page
    pub next: Option<String>,
    /// URL of the previous page, absent on the first page
    pub previous: Option<String>,
    /// Areas on this page
    pub results: Vec<NamedResource>,
}

/// A single location area and the pokemon that can be encountered there
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationArea {
    #[serde(default)]
    pub name: String,
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedResource,
}

/// Details of a single pokemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub name: String,
    /// Experience gained for defeating it, also drives catch difficulty
    #[serde(default)]
    pub base_experience: Option<u32>,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    pub stats: Vec<PokemonStat>,
    pub types: Vec<PokemonType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    pub effort: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonType {
    pub slot: u32,
    #[serde(rename = "type")]
    pub type_: NamedResource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_area_page_parses_api_shape() {
        let json = r#"{
            "count": 1089,
            "next": "https://pokeapi.co/api/v2/location-area?offset=20&limit=20",
            "previous": null,
            "results": [
                {"name": "canalave-city-area", "url": "https://pokeapi.co/api/v2/location-area/1/"},
                {"name": "eterna-city-area", "url": "https://pokeapi.co/api/v2/location-area/2/"}
            ]
        }"#;

        let page: LocationAreaPage = serde_json::from_str(json).expect("Failed to parse page");

        assert_eq!(page.count, 1089);
        assert!(page.next.as_deref().unwrap().contains("offset=20"));
        assert!(page.previous.is_none());
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].name, "canalave-city-area");
    }

    #[test]
    fn test_location_area_parses_encounters() {
        let json = r#"{
            "id": 1,
            "name": "canalave-city-area",
            "pokemon_encounters": [
                {"pokemon": {"name": "tentacool", "url": "https://pokeapi.co/api/v2/pokemon/72/"}, "version_details": []},
                {"pokemon": {"name": "tentacruel", "url": "https://pokeapi.co/api/v2/pokemon/73/"}, "version_details": []}
            ]
        }"#;

        let area: LocationArea = serde_json::from_str(json).expect("Failed to parse area");

        assert_eq!(area.name, "canalave-city-area");
        let names: Vec<&str> = area
            .pokemon_encounters
            .iter()
            .map(|e| e.pokemon.name.as_str())
            .collect();
        assert_eq!(names, vec!["tentacool", "tentacruel"]);
    }

    #[test]
    fn test_pokemon_parses_stats_and_types() {
        let json = r#"{
            "name": "pidgey",
            "base_experience": 50,
            "height": 3,
            "weight": 18,
            "stats": [
                {"base_stat": 40, "effort": 0, "stat": {"name": "hp", "url": "https://pokeapi.co/api/v2/stat/1/"}},
                {"base_stat": 56, "effort": 1, "stat": {"name": "speed", "url": "https://pokeapi.co/api/v2/stat/6/"}}
            ],
            "types": [
                {"slot": 1, "type": {"name": "normal", "url": "https://pokeapi.co/api/v2/type/1/"}},
                {"slot": 2, "type": {"name": "flying", "url": "https://pokeapi.co/api/v2/type/3/"}}
            ]
        }"#;

        let pokemon: Pokemon = serde_json::from_str(json).expect("Failed to parse pokemon");

        assert_eq!(pokemon.name, "pidgey");
        assert_eq!(pokemon.base_experience, Some(50));
        assert_eq!(pokemon.height, 3);
        assert_eq!(pokemon.weight, 18);
        assert_eq!(pokemon.stats[1].stat.name, "speed");
        assert_eq!(pokemon.stats[1].base_stat, 56);
        assert_eq!(pokemon.types[1].type_.name, "flying");
    }

    #[test]
    fn test_pokemon_null_base_experience() {
        let json = r#"{"name": "missingno", "base_experience": null, "height": 1, "weight": 1, "stats": [], "types": []}"#;

        let pokemon: Pokemon = serde_json::from_str(json).expect("Failed to parse pokemon");

        assert!(pokemon.base_experience.is_none());
    }
}
