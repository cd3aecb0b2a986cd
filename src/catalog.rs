//! Static travel content: cities, their attractions, and curated itineraries.
//!
//! The data set is compiled into the binary and parsed once on first use.
//! Nothing here is ever mutated after parsing.

use anyhow::Context;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;

const CATALOG_JSON: &str = include_str!("../data/catalog.json");

static CATALOG: OnceCell<Catalog> = OnceCell::new();

/// Returns the process-wide catalog, parsing the embedded data on first call.
pub fn catalog() -> anyhow::Result<&'static Catalog> {
    CATALOG.get_or_try_init(|| {
        let catalog = Catalog::from_json(CATALOG_JSON)?;
        info!(
            "Catalog loaded: {} cities, {} itineraries",
            catalog.cities.len(),
            catalog.itineraries.len()
        );
        Ok(catalog)
    })
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attraction {
    pub id: String,
    pub name: String,
    #[serde(rename = "name_local")]
    pub name_local: String,
    pub location: String,
    pub duration: String,
    pub best_time_to_visit: String,
    pub ticket: String,
    pub historical_significance: Vec<String>,
    pub highlights: Vec<String>,
    pub cultural_relevance: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    pub google_maps_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_context: Option<CulturalContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_and_architecture: Option<ArtAndArchitecture>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CulturalContext {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literature: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anecdotes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtAndArchitecture {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restoration: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub country: String,
    pub attractions: Vec<Attraction>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub id: String,
    pub city_id: String,
    pub city_name: String,
    pub title: String,
    pub description: String,
    pub attraction_ids: Vec<String>,
    /// `travel_times[i]` is the leg between stop `i` and stop `i + 1`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub travel_times: Vec<String>,
}

/// One resolved stop of an itinerary.
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryStop<'a> {
    pub order: usize,
    pub attraction: &'a Attraction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_time_to_next: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Catalog {
    pub cities: Vec<City>,
    pub itineraries: Vec<Itinerary>,
}

impl Catalog {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse catalog data")
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn city(&self, city_id: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.id == city_id)
    }

    pub fn attraction(&self, city_id: &str, attraction_id: &str) -> Option<&Attraction> {
        self.city(city_id)?
            .attractions
            .iter()
            .find(|a| a.id == attraction_id)
    }

    pub fn itinerary(&self, itinerary_id: &str) -> Option<&Itinerary> {
        self.itineraries.iter().find(|i| i.id == itinerary_id)
    }

    pub fn itineraries_for_city<'a, 'b>(
        &'a self,
        city_id: &'b str,
    ) -> impl Iterator<Item = &'a Itinerary> {
        self.itineraries.iter().filter(move |i| i.city_id == city_id)
    }

    /// Courses that visit the given attraction, in authored order.
    pub fn itineraries_including<'a, 'b>(
        &'a self,
        attraction_id: &'b str,
    ) -> impl Iterator<Item = &'a Itinerary> {
        self.itineraries
            .iter()
            .filter(move |i| i.attraction_ids.iter().any(|id| id == attraction_id))
    }

    /// Resolves an itinerary's attractions in visiting order.
    ///
    /// Ids that are not attractions of the itinerary's city are skipped. A
    /// travel time is attached to every stop but the last, taken from the
    /// leg that follows the stop's position in `attraction_ids`.
    pub fn itinerary_stops<'a>(&'a self, itinerary: &'a Itinerary) -> Vec<ItineraryStop<'a>> {
        let Some(city) = self.city(&itinerary.city_id) else {
            return Vec::new();
        };

        let resolved: Vec<(usize, &Attraction)> = itinerary
            .attraction_ids
            .iter()
            .enumerate()
            .filter_map(|(pos, id)| {
                city.attractions
                    .iter()
                    .find(|a| &a.id == id)
                    .map(|a| (pos, a))
            })
            .collect();

        let last = resolved.len().saturating_sub(1);
        resolved
            .into_iter()
            .enumerate()
            .map(|(index, (pos, attraction))| ItineraryStop {
                order: index + 1,
                attraction,
                travel_time_to_next: if index < last {
                    itinerary.travel_times.get(pos).map(String::as_str)
                } else {
                    None
                },
            })
            .collect()
    }
}

impl Attraction {
    /// Flattens the attraction into the text used to ground model answers.
    /// Built fresh for every question.
    pub fn context_string(&self) -> String {
        let mut lines = vec![
            format!("명소: {} ({})", self.name, self.name_local),
            format!("위치: {}", self.location),
            format!("추천 시간대: {}", self.best_time_to_visit),
        ];
        if !self.highlights.is_empty() {
            lines.push(format!("추천 포인트: {}", self.highlights.join(", ")));
        }
        if !self.historical_significance.is_empty() {
            lines.push(format!(
                "역사적 의미: {}",
                self.historical_significance.join(", ")
            ));
        }
        if let Some(tip) = self.tip.as_deref().filter(|t| !t.trim().is_empty()) {
            lines.push(format!("현지 꿀팁: {tip}"));
        }
        lines.join("\n")
    }
}
