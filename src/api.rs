//! Blocking HTTP client for the garden backend.
//!
//! The backend owns all persistent state; this module only fetches, decodes
//! and posts. Decoding is deliberately lenient for schedule payloads: records
//! originate from a third-party plant API and single malformed entries are
//! skipped and counted rather than failing the whole fetch.

use chrono::NaiveDate;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{DayWeather, Plant, PlantSummary, Section};
use crate::schedule::ScheduleEntry;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },
}

/// A fetched schedule snapshot: flattened entries, per-day weather, and the
/// count of malformed records skipped while decoding (surfaced to the user as
/// a soft notice, never an error)
#[derive(Debug, Clone, Default)]
pub struct ScheduleFetch {
    pub entries: Vec<ScheduleEntry>,
    pub weather: BTreeMap<NaiveDate, DayWeather>,
    pub skipped: usize,
    pub last_updated: Option<String>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    user_id: i64,
}

impl ApiClient {
    pub fn new(base_url: &str, user_id: i64, timeout_secs: u64) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Search the plant catalog by common name, scientific name or type
    pub fn search_plants(&self, query: &str) -> Result<Vec<PlantSummary>, ApiError> {
        debug!(query, "searching plant catalog");
        let resp = self
            .http
            .get(self.url("/api/plants/search"))
            .query(&[("query", query.to_string()), ("user_id", self.user_id.to_string())])
            .send()?;
        let body: SearchResponseDto = check(resp)?.json()?;
        Ok(body.items)
    }

    /// All plants in the user's garden
    pub fn garden_plants(&self) -> Result<Vec<Plant>, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/plants/user/{}/plants", self.user_id)))
            .send()?;
        Ok(check(resp)?.json()?)
    }

    /// Add a catalog plant to the garden; returns the full plant record
    pub fn add_plant(&self, plant_id: i64) -> Result<Plant, ApiError> {
        info!(plant_id, "adding plant to garden");
        let resp = self
            .http
            .post(self.url(&format!("/api/plants/user/{}/plants/{}", self.user_id, plant_id)))
            .send()?;
        Ok(check(resp)?.json()?)
    }

    pub fn remove_plant(&self, plant_id: i64) -> Result<(), ApiError> {
        info!(plant_id, "removing plant from garden");
        let resp = self
            .http
            .delete(self.url(&format!("/api/plants/user/{}/plants/{}", self.user_id, plant_id)))
            .send()?;
        check(resp)?;
        Ok(())
    }

    /// Move a plant into a section, or unassign it with None
    pub fn assign_section(&self, plant_id: i64, section: Option<&str>) -> Result<(), ApiError> {
        info!(plant_id, section = section.unwrap_or("<none>"), "assigning section");
        let resp = self
            .http
            .put(self.url(&format!(
                "/api/plants/user/{}/plants/{}/section",
                self.user_id, plant_id
            )))
            .json(&json!({ "section": section }))
            .send()?;
        check(resp)?;
        Ok(())
    }

    pub fn sections(&self) -> Result<Vec<Section>, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/sections/{}", self.user_id)))
            .send()?;
        Ok(check(resp)?.json()?)
    }

    pub fn create_section(
        &self,
        section_id: &str,
        name: &str,
        glyph: Option<&str>,
    ) -> Result<Section, ApiError> {
        info!(section_id, name, "creating section");
        let resp = self
            .http
            .post(self.url(&format!("/api/sections/{}", self.user_id)))
            .json(&json!({ "section_id": section_id, "name": name, "glyph": glyph }))
            .send()?;
        Ok(check(resp)?.json()?)
    }

    pub fn rename_section(
        &self,
        id: i64,
        name: &str,
        glyph: Option<&str>,
    ) -> Result<Section, ApiError> {
        info!(id, name, "renaming section");
        let resp = self
            .http
            .put(self.url(&format!("/api/sections/{}", id)))
            .json(&json!({ "name": name, "glyph": glyph }))
            .send()?;
        Ok(check(resp)?.json()?)
    }

    /// Delete a section. Plants assigned to it are unassigned first so the
    /// backend never holds dangling section references.
    pub fn delete_section(&self, id: i64, assigned_plants: &[i64]) -> Result<(), ApiError> {
        info!(id, plants = assigned_plants.len(), "deleting section");
        for &plant_id in assigned_plants {
            self.assign_section(plant_id, None)?;
        }
        let resp = self
            .http
            .delete(self.url(&format!("/api/sections/{}", id)))
            .send()?;
        check(resp)?;
        Ok(())
    }

    /// Fetch the watering overview and flatten the nested
    /// day → section → need-group → plant response into schedule entries
    pub fn watering_schedule(&self) -> Result<ScheduleFetch, ApiError> {
        info!(user_id = self.user_id, "fetching watering schedule");
        let resp = self
            .http
            .get(self.url(&format!(
                "/api/watering-schedule/watering-schedule/user/{}",
                self.user_id
            )))
            .send()?;
        let dto: WateringOverviewDto = check(resp)?.json()?;
        let fetch = flatten_watering(dto);
        if fetch.skipped > 0 {
            warn!(skipped = fetch.skipped, "skipped malformed watering records");
        }
        Ok(fetch)
    }

    /// Record (or undo) a watering for a plant on a date
    pub fn mark_watered(
        &self,
        plant_id: i64,
        date: NaiveDate,
        completed: bool,
    ) -> Result<(), ApiError> {
        info!(plant_id, %date, completed, "updating watering record");
        let resp = self
            .http
            .put(self.url(&format!("/api/watering-schedule/plant/{}", plant_id)))
            .json(&json!({
                "user_id": self.user_id,
                "scheduled_date": date.format("%Y-%m-%d").to_string(),
                "completed": completed,
            }))
            .send()?;
        check(resp)?;
        Ok(())
    }

    /// Fetch the pruning schedule and flatten the per-section month map into
    /// entries dated on the first of each month of `year`
    pub fn pruning_schedule(&self, year: i32) -> Result<ScheduleFetch, ApiError> {
        info!(user_id = self.user_id, year, "fetching pruning schedule");
        let resp = self
            .http
            .get(self.url(&format!("/api/pruning/schedule/{}", self.user_id)))
            .send()?;
        let dto: PruningOverviewDto = check(resp)?.json()?;
        let fetch = flatten_pruning(dto, year);
        if fetch.skipped > 0 {
            warn!(skipped = fetch.skipped, "skipped malformed pruning records");
        }
        Ok(fetch)
    }

    /// Plant suggestions for a section
    pub fn suggestions(&self, section_id: &str) -> Result<Vec<PlantSummary>, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/suggestions/{}", section_id)))
            .send()?;
        Ok(check(resp)?.json()?)
    }
}

/// Reject non-success responses, pulling the backend's `detail` message out of
/// the body when there is one
fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let detail = resp
        .text()
        .ok()
        .and_then(|body| extract_detail(&body))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    Err(ApiError::Backend {
        status: status.as_u16(),
        detail,
    })
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match &value["detail"] {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

// ─── wire shapes ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponseDto {
    #[serde(default)]
    items: Vec<PlantSummary>,
}

#[derive(Debug, Deserialize)]
struct WateringOverviewDto {
    #[serde(default)]
    schedule: Vec<DayDto>,
    #[serde(default)]
    last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DayDto {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    sections: Vec<DaySectionDto>,
    #[serde(default)]
    weather: Option<WeatherDto>,
    // Older payloads carry icons beside the weather object instead of inside it
    #[serde(default)]
    weather_icons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherDto {
    #[serde(default)]
    temperature: f64,
    #[serde(default)]
    precipitation: f64,
    #[serde(default)]
    wind_speed: f64,
    #[serde(default)]
    weather_icons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DaySectionDto {
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    groups: Vec<NeedGroupDto>,
}

#[derive(Debug, Deserialize)]
struct NeedGroupDto {
    #[serde(default)]
    plants: Vec<DuePlantDto>,
}

#[derive(Debug, Deserialize)]
struct DuePlantDto {
    #[serde(default)]
    plant_id: Option<i64>,
    #[serde(default)]
    plant_name: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    weather_adjusted: bool,
    #[serde(default)]
    weather_info: Option<WeatherInfoDto>,
}

#[derive(Debug, Deserialize)]
struct WeatherInfoDto {
    #[serde(default)]
    is_adjusted: bool,
    #[serde(default)]
    original_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PruningOverviewDto {
    #[serde(default)]
    pruning_schedule: Vec<PruningSectionDto>,
}

#[derive(Debug, Deserialize)]
struct PruningSectionDto {
    #[serde(default)]
    section: Option<String>,
    /// Month number ("1".."12") → plants to prune that month
    #[serde(default)]
    details: BTreeMap<String, Vec<PruningDetailDto>>,
}

#[derive(Debug, Deserialize)]
struct PruningDetailDto {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    name: Option<String>,
}

fn normalize_section(section: Option<String>) -> Option<String> {
    match section.as_deref() {
        None | Some("") | Some("Unassigned") => None,
        Some(_) => section,
    }
}

/// Flatten the nested watering overview. Individual records with a missing id,
/// missing name or unparsable date are skipped and counted.
fn flatten_watering(dto: WateringOverviewDto) -> ScheduleFetch {
    let mut fetch = ScheduleFetch {
        last_updated: dto.last_updated,
        ..ScheduleFetch::default()
    };

    for day in dto.schedule {
        let date = match day.date.as_deref().map(crate::utils::parse_date) {
            Some(Ok(date)) => date,
            _ => {
                // Unusable day: every record under it is lost
                let lost: usize = day
                    .sections
                    .iter()
                    .flat_map(|s| s.groups.iter())
                    .map(|g| g.plants.len())
                    .sum();
                fetch.skipped += lost.max(1);
                continue;
            }
        };

        if let Some(weather) = day.weather {
            let mut icons = weather.weather_icons;
            icons.extend(day.weather_icons);
            fetch.weather.insert(
                date,
                DayWeather {
                    temperature: weather.temperature,
                    precipitation: weather.precipitation,
                    wind_speed: weather.wind_speed,
                    icons,
                },
            );
        }

        for day_section in day.sections {
            let section = normalize_section(day_section.section);
            for group in day_section.groups {
                for plant in group.plants {
                    let (Some(plant_id), Some(plant_name)) = (plant.plant_id, plant.plant_name)
                    else {
                        fetch.skipped += 1;
                        continue;
                    };
                    let info = plant.weather_info.unwrap_or(WeatherInfoDto {
                        is_adjusted: false,
                        original_date: None,
                    });
                    fetch.entries.push(ScheduleEntry {
                        plant_id,
                        plant_name,
                        section: section.clone(),
                        scheduled_date: date,
                        completed: plant.completed,
                        weather_adjusted: plant.weather_adjusted || info.is_adjusted,
                        original_date: info
                            .original_date
                            .as_deref()
                            .and_then(|d| crate::utils::parse_date(d).ok()),
                    });
                }
            }
        }
    }

    fetch
}

/// Flatten the pruning overview into entries dated on the first of each month
/// of `year`. The backend speaks in month numbers; anything outside 1..=12 is
/// counted as skipped.
fn flatten_pruning(dto: PruningOverviewDto, year: i32) -> ScheduleFetch {
    let mut fetch = ScheduleFetch::default();

    for section_dto in dto.pruning_schedule {
        let section = normalize_section(section_dto.section);
        for (month_key, details) in section_dto.details {
            let date = month_key
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(|m| NaiveDate::from_ymd_opt(year, m, 1));
            let Some(date) = date else {
                fetch.skipped += details.len().max(1);
                continue;
            };
            for detail in details {
                let (Some(plant_id), Some(plant_name)) = (detail.id, detail.name) else {
                    fetch.skipped += 1;
                    continue;
                };
                fetch.entries.push(ScheduleEntry {
                    plant_id,
                    plant_name,
                    section: section.clone(),
                    scheduled_date: date,
                    completed: false,
                    weather_adjusted: false,
                    original_date: None,
                });
            }
        }
    }

    fetch
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_flatten_watering_nested_payload() {
        let payload = r#"{
            "schedule": [
                {
                    "date": "2024-06-03",
                    "sections": [
                        {
                            "section": "A",
                            "groups": [
                                {"need_level": "high", "plants": [
                                    {"plant_id": 1, "plant_name": "Fern", "completed": false},
                                    {"plant_id": 2, "plant_name": "Rose", "completed": true}
                                ]}
                            ]
                        },
                        {
                            "section": "Unassigned",
                            "groups": [
                                {"need_level": "low", "plants": [
                                    {"plant_id": 3, "plant_name": "Ivy",
                                     "weather_info": {"is_adjusted": true, "original_date": "2024-06-04"}}
                                ]}
                            ]
                        }
                    ],
                    "weather": {"temperature": 28.5, "precipitation": 0.0, "wind_speed": 12.0,
                                "weather_icons": ["🌡"]}
                }
            ],
            "last_updated": "2024-06-03T08:00:00"
        }"#;
        let dto: WateringOverviewDto = serde_json::from_str(payload).unwrap();
        let fetch = flatten_watering(dto);

        assert_eq!(fetch.entries.len(), 3);
        assert_eq!(fetch.skipped, 0);
        assert_eq!(fetch.last_updated.as_deref(), Some("2024-06-03T08:00:00"));

        let rose = &fetch.entries[1];
        assert!(rose.completed);
        assert_eq!(rose.section.as_deref(), Some("A"));

        let ivy = &fetch.entries[2];
        assert!(ivy.section.is_none(), "Unassigned normalizes to None");
        assert!(ivy.weather_adjusted, "weather_info.is_adjusted sets the flag");
        assert_eq!(
            ivy.original_date,
            Some(NaiveDate::from_ymd_opt(2024, 6, 4).unwrap())
        );

        let weather = fetch
            .weather
            .get(&NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
            .unwrap();
        assert_eq!(weather.temperature, 28.5);
        assert_eq!(weather.icons, vec!["🌡".to_string()]);
    }

    #[test]
    fn test_flatten_watering_counts_malformed_records() {
        let payload = r#"{
            "schedule": [
                {
                    "date": "not-a-date",
                    "sections": [
                        {"section": "A", "groups": [{"plants": [
                            {"plant_id": 1, "plant_name": "Fern"}
                        ]}]}
                    ]
                },
                {
                    "date": "2024-06-04",
                    "sections": [
                        {"section": "B", "groups": [{"plants": [
                            {"plant_name": "Nameless"},
                            {"plant_id": 5, "plant_name": "Rose"}
                        ]}]}
                    ]
                }
            ]
        }"#;
        let dto: WateringOverviewDto = serde_json::from_str(payload).unwrap();
        let fetch = flatten_watering(dto);

        assert_eq!(fetch.entries.len(), 1);
        assert_eq!(fetch.entries[0].plant_name, "Rose");
        assert_eq!(fetch.skipped, 2, "one lost day record + one idless plant");
    }

    #[test]
    fn test_flatten_pruning_dates_first_of_month() {
        let payload = r#"{
            "pruning_schedule": [
                {
                    "section": "A",
                    "months": {"3": 2, "11": 1},
                    "details": {
                        "3": [{"id": 1, "name": "Apple"}, {"id": 2, "name": "Pear"}],
                        "11": [{"id": 1, "name": "Apple"}],
                        "thirteen": [{"id": 9, "name": "Ghost"}]
                    }
                }
            ]
        }"#;
        let dto: PruningOverviewDto = serde_json::from_str(payload).unwrap();
        let fetch = flatten_pruning(dto, 2024);

        assert_eq!(fetch.entries.len(), 3);
        assert_eq!(fetch.skipped, 1);
        assert!(fetch
            .entries
            .iter()
            .all(|e| e.scheduled_date.day0() == 0 && e.scheduled_date.year() == 2024));
        assert!(fetch
            .entries
            .iter()
            .any(|e| e.scheduled_date.month() == 11 && e.plant_name == "Apple"));
    }

    #[test]
    fn test_extract_detail_variants() {
        assert_eq!(
            extract_detail(r#"{"detail": "Plant not found"}"#),
            Some("Plant not found".to_string())
        );
        assert_eq!(extract_detail(r#"{"other": 1}"#), None);
        assert_eq!(extract_detail("not json"), None);
    }
}
