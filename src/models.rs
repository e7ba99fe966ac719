use serde::{Deserialize, Serialize};

/// A plant in the user's garden, as served by the backend.
/// Most descriptive fields are optional: catalog records are sourced from a
/// third-party API and arrive with gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: i64,
    pub common_name: String,
    #[serde(default)]
    pub scientific_name: Vec<String>,
    #[serde(default)]
    pub other_names: Vec<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(rename = "type", default)]
    pub plant_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub growth_rate: Option<String>,
    #[serde(default)]
    pub maintenance: Option<String>,
    #[serde(default)]
    pub hardiness_zone: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cycle: Option<String>,
    #[serde(default)]
    pub watering: Option<String>,
    #[serde(default)]
    pub is_evergreen: bool,
    #[serde(default)]
    pub edible_fruit: bool,
    /// Section identifier ("A", "B", ...) or None when unassigned
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub attracts: Vec<String>,
    #[serde(default)]
    pub sunlight: Vec<String>,
}

impl Plant {
    /// Row grouping label for type-based schedule views
    pub fn type_label(&self) -> String {
        match self.plant_type.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => "Other".to_string(),
        }
    }
}

/// A catalog search hit. Lighter than [`Plant`]: the search endpoint returns
/// only identity fields plus whether the plant is already in the garden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantSummary {
    pub id: i64,
    pub common_name: String,
    #[serde(default)]
    pub scientific_name: Vec<String>,
    #[serde(default)]
    pub other_names: Vec<String>,
    #[serde(rename = "type", default)]
    pub plant_type: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub in_user_garden: bool,
}

/// A user-defined garden section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    /// Short stable identifier plants reference ("A", "B", ...)
    pub section_id: String,
    pub name: String,
    #[serde(default)]
    pub glyph: Option<String>,
    pub user_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Section {
    pub fn display_name(&self) -> String {
        match self.glyph.as_deref() {
            Some(g) if !g.is_empty() => format!("{} {}", g, self.name),
            _ => self.name.clone(),
        }
    }
}

/// Server-computed weather snapshot for one schedule day. The backend owns all
/// adjustment logic; these values are display-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayWeather {
    pub temperature: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    #[serde(default)]
    pub icons: Vec<String>,
}

/// Which derived schedule a view or fetch refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    Watering,
    Pruning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_type_label_fallback() {
        let json = r#"{"id": 3, "common_name": "Fern"}"#;
        let plant: Plant = serde_json::from_str(json).unwrap();
        assert_eq!(plant.type_label(), "Other");
        assert!(plant.section.is_none());
    }

    #[test]
    fn test_plant_decodes_partial_record() {
        let json = r#"{
            "id": 7,
            "common_name": "Japanese Maple",
            "type": "Tree",
            "section": "B",
            "is_evergreen": false
        }"#;
        let plant: Plant = serde_json::from_str(json).unwrap();
        assert_eq!(plant.type_label(), "Tree");
        assert_eq!(plant.section.as_deref(), Some("B"));
        assert!(plant.scientific_name.is_empty());
    }

    #[test]
    fn test_section_display_name() {
        let section = Section {
            id: 1,
            section_id: "A".to_string(),
            name: "Herb bed".to_string(),
            glyph: Some("🌿".to_string()),
            user_id: 1,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(section.display_name(), "🌿 Herb bed");
    }
}
