use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceCategory {
    Sport,
    Social,
    Cultural,
    Barbecue,
    Auditorium,
    Hall,
}

impl SpaceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceCategory::Sport => "sport",
            SpaceCategory::Social => "social",
            SpaceCategory::Cultural => "cultural",
            SpaceCategory::Barbecue => "barbecue",
            SpaceCategory::Auditorium => "auditorium",
            SpaceCategory::Hall => "hall",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sport" => Some(SpaceCategory::Sport),
            "social" => Some(SpaceCategory::Social),
            "cultural" => Some(SpaceCategory::Cultural),
            "barbecue" => Some(SpaceCategory::Barbecue),
            "auditorium" => Some(SpaceCategory::Auditorium),
            "hall" => Some(SpaceCategory::Hall),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpaceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Daily opening window, wall-clock "HH:MM" strings with start < end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingHours {
    pub start: String,
    pub end: String,
}

/// A bookable community space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub name: String,
    pub category: SpaceCategory,
    pub capacity: u32,
    pub description: String,
    pub operating_hours: OperatingHours,
    pub rules: Vec<String>,
    pub is_active: bool,
    pub image_url: Option<String>,
}

/// Request to create a space (admin only)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpaceRequest {
    pub name: String,
    pub category: SpaceCategory,
    pub capacity: u32,
    #[serde(default)]
    pub description: String,
    pub operating_hours: OperatingHours,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Partial update for a space; omitted fields are unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSpaceRequest {
    pub name: Option<String>,
    pub category: Option<SpaceCategory>,
    pub capacity: Option<u32>,
    pub description: Option<String>,
    pub operating_hours: Option<OperatingHours>,
    pub rules: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub image_url: Option<Option<String>>,
}

impl Space {
    /// Apply a partial update in place
    pub fn apply(&mut self, update: UpdateSpaceRequest) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(capacity) = update.capacity {
            self.capacity = capacity;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(hours) = update.operating_hours {
            self.operating_hours = hours;
        }
        if let Some(rules) = update.rules {
            self.rules = rules;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = image_url;
        }
    }
}
