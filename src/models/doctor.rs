use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub specialty: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub languages: Vec<String>,
    pub education: Vec<EducationItem>,
    pub experience: Vec<ExperienceItem>,
    pub consultation_fee: f64,
    pub rating: f64,
    pub review_count: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EducationItem {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperienceItem {
    pub position: String,
    pub institution: String,
    #[serde(default)]
    pub years: String,
}

/// The doctor fields embedded in appointment reads.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DoctorSummary {
    pub name: String,
    pub email: Option<String>,
}
