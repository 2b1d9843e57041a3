use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Company master record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
  /// Empty until the server assigns one
  #[serde(default)]
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub code: Option<String>,
  #[serde(default)]
  pub address: Option<String>,
  #[serde(default)]
  pub is_active: bool,
  #[serde(default)]
  pub created_on: Option<DateTime<Utc>>,
}

/// Site belonging to a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
  #[serde(default)]
  pub id: String,
  pub company_id: String,
  pub name: String,
  #[serde(default)]
  pub location: Option<String>,
  #[serde(default)]
  pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  #[serde(default)]
  pub id: String,
  pub user_name: String,
  #[serde(default)]
  pub full_name: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub role: Option<String>,
  #[serde(default)]
  pub company_id: Option<String>,
  #[serde(default)]
  pub is_active: bool,
}

/// Activity master: a compliance activity under an act
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMaster {
  #[serde(default)]
  pub id: String,
  pub act_name: String,
  pub activity_name: String,
  #[serde(default)]
  pub frequency: Option<String>, // "monthly", "quarterly", ...
  #[serde(default)]
  pub risk_level: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}

/// Uploadable document template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub file_name: Option<String>,
  #[serde(default)]
  pub uploaded_on: Option<DateTime<Utc>>,
}

/// Uploaded file in the file store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub folder: Option<String>,
  #[serde(default)]
  pub size: Option<u64>,
  #[serde(default)]
  pub uploaded_on: Option<DateTime<Utc>>,
}

/// Score-card report: company -> site -> act -> activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreCardReport {
  pub companies: Vec<CompanyScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyScore {
  pub company_id: String,
  pub company_name: String,
  #[serde(default)]
  pub sites: Vec<SiteScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteScore {
  pub site_id: String,
  pub site_name: String,
  #[serde(default)]
  pub acts: Vec<ActScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActScore {
  pub act_name: String,
  #[serde(default)]
  pub activities: Vec<ActivityScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityScore {
  pub activity_name: String,
  #[serde(default)]
  pub total: u32,
  #[serde(default)]
  pub completed: u32,
  #[serde(default)]
  pub pending: u32,
}

impl ScoreCardReport {
  /// Number of activity rows across the whole tree.
  pub fn activity_count(&self) -> usize {
    self
      .companies
      .iter()
      .flat_map(|c| &c.sites)
      .flat_map(|s| &s.acts)
      .map(|a| a.activities.len())
      .sum()
  }
}

/// Parameters of a score-card report request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCardQuery {
  /// `None` reports across all companies
  pub company_id: Option<String>,
  pub from: NaiveDate,
  pub to: NaiveDate,
}
