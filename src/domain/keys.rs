//! Entity identities and deterministic cache keys.

use crate::resource::Entity;

use super::types::{ActivityMaster, Company, FileEntry, ScoreCardQuery, Site, Template, User};

// ============================================================================
// Entity implementations
// ============================================================================

impl Entity for Company {
  fn entity_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "company"
  }
}

impl Entity for Site {
  fn entity_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "site"
  }
}

impl Entity for User {
  fn entity_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "user"
  }
}

impl Entity for ActivityMaster {
  fn entity_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "activity"
  }
}

impl Entity for Template {
  fn entity_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "template"
  }
}

impl Entity for FileEntry {
  fn entity_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "file"
  }
}

// ============================================================================
// Cache keys
// ============================================================================

/// Cache key for a read operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceKey {
  /// Full or scoped list of an entity type
  List {
    entity: &'static str,
    scope: Option<String>,
  },
  /// Single entity by id
  Item { entity: &'static str, id: String },
  /// Score-card report for a company and date range
  ScoreCard(ScoreCardQuery),
}

impl ResourceKey {
  pub fn list<E: Entity>(scope: Option<&str>) -> Self {
    Self::List {
      entity: E::entity_type(),
      scope: scope.map(String::from),
    }
  }

  pub fn item<E: Entity>(id: &str) -> Self {
    Self::Item {
      entity: E::entity_type(),
      id: id.to_string(),
    }
  }

  /// Prefix shared by every list key of `E`, scoped or not.
  pub fn list_prefix<E: Entity>() -> String {
    format!("{}_list", E::entity_type())
  }

  /// Keys look like `company_list`, `site_list_c1`, `company_item_c1`.
  pub fn cache_key(&self) -> String {
    match self {
      Self::List {
        entity,
        scope: None,
      } => format!("{}_list", entity),
      Self::List {
        entity,
        scope: Some(scope),
      } => format!("{}_list_{}", entity, scope),
      Self::Item { entity, id } => format!("{}_item_{}", entity, id),
      Self::ScoreCard(query) => format!(
        "score_card_{}_{}_{}",
        query.company_id.as_deref().unwrap_or("all"),
        query.from,
        query.to
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  #[test]
  fn test_cache_key_formats() {
    assert_eq!(ResourceKey::list::<User>(None).cache_key(), "user_list");
    assert_eq!(ResourceKey::list::<Site>(Some("c1")).cache_key(), "site_list_c1");
    assert_eq!(ResourceKey::item::<Company>("c7").cache_key(), "company_item_c7");
    assert_eq!(ResourceKey::list_prefix::<Site>(), "site_list");

    let query = ScoreCardQuery {
      company_id: None,
      from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
      to: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    };
    assert_eq!(
      ResourceKey::ScoreCard(query).cache_key(),
      "score_card_all_2024-01-01_2024-03-31"
    );
  }

  #[test]
  fn test_scoped_keys_share_list_prefix() {
    let prefix = ResourceKey::list_prefix::<Site>();
    assert!(ResourceKey::list::<Site>(Some("c1")).cache_key().starts_with(&prefix));
    assert!(ResourceKey::list::<Site>(None).cache_key().starts_with(&prefix));
    assert!(!ResourceKey::item::<Site>("s1").cache_key().starts_with(&prefix));
  }

  #[test]
  fn test_item_keys_never_collide_with_list_keys() {
    assert_ne!(
      ResourceKey::item::<Company>("list").cache_key(),
      ResourceKey::list::<Company>(None).cache_key()
    );
    let prefix = ResourceKey::list_prefix::<Site>();
    assert!(!ResourceKey::item::<Site>("list_c1").cache_key().starts_with(&prefix));
  }
}
