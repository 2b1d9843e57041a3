/// Trait for entities held in list resources.
///
/// The identity key is what list side effects match on when removing or
/// replacing an element.
pub trait Entity: Clone + Send + Sync + 'static {
  /// Unique identifier for this entity (e.g., company id)
  fn entity_key(&self) -> String;

  /// Entity type name, also the prefix of its cache keys (e.g., "company")
  fn entity_type() -> &'static str;
}
