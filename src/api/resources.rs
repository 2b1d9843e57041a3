use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{ActivityMaster, Company, Site, User};
use crate::resource::Entity;

/// An entity exposed as a standard REST collection
/// (`GET/POST <path>`, `GET/PUT/DELETE <path>/<id>`).
pub trait CrudResource: Entity + Serialize + DeserializeOwned {
  /// Collection path, e.g. "companies"
  const PATH: &'static str;
  /// Label used in messages, e.g. "companies"
  const PLURAL: &'static str;
  const SINGULAR: &'static str;
  /// Query parameter that scopes list requests, for collections nested under a parent
  const SCOPE_PARAM: Option<&'static str> = None;
}

impl CrudResource for Company {
  const PATH: &'static str = "companies";
  const PLURAL: &'static str = "companies";
  const SINGULAR: &'static str = "company";
}

impl CrudResource for Site {
  const PATH: &'static str = "sites";
  const PLURAL: &'static str = "sites";
  const SINGULAR: &'static str = "site";
  const SCOPE_PARAM: Option<&'static str> = Some("companyId");
}

impl CrudResource for User {
  const PATH: &'static str = "users";
  const PLURAL: &'static str = "users";
  const SINGULAR: &'static str = "user";
}

impl CrudResource for ActivityMaster {
  const PATH: &'static str = "activities";
  const PLURAL: &'static str = "activities";
  const SINGULAR: &'static str = "activity";
}
