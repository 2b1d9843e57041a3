mod keys;
mod types;

pub use keys::ResourceKey;
pub use types::{
  ActScore, ActivityMaster, ActivityScore, Company, CompanyScore, FileEntry, ScoreCardQuery,
  ScoreCardReport, Site, SiteScore, Template, User,
};
