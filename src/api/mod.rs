mod client;
mod resources;

pub use client::AdminApi;
pub use resources::CrudResource;
