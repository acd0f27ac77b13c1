pub mod gdrive;
pub mod oauth_state;
pub mod provider;
pub mod registry;
