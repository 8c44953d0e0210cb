pub mod error;
pub mod list;
pub mod reconcile;
pub mod settings;
