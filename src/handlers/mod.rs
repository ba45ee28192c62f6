pub mod alerts;
pub mod categories;
pub mod monitors;
pub mod triggers;
