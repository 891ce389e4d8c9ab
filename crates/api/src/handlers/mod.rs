pub mod activity;
pub mod annotations;
pub mod assignments;
pub mod capacity;
pub mod prospects;
