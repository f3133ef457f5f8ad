pub mod status;
pub mod update;
