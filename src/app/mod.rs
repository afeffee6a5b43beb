//! The pipeline surface: state, background tasks, interactive commands and the
//! view model handed to whatever renders the pipeline.

pub mod commands;
pub mod events;
pub mod helpers;
pub mod proxy;
pub mod state;
pub mod tasks;
pub mod view_model;
