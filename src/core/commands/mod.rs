// Core command module - the dot-prefix grammar and its dispatcher.

pub mod command_models;
pub mod command_service;

pub use command_service::*;
