pub mod commands;
pub mod dto;
pub mod events;
pub mod model;
