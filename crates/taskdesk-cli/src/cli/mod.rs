pub mod browser;
pub mod command_handlers;
pub mod dispatcher;
pub mod input;
pub mod main_types;
