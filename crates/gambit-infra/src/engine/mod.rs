//! External move-generation engine clients.

pub mod uci;
