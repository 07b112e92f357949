//! Application runtime composition modules.

pub(crate) mod discord;
pub(crate) mod runtime;
pub(crate) mod terminal;
