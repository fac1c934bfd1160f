//! Domain modules: the coin model and its watch-set container.

pub mod coin;
