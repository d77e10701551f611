//! Runtime module — process boot: logging, config, Docker, state.

pub mod boot;
