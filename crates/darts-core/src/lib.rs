#![deny(warnings)]
pub mod game;
pub mod model;
pub mod stats;
pub mod store;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "darts-scorekeeper"
    }

    pub const fn codename() -> &'static str {
        "Oche"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
