//! Configuration module.
//!
//! Handles the model folder layout, the external diff program and output style.

mod settings;

pub use settings::{
    expand_env_vars, DiffSettings, FormatSettings, IndentSetting, LayoutSettings, Settings,
    SettingsError,
};
