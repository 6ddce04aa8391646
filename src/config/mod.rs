mod settings;

pub use settings::{Config, FileConfigProvider, PanelSettings, Settings, WebSettings};
