pub mod settings;

// Re-export commonly used types
pub use settings::{
    load_viewer_settings, save_viewer_settings, ApiSettings, CameraSettings, ViewerSettings,
};
