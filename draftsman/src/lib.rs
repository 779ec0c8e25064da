pub mod editor;
pub mod logging;
pub mod settings;

pub use editor::{Editor, EditorError};
pub use settings::Settings;
