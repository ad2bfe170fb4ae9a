pub mod debug;
pub mod progress;
pub mod setup;
pub mod template;
