pub use shell::ShellBackend;

#[cfg(test)]
pub use recording::{RecordedStage, RecordingBackend};

#[cfg(test)]
mod recording;
mod shell;
