pub mod deadline;
pub mod ffmpeg;
