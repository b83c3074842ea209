pub mod image;
pub mod liveness;
pub mod readiness;
pub mod transcode;
pub mod upload;
