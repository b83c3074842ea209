pub mod transcode_status;
