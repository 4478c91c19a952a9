pub mod capture_host;
pub mod media_track;
pub mod stream_delegate;
