pub mod completion;
pub mod download;
