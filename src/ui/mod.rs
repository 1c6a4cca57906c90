//! UI components for the uploader

pub mod background;
pub mod glass;
pub mod history;
pub mod upload;
