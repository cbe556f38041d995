//! Request handlers

pub mod video;
