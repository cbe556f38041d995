//! Request and response bodies

pub mod video;
