pub mod time_format;

pub use time_format::{format_now, format_time};
