use chrono::{DateTime, Local};
use std::time::SystemTime;

/// 输出文件中使用的时间格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 格式化时间为本地时间 (例如: "2024-05-01 13:45:07")
pub fn format_time(time: SystemTime) -> String {
    let local_time: DateTime<Local> = time.into();
    local_time.format(TIMESTAMP_FORMAT).to_string()
}

/// 格式化当前时间
pub fn format_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
