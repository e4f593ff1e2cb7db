pub struct DefaultConfig;

impl DefaultConfig {
    /// 默认输出文件名
    pub fn default_output() -> String {
        "combined_output.txt".to_string()
    }

    /// 默认工作任务数，0 表示每个 CPU 一个
    pub fn default_workers() -> usize {
        0
    }

    /// 默认显示进度
    pub fn default_show_progress() -> bool {
        true
    }
}
