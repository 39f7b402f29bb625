use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_path = std::env::var("LEETRECALL_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./leetrecall.json"));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            data_path,
            log_level,
        }
    }
}
