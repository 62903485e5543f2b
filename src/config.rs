//! 配置模块，负责加载JSON配置文件

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    NotFound(PathBuf),

    #[error("无法读取配置文件 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法解析JSON配置文件 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 查询配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// 静默模式：解析和查询错误不会返回给调用方，结果视为无法确定
    pub silent: bool,
    /// 交互模式的历史记录文件
    pub history_file: Option<PathBuf>,
}

impl QueryConfig {
    /// 默认的配置文件名
    pub const DEFAULT_FILE: &'static str = "supports_query.json";

    /// 静默模式的配置
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Default::default()
        }
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }

        // 读取文件内容
        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;

        // 解析JSON
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path_ref.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
            "silent": true,
            "history_file": ".supports_history"
        }}"#
        )
        .unwrap();

        let config = QueryConfig::from_json_file(file.path()).unwrap();
        assert!(config.silent);
        assert_eq!(config.history_file, Some(PathBuf::from(".supports_history")));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();

        let config = QueryConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config, QueryConfig::default());
    }

    #[test]
    fn test_invalid_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "invalid json").unwrap();

        let result = QueryConfig::from_json_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = QueryConfig::from_json_file(dir.path().join("non_existent_file.json"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_silent_config() {
        let config = QueryConfig::silent();
        assert!(config.silent);
        assert_eq!(config.history_file, None);
    }
}
