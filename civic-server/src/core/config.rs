use std::path::PathBuf;

use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/civic/server | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | MODEL_API_URL | https://generativelanguage.googleapis.com | 模型 API 地址 |
/// | MODEL_NAME | gemini-2.5-flash | 模型名称 |
/// | GOOGLE_API_KEY | (空) | 模型 API 密钥 |
/// | MODEL_TIMEOUT_MS | 20000 | 模型调用超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/civic HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传图片、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 模型配置 ===
    /// 模型 API 基础地址
    pub model_api_url: String,
    /// 模型名称
    pub model_name: String,
    /// 模型 API 密钥
    pub model_api_key: String,
    /// 模型调用超时 (毫秒)，超时按调用失败处理
    pub model_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/civic/server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            model_api_url: std::env::var("MODEL_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into()),
            model_name: std::env::var("MODEL_NAME").unwrap_or_else(|_| "gemini-2.5-flash".into()),
            model_api_key: std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
            model_timeout_ms: std::env::var("MODEL_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(20000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
