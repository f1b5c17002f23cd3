use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::services::{GeminiClient, ImageStore, IssueAnalyzer, LanguageModel};

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是整个后端的核心数据结构，使用 Arc 实现浅拷贝，
/// 所有权成本极低。所有服务句柄由进程入口构造并注入，
/// 组件自身不持有全局客户端。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | analyzer | Arc<IssueAnalyzer> | AI 分诊服务 |
/// | image_store | Arc<ImageStore> | 图片存储服务 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// AI 分诊服务
    pub analyzer: Arc<IssueAnalyzer>,
    /// 图片存储服务
    pub image_store: Arc<ImageStore>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/civic.db)
    /// 3. 各服务 (Analyzer, ImageStore, JWT)
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let model = GeminiClient::new(
            config.model_api_url.clone(),
            config.model_name.clone(),
            config.model_api_key.clone(),
            config.model_timeout_ms,
        )?;
        Self::initialize_with_model(config, Arc::new(model)).await
    }

    /// 使用指定模型客户端初始化 (测试场景注入 mock 模型)
    pub async fn initialize_with_model(
        config: &Config,
        model: Arc<dyn LanguageModel>,
    ) -> anyhow::Result<Self> {
        let work_dir = PathBuf::from(&config.work_dir);
        std::fs::create_dir_all(config.database_dir())?;

        let db_path = config.database_dir().join("civic.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            analyzer: Arc::new(IssueAnalyzer::new(model)),
            image_store: Arc::new(ImageStore::new(&work_dir)),
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
        })
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
