//! Civic Server - 市政问题上报与分诊后端
//!
//! # 架构概述
//!
//! 本模块是 Civic Server 的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **AI 分诊** (`services/analyzer`): 描述文本 → 类别/严重度/部门
//! - **工作流** (`workflow`): 状态机、指派与时间戳规则
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! civic-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── services/      # AI 分诊、模型客户端、图片存储
//! ├── workflow/      # 工单状态机
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 错误、日志
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;
pub mod workflow;

// Re-export 公共类型
pub use auth::JwtService;
pub use core::{Config, Server, ServerState, setup_environment};
pub use services::{IssueAnalyzer, LanguageModel};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
