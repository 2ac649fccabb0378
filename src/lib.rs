//! # CRO Entity Lookup
//!
//! 批量查询爱尔兰公司注册处（CRO）实体编号的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / 输入提交能力
//! - `browser/` - 浏览器会话的获取与释放
//!
//! ### ② 业务能力层（Clients / Services）
//! - `clients/` - 描述"我能查什么"，只处理单个编号的单次查询
//!   - `CroApiClient` - 结构化查询（REST + Basic 认证）
//!   - `CroScrapeClient` - 页面抓取
//! - `services/` - 纯函数能力
//!   - `normalizer` - 编号规范化与去重
//!   - `classifier` - 原始结果 → 结果行
//!   - `csv_exporter` - 结果表导出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个编号"的完整处理流程
//! - `LookupCtx` - 上下文封装（编号 + 位置）
//! - `LookupFlow` - 流程编排（子查询 → 节奏 → 重试 → 分类合并）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用入口，管理输入输出和浏览器资源
//! - `orchestrator/lookup_runner` - 串行遍历编号列表，认证失败短路
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::BrowserSession;
pub use clients::{CroApiClient, CroScrapeClient, RegistryClient};
pub use config::{Config, Credentials, TransportStrategy};
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{EntityTypeFilter, Identifier, LookupTable, RawOutcome, ResultRow, RowStatus};
pub use orchestrator::{run_lookup, App};
pub use workflow::{LookupCtx, LookupFlow, QueryPolicy};
