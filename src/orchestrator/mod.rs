//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 读取并规范化输入
//! - 按传输策略创建客户端，管理浏览器会话的获取与释放
//! - 导出 CSV，输出统计信息
//!
//! ### `lookup_runner` - 批量查询驱动
//! - 严格串行地遍历编号列表
//! - 汇报进度
//! - 认证失败时短路，剩余编号标记为 Skipped
//!
//! ## 层次关系
//!
//! ```text
//! app (资源 + 输入输出)
//!     ↓
//! lookup_runner (处理 Vec<Identifier>)
//!     ↓
//! workflow::LookupFlow (处理单个 Identifier：子查询 / 重试 / 节奏)
//!     ↓
//! services (能力层：normalizer / classifier / csv_exporter)
//! clients  (能力层：结构化查询 / 页面抓取)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```

pub mod app;
pub mod lookup_runner;

pub use app::App;
pub use lookup_runner::run_lookup;
