// ==========================================
// 针织车间停机统计系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 针织机台停机统计与车间状态记录
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 故障事件源 - SQLite / 日志文件 / 内存
pub mod source;

// 引擎层 - 时间窗/聚合/百分比/报表组装
pub mod engine;

// 数据仓储层 - 车间可变状态
pub mod repository;

// 配置层 - 车间配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    FaultDuration, FaultEvent, FaultLogLine, FaultLogReport, FaultReport, MachineCardReport,
    OverviewReport, ReportResponse, ShiftLabel, ShiftWindow,
};

pub use engine::{
    FaultAggregator, PercentageEngine, ReportAssembler, ShiftWindowResolver,
};

pub use source::{
    DelimitedFileEventSource, EventSource, InMemoryEventSource, SqliteEventSource,
};

pub use api::{FloorApi, ReportApi};

pub use config::FactoryConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "针织车间停机统计系统";
