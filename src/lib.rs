//! lmsite - backend for a personal portfolio site
//!
//! 公开内容 API、签名 Cookie 登录、主题切换，以及自带的访问统计。
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line account and config management
//!
//! # Architecture
//! - `analytics`: 访客/会话 ID 推导、路径归一化、时间分桶与聚合
//! - `storage`: SeaORM 存储层与序列化视图
//! - `services`: 采集、统计、内容、认证、主题、地理位置
//! - `api`: HTTP handlers、中间件与签名 Cookie
//! - `interfaces`: CLI 命令实现
//! - `config`: 静态配置（TOML + `LM__*` 环境变量）
//! - `runtime`: 启动、关闭与运行模式
//! - `system`: 日志初始化

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
