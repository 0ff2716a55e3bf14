//! HTTP API
//!
//! - `services`: 处理器、路由、错误码与响应类型
//! - `middleware`: 请求 ID、管理端认证
//! - `signed_cookie`: 登录态 Cookie 签名与验证

pub mod constants;
pub mod middleware;
pub mod services;
pub mod signed_cookie;
