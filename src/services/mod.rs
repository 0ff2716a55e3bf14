//! Service layer for business logic
//!
//! HTTP 处理器和 CLI 共用这里的业务逻辑，存储层只负责读写。

mod analytics_service;
mod auth_service;
mod collector_service;
mod content_service;
pub mod geoip;
pub mod theme;

pub use analytics_service::*;
pub use auth_service::*;
pub use collector_service::*;
pub use content_service::*;
pub use geoip::{GeoInfo, GeoIpLookup, GeoIpProvider, GeoResolver};
pub use theme::{ThemeDefinition, ThemeId, ThemeRegistry, ThemeService};
