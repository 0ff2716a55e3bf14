use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Initialize the global configuration from `config.toml` + `LM__*` env vars
///
/// # Examples
/// ```no_run
/// use lmsite::config::init_config;
/// init_config();
/// ```
pub fn init_config() {
    init_config_from(DEFAULT_CONFIG_PATH);
}

/// 从指定路径初始化（CLI `-c/--config`）
pub fn init_config_from(path: &str) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// 替换当前配置（测试与 CLI 覆盖使用）
pub fn set_config(config: StaticConfig) {
    let current = CONFIG.get_or_init(|| ArcSwap::from_pointee(config.clone()));
    current.store(Arc::new(config));
}
