use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// 部署环境
///
/// production 下 Cookie 强制 Secure、禁用模拟地理位置
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Production,
    Development,
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、运行环境
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - auth: 签名密钥、默认管理员、重新验证密钥
/// - analytics: 访问统计、地理位置配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// 环境变量前缀
pub const ENV_PREFIX: &str = "LM";

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LM，分隔符：__
    /// 示例：LM__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }

    /// Cookie 是否带 Secure：显式配置优先，否则跟随环境
    pub fn cookie_secure(&self) -> bool {
        self.auth.cookie_secure.unwrap_or_else(|| self.is_production())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 签名密钥，production 下必须设置
    #[serde(default)]
    pub secret: String,
    /// 不设置时 production 为 true
    #[serde(default)]
    pub cookie_secure: Option<bool>,
    #[serde(default = "default_admin_email")]
    pub default_admin_email: String,
    #[serde(default)]
    pub default_admin_password: String,
    /// `POST /api/revalidate?secret=` 使用的密钥，为空时禁用该端点
    #[serde(default)]
    pub revalidate_secret: String,
    /// 可信反向代理（IP 或 CIDR），用于提取真实客户端 IP
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// 访问统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// 时间序列分桶使用的参考时区（IANA 名称）
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// 管理后台路径前缀，该前缀下的访问不计入统计
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
    /// 平台边缘节点提供的请求 ID 头
    #[serde(default = "default_edge_id_header")]
    pub edge_id_header: String,
    /// 非 production 环境下使用轮换的模拟地理位置
    #[serde(default = "default_true")]
    pub mock_geo: bool,
    /// 是否启用基于 IP 的地理位置查询
    #[serde(default)]
    pub enable_ip_lookup: bool,
    #[serde(default)]
    pub maxminddb_path: Option<String>,
    #[serde(default = "default_geoip_api_url")]
    pub geoip_api_url: String,
    #[serde(default)]
    pub geo_headers: GeoHeaderNames,
}

/// 边缘节点地理位置请求头名称
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoHeaderNames {
    #[serde(default = "default_country_header")]
    pub country: String,
    #[serde(default = "default_region_header")]
    pub region: String,
    #[serde(default = "default_city_header")]
    pub city: String,
    #[serde(default = "default_latitude_header")]
    pub latitude: String,
    #[serde(default = "default_longitude_header")]
    pub longitude: String,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://lmsite.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_admin_email() -> String {
    "admin@localhost".to_string()
}

fn default_timezone() -> String {
    "America/Los_Angeles".to_string()
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_edge_id_header() -> String {
    "x-vercel-id".to_string()
}

fn default_true() -> bool {
    true
}

fn default_geoip_api_url() -> String {
    "http://ip-api.com/json/{ip}?fields=status,countryCode,region,city,lat,lon".to_string()
}

fn default_country_header() -> String {
    "x-vercel-ip-country".to_string()
}

fn default_region_header() -> String {
    "x-vercel-ip-country-region".to_string()
}

fn default_city_header() -> String {
    "x-vercel-ip-city".to_string()
}

fn default_latitude_header() -> String {
    "x-vercel-ip-latitude".to_string()
}

fn default_longitude_header() -> String {
    "x-vercel-ip-longitude".to_string()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            environment: Environment::default(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            cookie_secure: None,
            default_admin_email: default_admin_email(),
            default_admin_password: String::new(),
            revalidate_secret: String::new(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            admin_prefix: default_admin_prefix(),
            edge_id_header: default_edge_id_header(),
            mock_geo: default_true(),
            enable_ip_lookup: false,
            maxminddb_path: None,
            geoip_api_url: default_geoip_api_url(),
            geo_headers: GeoHeaderNames::default(),
        }
    }
}

impl Default for GeoHeaderNames {
    fn default() -> Self {
        Self {
            country: default_country_header(),
            region: default_region_header(),
            city: default_city_header(),
            latitude: default_latitude_header(),
            longitude: default_longitude_header(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert!(config.is_production());
        assert!(config.cookie_secure());
        assert_eq!(config.analytics.timezone, "America/Los_Angeles");
        assert_eq!(config.analytics.edge_id_header, "x-vercel-id");
        assert_eq!(config.analytics.admin_prefix, "/admin");
    }

    #[test]
    fn test_cookie_secure_override() {
        let mut config = StaticConfig::default();
        config.server.environment = Environment::Development;
        assert!(!config.cookie_secure());
        config.auth.cookie_secure = Some(true);
        assert!(config.cookie_secure());
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[server]"));
        assert!(sample.contains("[analytics]"));
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.server.port, 8080);
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            "Development".parse::<Environment>().ok(),
            Some(Environment::Development)
        );
        assert!("staging".parse::<Environment>().is_err());
    }
}
