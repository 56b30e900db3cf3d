use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量 (或 `.env`) 覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_URL | sqlite:data/pos.db | SQLite 数据库 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | JWT_SECRET | (开发环境随机生成) | JWT 密钥, 至少 32 字符 |
/// | JWT_EXPIRATION_MINUTES | 60 | 访问令牌有效期 |
/// | MASTER_PASSWORD | - | 首个管理员引导口令 |
/// | TELEGRAM_BOT_TOKEN | - | 未设置时不启动机器人 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (按天滚动) |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | CORS_ORIGINS | * | 逗号分隔的允许来源 |
///
/// # 示例
///
/// ```ignore
/// DATABASE_URL=sqlite:/data/pos.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 连接串
    pub database_url: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 引导口令 (换取特殊访问令牌)
    pub master_password: Option<String>,
    /// Telegram 机器人令牌
    pub telegram_bot_token: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// CORS 允许来源, 为空表示允许任意来源
    pub cors_origins: Vec<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/pos.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            master_password: non_empty_var("MASTER_PASSWORD"),
            telegram_bot_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(database_url: impl Into<String>, jwt: JwtConfig) -> Self {
        let mut config = Self::from_env();
        config.database_url = database_url.into();
        config.jwt = jwt;
        config.telegram_bot_token = None;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_wildcard_dropped() {
        assert_eq!(
            parse_origins(" http://a.local , http://b.local,,"),
            vec!["http://a.local".to_string(), "http://b.local".to_string()]
        );
        assert!(parse_origins("*").is_empty());
    }
}
