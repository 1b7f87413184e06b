use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment, parse_u16,
    parse_u32, parse_u64,
};
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, JudgeSettings, PlagiarismSettings,
    RuntimeSettings, S3Settings, ServerHost, ServerPort, ServerSettings, Settings,
    TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("CODETRACK_HOST", "0.0.0.0");
        let port = env_or_default("CODETRACK_PORT", "8000");

        let environment = parse_environment(
            env_optional("CODETRACK_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("CODETRACK_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "CodeTrack API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "codetracksuperuser");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "codetrack_db");
        let database_url = env_optional("DATABASE_URL");

        let judge_base_url = env_or_default("JUDGE_BASE_URL", "http://localhost:2358");
        let judge_timeout_seconds =
            parse_u64("JUDGE_TIMEOUT_SECONDS", env_or_default("JUDGE_TIMEOUT_SECONDS", "30"))?;
        let judge_poll_interval_seconds = parse_u64(
            "JUDGE_POLL_INTERVAL_SECONDS",
            env_or_default("JUDGE_POLL_INTERVAL_SECONDS", "2"),
        )?;
        let judge_max_poll_attempts = parse_u32(
            "JUDGE_MAX_POLL_ATTEMPTS",
            env_or_default("JUDGE_MAX_POLL_ATTEMPTS", "150"),
        )?;

        let plagiarism_base_url = env_or_default("PLAGIARISM_BASE_URL", "");
        let plagiarism_timeout_seconds = parse_u64(
            "PLAGIARISM_TIMEOUT_SECONDS",
            env_or_default("PLAGIARISM_TIMEOUT_SECONDS", "60"),
        )?;
        let plagiarism_max_retries = parse_u32(
            "PLAGIARISM_MAX_RETRIES",
            env_or_default("PLAGIARISM_MAX_RETRIES", "3"),
        )?;

        let s3_endpoint = env_or_default("S3_ENDPOINT", "https://storage.yandexcloud.net");
        let s3_access_key = env_or_default("S3_ACCESS_KEY", "");
        let s3_secret_key = env_or_default("S3_SECRET_KEY", "");
        let s3_bucket = env_or_default("S3_BUCKET", "codetrack-data-storage");
        let s3_region = env_or_default("S3_REGION", "ru-central1");

        let log_level = env_or_default("CODETRACK_LOG_LEVEL", "info");
        let json = env_optional("CODETRACK_LOG_JSON")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);
        let prometheus_enabled = env_optional("PROMETHEUS_ENABLED")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            judge: JudgeSettings {
                base_url: judge_base_url,
                timeout_seconds: judge_timeout_seconds,
                poll_interval_seconds: judge_poll_interval_seconds,
                max_poll_attempts: judge_max_poll_attempts,
            },
            plagiarism: PlagiarismSettings {
                base_url: plagiarism_base_url,
                timeout_seconds: plagiarism_timeout_seconds,
                max_submit_retries: plagiarism_max_retries,
            },
            s3: S3Settings {
                endpoint: s3_endpoint,
                access_key: s3_access_key,
                secret_key: s3_secret_key,
                bucket: s3_bucket,
                region: s3_region,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn judge(&self) -> &JudgeSettings {
        &self.judge
    }

    pub(crate) fn plagiarism(&self) -> &PlagiarismSettings {
        &self.plagiarism
    }

    pub(crate) fn s3(&self) -> &S3Settings {
        &self.s3
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.judge.poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "JUDGE_POLL_INTERVAL_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.judge.max_poll_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "JUDGE_MAX_POLL_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        if self.judge.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "JUDGE_BASE_URL",
                value: String::from("<empty>"),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.plagiarism.base_url.is_empty() {
            return Err(ConfigError::MissingSecret("PLAGIARISM_BASE_URL"));
        }
        if self.s3.access_key.is_empty() || self.s3.secret_key.is_empty() {
            return Err(ConfigError::MissingSecret("S3_ACCESS_KEY/S3_SECRET_KEY"));
        }

        Ok(())
    }
}
