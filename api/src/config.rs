//! Process configuration, resolved strictly from environment variables
//! (§6's exhaustive list, plus `TRIGGER_SECRET` for §10.B's on-demand
//! trigger route). Every variable is optional with the documented default;
//! the ones naming external managed resources (`REQUEST_TABLE`,
//! `TASK_SQS_URL`, `SNS_TOPIC_ARN`, `TASK_DISPATCHER_FUN_NAME`, ...) are
//! accepted for parity with the spec's deployment surface but unused here —
//! the three stores, queue and notifier are the in-process stand-ins from
//! the `stores` crate (§1: these are external collaborators, out of scope).

use std::env;

fn env_str(key: &str, default: &str) -> String {
    env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_num<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,

    // §6 source-control / ingress
    pub access_token: String,
    pub github_api_base: String,
    pub gitlab_api_base: String,

    // §10.B on-demand trigger (`POST /trigger`), carried over from the
    // teacher's `trigger_mr`/`trigger_gitlab_mr` routes' shared secret.
    pub trigger_secret: String,

    // §6 LLM invocation transport
    pub bedrock_access_key: Option<String>,
    pub bedrock_secret_key: Option<String>,
    pub bedrock_region: String,

    // §4.E retry/backoff
    pub sqs_max_delay_secs: u64,
    pub sqs_base_delay_secs: u64,
    pub sqs_max_retries: u32,
    pub max_failed_times: u32,
    pub max_token_to_sample: u32,
    pub top_p: f32,
    pub temperature: f32,

    // §4.B / §4.D defaults
    pub default_mode: String,
    pub default_model: String,

    // §4.F cron + report
    pub report_timeout_secs: u64,
    pub cron_interval_secs: u64,

    /// Accepted for parity with the spec's env surface; not read by this
    /// in-process implementation (the real stores/queue/topic/dispatcher
    /// function are external collaborators, §1).
    pub request_table: Option<String>,
    pub task_table: Option<String>,
    pub bucket_name: Option<String>,
    pub task_sqs_url: Option<String>,
    pub sns_topic_arn: Option<String>,
    pub task_dispatcher_fun_name: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", env_num("APP_PORT", 8080u16)),

            access_token: env_str("ACCESS_TOKEN", ""),
            github_api_base: env_str("GITHUB_API_BASE", "https://api.github.com"),
            gitlab_api_base: env_str("GITLAB_API_BASE", "https://gitlab.com/api/v4"),
            trigger_secret: env_str("TRIGGER_SECRET", ""),

            bedrock_access_key: env_opt("BEDROCK_ACCESS_KEY"),
            bedrock_secret_key: env_opt("BEDROCK_SECRET_KEY"),
            bedrock_region: env_str("BEDROCK_REGION", "us-east-1"),

            sqs_max_delay_secs: env_num("SQS_MAX_DELAY", 300),
            sqs_base_delay_secs: env_num("SQS_BASE_DELAY", 60),
            sqs_max_retries: env_num("SQS_MAX_RETRIES", 5),
            max_failed_times: env_num("MAX_FAILED_TIMES", 6),
            max_token_to_sample: env_num("MAX_TOKEN_TO_SAMPLE", 10_000),
            top_p: env_num("TOP_P", 1.0),
            temperature: env_num("TEMPERATURE", 0.0),

            default_mode: env_str("DEFAULT_MODE", "all"),
            default_model: env_str("DEFAULT_MODEL", "claude3"),

            report_timeout_secs: env_num("REPORT_TIMEOUT_SECONDS", 900),
            cron_interval_secs: env_num("CRON_INTERVAL_SECONDS", 300),

            request_table: env_opt("REQUEST_TABLE"),
            task_table: env_opt("TASK_TABLE"),
            bucket_name: env_opt("BUCKET_NAME"),
            task_sqs_url: env_opt("TASK_SQS_URL"),
            sns_topic_arn: env_opt("SNS_TOPIC_ARN"),
            task_dispatcher_fun_name: env_opt("TASK_DISPATCHER_FUN_NAME"),
        }
    }

    /// Bedrock-runtime-shaped endpoint base the `llm-client` transport posts to.
    pub fn bedrock_runtime_base(&self) -> String {
        format!("https://bedrock-runtime.{}.amazonaws.com", self.bedrock_region)
    }
}
