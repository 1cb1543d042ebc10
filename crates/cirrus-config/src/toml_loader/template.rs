//! Commented default `config.toml`.

pub(super) fn default_config_toml() -> &'static str {
    r##"# Cirrus Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[assistant]
# model = "claude-sonnet-4-20250514"
# max_tokens = 4096          # 256-64000
# max_tool_rounds = 10       # 1-100, tool rounds per chat turn
# include_session_context = true
# system_prompt = "You are an expert in Amazon Web Services (AWS). ..."

[aws]
# default_profile = "default"
# default_region = "us-east-1"
# request_timeout_secs = 60  # 1-600

[files]
# sandbox_root = "/path/to/project"

[logging]
# level = "info"             # trace, debug, info, warn, error
"##
}
