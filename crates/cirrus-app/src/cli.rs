use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cirrus: a chat assistant that works with your AWS account.
#[derive(Parser, Debug)]
#[command(name = "cirrus", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Ask one question, or start an interactive chat when no prompt is given.
    Chat {
        prompt: Vec<String>,
    },
    /// Run a single tool with a JSON input and print its result.
    Tool {
        name: String,
        /// Tool input as JSON. Defaults to `{}`.
        input: Option<String>,
    },
    /// List the available tools.
    Tools,
    /// Show the active profile, region, endpoint and credential state.
    Status,
    /// List profiles from the shared credentials file.
    Profiles,
    /// Print the effective configuration as JSON.
    Config,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_collects_prompt_words() {
        let args = Args::try_parse_from(["cirrus", "chat", "list", "my", "buckets"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Chat {
                prompt: vec!["list".into(), "my".into(), "buckets".into()]
            })
        );
    }

    #[test]
    fn tool_input_is_optional() {
        let args = Args::try_parse_from(["cirrus", "tool", "aws_get_session"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Tool {
                name: "aws_get_session".into(),
                input: None
            })
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["cirrus", "status", "--log-level", "debug", "--config", "c.toml"])
                .unwrap();
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
        assert_eq!(args.command, Some(Command::Status));
    }

    #[test]
    fn no_subcommand_means_chat() {
        let args = Args::try_parse_from(["cirrus"]).unwrap();
        assert!(args.command.is_none());
    }
}
