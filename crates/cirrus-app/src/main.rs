mod boot;
mod cli;
mod interrupt;
mod output;

use std::io::Write;
use std::sync::Arc;

use cirrus_ai::{AiClient, ClaudeClient, ClaudeConfig, Conversation, StopReason};
use cirrus_aws::StatusSummary;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;

use crate::boot::App;
use crate::cli::Command;
use crate::interrupt::Interrupts;
use crate::output::TerminalSink;

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv() {
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    load_dotenv();
    let args = cli::parse();

    let (config, config_error) = boot::load_config(args.config.as_deref());
    boot::init_logging(&boot::log_directive(args.log_level.as_deref(), &config));
    tracing::info!("Cirrus v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    let app = match App::build(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("cirrus: {e}");
            std::process::exit(1);
        }
    };

    let code = match args.command.unwrap_or(Command::Chat { prompt: Vec::new() }) {
        Command::Chat { prompt } => run_chat(&app, prompt.join(" ")).await,
        Command::Tool { name, input } => run_tool(&app, &name, input.as_deref()).await,
        Command::Tools => {
            for def in app.registry.definitions() {
                println!("{:<22} {}", def.name, def.description);
            }
            0
        }
        Command::Status => {
            print_status(&app);
            0
        }
        Command::Profiles => {
            let active = app.context.session().get().profile;
            for profile in boot::available_profiles() {
                let marker = if profile == active { "*" } else { " " };
                println!("{marker} {profile}");
            }
            0
        }
        Command::Config => {
            println!("{}", cirrus_config::config_to_json(&app.config));
            0
        }
    };
    std::process::exit(code);
}

fn print_status(app: &App) {
    let session = app.context.session().get();
    let status = StatusSummary::build(&session, app.context.has_credentials(&session));
    println!("{}\n{}", status.text, status.tooltip);
}

async fn run_tool(app: &App, name: &str, input: Option<&str>) -> i32 {
    let input: Value = match serde_json::from_str(input.unwrap_or("{}")) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("cirrus: tool input is not valid JSON: {e}");
            return 2;
        }
    };
    match app.registry.invoke(name, &input).await {
        Some(result) => {
            println!("{}", result.to_text());
            if result.success {
                0
            } else {
                1
            }
        }
        None => {
            eprintln!("cirrus: no such tool: {name}");
            2
        }
    }
}

async fn run_chat(app: &App, prompt: String) -> i32 {
    let assistant = &app.config.assistant;
    let client = match ClaudeConfig::from_env().and_then(|c| {
        ClaudeClient::new(
            c.with_model(assistant.model.clone())
                .with_max_tokens(assistant.max_tokens),
        )
    }) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("model unavailable: {e}");
            println!("No suitable AI model found.");
            return 1;
        }
    };
    tracing::info!(model = client.model_name(), "chat model ready");

    let conversation = Conversation::new()
        .with_system_prompt(assistant.system_prompt.clone())
        .with_invoker(app.registry.clone())
        .with_max_tool_rounds(assistant.max_tool_rounds);

    let interrupts = Interrupts::new();
    interrupts.install();

    if !prompt.trim().is_empty() {
        return match turn(app, &client, &conversation, &interrupts, prompt).await {
            Ok(()) => 0,
            Err(()) => 1,
        };
    }

    println!("Cirrus chat. /status, /refresh, /exit");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        if let Err(e) = std::io::stdout().flush() {
            tracing::debug!("stdout flush failed: {e}");
        }
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("stdin read failed: {e}");
                break;
            }
        };
        match line.trim() {
            "" => continue,
            "/exit" | "/quit" => break,
            "/status" => print_status(app),
            "/refresh" => {
                app.context.session().reload();
                app.context.refresh().await;
                println!("Credentials refreshed.");
            }
            prompt => {
                // Failures are already reported on stderr.
                let _ = turn(app, &client, &conversation, &interrupts, prompt.to_string()).await;
            }
        }
    }

    let usage = conversation.tracker();
    tracing::info!(
        calls = usage.call_count(),
        tokens = usage.total_tokens(),
        "chat finished"
    );
    0
}

/// One user turn. Ctrl-C stops the loop before its next model call.
async fn turn(
    app: &App,
    client: &dyn AiClient,
    conversation: &Conversation,
    interrupts: &Interrupts,
    prompt: String,
) -> Result<(), ()> {
    let context = app
        .config
        .assistant
        .include_session_context
        .then(|| app.context.session().get().context_message());

    let cancel = interrupts.begin_turn();
    let result = conversation
        .run_turn(client, prompt, context, Arc::new(TerminalSink), &cancel)
        .await;
    interrupts.end_turn();
    println!();

    match result {
        Ok(outcome) => {
            match outcome.stop_reason {
                StopReason::Cancelled => eprintln!("(cancelled)"),
                StopReason::RoundLimit => eprintln!(
                    "(stopped after {} tool rounds)",
                    conversation.max_tool_rounds()
                ),
                StopReason::Completed | StopReason::ModelError => {}
            }
            if outcome.stop_reason == StopReason::ModelError {
                Err(())
            } else {
                Ok(())
            }
        }
        Err(e) => {
            eprintln!("cirrus: {e}");
            Err(())
        }
    }
}
