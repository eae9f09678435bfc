//! CLI entry point for chatwire.

mod cli;

use chatwire::agent::{Agent, AgentEvent};
use chatwire::api::ApiClient;
use chatwire::config::{load_config, ProviderConfig};
use chatwire::conversation::{history_messages, ConversationStore, JsonConversationStore};
use chatwire::error::ChatError;
use chatwire::tools::ToolRegistry;
use chatwire::types::Role;
use clap::Parser;
use std::io::{Read, Write};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    init_tracing();
    let args = cli::Args::parse();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    apply_overrides(&mut config, &args);
    tracing::debug!(
        provider = config.provider.as_str(),
        endpoint = %config.endpoint,
        model = %config.model,
        token = %config.redacted_token(),
        "configuration loaded"
    );

    let outcome = match args.command {
        Some(cli::Command::Test) => run_test(&config).await,
        Some(cli::Command::Image { ref prompt, ref output }) => {
            run_image(&config, prompt, output.as_deref()).await
        }
        Some(cli::Command::History { clear }) => run_history(clear),
        None => run_chat(&config, args.prompt, args.stream).await,
    };
    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Log filter comes from `CHATWIRE_LOG`, defaulting to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHATWIRE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(config: &mut ProviderConfig, args: &cli::Args) {
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if args.stream {
        config.enable_streaming = true;
    }
}

fn require_configured(config: &ProviderConfig) -> CliResult {
    if config.is_configured() {
        Ok(())
    } else {
        Err("endpoint, model and token must be set (config file or CHATWIRE_* env)".into())
    }
}

async fn run_test(config: &ProviderConfig) -> CliResult {
    require_configured(config)?;
    ApiClient::from_config(config).test_connection(config).await?;
    println!("Connection OK ({} / {})", config.provider.as_str(), config.model);
    Ok(())
}

async fn run_image(config: &ProviderConfig, prompt: &str, output: Option<&str>) -> CliResult {
    require_configured(config)?;
    let images = ApiClient::from_config(config)
        .generate_image(prompt, config)
        .await?;
    if images.is_empty() {
        return Err("no images returned".into());
    }

    if let Some(path) = output {
        let bytes = images[0]
            .decode_bytes()
            .ok_or("image was returned as a remote URL; nothing to write")?;
        std::fs::write(path, bytes)?;
        println!("Saved {path}");
        return Ok(());
    }
    for image in &images {
        if let Some(revised) = &image.revised_prompt {
            println!("# {revised}");
        }
        println!("{}", image.url);
    }
    Ok(())
}

fn run_history(clear: bool) -> CliResult {
    let mut store = JsonConversationStore::open_default()?;
    if clear {
        store.clear()?;
        println!("Cleared {}", store.path().display());
        return Ok(());
    }
    for message in store.list()? {
        println!("[{}] {}", message.role.as_str(), message.content);
    }
    Ok(())
}

async fn run_chat(config: &ProviderConfig, prompt: Option<String>, stream: bool) -> CliResult {
    require_configured(config)?;
    let prompt = match prompt {
        Some(p) => p,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err("empty prompt".into());
    }

    let store = JsonConversationStore::open_default()?;
    let client = Arc::new(ApiClient::from_config(config));
    let chat = async {
        if stream || config.enable_streaming {
            stream_reply(config, &client, Box::new(store), prompt).await
        } else {
            agent_reply(config, &client, Box::new(store), prompt).await
        }
    };

    tokio::select! {
        result = chat => result,
        _ = tokio::signal::ctrl_c() => {
            client.cancel_request();
            Err("interrupted".into())
        }
    }
}

async fn agent_reply(
    config: &ProviderConfig,
    client: &Arc<ApiClient>,
    store: Box<dyn ConversationStore>,
    prompt: &str,
) -> CliResult {
    let tools = ToolRegistry::with_default_tools(config);
    let mut agent = Agent::with_client(config.clone(), tools, store, client.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    agent.set_event_sink(Some(tx));

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let AgentEvent::ToolCall { name, args } = event {
                eprintln!("-> {name} {args}");
            }
        }
    });
    let reply = agent.send(prompt).await;
    drop(agent);
    let _ = printer.await;

    println!("{}", reply?);
    Ok(())
}

async fn stream_reply(
    config: &ProviderConfig,
    client: &ApiClient,
    mut store: Box<dyn ConversationStore>,
    prompt: &str,
) -> CliResult {
    store.append(Role::User, prompt).map_err(ChatError::Store)?;
    let history = history_messages(store.as_ref()).map_err(ChatError::Store)?;
    let mut stdout = std::io::stdout();
    let text = client
        .stream_chat(&history, config, |delta| {
            let _ = stdout.write_all(delta.as_bytes());
            let _ = stdout.flush();
        })
        .await?;
    println!();
    if !text.trim().is_empty() {
        store
            .append(Role::Assistant, &text)
            .map_err(ChatError::Store)?;
    }
    Ok(())
}
