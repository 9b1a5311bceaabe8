mod command;

use anyhow::Result;
use clap::Parser;
use relay_client::{Conversation, DEFAULT_RELAY_URL, RelayApi, RelayClient, ServiceIndicator};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use command::{HELP, Input};

#[derive(Parser)]
#[command(name = "relay-chat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the relay server.
    #[arg(long, env = "RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    url: String,

    /// Model to request; the relay's default is used when omitted.
    #[arg(short, long)]
    model: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let client = RelayClient::new(&cli.url)?;
    let mut convo = Conversation::new(cli.model);

    print_indicator(&ServiceIndicator::probe(&client).await);
    println!("Type a message, or /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        debug!(input = %line, "read line");

        match Input::parse(&line) {
            Input::Blank => {}
            Input::Message(text) => {
                let outcome = convo.send(&client, text).await?;
                println!("{}", outcome.reply);
                if let Some(err) = outcome.error {
                    eprintln!("  ({err})");
                }
            }
            Input::Clear => {
                convo.clear();
                println!("Conversation cleared.");
            }
            Input::Model(None) => match convo.model() {
                Some(model) => println!("Model: {model}"),
                None => println!("Model: relay default"),
            },
            Input::Model(Some(model)) => {
                if convo.switch_model(model) {
                    println!("Switched to {model}; conversation cleared.");
                } else {
                    println!("Already using {model}.");
                }
            }
            Input::Models => match client.list_models().await {
                Ok(list) => {
                    println!("{} models:", list.count);
                    for m in &list.available_models {
                        println!("  {:<40} {}", m.name, m.display_name);
                    }
                }
                Err(e) => eprintln!("Could not list models: {e}"),
            },
            Input::Health => print_indicator(&ServiceIndicator::probe(&client).await),
            Input::Usage => {
                let usage = convo.usage();
                println!(
                    "prompt {} / completion {} / total {}",
                    usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                );
            }
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Unknown(name) => eprintln!("Unknown command /{name}; try /help"),
        }
    }

    Ok(())
}

fn print_indicator(indicator: &ServiceIndicator) {
    match indicator {
        ServiceIndicator::Healthy { model, version } => {
            println!("Relay healthy: model {model}, API {version}")
        }
        ServiceIndicator::Degraded => println!("Relay unreachable or degraded"),
    }
}
