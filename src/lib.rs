pub mod cli;
pub mod config;
pub mod connector;
pub mod forms;
pub mod history;
pub mod llm;
pub mod models;
pub mod widget;

use cli::Args;
use history::initialize_history_store;
use llm::chat::new_client as new_chat_client;
use log::{ info, warn };
use std::error::Error;
use tokio::io::{ AsyncBufReadExt, BufReader };
use models::chat::Role;
use widget::{ ChatWidget, Visibility };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("History Store Type: {}", args.history_type);
    info!("History Key: {}", args.history_key);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("client default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("client default"));
    info!("Max Output Tokens: {}", args.max_output_tokens);
    info!("Temperature: {}", args.temperature);
    info!("Max Retries: {}", args.max_retries);
    info!("Initial Retry Delay: {}ms", args.initial_delay_ms);
    info!("-------------------------");

    let client = new_chat_client(&config::llm_config(&args), config::retry_policy(&args))?;
    info!(
        "Chat client configured: Model={}, BaseURL={}",
        client.get_model(),
        client.get_base_url()
    );
    let store = initialize_history_store(&args)?;
    let mut widget = ChatWidget::mount(store, client).await;

    println!("Chatbox ready. Commands: /open, /close, /clear, /quit");
    widget.open();
    print_transcript(&widget);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/open" => {
                widget.open();
                print_transcript(&widget);
            }
            "/close" => {
                widget.close();
                println!("(chat closed, /open to continue)");
            }
            "/clear" => {
                widget.clear().await;
                println!("(conversation cleared)");
            }
            _ if widget.visibility() == Visibility::Closed => {
                println!("(chat closed, /open to continue)");
            }
            _ => {
                widget.set_input(line.as_str());
                if !widget.can_send() {
                    continue;
                }
                println!("...");
                match widget.send().await {
                    Ok(messages) => {
                        if let Some(reply) = messages.last() {
                            println!("assistant> {}", reply.content);
                        }
                    }
                    Err(rejected) => warn!("Message not sent: {}", rejected),
                }
            }
        }
    }

    info!("Leaving conversation {}", widget.conversation_id());
    Ok(())
}

fn print_transcript(widget: &ChatWidget) {
    for message in widget.messages() {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("{}> {}", who, message.content);
    }
}
