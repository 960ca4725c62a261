//! Interactive conversation loop.

use std::io::Write;
use std::sync::Arc;

use tokio::io::AsyncBufReadExt;

use atomchat_client::{
    ApiClient, ApiError, ChatBackend, ElementLookup, Navigation, SessionStore,
};
use atomchat_core::{Conversation, LookupPanel, Role};

pub async fn run(client: Arc<ApiClient>, session: Arc<dyn SessionStore>) -> anyhow::Result<()> {
    let mut conversation =
        Conversation::new(Arc::clone(&client) as Arc<dyn ChatBackend>, session);

    if conversation.start().await.is_err() {
        println!("No valid session. Run `atomchat login` first.");
        return Ok(());
    }
    if let Some(user) = conversation.user() {
        println!("Logged in as {}.", user.email);
    }
    println!("Ask about any element, or use /lookup <id>, /elements, /analyze <path>, /logout, /quit.");

    let mut panel = LookupPanel::new();
    let mut rendered = 0;
    render_new(&conversation, &mut rendered);

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        let nav = dispatch(&client, &mut conversation, &mut panel, &line).await;

        match nav {
            Flow::Quit => break,
            Flow::Redirect(Navigation::Login) => {
                println!("Session expired. Run `atomchat login` to continue.");
                break;
            }
            Flow::Continue => {}
        }
        render_new(&conversation, &mut rendered);
        prompt();
    }
    Ok(())
}

enum Flow {
    Continue,
    Redirect(Navigation),
    Quit,
}

impl Flow {
    fn from_nav(nav: Option<Navigation>) -> Self {
        match nav {
            Some(target) => Self::Redirect(target),
            None => Self::Continue,
        }
    }
}

async fn dispatch(
    client: &ApiClient,
    conversation: &mut Conversation,
    panel: &mut LookupPanel,
    line: &str,
) -> Flow {
    match line {
        "" => Flow::Continue,
        "/quit" => Flow::Quit,
        "/logout" => {
            conversation.logout();
            println!("Logged out.");
            Flow::Quit
        }
        "/elements" => Flow::from_nav(list_elements(client).await),
        _ if line.starts_with("/lookup") => {
            let identifier = line.strip_prefix("/lookup").unwrap_or("").trim();
            if identifier.is_empty() {
                println!("Usage: /lookup <symbol or name>");
                return Flow::Continue;
            }
            let nav = conversation.lookup(panel, identifier).await;
            if nav.is_none() {
                render_panel(panel);
            }
            Flow::from_nav(nav)
        }
        _ if line.starts_with("/analyze") => {
            let path = line.strip_prefix("/analyze").unwrap_or("").trim();
            if path.is_empty() {
                println!("Usage: /analyze <path>");
                return Flow::Continue;
            }
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    let file_name = std::path::Path::new(path)
                        .file_name()
                        .and_then(|name| name.to_str())
                        .unwrap_or(path);
                    Flow::from_nav(conversation.analyze_media(file_name, bytes).await)
                }
                Err(error) => {
                    println!("Could not read {path}: {error}");
                    Flow::Continue
                }
            }
        }
        _ if line.starts_with('/') => {
            println!("Commands: /lookup <id>, /elements, /analyze <path>, /logout, /quit");
            Flow::Continue
        }
        question => Flow::from_nav(conversation.submit(question).await),
    }
}

async fn list_elements(client: &ApiClient) -> Option<Navigation> {
    match client.elements().await {
        Ok(elements) => {
            for element in elements {
                println!("{:>3}  {:<3} {}", element.atomic_number, element.symbol, element.name);
            }
            None
        }
        Err(ApiError::SessionExpired { redirect }) => Some(redirect),
        Err(error) => {
            println!(
                "{}",
                error.detail().unwrap_or("Could not fetch the element list.")
            );
            None
        }
    }
}

fn render_new(conversation: &Conversation, rendered: &mut usize) {
    let messages = conversation.messages();
    if *rendered > messages.len() {
        // History was reset (logout) while entries were already shown.
        *rendered = messages.len();
        return;
    }
    for message in &messages[*rendered..] {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => "bot",
        };
        if message.is_error {
            println!("[{speaker}] (error) {}", message.content);
        } else {
            println!("[{speaker}] {}", message.content);
        }
        if let Some(url) = &message.image_url {
            println!("      see: {url}");
        }
    }
    *rendered = messages.len();
}

fn render_panel(panel: &LookupPanel) {
    match panel.content() {
        Some(ElementLookup::Found(record)) => {
            println!("{} ({})", record.symbol, record.name);
            println!("  atomic number: {}", record.atomic_number);
            println!("  weight: {}", record.atomic_weight);
            println!(
                "  group: {}",
                record.group.map_or("N/A".to_string(), |group| group.to_string())
            );
            println!("  period: {}", record.period);
            println!("  state: {}", record.state);
            println!("  configuration: {}", record.electron_configuration);
            println!(
                "  density: {}",
                record
                    .density
                    .map_or("N/A".to_string(), |density| format!("{density} g/cm³"))
            );
        }
        Some(ElementLookup::NotFound { message }) => println!("{message}"),
        None => {}
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
