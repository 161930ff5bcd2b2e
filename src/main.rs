use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use mango_explorer::models::SavedConnection;
use mango_explorer::state::{ConfigManager, StatusLevel, StatusMessage};
use mango_explorer::{
    ExplorerTreeController, HostWindow, InputBoxOptions, MongoConnectionManager, TreeNode,
};

/// Host window over stdin/stdout.
struct TerminalWindow;

#[async_trait]
impl HostWindow for TerminalWindow {
    fn show_message(&self, message: StatusMessage) {
        match message.level {
            StatusLevel::Info => println!("info: {}", message.text),
            StatusLevel::Error => eprintln!("error: {}", message.text),
        }
    }

    async fn show_input_box(
        &self,
        options: InputBoxOptions,
    ) -> mango_explorer::Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        let prompt = format!("{} ({}): ", options.prompt, options.placeholder);
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let mut line = String::new();
        if BufReader::new(tokio::io::stdin()).read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let input = line.trim().to_string();
        if let Some(message) = options.validation_message(&input) {
            eprintln!("{message}");
        }
        Ok(if input.is_empty() { None } else { Some(input) })
    }
}

fn print_item(node: &TreeNode, depth: usize) {
    let item = node.tree_item();
    let indent = "  ".repeat(depth);
    match item.description {
        Some(description) => println!("{indent}{} ({description})", item.label),
        None => println!("{indent}{}", item.label),
    }
}

/// Print a connection with its databases and their collections.
async fn print_connection(
    controller: &ExplorerTreeController,
    connection: &TreeNode,
) -> mango_explorer::Result<()> {
    print_item(connection, 0);
    for database in controller.get_children(Some(connection)).await? {
        print_item(&database, 1);
        controller.on_expand(&database).await;
        for collection in controller.get_children(Some(&database)).await? {
            print_item(&collection, 2);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ConfigManager::new()?;
    let settings = config.load_settings().context("Failed to load settings")?;
    let mut connections = config.load_connections().context("Failed to load connections")?;
    if let Some(uri) = std::env::args().nth(1) {
        connections.push(SavedConnection::new(uri.clone(), uri));
    }
    if connections.is_empty() {
        eprintln!("No saved connections. Usage: mango-explorer <mongodb-uri>");
        return Ok(());
    }

    let manager = Arc::new(MongoConnectionManager::new(connections, settings.connect_timeout()));
    let controller = Arc::new(ExplorerTreeController::new(
        manager.clone(),
        Arc::new(TerminalWindow),
        settings,
    ));
    let listener = controller.listen_for_connection_changes();

    for root in controller.get_children(None).await? {
        if !matches!(root, TreeNode::Connection(_)) {
            print_item(&root, 0);
            continue;
        }
        if !controller.on_expand(&root).await {
            print_item(&root, 0);
            continue;
        }
        if let Err(err) = print_connection(&controller, &root).await {
            log::error!("{err}");
            eprintln!("error: {err}");
        }
    }

    controller.close();
    manager.disconnect().await?;
    listener.abort();
    Ok(())
}
