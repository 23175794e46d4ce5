use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, CatalogRender, CatalogView, HttpStorefrontClient, OrderPhase, OrderView,
    SessionProvider, Shell, ShellError, StaticSession, StorefrontApi,
};
use shared::domain::FieldEdit;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ShellCommand, HELP};

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Browse the product catalog and place orders")]
struct Args {
    /// TOML settings file (defaults to ./storefront.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    catalog_url: Option<String>,
    #[arg(long, global = true)]
    order_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print the catalog once.
    Catalog,
    /// Submit a single order.
    Order {
        #[arg(long)]
        item_id: String,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
        #[arg(long)]
        email: String,
    },
    /// Interactive session with both views (the default).
    Shell,
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    if let Some(url) = args.catalog_url {
        settings.catalog_url = url;
    }
    if let Some(url) = args.order_url {
        settings.order_url = url;
    }
    let endpoints = settings.endpoints()?;
    tracing::info!(
        catalog = %endpoints.catalog,
        order = %endpoints.order,
        "storefront endpoints configured"
    );

    let session: Arc<dyn SessionProvider> = Arc::new(StaticSession::new(
        settings.username.clone(),
        settings.auth_token.clone(),
    ));
    let client: Arc<dyn StorefrontApi> = Arc::new(
        HttpStorefrontClient::with_timeout(endpoints, session.clone(), settings.request_timeout())
            .context("failed to build http client")?,
    );

    match args.command.unwrap_or(Command::Shell) {
        Command::Catalog => run_catalog(client.as_ref()).await,
        Command::Order {
            item_id,
            quantity,
            email,
        } => run_order(client.as_ref(), item_id, quantity, email).await,
        Command::Shell => run_shell(Shell::new(client, session)).await,
    }
}

async fn run_catalog(api: &dyn StorefrontApi) -> Result<()> {
    let mut view = CatalogView::new();
    view.activate(api).await;
    let render = view.render();
    print_lines(&render.lines());
    if let CatalogRender::Error(message) = render {
        bail!("catalog unavailable: {message}");
    }
    Ok(())
}

async fn run_order(
    api: &dyn StorefrontApi,
    item_id: String,
    quantity: i64,
    email: String,
) -> Result<()> {
    let mut view = OrderView::new();
    view.edit(FieldEdit::ItemId(item_id));
    view.edit(FieldEdit::Quantity(quantity));
    view.edit(FieldEdit::CustomerEmail(email));

    let submitted = view.submit(api).await;
    print_lines(&view.render().lines());
    match submitted? {
        OrderPhase::Confirmed => Ok(()),
        phase => bail!("order not confirmed ({phase:?})"),
    }
}

/// Prints the shell, then runs any staged request and prints it again, so
/// the loading state is on screen while the request is in flight.
async fn show(shell: &mut Shell) {
    print_lines(&shell.render().await);
    if let Some(pending) = shell.take_pending() {
        tracing::debug!(route = %pending.route(), "request in flight");
        let completion = pending.run().await;
        shell.apply(completion);
        print_lines(&shell.render().await);
    }
}

async fn run_shell(mut shell: Shell) -> Result<()> {
    if let Err(err) = shell.navigate("/").await {
        println!("{err}");
    }
    show(&mut shell).await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                if !message.is_empty() {
                    println!("{message}");
                }
                continue;
            }
        };
        tracing::debug!(command = command.name(), "shell command");

        let result = match command {
            ShellCommand::Go(path) => shell.navigate(&path).await.map(|_| ()),
            ShellCommand::Refresh => shell.refresh_catalog().await,
            ShellCommand::Set { field, value } => shell.edit_order(&field, &value).await,
            ShellCommand::Submit => shell.begin_order_submit().await,
            ShellCommand::WhoAmI => {
                match shell.current_user().await {
                    Some(user) => println!(
                        "{} (signed in {})",
                        user.username,
                        user.signed_in_at.format("%Y-%m-%d %H:%M:%S UTC")
                    ),
                    None => println!("not signed in"),
                }
                continue;
            }
            ShellCommand::SignOut => {
                shell.sign_out().await?;
                print_lines(&shell.render().await);
                return Ok(());
            }
            ShellCommand::Help => {
                println!("{HELP}");
                continue;
            }
            ShellCommand::Quit => return Ok(()),
        };

        match result {
            Ok(()) => {}
            // Submit and validation failures are already shown by the view.
            Err(ShellError::Submit(_)) => {}
            Err(err) => println!("{err}"),
        }
        show(&mut shell).await;
    }
    Ok(())
}
