//! # storefront: Command-Line Storefront Client
//!
//! Runs the cart and checkout flows against a storefront API.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()         RUST_LOG or "info,storefront=debug"          │
//! │  2. ClientConfig::load()   storefront.toml + STOREFRONT_* env           │
//! │  3. HttpBackend::new()     reqwest client                               │
//! │  4. CartStore::load()      GET /users/cartData                          │
//! │  5. run the subcommand, then flush pending quantity syncs              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use storefront_client::{submit_order, CartStore, ClientConfig, HttpBackend, Notice};
use storefront_core::pricing::{compute_item_total, OrderTotals};
use storefront_core::types::Address;
use storefront_core::validation::check_address;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Cart and checkout client for the storefront API")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart with totals
    Cart,

    /// Change an item's quantity by a delta (e.g. 1 or -1)
    Quantity {
        item_id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },

    /// Set an item's quantity
    Set { item_id: String, quantity: i64 },

    /// Remove an item from the cart
    Remove { item_id: String },

    /// Check a shipping address (TOML file) without ordering
    CheckAddress { address: PathBuf },

    /// Place an order for the current cart
    Checkout { address: PathBuf },

    /// Inspect or write the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.clone()).context("Failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
        config.validate()?;
    }
    debug!(base_url = %config.api.base_url, "Configuration loaded");

    match cli.command {
        Commands::Config { action } => run_config(action, &config, cli.config),
        Commands::CheckAddress { address } => {
            let address = read_address(&address)?;
            println!("{}", serde_json::to_string_pretty(&check_address(&address))?);
            Ok(())
        }
        command => run_cart(command, &config).await,
    }
}

/// Sets up the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_client=trace` - Trace the client crate only
/// - Default: INFO, DEBUG for storefront crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_cart(command: Commands, config: &ClientConfig) -> anyhow::Result<()> {
    let backend = HttpBackend::new(config)?;
    let mut store = CartStore::from_config(backend, config);
    store.load().await.context("Failed to load cart")?;

    match command {
        Commands::Cart => print_cart(&store),
        Commands::Quantity { item_id, delta } => {
            let quantity = store.change_quantity(&item_id, delta)?;
            info!(item_id = %item_id, quantity, "Quantity changed");
            report(store.flush_sync().await?)?;
            print_cart(&store);
        }
        Commands::Set { item_id, quantity } => {
            store.set_quantity(&item_id, quantity)?;
            report(store.flush_sync().await?)?;
            print_cart(&store);
        }
        Commands::Remove { item_id } => {
            let removed = store.remove_item(&item_id)?;
            println!("Removed {}", removed.product_name);
            print_cart(&store);
        }
        Commands::Checkout { address } => {
            let address = read_address(&address)?;
            let confirmation = submit_order(&mut store, &address).await?;
            println!("Order placed successfully: {}", confirmation.order_number);
            println!("{}", serde_json::to_string_pretty(&confirmation)?);
        }
        Commands::CheckAddress { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn run_config(action: ConfigAction, config: &ClientConfig, path: Option<PathBuf>) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => println!("{}", toml::to_string_pretty(config)?),
        ConfigAction::Init => {
            config.save(path.clone())?;
            let shown = path.or_else(ClientConfig::default_config_path);
            println!("Wrote {}", shown.map(|p| p.display().to_string()).unwrap_or_default());
        }
    }
    Ok(())
}

fn read_address(path: &Path) -> anyhow::Result<Address> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read address file {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Invalid address file {}", path.display()))
}

/// Prints sync notices; a failed save is an error exit.
fn report(notices: Vec<Notice>) -> anyhow::Result<()> {
    let mut failed = false;
    for notice in notices {
        failed |= matches!(notice, Notice::SyncFailed { .. });
        println!("{notice}");
    }
    if failed {
        bail!("Some quantity changes were not saved");
    }
    Ok(())
}

fn print_cart<B: storefront_client::CartBackend>(store: &CartStore<B>) {
    if store.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for item in store.items() {
        println!(
            "{:<26} {:<40} {:>4} × {:>12} = {:>12}",
            item.id,
            item.product_name,
            item.quantity,
            item.unit_price.to_string(),
            compute_item_total(item).to_string(),
        );
    }
    print_totals(&store.totals());
}

fn print_totals(totals: &OrderTotals) {
    println!();
    println!("Subtotal: {}", totals.subtotal);
    if totals.has_free_shipping() {
        println!("Shipping: FREE");
    } else {
        println!("Shipping: {}", totals.shipping);
    }
    println!("Total:    {}", totals.total);

    if let Some(more) = totals.amount_to_free_shipping() {
        println!("Add {} more for FREE shipping", more);
    }
}
