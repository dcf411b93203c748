//! Flawless CLI - the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Load the shop's product sheet
//! flws import products.csv
//!
//! # Browse and fill the cart
//! flws catalog list --featured 8
//! flws cart add 3f2a9c0d41b74f7e9a0c5b6d7e8f9a01
//! flws cart show
//!
//! # Sign in and send the order to the shop's WhatsApp
//! flws account login -e ama@example.com
//! flws checkout --address "12 Oxford St, Osu" --notes "Call on arrival"
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and change the device's cart
//! - `catalog` - Browse products
//! - `import` - Batch-create products from a CSV export
//! - `account` - Sign up, sign in and out, reset a password
//! - `checkout` - Place an order and print the WhatsApp hand-off link
//! - `orders` - List the signed-in customer's orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use flawless_storefront::Storefront;
use flawless_storefront::config::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "flws")]
#[command(author, version, about = "Flawless storefront CLI")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Create products from a CSV export
    Import {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Manage the customer account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Place an order for the cart
    Checkout {
        /// Delivery address
        #[arg(short, long)]
        address: String,

        /// Notes for the shop
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// List your orders
    Orders,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart contents
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        product_id: String,
    },
    /// Remove a product line
    Remove {
        /// Product id
        product_id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Only the first N products, as on the home page
        #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "8")]
        featured: Option<usize>,
    },
    /// Show one product
    Show {
        /// Product id
        id: String,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create an account and sign in
    Signup {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long, env = "FLAWLESS_PASSWORD", hide_env_values = true)]
        password: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Phone number
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Sign in with email and password
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long, env = "FLAWLESS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in with Google, Facebook or Apple
    LoginWith {
        /// Provider name
        provider: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in customer
    Whoami,
    /// Request a password reset email
    ResetPassword {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!(detail = %e, "Command failed: {}", e.user_message());
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flawless_cli=info,flawless_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: Cli) -> flawless_storefront::Result<()> {
    let config = StorefrontConfig::from_env()?;
    let storefront = Storefront::open(config).await?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront),
            CartAction::Add { product_id } => commands::cart::add(&storefront, &product_id).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&storefront, &product_id),
            CartAction::Clear => commands::cart::clear(&storefront),
        },
        Commands::Catalog { action } => match action {
            CatalogAction::List { featured } => {
                commands::catalog::list(&storefront, featured).await?;
            }
            CatalogAction::Show { id } => commands::catalog::show(&storefront, &id).await?,
        },
        Commands::Import { file } => commands::import::run(&storefront, &file).await?,
        Commands::Account { action } => match action {
            AccountAction::Signup {
                email,
                password,
                name,
                phone,
            } => commands::account::signup(&storefront, email, password, name, phone).await?,
            AccountAction::Login { email, password } => {
                commands::account::login(&storefront, &email, password).await?;
            }
            AccountAction::LoginWith { provider } => {
                commands::account::login_with(&storefront, &provider).await?;
            }
            AccountAction::Logout => commands::account::logout(&storefront).await?,
            AccountAction::Whoami => commands::account::whoami(&storefront),
            AccountAction::ResetPassword { email } => {
                commands::account::reset_password(&storefront, &email).await?;
            }
        },
        Commands::Checkout { address, notes } => {
            commands::checkout::run(&storefront, &address, &notes).await?;
        }
        Commands::Orders => commands::checkout::list_orders(&storefront).await?,
    }
    Ok(())
}
