//! Petshop CLI - the admin dashboard from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is kept in PETSHOP_SESSION_FILE)
//! petshop login -e owner@petshop.id -p secret
//!
//! # Catalog
//! petshop products list
//! petshop products create --name Kibble --price 12.50 --category 2 --stock 10
//! petshop categories search toys
//!
//! # Store profile
//! petshop store update --set isOpen=false
//! petshop store locate --lat -6.2088 --lng 106.8456
//! ```
//!
//! # Commands
//!
//! - `login` / `register` / `logout` / `whoami` - Session management
//! - `products` / `categories` - List, inspect, search, and edit the catalog
//! - `store` - Show and edit the store profile, pick its map location

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use petshop_admin::Dashboard;
use petshop_admin::config::AdminConfig;
use petshop_admin::view_models::TracingNotifier;
use petshop_core::{CategoryId, ProductId};

mod commands;

const DEFAULT_LOG_FILTER: &str = "petshop_admin=info,petshop_cli=info";

#[derive(Parser)]
#[command(name = "petshop")]
#[command(author, version, about = "Petshop admin dashboard")]
struct Cli {
    /// Emit logs as JSON (also enabled by `PETSHOP_LOG_JSON=1`)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Password confirmation (defaults to the password)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign out and forget the session
    Logout,
    /// Show who is signed in
    Whoami {
        /// Re-fetch the profile from the backend
        #[arg(long)]
        refresh: bool,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage product categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage the store profile
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Only products in this category
        #[arg(long)]
        category: Option<CategoryId>,

        /// Only featured products
        #[arg(long, conflicts_with = "category")]
        featured: bool,
    },
    /// Show one product
    Get {
        id: ProductId,

        /// Also list related products
        #[arg(long)]
        related: bool,
    },
    /// Search products by name
    Search { query: String },
    /// Create a product
    Create(ProductFields),
    /// Change a product; omitted fields keep their value
    Update {
        id: ProductId,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Args)]
pub struct ProductFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub price: Option<String>,

    #[arg(long)]
    pub image: Option<String>,

    #[arg(long)]
    pub category: Option<CategoryId>,

    #[arg(long)]
    pub stock: Option<String>,
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List,
    /// Show one category
    Get { id: CategoryId },
    /// Search categories by name
    Search { query: String },
    /// Create a category
    Create(CategoryFields),
    /// Change a category; omitted fields keep their value
    Update {
        id: CategoryId,

        #[command(flatten)]
        fields: CategoryFields,
    },
    /// Delete a category
    Delete { id: CategoryId },
}

#[derive(Args)]
pub struct CategoryFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Subcommand)]
enum StoreAction {
    /// Show the store profile
    Show,
    /// Change store fields
    Update {
        /// `FIELD=VALUE`, e.g. `--set isOpen=false`; repeatable
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        assignments: Vec<String>,
    },
    /// Set the map location and address from coordinates
    Locate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json || json_from_env());

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn json_from_env() -> bool {
    std::env::var("PETSHOP_LOG_JSON").is_ok_and(|v| matches!(v.trim(), "1" | "true"))
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AdminConfig::from_env()?;
    let dashboard = Dashboard::from_config(config, Arc::new(TracingNotifier))?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&dashboard, &email, password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            confirm,
        } => {
            let confirm = confirm.unwrap_or_else(|| password.clone());
            commands::auth::register(&dashboard, &name, &email, password, confirm).await?;
        }
        Commands::Logout => commands::auth::logout(&dashboard).await,
        Commands::Whoami { refresh } => commands::auth::whoami(&dashboard, refresh).await?,
        Commands::Products { action } => match action {
            ProductAction::List { category, featured } => {
                commands::catalog::list_products(&dashboard, category, featured).await?;
            }
            ProductAction::Get { id, related } => {
                commands::catalog::get_product(&dashboard, id, related).await?;
            }
            ProductAction::Search { query } => {
                commands::catalog::search(&dashboard.product_page(), &dashboard, &query).await?;
            }
            ProductAction::Create(fields) => {
                commands::catalog::create_product(&dashboard, &fields).await?;
            }
            ProductAction::Update { id, fields } => {
                commands::catalog::update_product(&dashboard, id, &fields).await?;
            }
            ProductAction::Delete { id } => {
                commands::catalog::delete(&mut dashboard.product_page(), &dashboard, id).await?;
            }
        },
        Commands::Categories { action } => match action {
            CategoryAction::List => commands::catalog::list_categories(&dashboard).await?,
            CategoryAction::Get { id } => commands::catalog::get_category(&dashboard, id).await?,
            CategoryAction::Search { query } => {
                commands::catalog::search(&dashboard.category_page(), &dashboard, &query).await?;
            }
            CategoryAction::Create(fields) => {
                commands::catalog::create_category(&dashboard, &fields).await?;
            }
            CategoryAction::Update { id, fields } => {
                commands::catalog::update_category(&dashboard, id, &fields).await?;
            }
            CategoryAction::Delete { id } => {
                commands::catalog::delete(&mut dashboard.category_page(), &dashboard, id).await?;
            }
        },
        Commands::Store { action } => match action {
            StoreAction::Show => commands::store::show(&dashboard).await?,
            StoreAction::Update { assignments } => {
                commands::store::update(&dashboard, &assignments).await?;
            }
            StoreAction::Locate { lat, lng } => commands::store::locate(&dashboard, lat, lng).await?,
        },
    }
    Ok(())
}
