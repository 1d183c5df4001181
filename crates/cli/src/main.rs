//! Vitrine CLI - drive the storefront engine from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session persists in the credential file)
//! vitrine login -e shopper@example.com -p secret
//!
//! # Browse and fill the cart
//! vitrine products list
//! vitrine cart add 5 -q 2
//! vitrine cart show
//!
//! # Place the order and inspect the history
//! vitrine orders place
//! vitrine orders list
//!
//! # Administrative operations (ADMIN role)
//! vitrine orders set-status 11 CONFIRMED
//! vitrine users list
//! ```
//!
//! # Environment Variables
//!
//! - `VITRINE_API_URL` - Base URL of the backend gateway (required)
//! - `VITRINE_CREDENTIALS_PATH` - Credential file location (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use vitrine_client::{ClientConfig, ClientError, Storefront};
use vitrine_core::{CategoryId, Email, OrderId, OrderStatus, ProductId, Role, UserId};

mod commands;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: Email,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// End the session and clear stored credentials
    Logout,
    /// Create an account (does not sign in)
    Register {
        /// Given name
        #[arg(long)]
        first_name: String,

        /// Family name
        #[arg(long)]
        last_name: String,

        /// Email address
        #[arg(short, long)]
        email: Email,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Show the current profile
    Whoami,
    /// Browse or manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect or mutate the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place orders and manage their status
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Administrative user directory
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List the catalog
    List,
    /// Show one product
    Show { id: ProductId },
    /// List categories
    Categories,
    /// Product service health check
    Status,
    /// Create a product (admin)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        stock: u32,
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        category: CategoryId,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Delete a product (admin)
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the current cart projection
    Show,
    /// Add a product to the cart
    Add {
        product: ProductId,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a product already in the cart
    SetQuantity { product: ProductId, quantity: u32 },
    /// Remove a product from the cart
    Remove { product: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Submit the current cart as an order
    Place,
    /// Refresh and list the order history
    List,
    /// Show one order
    Show { id: OrderId },
    /// Transition an order's status (admin)
    SetStatus { id: OrderId, status: OrderStatus },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List registered users (admin)
    List,
    /// Show one user (admin)
    Show { id: UserId },
    /// Change a user's role (admin)
    SetRole { id: UserId, role: Role },
    /// Delete a user (admin)
    Delete { id: UserId },
}

#[tokio::main]
async fn main() {
    // Initialize tracing; command output goes through it as well
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitrine=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        if e.downcast_ref::<ClientError>()
            .is_some_and(ClientError::is_auth_failure)
        {
            tracing::info!("Sign in again with `vitrine login`.");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let storefront = Storefront::new(config)?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&storefront, &email, &password).await?;
        }
        Commands::Logout => commands::session::logout(&storefront).await,
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            commands::session::register(&storefront, first_name, last_name, email, password)
                .await?;
        }
        Commands::Whoami => commands::session::whoami(&storefront).await?,
        Commands::Products { action } => match action {
            ProductsAction::List => commands::catalog::list(&storefront).await?,
            ProductsAction::Show { id } => commands::catalog::show(&storefront, id).await?,
            ProductsAction::Categories => commands::catalog::categories(&storefront).await?,
            ProductsAction::Status => commands::catalog::status(&storefront).await?,
            ProductsAction::Create {
                name,
                description,
                price,
                stock,
                manufacturer,
                category,
                image_url,
            } => {
                commands::catalog::create(
                    &storefront,
                    name,
                    description,
                    price,
                    stock,
                    manufacturer,
                    category,
                    image_url,
                )
                .await?;
            }
            ProductsAction::Delete { id } => commands::catalog::delete(&storefront, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront).await?,
            CartAction::Add { product, quantity } => {
                commands::cart::add(&storefront, product, quantity).await?;
            }
            CartAction::SetQuantity { product, quantity } => {
                commands::cart::set_quantity(&storefront, product, quantity).await?;
            }
            CartAction::Remove { product } => commands::cart::remove(&storefront, product).await?,
            CartAction::Clear => commands::cart::clear(&storefront).await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::Place => commands::orders::place(&storefront).await?,
            OrdersAction::List => commands::orders::list(&storefront).await?,
            OrdersAction::Show { id } => commands::orders::show(&storefront, id).await?,
            OrdersAction::SetStatus { id, status } => {
                commands::orders::set_status(&storefront, id, status).await?;
            }
        },
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list(&storefront).await?,
            UsersAction::Show { id } => commands::users::show(&storefront, id).await?,
            UsersAction::SetRole { id, role } => {
                commands::users::set_role(&storefront, id, role).await?;
            }
            UsersAction::Delete { id } => commands::users::delete(&storefront, id).await?,
        },
    }
    Ok(())
}
