//! ShapeShop CLI - Local cart management.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! shapeshop-cli show
//!
//! # Add two plain units of product 3 with 40 in stock
//! shapeshop-cli add -p 3 -q 2 --price 9.99 --stock 40
//!
//! # Add a customized lamp
//! shapeshop-cli add -p 1 --price 64.00 --customization-price 12.00 \
//!     --stock 8 --options '{"shade": "linen", "text": "Ada"}'
//!
//! # Change or remove a line
//! shapeshop-cli update <LINE_ID> 3
//! shapeshop-cli remove <LINE_ID>
//! shapeshop-cli clear
//! ```
//!
//! The cart is stored in `--dir` (or `SHAPESHOP_CART_DIR`, default
//! `.shapeshop`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::Value;
use shapeshop_core::LineId;

mod commands;

#[derive(Parser)]
#[command(name = "shapeshop-cli")]
#[command(author, version, about = "ShapeShop cart tools")]
struct Cli {
    /// Directory holding the cart document
    #[arg(long, env = "SHAPESHOP_CART_DIR", default_value = ".shapeshop")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show cart lines and totals
    Show,
    /// Add an item to the cart
    Add {
        /// Catalog product ID
        #[arg(short, long)]
        product: i32,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Unit price
        #[arg(long, value_parser = parse_price)]
        price: Decimal,

        /// Customization surcharge per unit
        #[arg(long, default_value = "0", value_parser = parse_price)]
        customization_price: Decimal,

        /// Total stock for the product (unenforced if omitted)
        #[arg(long)]
        stock: Option<u32>,

        /// Customization options as a JSON object
        #[arg(long, value_parser = parse_options)]
        options: Option<Value>,

        /// Display title
        #[arg(long)]
        title: Option<String>,
    },
    /// Set the quantity of a line
    Update {
        /// Line ID
        line_id: LineId,
        /// New quantity
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Line ID
        line_id: LineId,
    },
    /// Empty the cart
    Clear,
}

fn parse_options(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw)
}

fn parse_price(raw: &str) -> Result<Decimal, String> {
    let amount: Decimal = raw.parse().map_err(|e| format!("invalid amount: {e}"))?;
    if amount.is_sign_negative() {
        return Err(format!("amount must not be negative: {amount}"));
    }
    Ok(amount)
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = commands::cart::open(&cli.dir)?;

    match cli.command {
        Commands::Show => {}
        Commands::Add {
            product,
            quantity,
            price,
            customization_price,
            stock,
            options,
            title,
        } => {
            commands::cart::add(
                &mut cart,
                commands::cart::AddItem {
                    product_id: product,
                    quantity,
                    price,
                    customization_price,
                    stock,
                    options,
                    title,
                },
            );
        }
        Commands::Update { line_id, quantity } => {
            commands::cart::update(&mut cart, line_id, quantity);
        }
        Commands::Remove { line_id } => {
            commands::cart::remove(&mut cart, line_id);
        }
        Commands::Clear => cart.clear_cart(),
    }

    print!("{}", commands::cart::render(&cart));
    Ok(())
}
