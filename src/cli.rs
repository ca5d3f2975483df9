use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::future::Future;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::api::{AdminClient, DeliveryReportQuery, OrderFilter};
use crate::config::Config;
use crate::domain::catalog::ProductKey;
use crate::domain::content::{Notice, PushAudience, PushNotification};
use crate::domain::order::{Order, OrderStatus, SettlementSummary, StatusFilter};
use crate::domain::settings::FeeChanges;
use crate::error::{AdminError, AdminResult};
use crate::events::{self, OrderFeed};
use crate::export::{self, ExportFormat, DELIVERED_COLUMNS, EARNINGS_COLUMNS, ORDER_COLUMNS, PRODUCT_COLUMNS};
use crate::services::{AssignmentRequest, Directory, DirectoryView, OrderBoard, OrderRow, Paginator};
use crate::validation::{validate_amount, ValidationError};

#[derive(Parser)]
#[command(name = "grokart-admin")]
#[command(about = "Grokart Admin - order operations for the Grokart marketplace", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Order listing, assignment and status workflow
    #[command(subcommand)]
    Orders(OrderCommands),

    /// Product catalog and stock
    #[command(subcommand)]
    Products(ProductCommands),

    /// Delivery partner directory and earnings
    #[command(subcommand)]
    Partners(PartnerCommands),

    /// Shop directory and approval
    #[command(subcommand)]
    Shops(ShopCommands),

    /// Customer directory
    #[command(subcommand)]
    Users(UserCommands),

    /// Push notifications
    #[command(subcommand)]
    Push(PushCommands),

    /// Home screen banners
    #[command(subcommand)]
    Banners(BannerCommands),

    /// The notice strip shown to customers
    #[command(subcommand)]
    Notices(NoticeCommands),

    /// App-wide settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Checkout fee configuration
    #[command(subcommand)]
    Fee(FeeCommands),

    /// Follow new orders live and reprint the board on each one (default)
    Watch {
        /// Status filter for the reprinted board
        #[arg(short, long, default_value = "All")]
        status: String,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// List orders, optionally by status
    List {
        #[arg(short, long, default_value = "All")]
        status: String,
    },

    /// Show one order in detail
    Show {
        #[arg(value_name = "ORDER_ID")]
        order_id: String,
    },

    /// Every order, newest first
    All,

    /// Orders waiting for assignment
    Placed,

    /// Orders matching server-side filters
    Filter(FilterArgs),

    /// Search orders by id, customer or phone
    Search {
        query: String,
    },

    /// Delivered orders with placement and delivery times
    Delivered {
        /// Also write the list as CSV into this directory
        #[arg(long, value_name = "DIR")]
        csv: Option<PathBuf>,
    },

    /// Assign a placed order to a shop and optionally a delivery partner
    Assign {
        #[arg(value_name = "ORDER_ID")]
        order_id: String,
        #[arg(long)]
        shop: String,
        #[arg(long)]
        partner: Option<String>,
    },

    /// Set an order's status
    Status {
        #[arg(value_name = "ORDER_ID")]
        order_id: String,
        /// e.g. "Confirmed", "Out for Delivery"
        status: String,
    },

    /// Mark a delivered order as paid
    Pay {
        #[arg(value_name = "ORDER_ID")]
        order_id: String,
    },

    /// Cancel an order
    Cancel {
        #[arg(value_name = "ORDER_ID")]
        order_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Cancel through the customer endpoint, as the customer would
        #[arg(long)]
        as_customer: bool,
    },

    /// Write the order list as CSV
    ExportCsv {
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Write every field of every order, one column per field
    ExportSheet {
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        /// Write pretty JSON instead of an XLSX workbook
        #[arg(long)]
        json: bool,
    },

    /// Ask the backend to render an export file
    Export {
        /// csv, excel or pdf
        #[arg(short, long, default_value = "csv")]
        format: String,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub payment_status: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub from: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long)]
    pub min_amount: Option<String>,
    #[arg(long)]
    pub max_amount: Option<String>,
}

impl From<FilterArgs> for OrderFilter {
    fn from(args: FilterArgs) -> Self {
        OrderFilter {
            payment_status: args.payment_status,
            status: args.status,
            city: args.city,
            state: args.state,
            start_date: args.from,
            end_date: args.to,
            min_amount: args.min_amount,
            max_amount: args.max_amount,
        }
    }
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List products
    List,
    /// Show one product
    Show {
        #[arg(value_name = "PRODUCT_ID")]
        product_id: String,
    },
    /// Write the product list as CSV
    ExportCsv {
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// List categories and their subcategories
    Categories,
    /// Set one product's stock
    Stock {
        /// Product id or exact name
        product: String,
        stock: i64,
    },
    /// Reset stock on every product
    ResetStock,
    /// Set every product's stock to eight
    StockEight,
    /// Set stock for a whole subcategory
    SubcategoryStock {
        sub_category: String,
        stock: i64,
    },
    /// Mark a whole subcategory out of stock
    ZeroStock {
        sub_category: String,
    },
    /// Change a product's price
    Price {
        product: String,
        price: String,
    },
    /// Change a product's description
    Description {
        product: String,
        description: String,
    },
    /// Replace a product's image
    Image {
        product: String,
        #[arg(value_name = "FILE")]
        image: PathBuf,
    },
    /// Delete a product
    Delete {
        #[arg(value_name = "PRODUCT_ID")]
        product_id: String,
    },
    /// Wishlist requests, newest first
    Wishlist,
}

#[derive(Subcommand)]
pub enum PartnerCommands {
    /// Partners currently available for assignment
    Available,
    /// Every partner
    All,
    /// Search partners by name or phone
    Search { query: String },
    /// Partners awaiting approval
    Registered,
    /// Earnings per partner, twelve to a page
    Earnings {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Today's earnings instead of all-time
        #[arg(long)]
        daily: bool,
        /// Also write the full list as CSV into this directory
        #[arg(long, value_name = "DIR")]
        csv: Option<PathBuf>,
    },
    /// Delivery totals and timings over a date range
    Report {
        /// YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        partner: Option<String>,
    },
    /// Cash collected by each partner today
    Collection,
    /// Completed orders of one partner with settlement totals
    Completed {
        /// Partner id, name or phone
        query: String,
    },
}

#[derive(Subcommand)]
pub enum ShopCommands {
    /// Every shop
    All,
    /// Shops awaiting approval
    Registered,
    /// Search shops
    Search { query: String },
    /// Approve a shop by its registration email
    Approve { email: String },
    /// Completed orders of one shop with settlement totals
    Completed {
        /// Shop id, name or email
        query: String,
    },
    /// One shop's earnings for a day
    Earnings {
        #[arg(value_name = "SHOP_ID")]
        shop_id: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Every customer
    All,
    /// Search customers
    Search { query: String },
    /// Account details of one customer
    Account {
        /// User id, name or email
        query: String,
    },
    /// Orders placed by one customer
    Orders {
        /// User id, name or email
        query: String,
    },
}

#[derive(Subcommand)]
pub enum BannerCommands {
    /// Banners currently shown
    List,
    /// Upload a new banner
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        redirect_url: Option<String>,
        /// Upload without showing it yet
        #[arg(long)]
        inactive: bool,
        #[arg(value_name = "FILE")]
        image: PathBuf,
    },
    /// Show or hide a banner
    Toggle {
        #[arg(value_name = "BANNER_ID")]
        banner_id: String,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Delete a banner
    Delete {
        #[arg(value_name = "BANNER_ID")]
        banner_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Clone)]
pub struct NoticeArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub message: String,
    #[arg(long)]
    pub icon: Option<String>,
    /// CSS colour, e.g. "#fef3c7"
    #[arg(long)]
    pub background: Option<String>,
    #[arg(long)]
    pub text_color: Option<String>,
    /// Store without showing it
    #[arg(long)]
    pub inactive: bool,
}

impl NoticeArgs {
    fn into_notice(self, id: Option<String>) -> Notice {
        let mut notice = Notice::new(self.title, self.message);
        notice.id = id;
        if let Some(icon) = self.icon {
            notice.icon = icon;
        }
        if let Some(background) = self.background {
            notice.background_color = background;
        }
        if let Some(text_color) = self.text_color {
            notice.text_color = text_color;
        }
        notice.is_active = !self.inactive;
        notice
    }
}

#[derive(Subcommand)]
pub enum NoticeCommands {
    /// Show the active notice
    Show,
    /// Publish a new notice
    Add(NoticeArgs),
    /// Replace an existing notice
    Update {
        #[arg(value_name = "NOTICE_ID")]
        notice_id: String,
        #[command(flatten)]
        notice: NoticeArgs,
    },
}

#[derive(Subcommand)]
pub enum PushCommands {
    /// Notify every user
    All {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        image: Option<String>,
    },
    /// Notify selected users
    Users {
        /// Comma separated user ids
        #[arg(long)]
        ids: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        image: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings
    Show,
    /// Turn cash on delivery on or off
    Cod {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(Subcommand)]
pub enum FeeCommands {
    /// Show the fee configuration
    Show,
    /// Change some fee fields and keep the rest
    Set(FeeArgs),
}

#[derive(Args, Clone, Default)]
pub struct FeeArgs {
    #[arg(long)]
    pub delivery_charge: Option<String>,
    #[arg(long)]
    pub handling_fee: Option<String>,
    #[arg(long)]
    pub gst_percentage: Option<String>,
    #[arg(long)]
    pub late_night_fee: Option<String>,
    #[arg(long)]
    pub surge_fee: Option<String>,
    #[arg(long)]
    pub late_night: Option<bool>,
    #[arg(long)]
    pub surge: Option<bool>,
    /// Whether fees apply at all
    #[arg(long)]
    pub active: Option<bool>,
}

impl TryFrom<FeeArgs> for FeeChanges {
    type Error = ValidationError;

    fn try_from(args: FeeArgs) -> Result<Self, Self::Error> {
        let amount = |field: &'static str, raw: Option<String>| {
            raw.map(|raw| validate_amount(field, &raw)).transpose()
        };
        Ok(FeeChanges {
            delivery_charge: amount("delivery_charge", args.delivery_charge)?,
            handling_fee: amount("handling_fee", args.handling_fee)?,
            gst_percentage: amount("gst_percentage", args.gst_percentage)?,
            late_night_fee: amount("late_night_fee", args.late_night_fee)?,
            surge_fee: amount("surge_fee", args.surge_fee)?,
            is_late_night_active: args.late_night,
            is_surge_active: args.surge,
            is_active: args.active,
        })
    }
}

pub async fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Config => handle_config_show(config),
        Commands::Watch { status } => handle_watch(config, &status).await,
        other => {
            let client = AdminClient::from_config(config)?;
            match other {
                Commands::Orders(cmd) => handle_orders(client, config, cmd).await,
                Commands::Products(cmd) => handle_products(&client, cmd).await,
                Commands::Partners(cmd) => handle_partners(&client, cmd).await,
                Commands::Shops(cmd) => handle_shops(&client, cmd).await,
                Commands::Users(cmd) => handle_users(&client, cmd).await,
                Commands::Push(cmd) => handle_push(&client, cmd).await,
                Commands::Banners(cmd) => handle_banners(&client, cmd).await,
                Commands::Notices(cmd) => handle_notices(&client, cmd).await,
                Commands::Settings(cmd) => handle_settings(&client, cmd).await,
                Commands::Fee(cmd) => {
                    let fee = match cmd {
                        FeeCommands::Show => client.fee_config().await?,
                        FeeCommands::Set(args) => {
                            let changes = FeeChanges::try_from(args).map_err(AdminError::from)?;
                            let fee = client.apply_fee_changes(changes).await?;
                            println!("✓ Fee configuration updated");
                            fee
                        }
                    };
                    println!("{}", serde_json::to_string_pretty(&fee)?);
                    Ok(())
                }
                Commands::Config | Commands::Watch { .. } => Ok(()),
            }
        }
    }
}

/// Operator-facing text for a failed command.
pub fn failure_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<AdminError>() {
        Some(e) => e.user_message(&e.to_string()),
        None => error.to_string(),
    }
}

/// Loads one listing through a [`Directory`] and reports an empty result.
async fn load<T, F>(name: &'static str, fetch: F) -> anyhow::Result<Vec<T>>
where
    T: Clone,
    F: Future<Output = AdminResult<Vec<T>>>,
{
    let directory = Directory::new(name);
    directory.refresh(fetch, &CancellationToken::new()).await?;
    if directory.view() == DirectoryView::Empty {
        println!("No {} found.", name);
    }
    Ok(directory.items())
}

fn status_filter(raw: &str) -> StatusFilter {
    raw.parse().unwrap_or_default()
}

fn board(client: AdminClient, config: &Config) -> OrderBoard<AdminClient> {
    OrderBoard::new(Arc::new(client), config.transition_policy)
}

async fn handle_orders(client: AdminClient, config: &Config, cmd: OrderCommands) -> anyhow::Result<()> {
    match cmd {
        OrderCommands::List { status } => {
            let board = board(client, config);
            board.set_filter(status_filter(&status));
            board.refresh().await?;
            print_board(&board.rows());
        }
        OrderCommands::Show { order_id } => {
            let order = client.order_by_id(&order_id).await?;
            print_order(&order);
        }
        OrderCommands::All => print_board(
            &load("orders", client.all_orders())
                .await?
                .iter()
                .map(OrderRow::from_order)
                .collect::<Vec<_>>(),
        ),
        OrderCommands::Placed => print_board(
            &client
                .placed_orders()
                .await?
                .iter()
                .map(OrderRow::from_order)
                .collect::<Vec<_>>(),
        ),
        OrderCommands::Filter(args) => {
            let orders = client.filter_orders(&args.into()).await?;
            print_board(&orders.iter().map(OrderRow::from_order).collect::<Vec<_>>());
        }
        OrderCommands::Search { query } => {
            let orders = client.search_orders(&query).await?;
            print_board(&orders.iter().map(OrderRow::from_order).collect::<Vec<_>>());
        }
        OrderCommands::Delivered { csv } => {
            let rows = client.delivered_orders().await?;
            for row in &rows {
                println!(
                    "{:<26} {:<20} {:<20} {:>10}",
                    export::cell_text(export::lookup(row, "orderId")),
                    export::cell_text(export::lookup(row, "userName")),
                    export::cell_text(export::lookup(row, "deliveryPartner.name")),
                    export::cell_text(export::lookup(row, "totalAmount")),
                );
            }
            if let Some(dir) = csv {
                let text = export::to_csv(&rows, DELIVERED_COLUMNS)?;
                write_file(&dir, "delivered_orders.csv", text.as_bytes()).await?;
            }
        }
        OrderCommands::Assign {
            order_id,
            shop,
            partner,
        } => {
            let board = board(client, config);
            let outcome = board
                .assign(&AssignmentRequest::new(order_id.clone(), shop, partner))
                .await?;
            println!("✓ {} ({})", outcome.summary(), order_id);
        }
        OrderCommands::Status { order_id, status } => {
            let board = board(client, config);
            board.refresh().await?;
            let status = OrderStatus::parse_known(&status).map_err(AdminError::from)?;
            let ack = board.update_status(&order_id, status.clone()).await?;
            println!("✓ {}", ack.message_or(&format!("Order {} set to {}", order_id, status)));
        }
        OrderCommands::Pay { order_id } => {
            let board = board(client, config);
            let ack = board.mark_paid(&order_id).await?;
            println!("✓ {}", ack.message_or("Payment status updated"));
        }
        OrderCommands::Cancel {
            order_id,
            yes,
            as_customer: true,
        } => {
            if yes || prompt_yes(&format!("Cancel order {} as the customer?", order_id)) {
                let ack = client.cancel_order_as_customer(&order_id).await?;
                println!("✓ {}", ack.message_or("Order cancelled successfully"));
            } else {
                println!("Cancellation aborted");
            }
        }
        OrderCommands::Cancel { order_id, yes, .. } => {
            let board = board(client, config);
            let confirm = |id: &str| yes || prompt_yes(&format!("Cancel order {}?", id));
            match board.cancel(&order_id, confirm).await? {
                Some(ack) => println!("✓ {}", ack.message_or("Order cancelled successfully")),
                None => println!("Cancellation aborted"),
            }
        }
        OrderCommands::ExportCsv { out } => {
            let rows = client.all_orders_raw().await?;
            let text = export::to_csv(&rows, ORDER_COLUMNS)?;
            write_file(&out, "orders.csv", text.as_bytes()).await?;
        }
        OrderCommands::ExportSheet { out, json } => {
            let rows = client.all_orders_raw().await?;
            if json {
                write_file(&out, "orders.json", export::json_dump(&rows)?.as_bytes()).await?;
            } else {
                write_file(&out, "orders_sheet.xlsx", &export::sheet_xlsx(&rows, "Orders")?).await?;
            }
        }
        OrderCommands::Export {
            format,
            filter,
            out,
        } => {
            let format: ExportFormat = format.parse()?;
            let bytes = client.export_orders(&filter.into(), format).await?;
            let name = export::export_file_name(format, chrono::Utc::now());
            write_file(&out, &name, &bytes).await?;
        }
    }
    Ok(())
}

async fn handle_products(client: &AdminClient, cmd: ProductCommands) -> anyhow::Result<()> {
    match cmd {
        ProductCommands::List => {
            for p in load("products", client.products()).await? {
                println!(
                    "{:<26} {:<32} {:>8} {:>6} {}",
                    p.id,
                    p.name,
                    p.price.map(|v| format!("₹{}", v)).unwrap_or_default(),
                    p.stock.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                    p.category.unwrap_or_default()
                );
            }
        }
        ProductCommands::Show { product_id } => {
            let p = client.product_by_id(&product_id).await?;
            println!("Product {}", p.id);
            println!("  Name:        {}", p.name);
            println!(
                "  Price:       {}",
                p.price.map(|v| format!("₹{}", v)).unwrap_or_else(|| "-".into())
            );
            println!(
                "  Stock:       {}",
                p.stock.map(|s| s.to_string()).unwrap_or_else(|| "-".into())
            );
            println!("  Category:    {}", p.category.unwrap_or_default());
            println!("  Description: {}", p.description.unwrap_or_default());
        }
        ProductCommands::ExportCsv { out } => {
            let rows = client.admin_products_raw().await?;
            let text = export::to_csv(&rows, PRODUCT_COLUMNS)?;
            write_file(&out, "products.csv", text.as_bytes()).await?;
        }
        ProductCommands::Categories => {
            for category in client.categories().await? {
                println!("{}", category.name);
                for sub in category.sub_categories {
                    println!("  - {}", sub);
                }
            }
        }
        ProductCommands::Stock { product, stock } => {
            let ack = client
                .set_product_stock(&ProductKey::detect(&product), stock)
                .await?;
            println!("✓ {}", ack.message_or("Stock updated"));
        }
        ProductCommands::ResetStock => {
            let ack = client.reset_all_stock().await?;
            println!("✓ {}", ack.message_or("Stock reset for all products"));
        }
        ProductCommands::StockEight => {
            let ack = client.set_stock_to_eight().await?;
            println!("✓ {}", ack.message_or("Stock set to 8 for all products"));
        }
        ProductCommands::SubcategoryStock {
            sub_category,
            stock,
        } => {
            let ack = client.set_subcategory_stock(&sub_category, stock).await?;
            println!("✓ {}", ack.message_or("Subcategory stock updated"));
        }
        ProductCommands::ZeroStock { sub_category } => {
            let ack = client.zero_subcategory_stock(&sub_category).await?;
            println!("✓ {}", ack.message_or("Subcategory marked out of stock"));
        }
        ProductCommands::Price { product, price } => {
            let ack = client
                .update_product_price(&ProductKey::detect(&product), &price)
                .await?;
            println!("✓ {}", ack.message_or("Price updated"));
        }
        ProductCommands::Description {
            product,
            description,
        } => {
            let ack = client
                .update_product_description(&ProductKey::detect(&product), &description)
                .await?;
            println!("✓ {}", ack.message_or("Description updated"));
        }
        ProductCommands::Image { product, image } => {
            let ack = client
                .update_product_image(&ProductKey::detect(&product), &image)
                .await?;
            println!("✓ {}", ack.message_or("Image updated"));
        }
        ProductCommands::Delete { product_id } => {
            let ack = client.delete_product(&product_id).await?;
            println!("✓ {}", ack.message_or("Product deleted"));
        }
        ProductCommands::Wishlist => {
            for entry in client.wishlist().await? {
                println!(
                    "{:<20} {:<14} {:<30} {}",
                    entry.name.unwrap_or_default(),
                    entry.phone.unwrap_or_default(),
                    entry.product_name.unwrap_or_default(),
                    entry
                        .created_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

async fn handle_partners(client: &AdminClient, cmd: PartnerCommands) -> anyhow::Result<()> {
    let partners = match cmd {
        PartnerCommands::Available => load("delivery partners", client.available_partners()).await?,
        PartnerCommands::All => load("delivery partners", client.all_partners()).await?,
        PartnerCommands::Search { query } => {
            load("delivery partners", client.search_partners(&query)).await?
        }
        PartnerCommands::Registered => load("delivery partners", client.registered_partners()).await?,
        PartnerCommands::Earnings { page, daily, csv } => {
            let earnings = if daily {
                client.daily_earnings().await?
            } else {
                client.all_time_earnings().await?
            };
            if let Some(dir) = csv {
                let rows = earnings
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<Vec<_>, _>>()?;
                let text = export::to_csv(&rows, EARNINGS_COLUMNS)?;
                write_file(&dir, "earnings.csv", text.as_bytes()).await?;
            }

            let mut pages = Paginator::new(earnings);
            pages.go_to(page);
            for e in pages.current() {
                println!(
                    "{:<26} {:<24} {:>6} {:>10}",
                    e.partner_id.as_deref().unwrap_or("-"),
                    e.name.as_deref().unwrap_or("-"),
                    e.orders.unwrap_or(0),
                    e.earnings
                        .as_ref()
                        .map(|v| format!("₹{}", v))
                        .unwrap_or_else(|| "₹0".into())
                );
            }
            println!("Page {} of {} ({} partners)", pages.page(), pages.last_page(), pages.total());
            return Ok(());
        }
        PartnerCommands::Report { from, to, partner } => {
            let report = client
                .delivery_report(&DeliveryReportQuery {
                    start_date: from,
                    end_date: to,
                    partner_id: partner,
                })
                .await?;
            println!("Total orders:          {}", report.total_orders);
            println!("Total earnings:        ₹{}", report.total_earnings);
            println!(
                "Average delivery time: {} min",
                report
                    .avg_delivery_time
                    .map(|t| t.with_scale(1).to_string())
                    .unwrap_or_else(|| "-".into())
            );
            for order in report.orders {
                println!(
                    "{:<26} {:<17} {:<17} {:>10}",
                    order.id,
                    order
                        .placed_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                    order
                        .delivered_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                    order
                        .total_amount
                        .map(|v| format!("₹{}", v))
                        .unwrap_or_default()
                );
            }
            return Ok(());
        }
        PartnerCommands::Collection => {
            for dp in load("collections", client.daily_collection()).await? {
                println!(
                    "{:<24} {:<14} {:>12}  {}",
                    dp.name.as_deref().unwrap_or("-"),
                    dp.phone.as_deref().unwrap_or("-"),
                    format!("₹{}", dp.total_amount_collected.with_scale(2)),
                    dp.orders_text()
                );
            }
            return Ok(());
        }
        PartnerCommands::Completed { query } => {
            let orders = load("completed orders", client.completed_by_partner(&query)).await?;
            print_settlement(&orders);
            return Ok(());
        }
    };

    for p in partners {
        println!(
            "{:<26} {:<36} {}",
            p.id,
            p.picker_label(),
            match p.is_available {
                Some(true) => "available",
                Some(false) => "busy",
                None => "",
            }
        );
    }
    Ok(())
}

async fn handle_shops(client: &AdminClient, cmd: ShopCommands) -> anyhow::Result<()> {
    let shops = match cmd {
        ShopCommands::All => load("shops", client.all_shops()).await?,
        ShopCommands::Registered => load("shops", client.registered_shops()).await?,
        ShopCommands::Search { query } => load("shops", client.search_shops(&query)).await?,
        ShopCommands::Approve { email } => {
            let ack = client.approve_shop(&email).await?;
            println!("✓ {}", ack.message_or("Shop approved"));
            return Ok(());
        }
        ShopCommands::Completed { query } => {
            let orders = load("completed orders", client.completed_by_shop(&query)).await?;
            print_settlement(&orders);
            return Ok(());
        }
        ShopCommands::Earnings { shop_id, date } => {
            let earnings = client.shop_daily_earnings(&shop_id, &date).await?;
            if !earnings.success {
                println!(
                    "{}",
                    earnings.message.as_deref().unwrap_or("No earnings data found.")
                );
                return Ok(());
            }
            println!(
                "Shop {} on {}",
                earnings.shop_id.as_deref().unwrap_or(&shop_id),
                earnings.date.as_deref().unwrap_or(&date)
            );
            println!("  Total orders:  {}", earnings.total_orders);
            println!("  Gross amount:  ₹{}", earnings.gross_amount);
            println!("  Commission:    ₹{}", earnings.commission_total);
            println!("  Shop received: ₹{}", earnings.shop_received_total);
            return Ok(());
        }
    };

    for s in shops {
        println!(
            "{:<26} {:<30} {:<28} {}",
            s.id,
            s.name,
            s.email.unwrap_or_default(),
            s.phone.unwrap_or_default()
        );
    }
    Ok(())
}

async fn handle_users(client: &AdminClient, cmd: UserCommands) -> anyhow::Result<()> {
    let users = match cmd {
        UserCommands::All => load("users", client.all_users()).await?,
        UserCommands::Search { query } => load("users", client.search_users(&query)).await?,
        UserCommands::Account { query } => {
            let user = client.account_info(&query).await?;
            println!("User {}", user.id);
            println!("  Name:       {}", user.name.unwrap_or_default());
            println!("  Email:      {}", user.email.unwrap_or_default());
            println!(
                "  Created:    {}",
                user.created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default()
            );
            println!("  Last login: {}", user.last_login.as_deref().unwrap_or("N/A"));
            return Ok(());
        }
        UserCommands::Orders { query } => {
            let orders = load("orders", client.orders_by_user(&query)).await?;
            print_board(&orders.iter().map(OrderRow::from_order).collect::<Vec<_>>());
            return Ok(());
        }
    };
    for u in users {
        println!(
            "{:<26} {:<24} {:<28} {}",
            u.id,
            u.name.unwrap_or_default(),
            u.email.unwrap_or_default(),
            u.phone.unwrap_or_default()
        );
    }
    Ok(())
}

async fn handle_push(client: &AdminClient, cmd: PushCommands) -> anyhow::Result<()> {
    let (audience, title, body, image) = match cmd {
        PushCommands::All { title, body, image } => (PushAudience::All, title, body, image),
        PushCommands::Users {
            ids,
            title,
            body,
            image,
        } => (PushAudience::users_from_csv(&ids), title, body, image),
    };
    let mut notification = PushNotification::new(title, body);
    notification.image = image;

    let summary = client.push(&audience, &notification).await?;
    tracing::info!("Push sent: {}", summary);
    println!("✓ Notification sent");
    Ok(())
}

async fn handle_banners(client: &AdminClient, cmd: BannerCommands) -> anyhow::Result<()> {
    match cmd {
        BannerCommands::List => {
            for b in load("banners", client.active_banners()).await? {
                println!(
                    "{:<26} {:<30} {:<8} {}",
                    b.id,
                    b.title.unwrap_or_default(),
                    if b.is_active { "active" } else { "hidden" },
                    b.redirect_url.unwrap_or_default()
                );
            }
        }
        BannerCommands::Add {
            title,
            redirect_url,
            inactive,
            image,
        } => {
            let ack = client
                .add_banner(&title, redirect_url.as_deref(), !inactive, &image)
                .await?;
            println!("✓ {}", ack.message_or("Banner added"));
        }
        BannerCommands::Toggle { banner_id, active } => {
            let ack = client.set_banner_active(&banner_id, active).await?;
            println!(
                "✓ {}",
                ack.message_or(if active { "Banner shown" } else { "Banner hidden" })
            );
        }
        BannerCommands::Delete { banner_id, yes } => {
            if yes || prompt_yes(&format!("Delete banner {}?", banner_id)) {
                let ack = client.delete_banner(&banner_id).await?;
                println!("✓ {}", ack.message_or("Banner deleted"));
            } else {
                println!("Deletion aborted");
            }
        }
    }
    Ok(())
}

async fn handle_notices(client: &AdminClient, cmd: NoticeCommands) -> anyhow::Result<()> {
    match cmd {
        NoticeCommands::Show => match client.active_notice().await? {
            Some(notice) => {
                println!("{} {}", notice.icon, notice.title);
                println!("  {}", notice.message);
                if let Some(id) = notice.id {
                    println!("  id: {}", id);
                }
            }
            None => println!("No active notice."),
        },
        NoticeCommands::Add(args) => {
            let ack = client.add_notice(&args.into_notice(None)).await?;
            println!("✓ {}", ack.message_or("Notice published"));
        }
        NoticeCommands::Update { notice_id, notice } => {
            let ack = client
                .update_notice(&notice.into_notice(Some(notice_id)))
                .await?;
            println!("✓ {}", ack.message_or("Notice updated"));
        }
    }
    Ok(())
}

async fn handle_settings(client: &AdminClient, cmd: SettingsCommands) -> anyhow::Result<()> {
    let settings = match cmd {
        SettingsCommands::Show => client.settings().await?,
        SettingsCommands::Cod { enabled } => client.set_cod_enabled(enabled).await?,
    };
    println!(
        "Cash on delivery: {}",
        if settings.cod_enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

async fn handle_watch(config: &Config, status: &str) -> anyhow::Result<()> {
    let client = AdminClient::from_config(config)?;
    let board = board(client, config);
    board.set_filter(status_filter(status));

    let shutdown = CancellationToken::new();
    let feed = OrderFeed::new(config.socket_url.clone(), config.cookie.clone(), shutdown.clone());
    let events = feed.subscribe();
    let feed_task = tokio::spawn(feed.run());

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    if let Err(e) = board.refresh().await {
        eprintln!("✗ {}", e.user_message("Failed to load orders"));
    }
    print_board(&board.rows());
    println!("Watching for new orders on {} (Ctrl+C to stop)", config.socket_url);

    events::refresh_on_new_orders(&board, events, shutdown.clone(), |event, result| {
        println!("🆕 {}", event.headline());
        match result {
            Ok(_) => print_board(&board.rows()),
            Err(e) => eprintln!("✗ {}", e.user_message("Failed to load orders")),
        }
    })
    .await;

    shutdown.cancel();
    board.shutdown();
    feed_task.await.context("order feed task panicked")?;
    Ok(())
}

pub fn handle_config_show(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  API URL: {}", config.api_url);
    println!("  Socket URL: {}", config.socket_url);
    println!(
        "  Cookie: {}",
        config.cookie.as_deref().map(mask_secret).unwrap_or_else(|| "(none)".into())
    );
    println!("  Timeout: {}s", config.timeout_secs);
    println!("  Transition policy: {:?}", config.transition_policy);

    println!("✓ Configuration is valid");
    Ok(())
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

fn prompt_yes(question: &str) -> bool {
    print!("{} [y/N] ", question);
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn write_file(dir: &Path, name: &str, contents: &[u8]) -> anyhow::Result<()> {
    let path = export::write_export(dir, name, contents).await?;
    println!("✓ Exported to {}", path.display());
    Ok(())
}

fn print_board(rows: &[OrderRow]) {
    if rows.is_empty() {
        println!("No orders found.");
        return;
    }

    println!(
        "{:<8} {:<18} {:<12} {:>9} {:<20} {:<20} {:<16} {}",
        "ID", "Customer", "Phone", "Total", "Shop", "Partner", "Payment", "Status"
    );
    println!("{}", "-".repeat(120));
    for row in rows {
        println!(
            "{:<8} {:<18} {:<12} {:>9} {:<20} {:<20} {:<16} {}{}",
            row.short_id,
            truncate(&row.customer, 18),
            truncate(&row.phone, 12),
            format!("₹{}", row.costing.final_amount),
            truncate(row.shop.text(), 20),
            truncate(row.partner.text(), 20),
            row.payment,
            row.badge.paint(row.status.label()),
            if row.mark_paid_offered { "  [pay]" } else { "" }
        );
    }
}

fn print_settlement(orders: &[Order]) {
    for order in orders {
        let costing = order.costing();
        println!(
            "{:<26} {:<20} {:>10} {:>10} {:>10}",
            order.id,
            order
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            format!("₹{}", order.total_amount),
            format!("₹{}", costing.commission),
            format!("₹{}", costing.shop_receives)
        );
    }
    let totals = SettlementSummary::over(orders);
    println!("Orders:                {}", totals.orders);
    println!("Gross:                 ₹{}", totals.gross);
    println!("After fixed charges:   ₹{}", totals.net);
    println!("Commission:            ₹{}", totals.commission);
    println!("Shop received:         ₹{}", totals.shop_received);
}

fn print_order(order: &Order) {
    let row = OrderRow::from_order(order);
    println!("Order {}", row.id);
    println!("  Status:   {}", row.badge.paint(row.status.label()));
    println!("  Placed:   {}", row.created);
    println!("  Customer: {} ({})", row.customer, row.phone);
    println!("  Address:  {}", row.address);
    println!("  Shop:     {}", row.shop.text());
    println!("  Partner:  {}", row.partner.text());
    println!("  Payment:  {}", row.payment);
    println!("  Items:");
    for item in &row.items {
        println!("    - {}", item);
    }
    println!("  Subtotal:      ₹{}", row.costing.subtotal);
    println!("  Delivery fee:  ₹{}", row.costing.delivery_fee);
    println!("  Platform fee:  ₹{}", row.costing.platform_fee);
    println!("  Final amount:  ₹{}", row.costing.final_amount);
    println!("  Shop receives: ₹{} (estimate)", row.costing.shop_receives);
    if !order.status_history.is_empty() {
        println!("  History:");
        for change in &order.status_history {
            println!(
                "    {} {}",
                change
                    .timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
                change.status
            );
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
