use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storefront_orders::actors::OrderWriterHandle;
use storefront_orders::config::AppConfig;
use storefront_orders::domain::order::{CartLine, Checkout, Order, OrderStatus};
use storefront_orders::metrics::{self, Metrics, ServerState};
use storefront_orders::notifications::{
    BreakerTransport, MailTransport, NotificationDispatcher, SmtpTransport, SpoolTransport,
};
use storefront_orders::service::OrderService;
use storefront_orders::store::{JsonFileStorage, OrderStore};
use storefront_orders::utils::CircuitBreakerConfig;

#[derive(Parser)]
#[command(name = "storefront_orders", version, about = "Storefront order store and notifications")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every stored order
    List,
    /// Print one order
    Get { id: String },
    /// Place an order from cart lines
    Checkout {
        #[arg(long)]
        email: Option<String>,
        /// Cart line as id:name:price:quantity (repeatable)
        #[arg(long = "item", required = true)]
        items: Vec<CartLine>,
    },
    /// Set the status of an order
    UpdateStatus { id: String, status: OrderStatus },
    /// Run the metrics server until Ctrl-C
    Serve,
    /// Walk a sample order through its whole lifecycle
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront_orders=debug"))
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    // === 1. Metrics ===
    let metrics = Arc::new(Metrics::new()?);

    // === 2. Store + notifications behind the single writer ===
    let orders = build_writer(&config, metrics.clone());

    let result = match cli.command {
        Command::List => list(&orders).await,
        Command::Get { id } => get(&orders, &id).await,
        Command::Checkout { email, items } => checkout(&orders, email, &items).await,
        Command::UpdateStatus { id, status } => update_status(&orders, &id, status).await,
        Command::Serve => serve(&orders, &metrics, config.metrics_port).await,
        Command::Demo => demo(&orders).await,
    };

    orders.shutdown().await;
    result
}

fn build_writer(config: &AppConfig, metrics: Arc<Metrics>) -> OrderWriterHandle {
    let storage = JsonFileStorage::new(&config.data_dir, &config.orders_file);
    let store = OrderStore::new(Arc::new(storage))
        .with_policy(config.transition_policy)
        .with_metrics(metrics.clone());

    let transport = mail_transport(config);
    let dispatcher = NotificationDispatcher::new(transport, &config.mail_from, config.mail_send_timeout);
    let service = OrderService::new(store, dispatcher).with_metrics(metrics);

    OrderWriterHandle::spawn(service)
}

/// Spool directory when set, else the SMTP relay when fully configured.
fn mail_transport(config: &AppConfig) -> Option<Arc<dyn MailTransport>> {
    if let Some(dir) = &config.mail_spool_dir {
        tracing::info!(dir = %dir.display(), "📧 Mail spool transport enabled");
        let spool = BreakerTransport::new(SpoolTransport::new(dir), CircuitBreakerConfig::default());
        return Some(Arc::new(spool) as Arc<dyn MailTransport>);
    }

    let smtp = SmtpTransport::new(&config.smtp);
    if !smtp.is_configured() {
        tracing::info!("No mail transport configured, order notifications are disabled");
        return None;
    }

    tracing::info!(
        host = config.smtp.host.as_deref().unwrap_or_default(),
        port = config.smtp.port,
        implicit_tls = config.smtp.uses_implicit_tls(),
        "📧 SMTP transport enabled"
    );
    Some(Arc::new(BreakerTransport::new(smtp, CircuitBreakerConfig::default())) as Arc<dyn MailTransport>)
}

fn print_order(order: &Order) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(order)?);
    Ok(())
}

async fn list(orders: &OrderWriterHandle) -> anyhow::Result<()> {
    let all = orders.list_all().await?;
    if all.is_empty() {
        println!("No orders");
    }
    for order in &all {
        println!(
            "{}  {:<10} {:>10.2}€  {:>3} item(s)  {}",
            order.id,
            order.status,
            order.total,
            order.item_count(),
            order.date
        );
    }
    Ok(())
}

async fn get(orders: &OrderWriterHandle, id: &str) -> anyhow::Result<()> {
    match orders.get_by_id(id).await? {
        Some(order) => print_order(&order),
        None => anyhow::bail!("Order {} not found", id),
    }
}

async fn checkout(
    orders: &OrderWriterHandle,
    email: Option<String>,
    items: &[CartLine],
) -> anyhow::Result<()> {
    let new_order = Checkout::default().place(items, email)?;
    let order = orders.create(new_order).await?;
    print_order(&order)
}

async fn update_status(
    orders: &OrderWriterHandle,
    id: &str,
    status: OrderStatus,
) -> anyhow::Result<()> {
    match orders.update_status(id, status).await? {
        Some(order) => print_order(&order),
        None => anyhow::bail!("Order {} not found", id),
    }
}

async fn serve(orders: &OrderWriterHandle, metrics: &Metrics, port: u16) -> anyhow::Result<()> {
    orders.ensure_storage().await?;

    let state = ServerState {
        registry: metrics.registry().clone(),
        orders: orders.clone(),
    };

    // actix-web runs on its own system thread
    std::thread::spawn(move || {
        let system = actix_web::rt::System::new();
        if let Err(e) = system.block_on(metrics::start_metrics_server(state, port)) {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    tracing::info!("⏳ Serving until Ctrl-C");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received, shutting down");
    Ok(())
}

async fn demo(orders: &OrderWriterHandle) -> anyhow::Result<()> {
    tracing::info!("🚀 Starting order lifecycle demo");

    let lines = vec![
        CartLine::new("ref-101", "Bluetooth speaker", 39.90, 1),
        CartLine::new("ref-204", "USB-C cable", 9.50, 2),
    ];
    let new_order = Checkout::default().place(&lines, Some("client@example.com".to_string()))?;
    let mut order = orders.create(new_order).await?;
    tracing::info!(order_id = %order.id, total = order.total, "📝 Order placed");

    while let Some(next) = order.status.next() {
        order = match orders.update_status(&order.id, next).await? {
            Some(updated) => updated,
            None => anyhow::bail!("Order {} disappeared from the store", order.id),
        };
        tracing::info!(order_id = %order.id, status = %order.status, "➡️  Status updated");
    }

    print_order(&order)?;
    tracing::info!("🎉 Demo complete!");
    Ok(())
}
