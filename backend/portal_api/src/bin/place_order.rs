use anyhow::{anyhow, bail, Result};
use clap::Parser;
use portal_api::{BackendClient, FxPrompt, OrderFlow};
use portal_engine::{OrderRequest, OrderType, SecType, Side};
use rust_decimal::Decimal;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "place_order", about = "Place an order through the dashboard proxy, converting currency first when the gateway asks for it")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    api: String,
    /// Defaults to the dashboard's active account.
    #[arg(long)]
    account: Option<String>,
    #[arg(long)]
    conid: i64,
    #[arg(long, default_value = "BUY")]
    side: Side,
    #[arg(long)]
    quantity: Decimal,
    #[arg(long, default_value = "MKT")]
    order_type: OrderType,
    /// Required for LMT orders.
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long, default_value = "STK")]
    sec_type: SecType,
    /// Defaults to the dashboard's account currency.
    #[arg(long)]
    base_currency: Option<String>,
    /// Convert the suggested amount without asking.
    #[arg(long, default_value_t = false)]
    yes: bool,
    #[arg(long, default_value_t = 5)]
    settle_secs: u64,
}

fn ask(prompt: &FxPrompt) -> Option<Decimal> {
    println!("{}", prompt.rejection);
    println!("You need approx. {} USD. Convert via {}?", prompt.needed.round_dp(2), prompt.pair);
    print!("Amount [{}], or n to cancel: ", prompt.suggested);
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    match line.trim() {
        "" | "y" | "Y" => Some(prompt.suggested),
        "n" | "N" => None,
        other => match other.parse::<Decimal>() {
            Ok(amount) => Some(amount),
            Err(_) => Some(Decimal::ZERO),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let client = BackendClient::new(&args.api)?;

    let dashboard = if args.account.is_none() || args.base_currency.is_none() {
        client.dashboard().await?
    } else {
        Value::Null
    };
    let account = match args.account {
        Some(a) => a,
        None => dashboard.get("accountId").and_then(Value::as_str).map(str::to_string)
            .ok_or_else(|| anyhow!("no active account; pass --account"))?,
    };
    let base_currency = args.base_currency
        .or_else(|| dashboard.get("currency").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "USD".into());

    let mut order = OrderRequest::market(account, args.conid, args.side, args.quantity, args.sec_type);
    order.order_type = args.order_type;
    if args.order_type == OrderType::Lmt {
        order.price = args.price;
    }

    let flow = OrderFlow::new(&client, base_currency).with_settle_delay(Duration::from_secs(args.settle_secs));
    let yes = args.yes;
    let report = flow.run(order, |p| if yes { Some(p.suggested) } else { ask(p) }).await?;
    if let Some(fx) = &report.fx {
        println!("Successfully submitted currency conversion: {}", fx.message);
    }
    println!("{}", report.confirmation.message);
    if !report.confirmation.success {
        bail!("order was not accepted");
    }
    Ok(())
}
