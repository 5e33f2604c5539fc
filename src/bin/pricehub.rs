use pricehub::config::Config;
use pricehub::fetchers::base::PriceFetcher;
use pricehub::fetchers::coingecko::CoinGeckoFetcher;
use pricehub::fetchers::yahoo::YahooFetcher;
use pricehub::normalize::NormalizeMode;
use pricehub::services::pipeline::PricePipeline;
use pricehub::sinks::base::PriceSink;
use pricehub::sinks::file::FileSink;
use pricehub::sinks::sqlite::SqliteSink;
use pricehub::util;

use anyhow::bail;
use clap::{App, Arg};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger; components emit through the log facade only
    env_logger::init();

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    let matches = App::new("pricehub")
        .version("0.1.0")
        .about("Market data pipeline: fetch, normalize and store historical price series")
        .arg(
            Arg::with_name("provider")
                .help("Data provider")
                .possible_values(["yahoo", "coingecko"])
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("symbol")
                .help("Asset symbol (e.g., AAPL, bitcoin)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("asset-type")
                .long("asset-type")
                .value_name("TYPE")
                .help("Type of asset")
                .possible_values(["equities", "crypto", "fx"])
                .takes_value(true)
                .default_value("equities"),
        )
        .arg(
            Arg::with_name("start")
                .long("start")
                .value_name("DATE")
                .help("Start date (YYYY-MM-DD) for Yahoo Finance")
                .takes_value(true)
                .default_value("2020-01-01"),
        )
        .arg(
            Arg::with_name("end")
                .long("end")
                .value_name("DATE")
                .help("End date (YYYY-MM-DD) for Yahoo Finance")
                .takes_value(true)
                .default_value(&today),
        )
        .arg(
            Arg::with_name("interval")
                .long("interval")
                .value_name("INTERVAL")
                .help("Interval for Yahoo Finance (e.g., 1d, 1h, 5m)")
                .takes_value(true)
                .default_value("1d"),
        )
        .arg(
            Arg::with_name("vs-currency")
                .long("vs-currency")
                .value_name("CURRENCY")
                .help("Quote currency for CoinGecko")
                .takes_value(true)
                .default_value("usd"),
        )
        .arg(
            Arg::with_name("days")
                .long("days")
                .value_name("DAYS")
                .help("Days of data for CoinGecko (e.g., 30, 90, max)")
                .takes_value(true)
                .default_value("30"),
        )
        .arg(
            Arg::with_name("output-dir")
                .long("output-dir")
                .value_name("DIR")
                .help("Directory to save data")
                .takes_value(true)
                .default_value("data"),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output file format")
                .possible_values(["csv", "arrow"])
                .takes_value(true)
                .default_value("csv"),
        )
        .arg(
            Arg::with_name("store")
                .long("store")
                .value_name("STORE")
                .help("Destination kind")
                .possible_values(["file", "sqlite"])
                .takes_value(true)
                .default_value("file"),
        )
        .arg(
            Arg::with_name("db-path")
                .long("db-path")
                .value_name("PATH")
                .help("SQLite database file for the sqlite store")
                .takes_value(true)
                .default_value("data/prices.db"),
        )
        .get_matches();

    let provider = matches.value_of("provider").unwrap();
    let symbol = matches.value_of("symbol").unwrap();

    let config = Config::new()
        .with_output_dir(matches.value_of("output-dir").unwrap())
        .with_asset_type(matches.value_of("asset-type").unwrap().parse()?)
        .with_file_format(matches.value_of("format").unwrap().parse()?)
        .with_db_path(matches.value_of("db-path").unwrap());

    // Create the fetcher for the chosen provider
    let fetcher: Arc<dyn PriceFetcher + Send + Sync> = match provider {
        "yahoo" => {
            let start = util::parse_date(matches.value_of("start").unwrap())?;
            let end = util::parse_date(matches.value_of("end").unwrap())?;
            Arc::new(YahooFetcher::new(
                start,
                end,
                matches.value_of("interval").unwrap(),
            )?)
        }
        "coingecko" => Arc::new(CoinGeckoFetcher::new(
            matches.value_of("vs-currency").unwrap(),
            matches.value_of("days").unwrap(),
        )?),
        _ => bail!("Unknown provider: {}", provider),
    };

    // Create the sink; each destination family has its own normalization
    let (sink, mode): (Arc<dyn PriceSink + Send + Sync>, NormalizeMode) =
        match matches.value_of("store").unwrap() {
            "sqlite" => (
                Arc::new(SqliteSink::new(&config.db_path)),
                NormalizeMode::Database,
            ),
            _ => (
                Arc::new(FileSink::new(
                    &config.output_dir,
                    config.asset_type,
                    config.file_format,
                )),
                NormalizeMode::FlatFile,
            ),
        };

    let pipeline = PricePipeline::new(fetcher, sink, mode);
    pipeline.run(symbol).await?;

    Ok(())
}
