use iex_datahub::cache::SummaryCache;
use iex_datahub::config::Config;
use iex_datahub::data_provider::{ClearTarget, EquityStore, COMPANIES_FILE, EQUITIES_FILE, RECOMMENDATIONS_FILE};
use iex_datahub::models::summary::SymbolSummary;
use iex_datahub::scrapers::iex::IexScraper;
use iex_datahub::services::data_service::DataService;
use iex_datahub::util::arrow_utils;

use clap::{App, Arg, ArgMatches, SubCommand};
use log::{info, error};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger, info by default so command output is visible
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = App::new("IEX DataHub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetch IEX equity data, store it and rank buy/sell recommendations")
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the Arrow store")
                .takes_value(true)
                .default_value("data"),
        )
        .arg(
            Arg::with_name("api-url")
                .long("api-url")
                .value_name("URL")
                .help("IEX API base url (overrides IEX_API_BASE_URL)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("top")
                .long("top")
                .value_name("N")
                .help("Number of symbols kept in the recommendation shortlist")
                .takes_value(true)
                .default_value("5"),
        );

    // 在开发模式下添加调试参数
    #[cfg(debug_assertions)]
    let app = app.arg(
        Arg::with_name("debug")
            .long("debug")
            .help("Enable debug mode")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("debug-limit")
            .long("debug-limit")
            .help("Limit the number of symbols to keep in debug mode")
            .takes_value(true)
            .default_value("10"),
    );

    let app = app.subcommand(
        SubCommand::with_name("symbols")
            .about("List the symbols available from IEX")
            .arg(
                Arg::with_name("save")
                    .long("save")
                    .help("Store symbols that are not saved yet")
                    .takes_value(false),
            ),
    ).subcommand(
        SubCommand::with_name("chart")
            .about("Summarize one year of daily data for a symbol")
            .arg(
                Arg::with_name("symbol")
                    .short('s')
                    .long("symbol")
                    .value_name("SYMBOL")
                    .help("Stock symbol")
                    .required(true)
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("save")
                    .long("save")
                    .help("Store daily records that are not saved yet")
                    .takes_value(false),
            )
            .arg(
                Arg::with_name("json")
                    .long("json")
                    .help("Print the summary as JSON")
                    .takes_value(false),
            ),
    ).subcommand(
        SubCommand::with_name("recommend")
            .about("Rank stored companies by average price with a buy/sell signal")
            .arg(
                Arg::with_name("save")
                    .long("save")
                    .help("Replace the saved recommendations with this ranking")
                    .takes_value(false),
            )
            .arg(
                Arg::with_name("json")
                    .long("json")
                    .help("Print the ranking as JSON")
                    .takes_value(false),
            ),
    ).subcommand(
        SubCommand::with_name("refresh")
            .about("Clear stored tables and report row counts")
            .arg(
                Arg::with_name("table")
                    .short('t')
                    .long("table")
                    .value_name("TABLE")
                    .help("Table to clear (all, companies, charts, recommendation)")
                    .required(true)
                    .takes_value(true),
            ),
    ).subcommand(
        SubCommand::with_name("explore")
            .about("Explore stored data")
            .arg(
                Arg::with_name("table")
                    .short('t')
                    .long("table")
                    .value_name("TABLE")
                    .help("Table to show (companies, charts, recommendation)")
                    .takes_value(true)
                    .default_value("charts"),
            )
            .arg(
                Arg::with_name("symbol")
                    .short('s')
                    .long("symbol")
                    .value_name("SYMBOL")
                    .help("Only show this symbol's daily records")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("limit")
                    .short('l')
                    .long("limit")
                    .value_name("LIMIT")
                    .help("Limit the number of records to display")
                    .takes_value(true)
                    .default_value("10"),
            )
            .arg(
                Arg::with_name("json")
                    .long("json")
                    .help("Dump the whole table as JSON lines")
                    .takes_value(false),
            ),
    );

    let matches = app.get_matches();

    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_symbol_limit = matches.value_of("debug-limit")
        .unwrap_or("10")
        .parse::<usize>()
        .unwrap_or(10);
    #[cfg(not(debug_assertions))]
    let debug_symbol_limit = usize::MAX;

    let top_n = matches.value_of("top").unwrap_or("5").parse::<usize>()?;
    let data_dir = matches.value_of("data-dir").unwrap_or("data");

    let mut config = Config::from_env()
        .with_data_dir(data_dir)
        .with_top_n(top_n)
        .with_debug_mode(debug_mode)
        .with_debug_symbol_limit(debug_symbol_limit);
    if let Some(url) = matches.value_of("api-url") {
        config = config.with_api_base_url(url);
    }

    info!("Using data dir {} and API {}", config.data_dir, config.api_base_url);

    let scraper = IexScraper::new(&config.api_base_url, config.request_interval_ms)?;
    let service = DataService::new(config, Arc::new(scraper));
    let mut cache = SummaryCache::new();

    let result = match matches.subcommand() {
        Some(("symbols", sub)) => run_symbols(&service, sub).await,
        Some(("chart", sub)) => run_chart(&service, sub).await,
        Some(("recommend", sub)) => run_recommend(&service, &mut cache, sub).await,
        Some(("refresh", sub)) => run_refresh(&service, &mut cache, sub).await,
        Some(("explore", sub)) => run_explore(service.data_path(), sub),
        _ => {
            info!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

async fn run_symbols(service: &DataService, matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let companies = service.symbols().await?;
    for company in &companies {
        info!("{:<8} {:<6} {}", company.symbol, company.kind, company.name);
    }
    info!("{} symbols", companies.len());

    if matches.is_present("save") {
        let added = service.populate_symbols(companies).await?;
        info!("Saved {} new companies", added);
    }
    Ok(())
}

async fn run_chart(service: &DataService, matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let symbol = matches.value_of("symbol").unwrap_or_default();
    let summary = if matches.is_present("save") {
        service.save_chart(symbol).await?
    } else {
        service.chart(symbol).await?
    };

    if matches.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

async fn run_recommend(
    service: &DataService,
    cache: &mut SummaryCache,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let ranked = service.recommendation(cache).await?;

    if matches.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        info!("{:<8} {:>12} {:>12} {:>12} {:>14} {:<6}",
              "Symbol", "Avg Price", "High", "Low", "Avg Vol (M)", "Signal");
        info!("{:-<70}", "");
        for summary in &ranked {
            info!("{:<8} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:<6}",
                  summary.symbol,
                  summary.average_price,
                  summary.high_price.unwrap_or_default(),
                  summary.low_price.unwrap_or_default(),
                  summary.average_volume_in_millions,
                  summary.recommendation);
        }
    }

    if matches.is_present("save") {
        let saved = service.save_recommendation(cache).await?;
        info!("Saved {} recommendations", saved);
    }
    Ok(())
}

async fn run_refresh(
    service: &DataService,
    cache: &mut SummaryCache,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let target: ClearTarget = matches.value_of("table").unwrap_or("all").parse()?;
    let counts = service.refresh(target, cache).await?;
    info!("{}", counts);
    Ok(())
}

fn run_explore(data_dir: &Path, matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let table = matches.value_of("table").unwrap_or("charts");
    let limit = matches.value_of("limit")
        .unwrap_or("10")
        .parse::<usize>()
        .unwrap_or(10);

    if matches.is_present("json") {
        let file = match table.to_lowercase().as_str() {
            "companies" => COMPANIES_FILE,
            "charts" => EQUITIES_FILE,
            "recommendation" => RECOMMENDATIONS_FILE,
            other => return Err(format!("Unknown table: {}", other).into()),
        };
        let batches = arrow_utils::read_batches(&data_dir.join(file))?;
        arrow_utils::write_json_lines(std::io::stdout().lock(), &batches)?;
        return Ok(());
    }

    let store = EquityStore::load_from_dir(data_dir)?;
    info!("{}", store.table_counts());

    match table.to_lowercase().as_str() {
        "companies" => {
            for company in store.companies().iter().take(limit) {
                info!("{:<8} {:<10} {:<6} {}", company.symbol, company.date, company.kind, company.name);
            }
        }
        "recommendation" => {
            for row in store.recommendations().iter().take(limit) {
                info!("{:<8} {:<10} close {:>10.2} avg {:>10.2} high {:>10.2} low {:>10.2} {}",
                      row.symbol, row.last_date, row.last_close, row.average_price,
                      row.high_price, row.low_price, row.recommendation);
            }
        }
        "charts" => {
            let symbols: Vec<String> = match matches.value_of("symbol") {
                Some(symbol) => vec![symbol.to_string()],
                None => store.companies().iter().map(|c| c.symbol.clone()).collect(),
            };

            for symbol in symbols.iter().take(limit) {
                let records = store.records_for(symbol);
                if records.is_empty() {
                    continue;
                }

                info!("Stock: {}", symbol);
                info!("{:-<60}", "");
                info!("{:<10} {:<10} {:<10} {:<10} {:<10} {:<15}",
                      "Date", "Open", "High", "Low", "Close", "Volume");
                info!("{:-<60}", "");
                for daily in records.iter().rev().take(limit) {
                    info!("{:<10} {:<10.2} {:<10.2} {:<10.2} {:<10.2} {:<15}",
                          daily.date, daily.open, daily.high, daily.low, daily.close, daily.volume);
                }
                if records.len() > limit {
                    info!("... and {} more records", records.len() - limit);
                }
            }
        }
        other => return Err(format!("Unknown table: {}", other).into()),
    }

    if let Some(date) = store.latest_trading_date() {
        info!("Latest trading date: {}", date);
    }
    Ok(())
}

fn print_summary(summary: &SymbolSummary) {
    let Some(current) = &summary.latest_record else {
        info!("No daily data available");
        return;
    };

    info!("Stock: {} ({} trading days)", summary.symbol, summary.date_series.len());
    info!("Latest {}: open {:.2} high {:.2} low {:.2} close {:.2} volume {}",
          current.date, current.open, current.high, current.low, current.close, current.volume);
    info!("Average price: {:.2}", summary.average_price);
    info!("Average volume: {:.2}M", summary.average_volume_in_millions);
    info!("Dates: {}", summary.dates_csv());
    info!("Prices: {}", summary.prices_csv());
    info!("Volumes (M): {}", summary.volumes_csv());
}
