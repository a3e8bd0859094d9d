//! Binary entrypoint for the Banker CLI.
//!
//! Every game command loads the saved game from `data_dir/game`, applies one
//! ledger operation and saves the result. Commands:
//! - `init` - write a starter `config.toml` and create the data directory
//! - `status` / `board` / `ledger` - inspect the current game
//! - `add-player`, `start`, `next-turn`, `reset` - game setup and turns
//! - `transfer`, `pass-go`, `jackpot`, `rent`, `sale-card` - money movements
//! - `buy`, `mortgage`, `unmortgage`, `build`, `bankrupt` - property dealings
//! - `undo` - roll back the last undoable operation
//! - `roster ...` - the persistent roster ledger
//!
//! Players may be named by id or by display name; `bank` and `free-parking`
//! name the two non-player endpoints.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use banker::config::Config;
use banker::logutil::quoted;
use banker::ledger::{
    format_money, format_money_grouped, parse_money, Endpoint, GameLedger, LedgerStore,
    NewRosterPlayer, NewRosterTransaction, PlayerId, PlayerPatch, RosterStore, SystemStamp,
};

#[derive(Parser)]
#[command(name = "banker")]
#[command(about = "Digital banker and ledger for property-trading board games")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file and create the data directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Show players, bank and turn
    Status,
    /// List every property with owner, mortgage and improvements
    Board,
    /// Show the most recent transactions
    Ledger {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Add a player to the game
    AddPlayer {
        name: String,
        #[arg(long, default_value = "#3b82f6")]
        color: String,
    },
    /// Start a new game with the current players
    Start {
        /// Starting cash per player (defaults to the configured value)
        #[arg(long)]
        starting_cash: Option<String>,
        /// Fines paid to free parking build a collectable jackpot
        #[arg(long)]
        jackpot: bool,
        /// Corner and tax squares become purchasable; sale cards are in play
        #[arg(long)]
        buy_everything: bool,
        /// Track the bank's cash as a finite reserve
        #[arg(long)]
        finite_bank: bool,
    },
    /// Pass the turn to the next player
    NextTurn,
    /// Move money between players, the bank and free parking
    Transfer {
        from: String,
        to: String,
        amount: String,
        #[arg(short, long, default_value = "")]
        reason: String,
    },
    /// Pay a player the GO salary
    PassGo { player: String },
    /// Pay a player the whole free parking pot
    Jackpot { player: String },
    /// Charge a player rent for landing on a property
    Rent {
        payer: String,
        property: String,
        /// Dice total, needed for utilities
        #[arg(long)]
        dice: Option<u32>,
    },
    /// Buy a sale card from the bank (buy-everything games only)
    SaleCard { player: String, amount: String },
    /// Buy an unowned property
    Buy {
        player: String,
        property: String,
        /// Price override (0 for a free acquisition)
        #[arg(long)]
        price: Option<String>,
        #[arg(long, default_value = "bank")]
        pay_to: String,
    },
    /// Mortgage an owned property
    Mortgage { property: String },
    /// Lift a mortgage (mortgage value plus 10%)
    Unmortgage { property: String },
    /// Add a house, or a hotel on top of four houses
    Build {
        property: String,
        #[arg(long, default_value = "bank")]
        pay_to: String,
        /// Build without charging the owner
        #[arg(long)]
        free: bool,
    },
    /// Declare a player bankrupt, handing their assets to a creditor
    Bankrupt {
        player: String,
        #[arg(long, default_value = "bank")]
        creditor: String,
    },
    /// Undo the last money or property operation
    Undo,
    /// Clear players, properties and the ledger
    Reset {
        /// Also delete the saved game from disk
        #[arg(long)]
        forget: bool,
    },
    /// Persistent roster ledger
    Roster {
        #[command(subcommand)]
        command: RosterCommands,
    },
}

#[derive(Subcommand)]
enum RosterCommands {
    /// List roster players (seeds four defaults into an empty roster)
    List,
    /// Add a roster player
    Add {
        name: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        balance: Option<String>,
    },
    /// Update a roster player
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        balance: Option<String>,
        #[arg(long)]
        bankrupt: Option<bool>,
    },
    /// Remove a roster player
    Remove { id: u64 },
    /// Record a payment; omit --from or --to for the bank
    Pay {
        #[arg(long)]
        from: Option<u64>,
        #[arg(long)]
        to: Option<u64>,
        amount: String,
        description: String,
    },
    /// Show the 50 most recent roster transactions
    History,
    /// Reset every balance and clear the roster transactions
    Reset {
        #[arg(long, default_value = "1500")]
        balance: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        init_logging(&None, cli.verbose);
        return init_config(&cli.config, force).await;
    }

    let config = Config::load_or_default(&cli.config).await?;
    init_logging(&Some(config.clone()), cli.verbose);
    debug!("Banker v{} using {}", env!("CARGO_PKG_VERSION"), quoted(&cli.config));

    match cli.command {
        Commands::Roster { command } => {
            let roster = RosterStore::open(config.storage.roster_path())?;
            run_roster(&roster, command)
        }
        command => {
            let store = LedgerStore::open(config.storage.game_path())?;
            let mut ledger = open_game(&config, &store)?;
            ledger.subscribe(Box::new(store.clone()));
            let forget = matches!(command, Commands::Reset { forget: true });
            run_game(&mut ledger, &config, command)?;
            if forget {
                store.clear()?;
                info!("saved game deleted");
            }
            Ok(())
        }
    }
}

async fn init_config(path: &str, force: bool) -> Result<()> {
    if !force && tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            path
        ));
    }
    Config::create_default(path).await?;
    let config = Config::default();
    tokio::fs::create_dir_all(&config.storage.data_dir).await?;
    info!("Configuration file created at {}", path);
    println!("Wrote {} (data in {})", path, config.storage.data_dir);
    Ok(())
}

fn open_game(config: &Config, store: &LedgerStore) -> Result<GameLedger> {
    let catalog = config.game.catalog()?;
    Ok(match store.load()? {
        Some(saved) => {
            debug!("resuming game saved at {}", saved.saved_at);
            GameLedger::from_state(catalog, saved.state, Box::new(SystemStamp))
        }
        None => GameLedger::new(catalog),
    })
}

fn player_arg(ledger: &GameLedger, input: &str) -> Result<PlayerId> {
    match ledger.resolve_endpoint(input) {
        Some(Endpoint::Player(id)) => Ok(id),
        _ => Err(anyhow!("Unknown player '{}'", input)),
    }
}

fn endpoint_arg(ledger: &GameLedger, input: &str) -> Result<Endpoint> {
    ledger
        .resolve_endpoint(input)
        .ok_or_else(|| anyhow!("Unknown player '{}'", input))
}

fn money_arg(input: &str) -> Result<i64> {
    parse_money(input).map_err(|e| anyhow!(e))
}

fn run_game(ledger: &mut GameLedger, config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Status => print_status(ledger),
        Commands::Board => print_board(ledger),
        Commands::Ledger { limit } => print_ledger(ledger, limit),
        Commands::AddPlayer { name, color } => {
            let id = ledger.add_player(&name, &color)?;
            println!("Added {} ({})", name.trim(), id);
        }
        Commands::Start {
            starting_cash,
            jackpot,
            buy_everything,
            finite_bank,
        } => {
            let mut settings = config.game.settings();
            if let Some(cash) = starting_cash {
                settings.starting_cash = money_arg(&cash)?;
            }
            settings.free_parking_jackpot |= jackpot;
            settings.buy_everything |= buy_everything;
            settings.bank_cash_mode |= finite_bank;
            ledger.start_game(settings)?;
            print_status(ledger);
        }
        Commands::NextTurn => {
            let id = ledger.next_turn()?;
            let name = ledger.player(&id).map(|p| p.name.as_str()).unwrap_or("?");
            println!("Turn {}: {}", ledger.turn_count(), name);
        }
        Commands::Transfer {
            from,
            to,
            amount,
            reason,
        } => {
            let from = endpoint_arg(ledger, &from)?;
            let to = endpoint_arg(ledger, &to)?;
            ledger.transfer_money(from, to, money_arg(&amount)?, &reason)?;
            print_latest(ledger);
        }
        Commands::PassGo { player } => {
            let id = player_arg(ledger, &player)?;
            ledger.pass_go(&id)?;
            print_latest(ledger);
        }
        Commands::Jackpot { player } => {
            let id = player_arg(ledger, &player)?;
            let collected = ledger.collect_jackpot(&id)?;
            println!("Collected {}", format_money(collected));
        }
        Commands::Rent {
            payer,
            property,
            dice,
        } => {
            let id = player_arg(ledger, &payer)?;
            ledger.pay_rent(&id, &property, dice)?;
            print_latest(ledger);
        }
        Commands::SaleCard { player, amount } => {
            let id = player_arg(ledger, &player)?;
            ledger.buy_sale_card(&id, money_arg(&amount)?)?;
            print_latest(ledger);
        }
        Commands::Buy {
            player,
            property,
            price,
            pay_to,
        } => {
            let id = player_arg(ledger, &player)?;
            let pay_to = endpoint_arg(ledger, &pay_to)?;
            let price = price.as_deref().map(money_arg).transpose()?;
            ledger.buy_property(&id, &property, price, pay_to)?;
            print_latest(ledger);
        }
        Commands::Mortgage { property } => {
            ledger.mortgage_property(&property)?;
            print_latest(ledger);
        }
        Commands::Unmortgage { property } => {
            ledger.unmortgage_property(&property)?;
            print_latest(ledger);
        }
        Commands::Build {
            property,
            pay_to,
            free,
        } => {
            if free {
                ledger.build_house_free(&property)?;
            } else {
                let pay_to = endpoint_arg(ledger, &pay_to)?;
                ledger.build_house(&property, pay_to)?;
            }
            print_latest(ledger);
        }
        Commands::Bankrupt { player, creditor } => {
            let id = player_arg(ledger, &player)?;
            let creditor = endpoint_arg(ledger, &creditor)?;
            ledger.declare_bankruptcy(&id, creditor)?;
            print_latest(ledger);
        }
        Commands::Undo => {
            ledger.undo()?;
            println!("Undone ({} more steps available)", ledger.history_depth());
        }
        Commands::Reset { .. } => {
            ledger.reset_game();
            println!("Game reset");
        }
        Commands::Init { .. } | Commands::Roster { .. } => {}
    }
    Ok(())
}

fn print_latest(ledger: &GameLedger) {
    if let Some(tx) = ledger.transactions().first() {
        println!("{}", tx.description);
    }
}

fn print_status(ledger: &GameLedger) {
    let active = ledger.active_player().map(|p| p.id.clone());
    println!("Turn {}", ledger.turn_count());
    for player in ledger.players() {
        let marker = if Some(&player.id) == active.as_ref() { ">" } else { " " };
        let flag = if player.is_bankrupt { " (bankrupt)" } else { "" };
        println!(
            "{} {:<24} {:>10}  {} properties{}",
            marker,
            player.name,
            format_money_grouped(player.cash),
            ledger.state().owned_by(&player.id).len(),
            flag
        );
    }
    let bank = ledger.bank();
    let cash = if ledger.settings().bank_cash_mode {
        format_money_grouped(bank.cash)
    } else {
        "unlimited".to_string()
    };
    println!(
        "Bank: {}  houses {}  hotels {}  free parking {}",
        cash,
        bank.houses,
        bank.hotels,
        format_money_grouped(bank.free_parking_pot)
    );
}

fn print_board(ledger: &GameLedger) {
    for prop in ledger.catalog().purchasable(ledger.settings().buy_everything) {
        let Some(ps) = ledger.property_state(&prop.id) else {
            continue;
        };
        let owner = ps
            .owner
            .as_ref()
            .and_then(|id| ledger.player(id))
            .map(|p| p.name.as_str())
            .unwrap_or("-");
        let improvements = if ps.has_hotel() {
            "hotel".to_string()
        } else if ps.level > 0 {
            format!("{} houses", ps.level)
        } else {
            String::new()
        };
        println!(
            "{:<22} {:<16} {:>6}  {:<16}{}{}",
            prop.id,
            prop.name,
            format_money(prop.price),
            owner,
            if ps.mortgaged { " mortgaged " } else { " " },
            improvements
        );
    }
}

fn print_ledger(ledger: &GameLedger, limit: usize) {
    for tx in ledger.transactions().iter().take(limit) {
        println!(
            "{}  {}",
            tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
            tx.description
        );
    }
}

fn run_roster(roster: &RosterStore, command: RosterCommands) -> Result<()> {
    match command {
        RosterCommands::List => {
            roster.seed_defaults()?;
            for player in roster.list_players()? {
                println!(
                    "{:>4}  {:<24} {:>10}  {}{}",
                    player.id,
                    player.name,
                    format_money_grouped(player.balance),
                    player.color,
                    if player.is_bankrupt { " (bankrupt)" } else { "" }
                );
            }
        }
        RosterCommands::Add {
            name,
            color,
            balance,
        } => {
            let balance = balance.as_deref().map(money_arg).transpose()?;
            let player = roster.create_player(NewRosterPlayer {
                name,
                color,
                balance,
            })?;
            println!("Added {} as #{}", player.name, player.id);
        }
        RosterCommands::Update {
            id,
            name,
            color,
            balance,
            bankrupt,
        } => {
            let balance = balance.as_deref().map(money_arg).transpose()?;
            let player = roster.update_player(
                id,
                PlayerPatch {
                    name,
                    color,
                    balance,
                    is_bankrupt: bankrupt,
                },
            )?;
            println!("{}: {}", player.name, format_money(player.balance));
        }
        RosterCommands::Remove { id } => {
            roster.delete_player(id)?;
            println!("Removed #{}", id);
        }
        RosterCommands::Pay {
            from,
            to,
            amount,
            description,
        } => {
            let tx = roster.create_transaction(NewRosterTransaction {
                from_player_id: from,
                to_player_id: to,
                amount: money_arg(&amount)?,
                description,
            })?;
            println!("#{} {} {}", tx.id, format_money(tx.amount), tx.description);
        }
        RosterCommands::History => {
            for tx in roster.list_transactions()? {
                let side = |id: Option<u64>| id.map_or_else(|| "bank".to_string(), |i| format!("#{}", i));
                println!(
                    "{}  {} -> {}  {}  {}",
                    tx.created_at.format("%Y-%m-%d %H:%M:%S"),
                    side(tx.from_player_id),
                    side(tx.to_player_id),
                    format_money(tx.amount),
                    tx.description
                );
            }
        }
        RosterCommands::Reset { balance } => {
            let players = roster.reset_game(money_arg(&balance)?)?;
            println!("Reset {} players", players.len());
        }
    }
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|cfg| cfg.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let log_file = config.as_ref().and_then(|cfg| cfg.logging.file.clone());
    if let Some(file) = log_file {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Interactive sessions also echo log lines to the console
            let is_tty = atty::is(atty::Stream::Stderr);

            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());

                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }

                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
            let _ = builder.try_init();
            return;
        }
    }
    builder.format(|fmt, record| {
        writeln!(
            fmt,
            "{} [{}] {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            record.level(),
            record.args()
        )
    });
    let _ = builder.try_init();
}
