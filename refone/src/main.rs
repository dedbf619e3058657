use clap::{Parser, Subcommand};
use log::*;
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use refone::{
    app::{self, LiveSession, message::HELP, view},
    config::{APP_NAME, Config, data_dir},
    cue_controller::CueController,
    report, sync_commands,
    workout::LoggedWorkout,
};
use refone_common::{
    config::load_from_file,
    stats::career::{CareerStats, Period, parse_date},
    sync::{Endpoint, HandoffDir, MatchListCache, MatchResult, schedule::Schedule},
};
use std::{
    error::Error,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use time::{Date, OffsetDateTime, UtcOffset};
use tokio::sync::mpsc::unbounded_channel;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long, short)]
    /// Read the config from this file instead of the default location
    config: Option<PathBuf>,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Referee a match on this device
    Run {
        #[clap(long = "match", short)]
        /// Index of the match to referee from the synced list, otherwise an unscheduled match
        /// is played with the configured timings
        match_index: Option<usize>,

        #[clap(long, short)]
        /// Only list the synced matches
        list: bool,

        #[clap(long)]
        /// Write the match's event log to this file once it ends
        save_log: Option<PathBuf>,
    },
    /// Send the unplayed matches of a schedule to the wrist device
    PushSchedule {
        /// The schedule TOML file
        schedule: PathBuf,
    },
    /// Apply the results received from the wrist device to a schedule
    Results {
        /// The schedule TOML file
        schedule: PathBuf,
    },
    /// Career statistics over the finished matches of a schedule
    Stats {
        /// The schedule TOML file
        schedule: PathBuf,

        #[clap(long, conflicts_with_all = ["year", "from", "to"])]
        /// Only matches of the current month
        month: bool,

        #[clap(long, conflicts_with_all = ["from", "to"])]
        /// Only matches of the current year
        year: bool,

        #[clap(long, value_parser = parse_date)]
        /// First day to include, as YYYY-MM-DD
        from: Option<Date>,

        #[clap(long, value_parser = parse_date)]
        /// Last day to include, as YYYY-MM-DD
        to: Option<Date>,
    },
    /// Summarize a workout recording
    Report {
        #[clap(long)]
        /// CSV file with `seconds,bpm` rows
        heart_rate: Option<PathBuf>,

        #[clap(long)]
        /// CSV file with `latitude,longitude` rows
        route: Option<PathBuf>,
    },
}

fn init_logging(args: &Cli) -> Result<(), Box<dyn Error>> {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = args
        .log_location
        .clone()
        .unwrap_or_else(|| data_dir().join("logs"));
    let log_path = log_base_path.join(format!("{APP_NAME}-log.txt"));
    let archived_log_path = log_base_path.join(format!("{APP_NAME}-log-{{}}.txt.gz"));

    // Only log to the console in debug mode
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    // Setup the file log roller
    let roller = FixedWindowRoller::builder().build(
        archived_log_path
            .to_str()
            .ok_or("The log path is not valid UTF-8")?,
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(&log_path, Box::new(file_policy))?;

    // Everything outside this app only logs errors
    let root = Root::builder().appender("file_appender");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)));

    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config
        .logger(Logger::builder().build(APP_NAME, log_level))
        .logger(Logger::builder().build("refone_common", log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    log_panics::init();

    debug!("Logging to {}", log_path.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn Error>> {
    if let Some(path) = path {
        info!("Reading config file from {path:?}");
        let config: Config = load_from_file(path)?;
        config.validate()?;
        return Ok(config);
    }

    info!(
        "Reading config file from {:?}",
        confy::get_configuration_file_path(APP_NAME, None)?
    );

    let config: Config = match confy::load(APP_NAME, None) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = Config::default();
            confy::store(APP_NAME, None, &config)?;
            config
        }
    };

    if let Err(e) = config.validate() {
        warn!("Invalid config file, using the defaults instead. Error: {e}");
        return Ok(Config::default());
    }
    Ok(config)
}

fn run_match(
    config: &Config,
    match_index: Option<usize>,
    list: bool,
    save_log: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let handoff = match HandoffDir::open(config.sync.handoff_dir(), Endpoint::Wrist) {
        Ok(handoff) => Some(handoff),
        Err(e) => {
            warn!("Sync with the phone is unavailable: {e}");
            None
        }
    };
    let cache = MatchListCache::new(config.sync.cache_file());
    let matches = match &handoff {
        Some(handoff) => sync_commands::refresh_match_list(handoff, &cache),
        None => cache.load(),
    };

    if list {
        if matches.is_empty() {
            println!("No matches synced");
        }
        for (i, summary) in matches.iter().enumerate() {
            println!("{i}: {summary}");
        }
        return Ok(());
    }

    let summary = match match_index {
        Some(i) => Some(
            matches
                .get(i)
                .cloned()
                .ok_or_else(|| format!("No match {i}, {} synced", matches.len()))?,
        ),
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let (result, log_json, report) = runtime.block_on(async {
        let cues = CueController::new(config.cues.clone());
        let workout = LoggedWorkout::new();
        let mut session = match summary {
            Some(summary) => {
                info!("Refereeing {summary}");
                LiveSession::for_match(summary, &config.alerts, cues, workout)
            }
            None => {
                info!("Refereeing an unscheduled match");
                LiveSession::ad_hoc(config.match_timing.clone(), &config.alerts, cues, workout)
            }
        };

        let (tx, rx) = unbounded_channel();
        app::spawn_input_reader(tokio::io::stdin(), tx);
        println!("{HELP}");

        let result = app::run_session(&mut session, rx, &config.alerts, |snapshot, summary| {
            print!("\r{:<100}", view::status_line(snapshot, summary));
            let _ = std::io::stdout().flush();
        })
        .await;
        println!();

        let now = tokio::time::Instant::now();
        let report = view::full_time_report(&session.snapshot(now), session.summary());
        info!("Session ended in {}", session.manager().phase());
        (result, session.log().as_json(), report)
    });

    // The stdin reader can't be cancelled, so don't wait for it
    runtime.shutdown_background();

    println!("{report}");

    if let Some(path) = save_log {
        match log_json {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    error!("Failed to save the match log to {path:?}: {e}");
                }
            }
            Err(e) => error!("Failed to encode the match log: {e}"),
        }
    }

    if let Some(result) = result {
        send_result(handoff.as_ref(), result);
    }
    Ok(())
}

fn send_result(handoff: Option<&HandoffDir>, result: MatchResult) {
    match handoff {
        Some(handoff) => {
            if sync_commands::deliver_result(handoff, result) {
                println!("Result queued for the phone");
            }
        }
        None => warn!("No handoff directory, the result for {} is lost", result.match_id),
    }
}

fn stats_period(
    month: bool,
    year: bool,
    from: Option<Date>,
    to: Option<Date>,
    today: Date,
) -> Period {
    if month {
        Period::Month(today)
    } else if year {
        Period::Year(today.year())
    } else if from.is_some() || to.is_some() {
        Period::Range {
            from: from.unwrap_or(Date::MIN),
            to: to.unwrap_or(Date::MAX),
        }
    } else {
        Period::All
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    init_logging(&args)?;

    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Command::Run {
            match_index,
            list,
            save_log,
        } => run_match(&config, *match_index, *list, save_log.as_deref())?,
        Command::PushSchedule { schedule } => {
            let handoff = HandoffDir::open(config.sync.handoff_dir(), Endpoint::Phone)?;
            let pushed = sync_commands::push_schedule(schedule, &handoff, &config.match_timing)?;
            println!("Sent {} matches to the wrist", pushed.len());
            for summary in pushed {
                println!("  {summary}");
            }
        }
        Command::Results { schedule } => {
            let handoff = HandoffDir::open(config.sync.handoff_dir(), Endpoint::Phone)?;
            let results = sync_commands::collect_results(schedule, &handoff)?;
            if results.is_empty() {
                println!("No new results");
            }
            for result in results {
                println!("{}: {}", result.match_id, result.scores);
            }
        }
        Command::Stats {
            schedule,
            month,
            year,
            from,
            to,
        } => {
            let offset = UtcOffset::current_local_offset().unwrap_or_else(|e| {
                warn!("Couldn't find the local time zone, using UTC: {e}");
                UtcOffset::UTC
            });
            let today = OffsetDateTime::now_utc().to_offset(offset).date();
            let period = stats_period(*month, *year, *from, *to, today);
            let schedule = Schedule::load(schedule)?;
            let stats = CareerStats::new(&schedule, period, offset, &config.match_timing);
            print!("{}", report::format_career(&stats, period));
        }
        Command::Report { heart_rate, route } => {
            let report = report::build_report(
                heart_rate.as_deref(),
                route.as_deref(),
                &config.heart_rate,
                &config.heatmap,
            )?;
            print!("{}", report::format_report(&report, &config.heart_rate));
        }
    }

    Ok(())
}
