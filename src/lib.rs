pub mod agent;
pub mod coding;
pub mod config;
pub mod engine;
pub mod environment;
pub mod model;
pub mod search;

/// dimensional analysis types
pub type Symbol = bool;
pub type Action = u64;
pub type Percept = u64;
pub type Age = u64;
pub type Reward = f64;
pub type Weight = f64;
pub type Probability = f64;

/// UCB exploration constant for the planner
pub(crate) const UCB_EXPLORATION: f64 = 1.0;

/// tolerated drift of the block log-probability across a save/revert cycle
pub(crate) const REVERT_PRECISION: Weight = 1e-4;

/// beyond this log-domain gap the smaller mixture term is numerically invisible
pub(crate) const LOG_MIX_CUTOFF: Weight = 42.0;

/// initialize logging: info to the terminal, debug to a timestamped file
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
