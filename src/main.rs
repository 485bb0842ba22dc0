use clap::Parser;
use mcaixi::config::Options;
use mcaixi::config::Settings;
use mcaixi::engine::Engine;

fn main() -> anyhow::Result<()> {
    mcaixi::init();
    let settings = Settings::resolve(Options::parse())?;
    log::info!(
        "{:?} with depth {}, horizon {}, {} simulations per decision",
        settings.environment,
        settings.ct_depth,
        settings.agent_horizon,
        settings.mc_simulations,
    );
    Engine::new(&settings).run();
    Ok(())
}
