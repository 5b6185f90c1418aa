use diskgen_core::DiskConfig;

fn main() {
    env_logger::init();

    // Optional JSON configuration file; defaults only when none is given
    let result = DiskConfig::load(std::env::args().nth(1))
        .and_then(|config| diskgen_sim::run(&config));

    match result {
        Ok(path) => log::info!("Initial conditions ready: {}", path.display()),
        Err(e) => {
            log::error!("Failed to generate disk initial conditions: {e}");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
