use clap::Parser;

mod demo;

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match demo::run(demo::Args::parse()) {
        Ok(()) => log::info!("Exiting"),
        Err(err) => {
            log::error!("Error: {err}");
            for cause in err.chain().skip(1) {
                log::error!("\t{cause}");
            }
            std::process::exit(1);
        }
    }
}
