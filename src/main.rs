fn main() {
    use clap::Parser;
    use std::error::Error;
    let args = litscrape::cli::Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if args.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();
    if let Err(e) = litscrape::cli::run(&args) {
        eprintln!("{}", e);
        if args.debug {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
