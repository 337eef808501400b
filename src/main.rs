fn main() {
    #[cfg(feature = "cli")]
    oxildm::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxildm: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
