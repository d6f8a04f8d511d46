fn main() {
    env_logger::init();
    log::info!("warpkit demo starting up");

    if let Err(e) = warpkit::app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
