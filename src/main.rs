use glowlink_payments::app;
use glowlink_payments::config::Config;

fn main() {
    let conf = Config::from_any();

    // Setup simplelog
    glowlink_payments::log::setup(&conf.log, &conf.app.environment);

    app::launch(&conf);
}
