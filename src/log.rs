use crate::config::LogConf;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;

pub fn setup(conf: &LogConf, environment: &str) {
    let level = if environment == "production" {
        LevelFilter::Info
    } else {
        LevelFilter::Debug
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    // A log file that cannot be opened must not stop the server.
    match File::create(&conf.file) {
        Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
        Err(err) => eprintln!("Could not open log file {}: {}", conf.file, err),
    }

    CombinedLogger::init(loggers).unwrap();
}
