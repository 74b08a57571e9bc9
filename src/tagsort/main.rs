use clap::Parser;
use colored::*;
use tagsort::api::{CmdMessage, MessageLevel, TagsortApi};
use tagsort::config::load_config;
use tagsort::error::Result;
use tagsort::logging::init_logging;
use tagsort::settings::{resolve_logging, Settings};

mod args;
use args::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cli_config = cli.to_config();
    let file_config = load_config(cli.config.as_deref(), &cli.config_search_folders())?;

    init_logging(&resolve_logging(&cli_config, &file_config))?;
    let settings = Settings::resolve(&cli_config, &file_config)?;
    tracing::debug!("Settings: {:?}", settings);

    let mut api = TagsortApi::from_files(&settings.group_files, &settings.schema_files)?;
    let result = api.organize(&settings)?;

    let placed = result.files.iter().filter(|f| !f.move_failed).count();
    let named = result.files.iter().filter(|f| !f.rename_failed).count();
    println!(
        "{} tagged file(s): {} placed, {} named",
        result.files.len(),
        placed,
        named
    );
    print_messages(&result.messages);
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}
