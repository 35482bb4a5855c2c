use clap::ArgMatches;
use podium::commands::command_argument_builder;
use podium::handlers::{
    CollageOptions, Session, handle_collage, handle_query, init_logging, print_error, query_from_args,
    report_format_from_args, source_config_from_args,
};
use podium::menu::Menu;
use podium_core::artifacts::DEFAULT_FLAG_SIZE;
use podium_core::print_banner;
use podium_scanner::HttpSource;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();

    init_logging(chosen_command.get_count("verbose"));

    // Show banner unless --quiet flag is set
    if !chosen_command.get_flag("quiet") {
        print_banner();
    }

    if let Err(e) = run(&chosen_command).await {
        print_error(&e);
        std::process::exit(1);
    }
}

async fn run(chosen_command: &ArgMatches) -> Result<(), String> {
    // Global args are propagated to the subcommand's matches
    let args = chosen_command
        .subcommand()
        .map(|(_, sub)| sub)
        .unwrap_or(chosen_command);

    let config = source_config_from_args(args)?;
    let session = Session::<HttpSource>::http(config, report_format_from_args(args), collage_options(args))?;

    match chosen_command.subcommand() {
        None | Some(("menu", _)) => {
            let stdin = std::io::stdin();
            let mut menu = Menu::new(stdin.lock(), std::io::stdout());
            menu.run(&session).await.map_err(|e| e.to_string())
        }
        Some(("collage", primary_command)) => {
            let year = primary_command
                .get_one::<String>("YEAR")
                .ok_or("Missing <YEAR>")?;
            handle_collage(&session, year).await
        }
        Some((name, primary_command)) => {
            let query = query_from_args(name, primary_command)?;
            let output = primary_command.get_one::<PathBuf>("output");
            handle_query(&session, &query, output.map(PathBuf::as_path)).await
        }
    }
}

fn collage_options(args: &ArgMatches) -> CollageOptions {
    // Only the collage subcommand defines --dir and --size
    match args.try_get_one::<String>("dir") {
        Ok(Some(dir)) => {
            let size = args
                .try_get_one::<u32>("size")
                .ok()
                .flatten()
                .copied()
                .unwrap_or(DEFAULT_FLAG_SIZE);
            CollageOptions::new(dir, size)
        }
        _ => CollageOptions::default(),
    }
}
