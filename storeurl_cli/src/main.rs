use clap::Parser as _;

mod cli;
mod logging;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.run().await {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("storeurl error: {err:#}");
            std::process::exit(1);
        }
    }
}
