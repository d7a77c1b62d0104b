use crate::commands::{run_import, run_search, ImportArgs, SearchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use property_ledger::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Property Ledger",
    about = "Record property sales and search them with suburb price comparisons",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Load sales from a CSV export into the SQLite store (PROPERTY_STORE=sqlite)
    Import(ImportArgs),
    /// Search the configured store and print one page of results
    Search(SearchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import(args) => run_import(args).await,
        Command::Search(args) => run_search(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_optional() {
        let cli = Cli::try_parse_from(["property-ledger"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn search_flags_parse() {
        let cli = Cli::try_parse_from([
            "property-ledger",
            "search",
            "--suburb",
            "Bondi",
            "--page",
            "2",
            "--limit",
            "10",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Search(args)) => {
                assert_eq!(args.suburb.as_deref(), Some("Bondi"));
                assert_eq!(args.page, Some(2));
                assert_eq!(args.limit, Some(10));
            }
            other => panic!("expected search command, got {other:?}"),
        }
    }

    #[test]
    fn import_requires_csv_path() {
        assert!(Cli::try_parse_from(["property-ledger", "import"]).is_err());
        let cli = Cli::try_parse_from(["property-ledger", "import", "--csv", "sales.csv"])
            .expect("parses");
        assert!(matches!(cli.command, Some(Command::Import(_))));
    }
}
