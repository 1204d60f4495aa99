use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding one <community>.txt roster per community
    #[arg(default_value = "data")]
    roster_dir: PathBuf,

    /// Also write the derived address -> communities index
    #[arg(long)]
    reverse_index: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    process::load_rosters(args.roster_dir, args.reverse_index).await;
}
