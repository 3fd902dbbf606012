use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "driftway")]
#[command(about = "Rendezvous relay for negotiating peer-to-peer media connections")]
pub struct Cli {
    /// Listening port; overrides the PORT environment variable
    #[arg(long)]
    pub port: Option<u16>,
}
