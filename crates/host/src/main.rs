use clap::Parser;
use linkmate_host::{cli::Cli, host::Host, logging};
use tracing::{error, info};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	info!(target = "linkmate", launch_args = ?cli.launch_args, "native host started");

	let mut host = Host::new(cli.snapshot_out);
	if let Err(err) = host.serve(tokio::io::stdin(), tokio::io::stdout()).await {
		error!(target = "linkmate", error = %format!("{err:#}"), "native host stopped");
		std::process::exit(1);
	}
}
