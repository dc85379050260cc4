use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "linkmate-host")]
#[command(about = "LinkMate native messaging host - receives tab snapshots from the browser")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Keep the newest snapshot per profile in this JSON file
	#[arg(long, env = "LINKMATE_SNAPSHOT_OUT", value_name = "PATH")]
	pub snapshot_out: Option<PathBuf>,

	/// Arguments appended by the browser (caller origin, parent window)
	#[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
	pub launch_args: Vec<String>,
}
