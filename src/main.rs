#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "replspect", about = "REPL reflection core inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Expr {
		text: String,
		#[arg(long)]
		json: bool,
	},
	Ty {
		text: String,
		#[arg(long)]
		json: bool,
	},
	Basics {
		#[arg(long)]
		json: bool,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> replspect::repl::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Expr { text, json } => cmd::expr::run(&text, json),
		Commands::Ty { text, json } => cmd::ty::run(&text, json),
		Commands::Basics { json } => cmd::basics::run(json),
	}
}
