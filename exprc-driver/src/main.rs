//! Expr Compiler Driver
//!
//! Command-line entry point. Programs arrive as decorated-AST JSON produced
//! by the external parser and type checker; `build` lowers and links them,
//! `run` also interprets them and `exec` interprets an already linked
//! instruction file.

use clap::{Args, Parser, Subcommand};
use exprc_common::CompilerError;
use exprc_frontend::Frontend;
use exprc_ir::{Linker, Program};
use exprc_vm::{Interpreter, UnknownOpcodePolicy, VmConfig};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "exprc")]
#[command(about = "Expr three-address compiler and interpreter")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower and link a decorated AST into a linear instruction file
    Build {
        /// Input decorated AST (JSON)
        input: PathBuf,

        /// Output file for the linked instructions (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the block graph before linking
        #[arg(long)]
        show_blocks: bool,

        /// Print the linearized instructions
        #[arg(short = 'c', long)]
        show_instructions: bool,
    },

    /// Compile a decorated AST and interpret it
    Run {
        /// Input decorated AST (JSON)
        input: PathBuf,

        /// Print the linearized instructions before running
        #[arg(short = 'c', long)]
        show_instructions: bool,

        #[command(flatten)]
        vm: VmArgs,
    },

    /// Interpret a linked instruction file
    Exec {
        /// Linked instructions (JSON array of tuples)
        input: PathBuf,

        #[command(flatten)]
        vm: VmArgs,
    },
}

#[derive(Args)]
struct VmArgs {
    /// Interpreter settings file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Warn about unknown opcodes instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Abort after this many executed instructions
    #[arg(long)]
    step_limit: Option<u64>,
}

impl VmArgs {
    /// Settings file first, then command-line overrides
    fn to_config(&self) -> Result<VmConfig, CompilerError> {
        let mut config = match &self.config {
            Some(path) => VmConfig::load(path)?,
            None => VmConfig::default(),
        };
        if self.lenient {
            config.unknown_opcode = UnknownOpcodePolicy::Warn;
        }
        if self.step_limit.is_some() {
            config.step_limit = self.step_limit;
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let result = match cli.command {
        Commands::Build { input, output, show_blocks, show_instructions } => {
            build_command(&input, output.as_deref(), show_blocks, show_instructions)
        }
        Commands::Run { input, show_instructions, vm } => run_command(&input, show_instructions, &vm),
        Commands::Exec { input, vm } => exec_command(&input, &vm),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn compile_file(path: &Path, show_blocks: bool) -> Result<Program, CompilerError> {
    let ast = Frontend::load_file(path)?;
    debug!("loaded {} statements from {}", ast.statements.len(), path.display());

    let graph = Frontend::generate(&ast)?;
    if show_blocks {
        print!("{}", graph.display());
    }
    Ok(Linker::new().link(&graph)?)
}

fn build_command(
    input: &Path,
    output: Option<&Path>,
    show_blocks: bool,
    show_instructions: bool,
) -> Result<(), CompilerError> {
    let program = compile_file(input, show_blocks)?;
    if show_instructions {
        print!("{}", program.listing());
    }

    let json = serde_json::to_string_pretty(&program)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("Instructions written to: {}", path.display());
        }
        None if !show_blocks && !show_instructions => println!("{json}"),
        None => {}
    }
    Ok(())
}

fn run_command(input: &Path, show_instructions: bool, vm: &VmArgs) -> Result<(), CompilerError> {
    let program = compile_file(input, false)?;
    if show_instructions {
        print!("{}", program.listing());
    }
    execute(&program, vm)
}

fn exec_command(input: &Path, vm: &VmArgs) -> Result<(), CompilerError> {
    let source = fs::read_to_string(input)?;
    let program: Program = serde_json::from_str(&source)?;
    execute(&program, vm)
}

fn execute(program: &Program, vm: &VmArgs) -> Result<(), CompilerError> {
    let config = vm.to_config()?;
    let capabilities = config.build_capabilities()?;
    let mut interpreter = Interpreter::new(program, capabilities).with_config(config);
    interpreter.run()?;
    debug!("executed {} instructions", interpreter.steps());
    Ok(())
}
