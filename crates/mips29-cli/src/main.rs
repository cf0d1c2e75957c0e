use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mips29::{Config, RegisterPolicy};

#[derive(Parser, Debug)]
#[command(author, version, about = "Assembler/disassembler for the 29-instruction MIPS subset", long_about = None)]
struct Cli {
    /// JSON config file (base_address, width, depth, comment, registers)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Load address of the first instruction (hex or dec)
    #[arg(long, global = true)]
    base: Option<String>,
    /// Memory depth in words
    #[arg(long, global = true)]
    depth: Option<usize>,
    /// Map unknown register names to $zero instead of failing
    #[arg(long, global = true)]
    lenient_registers: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a source file into a memory-initialization file
    Assemble {
        #[arg(value_name = "SOURCE")]
        input: PathBuf,
        #[arg(value_name = "MIF")]
        output: PathBuf,
        /// Print slot, word and source line for every instruction
        #[arg(long)]
        listing: bool,
    },
    /// Disassemble a memory-initialization file
    Disassemble {
        #[arg(value_name = "MIF")]
        input: PathBuf,
        /// Write output to file instead of stdout
        #[arg(value_name = "OUT")]
        output: Option<PathBuf>,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            Config::from_json(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(base) = &cli.base {
        cfg.base_address = parse_u32(base).with_context(|| format!("bad --base {base}"))?;
    }
    if let Some(depth) = cli.depth {
        anyhow::ensure!(depth > 0, "--depth must be positive");
        cfg.depth = depth;
    }
    if cli.lenient_registers {
        cfg.registers = RegisterPolicy::Lenient;
    }
    Ok(cfg)
}

fn write_out(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(p) => std::fs::write(p, text).with_context(|| format!("writing {}", p.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn report_output(path: &Path) {
    let shown = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    println!("Success!");
    println!("Output file:");
    println!("{}", shown.display());
}

fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli)?;
    match cli.cmd {
        Command::Assemble { input, output, listing } => {
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let program = mips29::assemble(&source, &cfg)?;
            let mif = mips29::mif::write(&program.words(), &cfg)?;
            std::fs::write(&output, mif).with_context(|| format!("writing {}", output.display()))?;
            info!(words = program.listing.len(), labels = program.symbols.len(), "assembled");

            if listing {
                let mut labels: Vec<_> = program.symbols.iter().collect();
                labels.sort_by_key(|(_, sym)| sym.slot);
                for (name, sym) in labels {
                    let addr = cfg.base_address.wrapping_add(sym.slot - 1);
                    println!("{addr:#010x} <{name}>");
                }
                for l in &program.listing {
                    let addr = cfg.base_address.wrapping_add(l.slot - 1);
                    println!("{addr:#010x}: {:08X}  {:>4}| {}", l.word, l.line, l.source);
                }
            }
            report_output(&output);
        }
        Command::Disassemble { input, output, format } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let lines = mips29::disassemble_text(&text)?;
            info!(words = lines.len(), "disassembled");

            let buf = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&lines)? + "\n",
                OutputFormat::Text => {
                    let mut buf = String::new();
                    for l in &lines {
                        let _ = writeln!(buf, "{}", l.text);
                    }
                    buf
                }
            };
            write_out(output.as_deref(), &buf)?;
            if let Some(p) = &output {
                report_output(p);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            // Translation errors use status 2, everything else 1.
            if err.downcast_ref::<mips29::Error>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u32_hex_and_dec() {
        assert_eq!(parse_u32("0x00400000").unwrap(), 0x0040_0000);
        assert_eq!(parse_u32("16").unwrap(), 16);
        assert!(parse_u32("zz").is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "mips29",
            "--base",
            "0x1000",
            "--depth",
            "64",
            "--lenient-registers",
            "disassemble",
            "in.mif",
        ]);
        let cfg = load_config(&cli).unwrap();
        assert_eq!(cfg.base_address, 0x1000);
        assert_eq!(cfg.depth, 64);
        assert_eq!(cfg.registers, RegisterPolicy::Lenient);
    }

    #[test]
    fn assemble_then_disassemble_files() {
        let dir = std::env::temp_dir().join(format!("mips29-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let src = dir.join("prog.s");
        let mif = dir.join("prog.mif");
        std::fs::write(&src, "start: add $1, $2, $3\n  j start ; loop\n").unwrap();

        let cli = Cli::parse_from(["mips29", "assemble", src.to_str().unwrap(), mif.to_str().unwrap()]);
        run(cli).unwrap();
        let lines = mips29::disassemble_text(&std::fs::read_to_string(&mif).unwrap()).unwrap();
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["add $1, $2, $3", "j 0x0400000"]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
