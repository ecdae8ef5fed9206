use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};

use dexpatch_ir::{CodeItem, Listing, disassemble};
use dexpatch_patches::{PatchOptions, PatchRegistry};
use log::debug;
use memmap2::Mmap;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "dexpatch", about = "Dalvik bytecode patcher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in patches
    List,
    /// Assemble a YAML listing and print it back with resolved references
    Disasm {
        /// Path to the listing
        input: PathBuf,
    },
    /// Decode a raw code_item and print its instructions
    Decode {
        /// Path to a file holding the code_item
        input: PathBuf,
        /// Byte offset of the code_item in the file
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Run the enabled patches over a YAML listing
    Patch {
        /// Path to the listing
        input: PathBuf,
        /// Output listing (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Patch options file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Enable a patch by name; may be repeated
        #[arg(long = "enable", value_name = "NAME")]
        enable: Vec<String>,
        /// Instructions scanned after a call site for its result capture
        #[arg(long)]
        lookahead: Option<usize>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List => cmd_list(),
        Commands::Disasm { input } => cmd_disasm(&input),
        Commands::Decode { input, offset } => cmd_decode(&input, offset),
        Commands::Patch {
            input,
            output,
            config,
            enable,
            lookahead,
        } => cmd_patch(&input, output.as_deref(), config.as_deref(), enable, lookahead),
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(1);
}

fn cmd_list() {
    let registry = PatchRegistry::default();
    for patch in registry.patches() {
        let info = patch.info();
        let state = if info.use_by_default { "enabled" } else { "disabled" };
        println!("{} {} ({state})", info.name, info.version);
        println!("    {}", info.description);
    }
}

fn cmd_disasm(path: &Path) {
    let listing = Listing::read(path).unwrap_or_else(|e| fail(e));
    let image = listing.to_image().unwrap_or_else(|e| fail(e));

    for class in image.classes() {
        println!("# Class: {}", class.type_name);
        println!();
        for method in class.methods() {
            let flags = method.access_flags.names().join(" ");
            println!(".method {flags} {}", method.reference());
            match method.implementation() {
                Some(body) => {
                    println!("    .registers {}", body.registers_count());
                    for line in disassemble(body.instructions(), &image.pool) {
                        println!("    {line}");
                    }
                }
                None => println!("    # (no code - native or abstract)"),
            }
            println!(".end method");
            println!();
        }
    }
}

fn cmd_decode(path: &Path, offset: usize) {
    let file = File::open(path).unwrap_or_else(|e| fail(e));
    // SAFETY: the input is not modified while mapped.
    let data = unsafe { Mmap::map(&file) }.unwrap_or_else(|e| fail(e));
    debug!("mapped {} bytes from {}", data.len(), path.display());

    let code = CodeItem::parse(&data, offset).unwrap_or_else(|e| fail(e));
    println!(
        "# registers: {}, ins: {}, outs: {}, code units: {}",
        code.registers_size,
        code.ins_size,
        code.outs_size,
        code.insns.len()
    );

    let instructions = code.decode_instructions().unwrap_or_else(|e| fail(e));
    for (insn, offset) in &instructions {
        println!("    {offset:#06x}  {insn}");
    }

    for try_item in &code.tries {
        println!(
            "    # try [{:#x}..{:#x}]",
            try_item.start_addr,
            try_item.start_addr + try_item.insn_count as u32
        );
        for catch in &try_item.handler.catches {
            println!("    #   catch type@{} -> {:#x}", catch.type_idx, catch.addr);
        }
        if let Some(addr) = try_item.handler.catch_all_addr {
            println!("    #   catch_all -> {addr:#x}");
        }
    }
}

fn cmd_patch(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    enable: Vec<String>,
    lookahead: Option<usize>,
) {
    let mut options = match config {
        Some(path) => PatchOptions::load(path).unwrap_or_else(|e| fail(e)),
        None => PatchOptions::default(),
    };
    for name in enable {
        if !options.enabled.contains(&name) {
            options.enabled.push(name);
        }
    }
    if let Some(lookahead) = lookahead {
        options.lookahead = lookahead;
    }

    let listing = Listing::read(input).unwrap_or_else(|e| fail(e));
    let mut image = listing.to_image().unwrap_or_else(|e| fail(e));

    let registry = PatchRegistry::default();
    let reports = registry.run(&mut image, &options).unwrap_or_else(|e| fail(e));
    if reports.is_empty() {
        eprintln!("No patches enabled");
    }
    for (name, report) in &reports {
        eprintln!("{name}: {report}");
    }

    let patched = Listing::from_image(&image);
    match output {
        Some(path) => patched.write(path).unwrap_or_else(|e| fail(e)),
        None => print!("{}", patched.to_yaml().unwrap_or_else(|e| fail(e))),
    }
}
