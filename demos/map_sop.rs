use std::path::PathBuf;

use clap::Parser;

use vfpga::bitstream;
use vfpga::dot::{to_dot, DotConfig};
use vfpga::mapper::MapperConfig;
use vfpga::sop::SopSpec;
use vfpga::synth::Synthesis;

/// Map sum-of-products equations onto LUT4/LUT6 primitives.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Equations such as "X=a*c+b*d" (one per argument).
    #[arg(short, long = "equation")]
    equations: Vec<String>,

    /// File with one equation per line.
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Number of 4-input LUTs.
    #[clap(long, value_name = "INT", default_value_t = 64)]
    lut4: usize,

    /// Number of 6-input LUTs.
    #[clap(long, value_name = "INT", default_value_t = 32)]
    lut6: usize,

    /// Drop absorbed terms before mapping.
    #[arg(long)]
    simplify: bool,

    /// Write the bitstream here.
    #[arg(long)]
    bitstream: Option<PathBuf>,

    /// Write a Graphviz rendering here.
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Skip mapping and print a previously saved bitstream.
    #[arg(long, conflicts_with_all = ["equations", "file"])]
    load: Option<PathBuf>,

    /// Enable debug logging.
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    println!("args = {:?}", cli);

    simplelog::TermLogger::init(
        if cli.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    if let Some(path) = &cli.load {
        let (netlist, graph) = bitstream::load(path)?;
        println!("{}", netlist);
        for (producer, consumer) in graph.edges() {
            println!("#{} -> #{}", producer, consumer);
        }
        return Ok(());
    }

    let mut spec = match &cli.file {
        Some(path) => SopSpec::parse(&std::fs::read_to_string(path)?)?,
        None => SopSpec::new(),
    };
    for equation in cli.equations.iter() {
        spec.parse_equation(equation)?;
    }
    if spec.is_empty() {
        color_eyre::eyre::bail!("no equations given (use --equation or --file)");
    }
    if cli.simplify {
        spec.simplify();
    }
    println!("spec:\n{}", spec);

    let config = MapperConfig::default().with_lut4(cli.lut4).with_lut6(cli.lut6);
    let time_total = std::time::Instant::now();
    let synthesis = Synthesis::run(&spec, &config)?;
    println!("mapped in {:?}", time_total.elapsed());

    println!("netlist:\n{}", synthesis.netlist);
    println!("connections: {}", synthesis.graph.num_edges());
    println!("usage:\n{}", synthesis.usage);

    if let Some(path) = &cli.bitstream {
        synthesis.save(path)?;
        println!("bitstream written to {}", path.display());
    }
    if let Some(path) = &cli.dot {
        let dot = to_dot(
            &synthesis.netlist,
            &synthesis.graph,
            &synthesis.primary_inputs,
            &synthesis.outputs,
            &DotConfig::default(),
        )?;
        std::fs::write(path, dot)?;
        println!("diagram written to {}", path.display());
    }

    Ok(())
}
