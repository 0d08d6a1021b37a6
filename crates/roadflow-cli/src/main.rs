mod config;
mod external;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use roadflow_lp::{LpModel, mps};
use roadflow_net::{
    AbbreviationRegistry, Compiler, DecodedFlows, Decoder, EdgeCapacity, FormulationKind, Graph,
    Terminals, load_graph, load_registry, render, resolve_endpoints,
};
use tracing::{Level, info, warn};

use config::{DEFAULT_MODEL_DIR, Layout};

#[derive(Parser)]
#[command(name = "roadflow", version)]
#[command(about = "Compile road network flow problems to MPS and decode solver reports", long_about = None)]
struct Cli {
    /// Directory holding the population, edge, abbreviation and endpoint files
    #[arg(long, global = true, default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,

    /// Directory the statement, report and flow files are written to
    #[arg(long, global = true, default_value = ".")]
    out_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormulationArg {
    /// Maximum flow from source to destination
    MaxFlow,
    /// Total flow over all roads with population-capped junctions
    Junction,
    /// Source to destination flow over road class capacities
    MinCost,
}

impl From<FormulationArg> for FormulationKind {
    fn from(arg: FormulationArg) -> Self {
        match arg {
            FormulationArg::MaxFlow => FormulationKind::MaxFlow,
            FormulationArg::Junction => FormulationKind::Junction,
            FormulationArg::MinCost => FormulationKind::MinCost,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CapacityArg {
    /// floor(2 * 20 * 70 * distance / 60)
    Throughput,
    /// The distance itself
    Distance,
}

impl From<CapacityArg> for EdgeCapacity {
    fn from(arg: CapacityArg) -> Self {
        match arg {
            CapacityArg::Throughput => EdgeCapacity::Throughput,
            CapacityArg::Distance => EdgeCapacity::Distance,
        }
    }
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum StatementFormat {
    Mps,
    Json,
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum FlowFormat {
    /// flows.dot and flows.txt in the output directory
    Files,
    /// `from,to,flow,bound` on stdout
    Csv,
    /// Edges and junction loads as JSON on stdout
    Json,
}

#[derive(clap::Args)]
struct ModelArgs {
    /// Source vertex; overrides the endpoint file
    source: Option<String>,
    /// Destination vertex; overrides the endpoint file
    destination: Option<String>,
    #[arg(short, long, value_enum, default_value = "max-flow")]
    formulation: FormulationArg,
    /// Edge capacity model of the max-flow and junction formulations
    #[arg(short, long, value_enum, default_value = "throughput")]
    capacity: CapacityArg,
    /// Name written to the NAME card
    #[arg(long, default_value = roadflow_net::DEFAULT_PROBLEM_NAME)]
    problem_name: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the road network into an MPS statement
    Compile {
        #[command(flatten)]
        model: ModelArgs,
        /// Write here instead of statement.mps in the output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "mps")]
        format: StatementFormat,
    },
    /// Decode a solver report into flows
    Decode {
        /// Report to read instead of solution.out in the output directory
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Stop after this many table rows
        #[arg(long)]
        row_limit: Option<usize>,
        #[arg(long, value_enum, default_value = "files")]
        format: FlowFormat,
    },
    /// Compile, solve with glpsol, decode and render with dot
    Run {
        #[command(flatten)]
        model: ModelArgs,
        /// Solver executable
        #[arg(long, default_value = "glpsol")]
        solver: String,
        /// Graphviz executable
        #[arg(long, default_value = "dot")]
        renderer: String,
        /// Rendered image; its extension selects the output format
        #[arg(long, default_value = "flows.png")]
        image: PathBuf,
        /// Do not render the flow graph
        #[arg(long)]
        no_render: bool,
    },
    /// Load and validate the input files
    Check,
    /// Write the vertex order to verts_order.txt
    Order,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let layout = Layout::new(&cli.model_dir, &cli.out_dir);
    let result = match cli.command {
        Commands::Compile {
            model,
            output,
            format,
        } => compile_command(&layout, &model, output.as_deref(), format),
        Commands::Decode {
            input,
            row_limit,
            format,
        } => decode_command(&layout, input.as_deref(), row_limit, format),
        Commands::Run {
            model,
            solver,
            renderer,
            image,
            no_render,
        } => {
            let renderer = (!no_render).then_some((renderer.as_str(), image.as_path()));
            run_command(&layout, &model, &solver, renderer)
        }
        Commands::Check => check_command(&layout),
        Commands::Order => order_command(&layout),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn load_network(layout: &Layout) -> Result<(Graph, AbbreviationRegistry)> {
    let graph = load_graph(&layout.populations, &layout.edges).context("loading road network")?;
    let registry = load_registry(&layout.abbreviations).context("loading abbreviations")?;
    Ok((graph, registry))
}

fn build_model(layout: &Layout, args: &ModelArgs) -> Result<LpModel> {
    let (graph, registry) = load_network(layout)?;
    let compiler = Compiler::new(&graph, &registry)?.with_problem_name(args.problem_name.as_str());

    let kind = FormulationKind::from(args.formulation);
    let terminals = if kind.needs_terminals() {
        let endpoints = resolve_endpoints(args.source.clone(), args.destination.clone(), &layout.endpoints)
            .context("resolving source and destination")?;
        let Some(endpoints) = endpoints else {
            bail!(
                "no source and destination given and {} does not name them",
                layout.endpoints.display()
            );
        };
        info!(source = %endpoints.source, destination = %endpoints.destination, "terminals");
        Some(Terminals::resolve(
            compiler.network(),
            &endpoints.source,
            &endpoints.destination,
        )?)
    } else {
        if args.source.is_some() || args.destination.is_some() {
            warn!("the junction formulation ignores source and destination");
        }
        None
    };

    let formulation = kind.build(terminals, args.capacity.into())?;
    Ok(compiler.compile(formulation.as_ref())?)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_statement(model: &LpModel, path: &Path) -> Result<()> {
    let mut out = create(path)?;
    mps::write(model, &mut out)
        .and_then(|_| out.flush())
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote statement");
    Ok(())
}

fn compile_command(
    layout: &Layout,
    args: &ModelArgs,
    output: Option<&Path>,
    format: StatementFormat,
) -> Result<()> {
    let model = build_model(layout, args)?;
    match format {
        StatementFormat::Mps => write_statement(&model, output.unwrap_or(&layout.statement)),
        StatementFormat::Json => {
            let json = serde_json::to_string_pretty(&model)?;
            match output {
                Some(path) => fs::write(path, json).with_context(|| format!("writing {}", path.display())),
                None => {
                    println!("{}", json);
                    Ok(())
                }
            }
        }
    }
}

fn decode_report(layout: &Layout, report_path: &Path, row_limit: Option<usize>) -> Result<DecodedFlows> {
    let registry = load_registry(&layout.abbreviations).context("loading abbreviations")?;
    let report = fs::read_to_string(report_path)
        .with_context(|| format!("reading solver report {}", report_path.display()))?;

    let mut decoder = Decoder::new(&registry);
    if let Some(limit) = row_limit {
        decoder = decoder.with_row_limit(limit);
    }
    let flows = decoder
        .decode(&report)
        .with_context(|| format!("decoding {}", report_path.display()))?;
    Ok(flows)
}

fn write_flow_files(layout: &Layout, flows: &DecodedFlows) -> Result<()> {
    let mut dot = create(&layout.dot)?;
    render::write_dot(&flows.edges, &mut dot)
        .and_then(|_| dot.flush())
        .with_context(|| format!("writing {}", layout.dot.display()))?;

    let mut table = create(&layout.table)?;
    render::write_table(&flows.edges, &mut table)
        .and_then(|_| table.flush())
        .with_context(|| format!("writing {}", layout.table.display()))?;

    if !flows.junctions.is_empty() {
        let mut junctions = create(&layout.junctions)?;
        render::write_junctions(&flows.junctions, &mut junctions)
            .and_then(|_| junctions.flush())
            .with_context(|| format!("writing {}", layout.junctions.display()))?;
    }

    info!(edges = flows.edges.len(), dot = %layout.dot.display(), "wrote flows");
    Ok(())
}

fn decode_command(
    layout: &Layout,
    input: Option<&Path>,
    row_limit: Option<usize>,
    format: FlowFormat,
) -> Result<()> {
    let flows = decode_report(layout, input.unwrap_or(&layout.solution), row_limit)?;
    match format {
        FlowFormat::Files => write_flow_files(layout, &flows),
        FlowFormat::Csv => Ok(render::write_csv(&flows.edges, io::stdout().lock())?),
        FlowFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&flows)?);
            Ok(())
        }
    }
}

fn run_command(
    layout: &Layout,
    args: &ModelArgs,
    solver: &str,
    renderer: Option<(&str, &Path)>,
) -> Result<()> {
    let model = build_model(layout, args)?;
    write_statement(&model, &layout.statement)?;

    external::solve(solver, &layout.statement, &layout.solution, model.sense).context("solving statement")?;

    let flows = decode_report(layout, &layout.solution, None)?;
    write_flow_files(layout, &flows)?;

    if let Some((program, image)) = renderer {
        let image = layout_relative(layout, image);
        external::render(program, &layout.dot, &image).context("rendering flows")?;
        println!("{}", image.display());
    }

    println!("{} critical edges", flows.edges.len());
    Ok(())
}

/// Relative image paths land next to the other outputs.
fn layout_relative(layout: &Layout, image: &Path) -> PathBuf {
    match layout.dot.parent() {
        Some(dir) if image.is_relative() => dir.join(image),
        _ => image.to_path_buf(),
    }
}

fn check_command(layout: &Layout) -> Result<()> {
    let (graph, registry) = load_network(layout)?;
    // Resolves every vertex code up front.
    Compiler::new(&graph, &registry)?;

    println!("Vertices:      {}", graph.len());
    println!("Roads:         {}", graph.road_count());
    println!("Abbreviations: {}", registry.len());

    match resolve_endpoints(None, None, &layout.endpoints)? {
        Some(endpoints) => {
            graph.index_of(&endpoints.source)?;
            graph.index_of(&endpoints.destination)?;
            println!("Endpoints:     {} -> {}", endpoints.source, endpoints.destination);
        }
        None => println!("Endpoints:     none"),
    }
    Ok(())
}

fn order_command(layout: &Layout) -> Result<()> {
    let graph = load_graph(&layout.populations, &layout.edges).context("loading road network")?;
    let mut out = create(&layout.vertex_order)?;
    render::write_vertex_order(&graph, &mut out)
        .and_then(|_| out.flush())
        .with_context(|| format!("writing {}", layout.vertex_order.display()))?;
    Ok(())
}
