mod board;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use retrace_machine::{
    BranchId, HistoryConfig, StateHistory, StateRecorder, TimeMachine, TimelineMode, Topology,
};
use retrace_tools::HistoryInspector;
use tracing_subscriber::EnvFilter;

use board::{Board, BoardPatch};

#[derive(Parser)]
#[command(name = "retrace-cli", about = "Drive branching history over a demo board")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file with a history configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage mode, overriding the config file
    #[arg(long)]
    mode: Option<ModeArg>,

    /// History topology, overriding the config file
    #[arg(long)]
    topology: Option<TopologyArg>,

    /// Checkpoint interval for hybrid mode, overriding the config file
    #[arg(long)]
    interval: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration
    Info,
    /// Play, rewind and overwrite a few moves
    Scenario,
    /// Fork alternative openings and cycle through them
    Branches {
        /// Number of alternative second moves to fork
        #[arg(short, long, default_value = "3")]
        forks: usize,
    },
    /// Record many games and report reconstruction cost
    Replay {
        /// Number of games to record
        #[arg(short, long, default_value = "10")]
        games: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Full,
    Patch,
    Hybrid,
}

impl From<ModeArg> for TimelineMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Full => Self::Full,
            ModeArg::Patch => Self::Patch,
            ModeArg::Hybrid => Self::Hybrid,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TopologyArg {
    Linear,
    Branching,
}

impl From<TopologyArg> for Topology {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Linear => Self::Linear,
            TopologyArg::Branching => Self::Branching,
        }
    }
}

type Machine = TimeMachine<Board, Board, BoardPatch>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Info => {
            println!("retrace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "config: mode={} topology={} interval={}",
                config.mode, config.topology, config.checkpoint_interval
            );
        }
        Commands::Scenario => run_scenario(config)?,
        Commands::Branches { forks } => run_branches(config, forks)?,
        Commands::Replay { games } => run_replay(config, games)?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<HistoryConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => HistoryConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }
    if let Some(topology) = cli.topology {
        config.topology = topology.into();
    }
    if let Some(interval) = cli.interval {
        config.checkpoint_interval = interval;
    }
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn new_machine(config: HistoryConfig) -> anyhow::Result<Machine> {
    TimeMachine::new(board::codec(), config, Board::default())
        .context("creating time machine")
}

/// Play `cell` on the live board and commit it.
fn play(machine: &mut Machine, cell: usize) -> anyhow::Result<()> {
    if !machine.state_mut().play(cell) {
        anyhow::bail!("cell {cell} cannot be played");
    }
    machine.commit(Some(format!("play {cell}").as_str()))?;
    Ok(())
}

fn print_history(machine: &Machine) {
    println!("{}", HistoryInspector::summary(machine.timeline()));
    for entry in HistoryInspector::entries(machine.timeline()) {
        println!("  {entry}");
    }
}

fn run_scenario(config: HistoryConfig) -> anyhow::Result<()> {
    let mut machine = new_machine(config)?;
    machine.commit(Some("empty board"))?;
    play(&mut machine, 4)?;
    play(&mut machine, 0)?;
    println!("After two moves:\n{}", machine.state());

    machine.step_backward()?;
    machine.step_backward()?;
    println!("Rewound to the start:\n{}", machine.state());

    // Committing an unchanged board records nothing.
    machine.commit(Some("no-op"))?;

    play(&mut machine, 8)?;
    println!("New first move:\n{}", machine.state());
    print_history(&machine);
    println!("branches: {}", machine.branch_count());
    Ok(())
}

fn run_branches(mut config: HistoryConfig, forks: usize) -> anyhow::Result<()> {
    config.topology = Topology::Branching;
    let mut machine = new_machine(config)?;
    machine.commit(Some("empty board"))?;
    play(&mut machine, 4)?;
    machine.set_branch_label(BranchId::ROOT, Some("centre opening"))?;

    let replies = [0, 2, 6, 8, 1, 3, 5, 7];
    for (i, cell) in replies.iter().take(forks).enumerate() {
        play(&mut machine, *cell)?;
        if i + 1 < forks {
            machine.step_backward()?;
        }
    }

    for info in HistoryInspector::branches(&machine) {
        println!("{info}");
    }

    for _ in 0..machine.branch_count() {
        machine.next_branch()?;
        println!(
            "branch {} at {}:\n{}",
            machine.branch_id(),
            HistoryInspector::scrubber(machine.timeline()),
            machine.state()
        );
    }
    Ok(())
}

fn run_replay(config: HistoryConfig, games: usize) -> anyhow::Result<()> {
    let mut history: StateHistory<Board, Board, BoardPatch> =
        StateHistory::new(board::codec(), config.mode, config.checkpoint_interval)?;

    let mut recorded = 0;
    for game in 0..games {
        let mut board = Board::default();
        recorded += usize::from(history.record(&board)?);
        for step in 0..board::SIDE * board::SIDE {
            let cell = (game + step * 5) % (board::SIDE * board::SIDE);
            if board.play(cell) {
                recorded += usize::from(history.record(&board)?);
            }
        }
    }
    println!("recorded {recorded} entries over {games} games");

    let timeline = history.timeline();
    for index in (0..timeline.len()).rev() {
        timeline.snapshot_at(index)?;
    }
    let summary = HistoryInspector::summary(timeline);
    println!("{summary}");
    if timeline.len() <= 80 {
        println!("{}", HistoryInspector::scrubber(timeline));
    }

    let mut board = history.current()?.clone();
    history.undo(&mut board)?;
    println!("one move before the end:\n{board}");
    Ok(())
}
