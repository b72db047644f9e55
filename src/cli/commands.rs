//! Command dispatch: wires parsed arguments to services and output

use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::render::{render_trace, render_tree, to_graph_json};
use crate::application::services::Session;
use crate::application::{ApplicationError, ApplicationResult};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputKind};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    format_value, sample_tree, Direction, Evaluation, Node, Role, TreeDocument, TreeFormat,
    DEFAULT_TREE,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Options of the `eval` command after merging with settings.
#[derive(Debug, Clone, Copy)]
struct EvalRequest {
    direction: Direction,
    start_with: Role,
    format: TreeFormat,
    output: OutputKind,
    trace: bool,
    stats: bool,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = cli
        .project_dir
        .clone()
        .or_else(|| std::env::current_dir().ok());
    let settings = Settings::load(project_dir.as_deref())?;
    let color = settings.color && !cli.no_color;
    if !color {
        output::disable_color();
    }
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Eval {
            file,
            direction,
            start_with,
            format,
            output: kind,
            trace,
            stats,
        }) => {
            let request = EvalRequest {
                direction: direction.unwrap_or(container.settings.direction),
                start_with: start_with.unwrap_or(container.settings.start_with),
                format: format.unwrap_or(container.settings.format),
                output: *kind,
                trace: *trace,
                stats: *stats,
            };
            cmd_eval(&container, file.as_deref(), request, color)
        }
        Some(Commands::Compare {
            file,
            start_with,
            format,
        }) => cmd_compare(
            &container,
            file.as_deref(),
            start_with.unwrap_or(container.settings.start_with),
            format.unwrap_or(container.settings.format),
        ),
        Some(Commands::Sample { json }) => cmd_sample(*json),
        Some(Commands::Repl { file }) => cmd_repl(&container, file.as_deref(), color),
        Some(Commands::Config { command }) => {
            cmd_config(&container, command, project_dir.as_deref())
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e).into()),
    }
}

fn write_err(e: io::Error) -> CliError {
    InfraError::io("write output", e).into()
}

/// Resolve the tree to work on: an explicit file, `-` for stdin, the
/// configured default tree, or the sample.
pub fn read_tree(
    container: &ServiceContainer,
    file: Option<&Path>,
    format: TreeFormat,
) -> CliResult<Node> {
    let service = container.evaluation_service();
    let node = match file {
        Some(path) if path == Path::new("-") => {
            let source = container
                .input
                .read_all()
                .map_err(|e| InfraError::io("read stdin", e))?;
            service.parse(&source, format)?
        }
        Some(path) => service.load_tree(path, format)?,
        None => match &container.settings.default_tree {
            Some(path) => service.load_tree(path, format)?,
            None => service.parse(DEFAULT_TREE, TreeFormat::Expr)?,
        },
    };
    Ok(node)
}

#[instrument(skip(container))]
fn cmd_eval(
    container: &ServiceContainer,
    file: Option<&Path>,
    request: EvalRequest,
    color: bool,
) -> CliResult<()> {
    let node = read_tree(container, file, request.format)?;
    let evaluation =
        container
            .evaluation_service()
            .evaluate(&node, request.direction, request.start_with)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if request.trace {
        for line in render_trace(&evaluation) {
            writeln!(out, "{line}").map_err(write_err)?;
        }
    }
    match request.output {
        OutputKind::Tree => {
            writeln!(out, "{}", render_tree(&evaluation, color)).map_err(write_err)?
        }
        OutputKind::Json => writeln!(out, "{}", to_graph_json(&evaluation)?).map_err(write_err)?,
        OutputKind::Value => {
            writeln!(out, "{}", format_value(evaluation.value)).map_err(write_err)?
        }
    }
    if request.stats {
        write_stats(&mut out, &evaluation).map_err(write_err)?;
    }
    Ok(())
}

fn write_stats<W: Write>(out: &mut W, evaluation: &Evaluation) -> io::Result<()> {
    let stats = &evaluation.stats;
    writeln!(out, "direction: {}", evaluation.direction)?;
    writeln!(out, "root:      {}", evaluation.root_role)?;
    writeln!(out, "value:     {}", format_value(evaluation.value))?;
    writeln!(out, "visited:   {}", stats.visited)?;
    writeln!(out, "leaves:    {}", stats.leaves_evaluated)?;
    writeln!(out, "pruned:    {}", stats.pruned)
}

#[instrument(skip(container))]
fn cmd_compare(
    container: &ServiceContainer,
    file: Option<&Path>,
    start_with: Role,
    format: TreeFormat,
) -> CliResult<()> {
    let node = read_tree(container, file, format)?;
    let comparison = container.evaluation_service().compare(&node, start_with)?;

    output::header(&format!(
        "{} at root, minimax value {}",
        comparison.root_role,
        format_value(comparison.reference)
    ));
    for report in &comparison.reports {
        output::detail(report);
    }
    Ok(())
}

fn cmd_sample(json: bool) -> CliResult<()> {
    if json {
        let text = TreeDocument::from(&sample_tree())
            .to_json()
            .map_err(ApplicationError::from)?;
        output::info(&text);
    } else {
        output::info(DEFAULT_TREE);
    }
    Ok(())
}

fn cmd_repl(container: &ServiceContainer, file: Option<&Path>, color: bool) -> CliResult<()> {
    let mut session = container.session();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let opened = match file {
        Some(path) => session.load(path),
        None => session.refresh(),
    };
    report(&mut out, opened, color).map_err(write_err)?;

    run_repl(&mut session, stdin.lock(), &mut out, color)
}

const REPL_HELP: &str = "\
commands:
  none | ltr | rtl   set pruning direction
  toggle             switch the root role between Max and Min
  reset              back to the sample tree
  load <file>        read a tree file
  tree <expr>        replace the tree text
  show               print the current tree
  json               print the current tree as graph JSON
  help               this text
  quit               leave";

/// Read commands line by line until `quit` or end of input. Every change
/// re-evaluates and prints the tree; failures keep the last good tree.
pub fn run_repl<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    out: &mut W,
    color: bool,
) -> CliResult<()> {
    for line in input.lines() {
        let line = line.map_err(|e| InfraError::io("read input", e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));
        debug!("repl: {} {}", command, rest);

        match command {
            "quit" | "exit" | "q" => break,
            "help" | "?" => writeln!(out, "{REPL_HELP}").map_err(write_err)?,
            "none" | "ltr" | "rtl" | "off" => {
                let direction: Direction = command.parse().map_err(ApplicationError::from)?;
                report(out, session.set_direction(direction), color).map_err(write_err)?
            }
            "toggle" => report(out, session.toggle_role(), color).map_err(write_err)?,
            "reset" => report(out, session.reset(), color).map_err(write_err)?,
            "load" if !rest.is_empty() => {
                report(out, session.load(Path::new(rest)), color).map_err(write_err)?
            }
            "tree" if !rest.is_empty() => {
                report(out, session.submit(rest), color).map_err(write_err)?
            }
            "show" => {
                let written = match session.current() {
                    Some(evaluation) => writeln!(out, "{}", render_tree(evaluation, color)),
                    None => writeln!(out, "no tree evaluated yet"),
                };
                written.map_err(write_err)?
            }
            "json" => {
                let written = match session.current() {
                    Some(evaluation) => writeln!(out, "{}", to_graph_json(evaluation)?),
                    None => writeln!(out, "no tree evaluated yet"),
                };
                written.map_err(write_err)?
            }
            _ => writeln!(out, "unknown command: {line} (try help)").map_err(write_err)?,
        }
    }
    Ok(())
}

fn report<W: Write>(
    out: &mut W,
    outcome: ApplicationResult<&Evaluation>,
    color: bool,
) -> io::Result<()> {
    match outcome {
        Ok(evaluation) => {
            writeln!(
                out,
                "[{} at root, direction {}]",
                evaluation.root_role, evaluation.direction
            )?;
            writeln!(out, "{}", render_tree(evaluation, color))
        }
        Err(e) => writeln!(out, "error: {e} (keeping last good tree)"),
    }
}

fn cmd_config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    project_dir: Option<&Path>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no config directory available".into()))?
            } else {
                let dir = project_dir
                    .ok_or_else(|| CliError::Usage("no project directory available".into()))?;
                local_config_path(dir)
            };
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .and_then(|_| container.fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
        ConfigCommands::Path => {
            let marker = |p: &Path| if container.fs.exists(p) { "" } else { " (missing)" };
            match global_config_path() {
                Some(p) => output::action("global", &format!("{}{}", p.display(), marker(p.as_path()))),
                None => output::warning("no global config directory"),
            }
            if let Some(dir) = project_dir {
                let p = local_config_path(dir);
                output::action("local", &format!("{}{}", p.display(), marker(p.as_path())));
            }
            Ok(())
        }
    }
}
