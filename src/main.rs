use clap::Parser;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use structnav::parsing::{JsParser, Parse};
use structnav::{
    log, Command, ConfigError, EditorView, Outcome, Pos, Session, SessionError, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "structnav")]
#[command(about = "Navigate JavaScript source by its syntax tree", long_about = None)]
struct Args {
    /// Source file to navigate
    #[arg(value_name = "FILE", required_unless_present = "list_commands")]
    file: Option<PathBuf>,

    /// Commands to run in order
    #[arg(value_name = "COMMAND")]
    commands: Vec<Command>,

    /// Cursor position (1-indexed line, 0-indexed column)
    #[arg(long, value_name = "L:C", default_value = "1:0")]
    cursor: Pos,

    /// Other end of the selection. Defaults to the cursor.
    #[arg(long, value_name = "L:C")]
    anchor: Option<Pos>,

    /// Slot schema file, overriding the settings
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Settings file [default: ./structnav.ron, if present]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print one JSON object per command
    #[arg(long)]
    json: bool,

    /// Write the edited text back to FILE instead of printing it
    #[arg(long)]
    write: bool,

    /// List the available commands and their default key chords
    #[arg(long)]
    list_commands: bool,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Failed to access {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("No source file given")]
    NoFile,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("structnav: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    if args.list_commands {
        for command in Command::ALL {
            println!(
                "{:<8} {:<12} {}",
                command.name(),
                command.chord(),
                command.description()
            );
        }
        return Ok(());
    }

    let mut settings = Settings::discover(args.config.as_deref())?;
    if let Some(schema) = args.schema {
        settings.schema = Some(schema);
    }
    settings.configure_log()?;
    let schema = settings.slot_schema()?;

    let file = args.file.ok_or(CliError::NoFile)?;
    let text = fs::read_to_string(&file).map_err(|source| CliError::Io {
        path: file.clone(),
        source,
    })?;
    let parser = JsParser;
    log!(Info, "Navigating {} as {}", file.display(), parser.name());

    let mut view = EditorView {
        text,
        anchor: args.anchor.unwrap_or(args.cursor),
        head: args.cursor,
    };
    let mut session = Session::new(Box::new(parser), schema);
    let mut edited = false;
    for command in args.commands {
        let outcome = session.execute(command, &mut view)?;
        edited |= matches!(outcome, Outcome::Cut { .. });
        if args.json {
            let step = serde_json::json!({
                "command": command.name(),
                "result": outcome,
                "anchor": view.anchor,
                "head": view.head,
            });
            println!("{}", step);
        } else {
            println!("{}: {}", command, describe(&outcome));
        }
    }

    if !edited {
        return Ok(());
    }
    if args.write {
        fs::write(&file, &view.text).map_err(|source| CliError::Io { path: file, source })?;
    } else if args.json {
        println!("{}", serde_json::json!({ "text": view.text }));
    } else {
        print!("{}", view.text);
    }
    Ok(())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Target {
            kind,
            span: Some(span),
        } => format!("{} {}", kind, span),
        Outcome::Target { kind, span: None } => format!("{} (no span)", kind),
        Outcome::Cut { deleted, cursor } => format!("deleted {}, cursor at {}", deleted, cursor),
        Outcome::NoTarget => "no target".to_owned(),
    }
}
