use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use xform_spec::{BodyRefs, CompileOptions, Form, check_form, compile, form_schema, serialize};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compile form designs into ODK XForms",
    long_about = "Reads a control-tree JSON document and emits the matching XForm (instance, binds, itext and body)"
)]
struct Cli {
    /// Log compiler progress to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Xml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a control tree into an XForm.
    Build {
        /// Path to the control-tree JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Active language; repeat for several, order is kept.
        #[arg(long = "lang", value_name = "CODE", default_value = "en")]
        languages: Vec<String>,
        /// Tag name of the instance root.
        #[arg(long, value_name = "NAME", default_value = "data")]
        instance_root: String,
        /// Optional id attribute for the instance root.
        #[arg(long, value_name = "ID")]
        form_id: Option<String>,
        /// Emit body refs relative to the instance root.
        #[arg(long)]
        relative_refs: bool,
        /// Output representation.
        #[arg(long, value_enum, default_value_t = OutputFormat::Xml)]
        format: OutputFormat,
        /// Write to this file instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Overwrite the output file if present.
        #[arg(long)]
        force: bool,
    },
    /// Check a control tree without compiling it.
    Check {
        /// Path to the control-tree JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Print the JSON schema of the control-tree format.
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Build {
            form,
            languages,
            instance_root,
            form_id,
            relative_refs,
            format,
            out,
            force,
        } => {
            let mut options = CompileOptions::new(languages).with_instance_root(instance_root);
            if let Some(form_id) = form_id {
                options = options.with_form_id(form_id);
            }
            if relative_refs {
                options = options.with_body_refs(BodyRefs::Relative);
            }
            run_build(&form, &options, format, out.as_deref(), force)
        }
        Command::Check { form } => run_check(&form),
        Command::Schema => run_schema(),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn read_form(path: &Path) -> CliResult<Form> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    debug!(path = %path.display(), bytes = contents.len(), "read control tree");
    Ok(Form::from_json(&contents)?)
}

fn run_build(
    form_path: &Path,
    options: &CompileOptions,
    format: OutputFormat,
    out: Option<&Path>,
    force: bool,
) -> CliResult<()> {
    let form = read_form(form_path)?;
    let root = compile(&form, options)?;
    let rendered = match format {
        OutputFormat::Xml => serialize(&root),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&root)?),
    };

    match out {
        Some(path) => {
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists; rerun with --force to overwrite",
                    path.display()
                )
                .into());
            }
            fs::write(path, rendered)?;
            info!(path = %path.display(), "wrote xform");
            println!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn run_check(form_path: &Path) -> CliResult<()> {
    let form = read_form(form_path)?;
    check_form(&form)?;
    println!("ok");
    Ok(())
}

fn run_schema() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&form_schema())?);
    Ok(())
}
