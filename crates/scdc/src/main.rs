use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use scd_contracts::{SCDC_REPORT_SCHEMA_VERSION, SCD_LAYOUT_SCHEMA_VERSION};
use scdc::c_emit;
use scdc::diagnostics::{Diagnostic, Report, Severity, Stage};
use scdc::language::{self, limits};
use scdc::layout;
use scdc::model::ContractModel;
use scdc::schema;
use scdc::template;
use scdc::util;
use scdc::validate::{self, ScdError};

mod cli_codes {
    pub const ARGS: &str = "SCDC-CLI-ARGS-0001";
    pub const IO_READ: &str = "SCDC-IO-READ-0001";
    pub const IO_WRITE: &str = "SCDC-IO-WRITE-0001";
    pub const GEN_STALE: &str = "SCDC-GEN-0001";
    pub const FMT: &str = "SCDC-FMT-0001";
}

#[derive(Parser)]
#[command(name = "scdc")]
#[command(about = "SmartC contract description compiler (SCD -> SmartC).", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    LangId,
    /// Print the embedded JSON Schema of the description format.
    Schema,
    /// Validate a description and print a diagnostics report.
    Check {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        report_json: bool,
    },
    /// Print the storage slot of every state variable and struct field.
    Layout {
        #[arg(long)]
        input: PathBuf,
    },
    /// Generate the SmartC skeleton.
    Gen {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        write: bool,
        #[arg(long)]
        check: bool,
        #[arg(long)]
        report_json: bool,
    },
    Fmt {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        check: bool,
        #[arg(long)]
        write: bool,
        #[arg(long)]
        report_json: bool,
    },
    /// Write a starter description.
    Init {
        #[arg(long)]
        name: String,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize)]
struct ScdcToolReport {
    schema_version: &'static str,
    command: &'static str,
    ok: bool,
    r#in: String,
    diagnostics_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    meta: BTreeMap<String, Value>,
    exit_code: u8,
}

impl ScdcToolReport {
    fn new(command: &'static str, input: &Path, diagnostics: Vec<Diagnostic>, exit_code: u8) -> Self {
        Self {
            schema_version: SCDC_REPORT_SCHEMA_VERSION,
            command,
            ok: exit_code == 0,
            r#in: input.display().to_string(),
            diagnostics_count: diagnostics.len(),
            diagnostics,
            meta: BTreeMap::new(),
            exit_code,
        }
    }
}

#[derive(Debug, Serialize)]
struct LayoutDoc<'a> {
    schema_version: &'static str,
    contract: &'a str,
    entries: Vec<layout::LayoutEntry>,
}

/// A command failure; rendered as a tool report under `--report-json`, as stderr text otherwise.
struct Failure {
    exit_code: u8,
    message: String,
    diagnostics: Vec<Diagnostic>,
    meta: BTreeMap<String, Value>,
}

impl Failure {
    fn new(exit_code: u8, message: String, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            exit_code,
            message,
            diagnostics,
            meta: BTreeMap::new(),
        }
    }

    fn single(exit_code: u8, code: &str, stage: Stage, message: String) -> Self {
        let diag = Diagnostic::error(code, stage, message.clone());
        Self::new(exit_code, message, vec![diag])
    }

    fn usage(message: &str) -> Self {
        Self::single(2, cli_codes::ARGS, Stage::Parse, message.to_string())
    }

    fn io(code: &str, err: anyhow::Error) -> Self {
        Self::single(2, code, Stage::Io, format!("{err:#}"))
    }

    fn invalid(input: &Path, err: &ScdError) -> Self {
        Self::new(2, format!("{}: {err}", input.display()), err.diagnostics())
    }
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::LangId => {
            println!("{}", language::LANG_ID);
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Schema => {
            let text = schema::schema_text()?;
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Check { input, report_json } => cmd_check(&input, report_json),
        Cmd::Layout { input } => cmd_layout(&input),
        Cmd::Gen {
            input,
            out,
            write,
            check,
            report_json,
        } => cmd_gen(&input, out.as_deref(), write, check, report_json),
        Cmd::Fmt {
            input,
            check,
            write,
            report_json,
        } => cmd_fmt(&input, check, write, report_json),
        Cmd::Init { name, out, force } => cmd_init(&name, &out, force),
    }
}

fn cmd_check(input: &Path, report_json: bool) -> Result<ExitCode> {
    let bytes = match read_input(input) {
        Ok(bytes) => bytes,
        Err(failure) => return fail("check", input, report_json, failure),
    };

    let (report, exit_code) = match validate::load_model(&bytes) {
        Ok(model) => {
            let report = Report::ok()
                .with_diagnostics(validate::advisories(&model))
                .with_meta(
                    "contract",
                    Value::String(model.contract_info().name.to_string()),
                );
            (report, 0)
        }
        Err(ScdError::Invariant(msg)) => anyhow::bail!("internal error: {msg}"),
        Err(err) => (Report::ok().with_diagnostics(err.diagnostics()), 1),
    };

    if report_json {
        let mut tool_report = ScdcToolReport::new("check", input, report.diagnostics, exit_code);
        tool_report.meta = report.meta;
        print_json(&tool_report)?;
    } else {
        print_json(&report)?;
    }
    Ok(ExitCode::from(exit_code))
}

fn cmd_layout(input: &Path) -> Result<ExitCode> {
    let model = match load_model(input) {
        Ok((_, model)) => model,
        Err(failure) => return fail("layout", input, false, failure),
    };
    let doc = LayoutDoc {
        schema_version: SCD_LAYOUT_SCHEMA_VERSION,
        contract: model.contract_info().name,
        entries: layout::resolve_layout(&model),
    };
    print_json(&doc)?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_gen(
    input: &Path,
    out: Option<&Path>,
    write: bool,
    check: bool,
    report_json: bool,
) -> Result<ExitCode> {
    const CMD: &str = "gen";

    if write && check {
        return fail(CMD, input, report_json, Failure::usage("set at most one of --check or --write"));
    }
    let Some(out) = out else {
        if write || check || report_json {
            return fail(
                CMD,
                input,
                report_json,
                Failure::usage(
                    "--write, --check and --report-json require --out (otherwise stdout would be the generated code)",
                ),
            );
        }
        let model = match load_model(input) {
            Ok((_, model)) => model,
            Err(failure) => return fail(CMD, input, false, failure),
        };
        print_warnings(&validate::advisories(&model));
        print!("{}", c_emit::generate_contract(&model));
        return Ok(ExitCode::SUCCESS);
    };

    let model = match load_model(input) {
        Ok((_, model)) => model,
        Err(failure) => return fail(CMD, input, report_json, failure),
    };
    let code = c_emit::generate_contract(&model);
    let advisories = validate::advisories(&model);

    let mut meta = BTreeMap::new();
    meta.insert(
        "description_sha256".to_string(),
        Value::String(description_sha256(&model)?),
    );
    meta.insert(
        "output_sha256".to_string(),
        Value::String(util::sha256_hex(code.as_bytes())),
    );
    meta.insert("out".to_string(), Value::String(out.display().to_string()));

    if check {
        let on_disk = match std::fs::read(out) {
            Ok(bytes) => Some(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                let err = anyhow::Error::new(err).context(format!("read: {}", out.display()));
                return fail(CMD, input, report_json, Failure::io(cli_codes::IO_READ, err));
            }
        };
        if on_disk.as_deref() != Some(code.as_bytes()) {
            let message = format!("generated code is out of date: {}", out.display());
            let mut diagnostics = advisories;
            diagnostics.push(Diagnostic::error(
                cli_codes::GEN_STALE,
                Stage::Codegen,
                message.clone(),
            ));
            let mut failure = Failure::new(1, message, diagnostics);
            failure.meta = meta;
            return fail(CMD, input, report_json, failure);
        }
    } else if let Err(err) = util::write_bytes(out, code.as_bytes()) {
        return fail(CMD, input, report_json, Failure::io(cli_codes::IO_WRITE, err));
    }

    if report_json {
        let mut report = ScdcToolReport::new(CMD, input, advisories, 0);
        report.meta = meta;
        print_json(&report)?;
    } else {
        print_warnings(&advisories);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_fmt(input: &Path, check: bool, write: bool, report_json: bool) -> Result<ExitCode> {
    const CMD: &str = "fmt";

    if check == write {
        return fail(CMD, input, report_json, Failure::usage("set exactly one of --check or --write"));
    }
    if write && input.as_os_str() == "-" {
        return fail(CMD, input, report_json, Failure::usage("--write needs a file --input"));
    }

    let (bytes, model) = match load_model(input) {
        Ok(loaded) => loaded,
        Err(failure) => return fail(CMD, input, report_json, failure),
    };
    let formatted = util::canonical_pretty_json_bytes(&model.description().to_json_value())?;

    if check && bytes != formatted {
        let message = format!("file is not formatted: {}", input.display());
        let failure = Failure::single(1, cli_codes::FMT, Stage::Parse, message);
        return fail(CMD, input, report_json, failure);
    }
    if write && bytes != formatted {
        if let Err(err) = util::write_bytes(input, &formatted) {
            return fail(CMD, input, report_json, Failure::io(cli_codes::IO_WRITE, err));
        }
    }

    if report_json {
        print_json(&ScdcToolReport::new(CMD, input, Vec::new(), 0))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_init(name: &str, out: &Path, force: bool) -> Result<ExitCode> {
    let doc = template::starter_description(name)
        .map_err(|msg| anyhow::anyhow!("invalid --name: {msg}"))?;
    let desc = validate::validate(&doc).context("starter description")?;
    if out.exists() && !force {
        anyhow::bail!(
            "refusing to overwrite existing file: {} (pass --force)",
            out.display()
        );
    }
    let bytes = util::canonical_pretty_json_bytes(&desc.to_json_value())?;
    util::write_bytes(out, &bytes)?;
    Ok(ExitCode::SUCCESS)
}

fn read_input(input: &Path) -> Result<Vec<u8>, Failure> {
    let max_bytes = u64::try_from(limits::max_input_bytes()).unwrap_or(u64::MAX);
    util::read_bounded(input, max_bytes).map_err(|err| Failure::io(cli_codes::IO_READ, err))
}

fn load_model(input: &Path) -> Result<(Vec<u8>, ContractModel), Failure> {
    let bytes = read_input(input)?;
    let model = validate::load_model(&bytes).map_err(|err| Failure::invalid(input, &err))?;
    Ok((bytes, model))
}

fn fail(
    command: &'static str,
    input: &Path,
    report_json: bool,
    failure: Failure,
) -> Result<ExitCode> {
    if report_json {
        let mut report = ScdcToolReport::new(command, input, failure.diagnostics, failure.exit_code);
        report.meta = failure.meta;
        print_json(&report)?;
        return Ok(ExitCode::from(report.exit_code));
    }
    if failure.exit_code == 2 {
        anyhow::bail!("{}", failure.message);
    }
    eprintln!("{}", failure.message);
    Ok(ExitCode::from(failure.exit_code))
}

fn description_sha256(model: &ContractModel) -> Result<String> {
    let bytes = util::canonical_json_bytes(&model.description().to_json_value())?;
    Ok(util::sha256_hex(&bytes))
}

fn print_warnings(diagnostics: &[Diagnostic]) {
    for d in diagnostics.iter().filter(|d| d.severity == Severity::Warning) {
        eprintln!("warning[{}]: {}", d.code, d.message);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
