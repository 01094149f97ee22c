mod form;
mod render;

use std::ffi::OsString;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use healthguard_core::{AiSettings, Gender, SymptomId, SYMPTOMS};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use form::FormState;

#[derive(Parser)]
#[command(name = "healthguard", version, about = "AI-assisted symptom assessment")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the symptom catalog
    Symptoms,
    /// Assess symptoms with the configured AI provider
    Diagnose {
        /// Symptom id or name; repeat for several. Omit to fill the form interactively.
        #[arg(short, long = "symptom")]
        symptoms: Vec<SymptomId>,
        /// Age in years (0-120)
        #[arg(short, long)]
        age: Option<u32>,
        /// male or female
        #[arg(short, long)]
        gender: Option<Gender>,
        /// Print the result as JSON instead of panels
        #[arg(long)]
        json: bool,
    },
    /// Validate and render a saved raw model reply without calling the provider
    Parse {
        /// File holding the raw reply, or - for stdin
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show or change AI settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print current settings (API key masked)
    Show,
    /// Update stored settings
    Set {
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    Ok(())
}

fn mask(key: &str) -> String {
    if key.is_empty() {
        "(not set)".to_string()
    } else {
        let skip = key.chars().count().saturating_sub(4);
        let tail: String = key.chars().skip(skip).collect();
        format!("****{tail}")
    }
}

/// Fill the form from flags, or interactively when no symptom was given.
/// Interactive prompts are written to `prompts`, never mixed into the result.
fn build_form<R: BufRead, W: Write>(
    symptoms: Vec<SymptomId>,
    age: Option<u32>,
    gender: Option<Gender>,
    input: &mut R,
    prompts: &mut W,
) -> Result<Option<FormState>> {
    if symptoms.is_empty() {
        return Ok(form::prompt_form(input, prompts)?);
    }

    let mut form = FormState::default();
    for s in symptoms {
        if !form.selected().contains(&s) {
            form.toggle_symptom(s);
        }
    }
    if let Some(age) = age {
        form.set_age(age.to_string());
    }
    if let Some(gender) = gender {
        form.set_gender(gender);
    }
    Ok(Some(form))
}

/// Colour only on a terminal, and never when `NO_COLOR` is set to anything.
fn use_color(is_tty: bool, no_color: Option<OsString>) -> bool {
    is_tty && no_color.is_none()
}

fn emit(result: &healthguard_core::DiagnosisResult, json: bool) -> Result<()> {
    let mut stdout = io::stdout();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(result)?)?;
    } else {
        let color = use_color(stdout.is_terminal(), std::env::var_os("NO_COLOR"));
        render::display_diagnosis(&mut stdout, result, color)?;
    }
    Ok(())
}

async fn run_diagnose(
    symptoms: Vec<SymptomId>,
    age: Option<u32>,
    gender: Option<Gender>,
    json: bool,
) -> Result<bool> {
    if !json {
        render::display_welcome(&mut io::stdout())?;
    }

    // With --json, stdout carries only the result document.
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let built = if json {
        build_form(symptoms, age, gender, &mut input, &mut io::stderr())?
    } else {
        build_form(symptoms, age, gender, &mut input, &mut io::stdout())?
    };
    drop(input);
    let Some(mut form) = built else {
        eprintln!("Input berakhir sebelum formulir lengkap.");
        return Ok(false);
    };

    let request = match form.begin_submit() {
        Ok(r) => r,
        Err(e) => {
            render::display_error(&mut io::stderr(), &e.to_string())?;
            return Ok(false);
        }
    };

    let settings = healthguard_core::read_settings();

    if !json {
        println!("Menganalisis...");
    }
    let outcome = healthguard_diagnose::diagnose(&request, &settings).await;
    form.finish_submit();

    match outcome {
        Ok(result) => {
            emit(&result, json)?;
            Ok(true)
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), "diagnosis failed");
            render::display_error(&mut io::stderr(), &e.to_string())?;
            Ok(false)
        }
    }
}

fn run_parse(input: PathBuf, json: bool) -> Result<bool> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?
    };

    match healthguard_diagnose::parse_diagnosis(&raw) {
        Ok(result) => {
            emit(&result, json)?;
            Ok(true)
        }
        Err(e) => {
            render::display_error(&mut io::stderr(), &e.to_string())?;
            Ok(false)
        }
    }
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let s = healthguard_core::read_settings();
            println!("settings file: {}", healthguard_core::settings_path().display());
            println!("provider:      {}", s.provider);
            println!("model:         {}", s.model);
            println!("api key:       {}", mask(&s.api_key));
            println!("timeout:       {}s", s.timeout_secs);
            println!(
                "configured:    {}",
                if healthguard_core::ai_configured(&s) { "yes" } else { "no" }
            );
        }
        ConfigAction::Set {
            provider,
            model,
            api_key,
            timeout_secs,
        } => {
            // Start from the file only, so env overrides are not persisted.
            let path = healthguard_core::settings_path();
            let mut s: AiSettings = healthguard_core::read_settings_from(&path);
            if let Some(p) = provider {
                s.provider = p;
            }
            if let Some(m) = model {
                s.model = m;
            }
            if let Some(k) = api_key {
                s.api_key = k;
            }
            if let Some(t) = timeout_secs {
                s.timeout_secs = t;
            }
            healthguard_core::write_settings(&s)?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let ok = match cli.command {
        Commands::Symptoms => {
            for sym in SYMPTOMS {
                println!("{:<22} {}", sym.id.as_str(), sym.name);
            }
            true
        }
        Commands::Diagnose {
            symptoms,
            age,
            gender,
            json,
        } => run_diagnose(symptoms, age, gender, json).await?,
        Commands::Parse { input, json } => run_parse(input, json)?,
        Commands::Config { action } => {
            run_config(action)?;
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Cursor;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn diagnose_args_parse_ids_and_names() {
        let cli = Cli::try_parse_from([
            "healthguard",
            "diagnose",
            "-s",
            "fever",
            "--symptom",
            "Batuk",
            "--age",
            "33",
            "--gender",
            "female",
        ])
        .unwrap();
        match cli.command {
            Commands::Diagnose { symptoms, age, gender, json } => {
                assert_eq!(symptoms, vec![SymptomId::Fever, SymptomId::Cough]);
                assert_eq!(age, Some(33));
                assert_eq!(gender, Some(Gender::Female));
                assert!(!json);
            }
            _ => panic!("expected diagnose"),
        }
    }

    #[test]
    fn unknown_symptom_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["healthguard", "diagnose", "-s", "hiccups"]).is_err());
    }

    #[test]
    fn form_from_flags_dedups_repeated_symptoms() {
        let mut prompts = Vec::new();
        let form = build_form(
            vec![SymptomId::Rash, SymptomId::Rash, SymptomId::Fever],
            Some(10),
            Some(Gender::Male),
            &mut Cursor::new(""),
            &mut prompts,
        )
        .unwrap()
        .unwrap();
        assert_eq!(form.selected(), &[SymptomId::Rash, SymptomId::Fever]);
        assert!(form.can_submit());
        assert!(prompts.is_empty());
    }

    #[test]
    fn interactive_prompts_go_to_the_given_sink() {
        let mut prompts = Vec::new();
        let form = build_form(
            Vec::new(),
            None,
            None,
            &mut Cursor::new("1

40
perempuan
"),
            &mut prompts,
        )
        .unwrap()
        .unwrap();
        assert_eq!(form.selected(), &[SymptomId::Fever]);

        let shown = String::from_utf8(prompts).unwrap();
        assert!(shown.contains("Gejala apa yang Anda alami?"));
        assert!(shown.contains("Usia: "));
        assert!(shown.contains("Jenis Kelamin"));
    }

    #[test]
    fn color_needs_tty_and_no_no_color() {
        assert!(use_color(true, None));
        assert!(!use_color(false, None));
        assert!(!use_color(true, Some(OsString::from("1"))));
        assert!(!use_color(true, Some(OsString::new())));
        assert!(!use_color(false, Some(OsString::from("1"))));
    }

    #[test]
    fn form_from_flags_without_age_is_incomplete() {
        let form = build_form(
            vec![SymptomId::Rash],
            None,
            Some(Gender::Male),
            &mut Cursor::new(""),
            &mut Vec::new(),
        )
        .unwrap()
        .unwrap();
        assert!(!form.can_submit());
        assert_eq!(form.to_request().unwrap_err(), form::FormError::Incomplete);
    }

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask(""), "(not set)");
        assert_eq!(mask("AIzaSyABCDEF1234"), "****1234");
        assert_eq!(mask("ab"), "****ab");
    }
}
