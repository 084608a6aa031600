use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use indoc::indoc;
use log::{LevelFilter, info};
use serde::Serialize;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[cfg(feature = "pe_update")]
use rcjson::PeImageUpdate;
use rcjson::{
    BuiltinLocales, LanguageId, ResFileUpdate, Resource, ResourceScript, apply_resources,
};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const PE_IMAGE_EXTENSIONS: &[&str] = &["exe", "dll", "sys", "ocx", "cpl", "scr"];

/// One line of `--summary` output.
#[derive(Debug, Serialize)]
struct ResourceSummary<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: u16,
    language: u16,
    size: usize,
    output: &'a Path,
}

struct RcJson {
    input: PathBuf,
    output: PathBuf,
    confirm_overwrite: bool,
    summary: bool,
    verbosity_level: Option<LevelFilter>,
}

impl RcJson {
    fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let input = matches
            .get_one::<PathBuf>("INPUT")
            .context("INPUT is a required argument")?
            .clone();

        let output = match matches.get_one::<PathBuf>("output") {
            Some(path) => path.clone(),
            None => input.with_extension("res"),
        };

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            3 => Some(LevelFilter::Trace),
            _ => {
                eprintln!("using more than -vvv does not affect verbosity level");
                Some(LevelFilter::Trace)
            }
        };

        Ok(RcJson {
            input,
            output,
            confirm_overwrite: !matches.get_flag("no-confirm-overwrite"),
            summary: matches.get_flag("summary"),
            verbosity_level,
        })
    }

    fn run(&self) -> Result<()> {
        self.try_to_initialize_logging();

        let text = fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read `{}`", self.input.display()))?;

        let base_dir = match self.input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let script = ResourceScript::from_json_str(&text, &BuiltinLocales)
            .with_context(|| format!("failed to load `{}`", self.input.display()))?
            .with_base_dir(base_dir);

        let resources = script.compile()?;

        if is_pe_image_path(&self.output) {
            self.update_image(script.language, &resources)?;
        } else {
            self.check_output_target()?;
            let update = ResFileUpdate::open(&self.output)?;
            apply_resources(update, script.language, &resources)?;
        }

        info!(
            "wrote {} resource(s) to `{}`",
            resources.len(),
            self.output.display()
        );

        if self.summary {
            self.print_summary(script.language.value(), &resources)?;
        }

        Ok(())
    }

    /// Executables are updated in place, like a resource compiler's `UpdateResource` session.
    fn update_image(&self, language: LanguageId, resources: &[Resource]) -> Result<()> {
        #[cfg(feature = "pe_update")]
        {
            let update = PeImageUpdate::open(&self.output)?;
            apply_resources(update, language, resources)?;
            Ok(())
        }

        #[cfg(not(feature = "pe_update"))]
        {
            let _ = (language, resources);
            bail!(
                "Updating `{}` in place requires building `rcjson` with the `pe_update` feature.",
                self.output.display()
            );
        }
    }

    /// Refuses directories, and asks before replacing an existing file unless told otherwise.
    fn check_output_target(&self) -> Result<()> {
        let p = &self.output;

        if p.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                p.display()
            );
        }

        if p.exists() && self.confirm_overwrite {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Are you sure you want to override output file at {}",
                    p.display()
                ))
                .default(false)
                .interact()
                .context("Failed to write confirmation prompt to term")?;

            if !confirmed {
                bail!("Cancelled");
            }
        }

        Ok(())
    }

    fn print_summary(&self, language: u16, resources: &[Resource]) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for resource in resources {
            let line = ResourceSummary {
                kind: resource.kind.name(),
                id: resource.id,
                language,
                size: resource.data.len(),
                output: &self.output,
            };
            serde_json::to_writer(&mut out, &line)?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            if let Err(e) = TermLogger::init(
                level,
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ) {
                eprintln!("Failed to initialize logging: {e:?}");
            }
        }
    }
}

/// Outputs with an executable image extension are updated in place instead of written as `.res`.
fn is_pe_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PE_IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn command() -> Command {
    Command::new("rcjson")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile a JSON resource description into a Win32 .res file")
        .long_about(indoc!(r#"
            Compile a JSON resource description into a Win32 .res file.

            The description may contain a `version` section (RT_VERSION), a
            `messageTable` section (RT_MESSAGETABLE) and a `manifest` file name
            (RT_MANIFEST), all tagged with the language named by `language`.

            Manifest paths are resolved relative to the description's directory.

            By default a .res file is written next to INPUT. When --output names an
            executable image (EXE/DLL), the resources are written into that file
            instead, replacing entries with the same type, id and language.
        "#))
        .arg(
            Arg::new("INPUT")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON resource description."),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Writes the .res file to PATH (defaults to INPUT with a `.res` extension). \
                       Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`. \
                       If PATH is an existing executable (.exe, .dll, .sys, ...), its resources are updated in place."),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help("When set, will not ask for confirmation before overwriting files, useful for automation"),
        )
        .arg(
            Arg::new("summary")
                .long("summary")
                .action(ArgAction::SetTrue)
                .help("Print one JSON line per written resource to stdout."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help(indoc!("
                    Sets debug prints level for the application:
                        -v   - info
                        -vv  - debug
                        -vvv - trace
                    NOTE: trace output is only available in debug builds, as it is extremely verbose."))
        )
}

fn main() -> Result<()> {
    let matches = command().get_matches();
    let app = RcJson::from_cli_matches(&matches)?;
    app.run()
}
