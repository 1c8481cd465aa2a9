//! The `jot` command-line interface.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

use anyhow::{bail, Context as _, Result};
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "\
usage: jot [options] <file>

options:
  -e, --exec <expr>        evaluate the expression instead of a file
  -V, --ext-str <k=v>      set an external string variable
      --ext-code <k=v>     set an external code variable
  -A, --tla-str <k=v>      set a top-level string argument
      --tla-code <k=v>     set a top-level code argument
  -J, --jpath <dir>        add a library search path (repeatable)
  -o, --output-file <f>    write to a file instead of stdout
  -S, --string             expect a string result, output it raw
      --max-stack <n>      evaluator recursion budget (default 500)
  -h, --help               print this help
      --version            print the version
";

fn main() -> ExitCode {
  let logger_env = env_logger::Env::default().default_filter_or("warn");
  if let Err(e) = env_logger::try_init_from_env(logger_env) {
    eprintln!("jot: cannot init logger: {e}");
  }
  match run() {
    Ok(code) => code,
    Err(e) => {
      eprintln!("{e:#}");
      ExitCode::FAILURE
    }
  }
}

fn run() -> Result<ExitCode> {
  let mut args = pico_args::Arguments::from_env();
  if args.contains(["-h", "--help"]) {
    print!("{USAGE}");
    return Ok(ExitCode::SUCCESS);
  }
  if args.contains("--version") {
    println!("jot {}", env!("CARGO_PKG_VERSION"));
    return Ok(ExitCode::SUCCESS);
  }
  let mut options = jot::Options::default();
  for (name, value) in kv_args(&mut args, ["-V", "--ext-str"], "--ext-str")? {
    options.ext_vars.push((name, value));
  }
  for (name, value) in kv_args(&mut args, "--ext-code", "--ext-code")? {
    options.ext_codes.push((name, value));
  }
  for (name, value) in kv_args(&mut args, ["-A", "--tla-str"], "--tla-str")? {
    options.tla_vars.push((name, value));
  }
  for (name, value) in kv_args(&mut args, "--tla-code", "--tla-code")? {
    options.tla_codes.push((name, value));
  }
  while let Some(dir) = args.opt_value_from_str::<_, PathBuf>(["-J", "--jpath"])? {
    options.search_paths.push(dir);
  }
  if let Some(n) = args.opt_value_from_str("--max-stack")? {
    options.max_stack = n;
  }
  options.string_output = args.contains(["-S", "--string"]);
  let expr: Option<String> = args.opt_value_from_str(["-e", "--exec"])?;
  let output: Option<PathBuf> = args.opt_value_from_str(["-o", "--output-file"])?;

  let result = match expr {
    Some(source) => {
      let rest = args.finish();
      if !rest.is_empty() {
        bail!("unexpected arguments after -e: {rest:?}");
      }
      log::info!("evaluating command-line expression");
      jot::evaluate(&source, &jot::Origin::synthetic("<cmdline>"), &options)
    }
    None => {
      let rest = args.finish();
      let [file] = rest.as_slice() else {
        bail!("expected exactly one input file\n{USAGE}");
      };
      let file = PathBuf::from(file);
      log::info!("evaluating {}", file.display());
      jot::evaluate_file(&file, &options)
    }
  };
  let text = match result {
    Ok(text) => text,
    Err(diagnostic) => {
      eprintln!("{diagnostic}");
      return Ok(ExitCode::FAILURE);
    }
  };
  match output {
    Some(path) => {
      let mut f = std::fs::File::create(&path)
        .with_context(|| format!("cannot create {}", path.display()))?;
      writeln!(f, "{text}").context("cannot write output")?;
    }
    None => println!("{text}"),
  }
  Ok(ExitCode::SUCCESS)
}

/// Collects every occurrence of a repeatable `key=value` flag.
fn kv_args<K>(
  args: &mut pico_args::Arguments,
  keys: K,
  flag: &'static str,
) -> Result<Vec<(String, String)>>
where
  K: Into<pico_args::Keys> + Copy,
{
  let mut ret = Vec::<(String, String)>::new();
  while let Some(kv) = args.opt_value_from_str::<_, String>(keys)? {
    let Some((k, v)) = kv.split_once('=') else {
      bail!("expected `name=value` for {flag}, got `{kv}`");
    };
    ret.push((k.to_owned(), v.to_owned()));
  }
  Ok(ret)
}
