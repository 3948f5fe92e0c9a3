use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};

use bhasha::diagnostics::ErrorLanguage;
use bhasha::interpreter::Interpreter;
use bhasha::pipeline::{PipelineOptions, run_source};

fn main() -> Result<ExitCode> {
    let mut args = std::env::args().skip(1);
    let mut options = PipelineOptions::default();
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ir" => {
                options.emit_ir = true;
            }
            "--no-semantic" => {
                options.run_semantic = false;
            }
            "--debug" => {
                options.debug = true;
            }
            "--lang" | "-l" => {
                let flag = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing language after {arg}"))?;
                options.error_language = ErrorLanguage::from_flag(&flag)
                    .ok_or_else(|| anyhow::anyhow!("Unknown language '{flag}' (en|hi|both)"))?;
            }
            _ => {
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one input file is supported");
                }
                break;
            }
        }
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let mut interpreter = Interpreter::new();
    let code = run_source(&source, &mut interpreter, &options)?;
    let output = interpreter.take_output();
    if !output.is_empty() {
        print!("{output}");
    }
    Ok(ExitCode::from(code as u8))
}
