// Copyright (c) 2017-2021 Fabian Schuiki

#[macro_use]
extern crate clap;
use anyhow::{anyhow, Context, Result};
use clap::Arg;
use ssir::{
    assembly::{parse_module, write_module},
    pass,
    stats::{summarize, Statistics},
    verifier::Verifier,
};
use std::{
    fs::File,
    io::{BufWriter, Read, Write},
};

fn main() {
    env_logger::init();
    match main_inner() {
        Ok(_) => (),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn main_inner() -> Result<()> {
    let matches = app_from_crate!()
        .about("Optimizes SSIR assembly.")
        .arg(
            Arg::with_name("input")
                .help("SSIR file to optimize")
                .required(true),
        )
        .arg(
            Arg::with_name("output")
                .help("File to write the optimized module to")
                .required(true),
        )
        .arg(
            Arg::with_name("mem2reg")
                .long("mem2reg")
                .help("Perform memory to register promotion before CSE"),
        )
        .arg(
            Arg::with_name("no-cse")
                .long("no-cse")
                .help("Do not perform the CSE optimization pipeline"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .help("Dump statistics to stderr"),
        )
        .arg(
            Arg::with_name("no-verify")
                .long("no-verify")
                .help("Do not check the module after optimization"),
        )
        .get_matches();

    // Read the input.
    let input_path = matches.value_of("input").unwrap();
    let mut module = {
        let mut input = File::open(input_path)
            .with_context(|| format!("cannot open `{}`", input_path))?;
        let mut contents = String::new();
        input
            .read_to_string(&mut contents)
            .with_context(|| format!("cannot read `{}`", input_path))?;
        parse_module(&contents)
            .map_err(|e| anyhow!("{}:{}", input_path, e))?
    };

    // If requested, do some early optimizations.
    if matches.is_present("mem2reg") {
        pass::mem2reg::run_on_module(&mut module);
    }

    // Apply the optimization pipeline.
    let mut stats = Statistics::new();
    if !matches.is_present("no-cse") {
        pass::optimize(&mut module, &mut stats);
    }

    // Collect statistics on the module and write the CSV side channel.
    summarize(&module, &mut stats);
    let output_path = matches.value_of("output").unwrap();
    {
        let stats_path = format!("{}.stats", output_path);
        let mut sink = File::create(&stats_path)
            .with_context(|| format!("cannot create `{}`", stats_path))?;
        stats.write_csv(&mut sink)?;
    }
    if matches.is_present("verbose") {
        eprint!("{}", stats);
    }

    // Verify the integrity of the module, do this by default.
    if !matches.is_present("no-verify") {
        let mut verifier = Verifier::new();
        verifier.verify_module(&module);
        verifier
            .finish()
            .map_err(|errs| anyhow!("verification failed after optimization:\n{}", errs))?;
    }

    // Write the final module.
    let output = File::create(output_path)
        .with_context(|| format!("cannot create `{}`", output_path))?;
    let mut output = BufWriter::with_capacity(1 << 20, output);
    write_module(&mut output, &module)?;
    output.flush()?;

    Ok(())
}
