use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;

use tlox::{run, Interpreter, RunStatus};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() > 2 {
        eprintln!("Usage: tlox [script]");
        process::exit(64);
    } else if args.len() == 2 {
        run_file(&args[1]);
    } else if let Err(error) = run_prompt() {
        eprintln!("Error reading input: {error}");
        process::exit(74);
    }
}

fn run_file(path: &str) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("Error reading file '{path}': {error}");
            process::exit(66);
        }
    };

    let mut interpreter = Interpreter::stdout();
    let status = run(&text, &mut interpreter);
    report(&status);

    if status.had_error() {
        process::exit(65);
    }
    if status.had_runtime_error() {
        process::exit(70);
    }
}

fn run_prompt() -> io::Result<()> {
    let mut interpreter = Interpreter::stdout();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        report(&run(&line?, &mut interpreter));
    }

    Ok(())
}

fn report(status: &RunStatus) {
    for error in &status.syntax_errors {
        eprintln!("{error}");
    }
    for error in &status.runtime_errors {
        eprintln!("{error}");
    }
}
