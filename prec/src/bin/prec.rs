use std::process::exit;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use prec::{parse, Dumper, Error, EvalContext, Number, Prelude};

/// The precision calculator with the lispy dialect.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Evaluate one expression and exit instead of starting the REPL.
    #[arg(short = 'c')]
    code: Option<String>,

    /// Print the parse tree of each expression before its value.
    #[arg(short, long)]
    verbose: bool,

    /// Number of fractional digits printed for inexact results.
    #[arg(short, long, default_value_t = 10)]
    precision: usize,
}


struct Session<'p> {
    context: EvalContext<'p>,
    dumper: Dumper,
    verbose: bool,
    precision: usize,
}

impl<'p> Session<'p> {
    fn run(&self, line: &str) -> Result<Option<Number>, Error> {
        let expr = parse(line)?;
        if self.verbose {
            print!("{}", self.dumper.dump(&expr)?);
        }
        self.context.evaluate(&expr)
    }

    /// Evaluate a line and print the outcome. Returns false on error.
    fn run_and_print(&self, line: &str) -> bool {
        match self.run(line) {
            Ok(Some(value)) => {
                println!("{:.*}", self.precision, value);
                true
            }
            Ok(None) => true,
            Err(err) => {
                report(err, line);
                false
            }
        }
    }
}


fn report(err: Error, line: &str) {
    let err = err.render(Some(line));
    match err.rendered() {
        Some(text) => eprintln!("{}", text),
        None => eprintln!("Error: {:?}", err),
    }
}


fn help(prelude: &Prelude) {
    println!("Enter an s-expression such as (+ 1 (* 2 3)) to evaluate it.");
    println!("Functions: {}", prelude.names().join(" "));
    println!("Commands:");
    println!("  help       Show this help");
    println!("  verbose    Toggle printing of parse trees");
    println!("  quit       Exit");
}


fn repl(session: &mut Session) -> Result<(), ReadlineError> {
    println!("prec v{}", env!("CARGO_PKG_VERSION"));
    println!("The precision calculator with the lispy dialect.");

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("; ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    "quit" | "exit" => break,
                    "help" => help(session.context.prelude()),
                    "verbose" => {
                        session.verbose = !session.verbose;
                        println!("verbose {}", if session.verbose { "on" } else { "off" });
                    }
                    _ => {
                        session.run_and_print(line);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    Ok(())
}


fn main() {
    let args = Cli::parse();
    let prelude = Prelude::new();

    let mut session = Session {
        context: EvalContext::new(&prelude),
        dumper: Dumper::default(),
        verbose: args.verbose,
        precision: args.precision,
    };

    if let Some(code) = args.code {
        if !session.run_and_print(code.trim()) {
            exit(1);
        }
        return;
    }

    if let Err(err) = repl(&mut session) {
        eprintln!("Error: {}", err);
        exit(1);
    }
}
