//! cause CLI - inspect, rewrite and run expressions.

mod json;
mod output;

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use cause_ast::{LineIndex, Printer};
use cause_compiler::{CompileError, CompileOptions, Compiled, Compiler};
use cause_interp::{eager, Descriptors, Interpreter, Value};
use cause_process::{ChildEvent, Sender, Start};
use cause_transform::Symbols;
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use log::warn;

#[derive(Parser)]
#[command(name = "cause", version)]
#[command(about = "Rewrite expressions so State is only consumed through the dependency runtime")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Name bound outside the expression (repeatable)
    #[arg(long = "symbol", global = true)]
    symbols: Vec<String>,

    /// Fail when a free variable has no binding
    #[arg(long, global = true)]
    strict: bool,

    /// Identifier that names the dependency runtime
    #[arg(long, global = true, default_value = cause_ast::DEFAULT_NAMESPACE)]
    namespace: String,
}

#[derive(Args)]
struct Input {
    /// Source file
    #[arg(required_unless_present = "expr")]
    file: Option<PathBuf>,

    /// Source given inline
    #[arg(short = 'e', long = "eval", conflicts_with = "file")]
    expr: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Tokenize and print tokens
    Lex {
        #[command(flatten)]
        input: Input,
    },

    /// Parse and print the expression
    Parse {
        #[command(flatten)]
        input: Input,
    },

    /// Rewrite and print the type and generated code
    Compile {
        #[command(flatten)]
        input: Input,
    },

    /// Rewrite, run eagerly, and print the result
    Run {
        #[command(flatten)]
        input: Input,

        /// Bind a free variable to a JSON value (NAME=JSON)
        #[arg(long = "bind", value_parser = json::parse_binding)]
        bindings: Vec<(String, serde_json::Value)>,

        /// Bind NAME to a function returning entries of a JSON object as State (NAME=JSON)
        #[arg(long = "lookup", value_parser = json::parse_binding)]
        lookups: Vec<(String, serde_json::Value)>,
    },

    /// Run a program and print its lifecycle events
    Spawn {
        /// Exchange newline-delimited JSON with the child over stdin/stdout
        #[arg(long)]
        messaging: bool,

        /// Interrupt the child's process group after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        program: PathBuf,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() {
    output::init();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let options = CompileOptions {
        namespace: cli.namespace,
        strict_free_variables: cli.strict,
    };
    let symbols = Symbols::from(cli.symbols);

    match cli.command {
        Command::Lex { input } => cmd_lex(&input.read()),
        Command::Parse { input } => cmd_parse(&input.read(), &options.namespace),
        Command::Compile { input } => cmd_compile(&input.read(), symbols, options),
        Command::Run { input, bindings, lookups } => {
            let mut values: IndexMap<String, Value> = bindings
                .iter()
                .map(|(name, json)| (name.clone(), json::to_value(json)))
                .collect();
            for (name, table) in &lookups {
                values.insert(name.clone(), json::lookup(name, table));
            }
            cmd_run(&input.read(), symbols, options, &values);
        }
        Command::Spawn { messaging, timeout, program, args } => cmd_spawn(program, args, messaging, timeout),
    }
}

impl Input {
    fn read(&self) -> String {
        if let Some(expr) = &self.expr {
            return expr.clone();
        }
        let Some(path) = &self.file else {
            eprintln!("{}: no input; pass a file or -e <expr>", output::error_label());
            process::exit(1);
        };
        match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }
}

fn cmd_lex(source: &str) {
    let result = cause_lexer::Lexer::new(source).tokenize();

    for error in &result.errors {
        show_error(source, error.span.start, &error.message, error.hint.as_deref());
    }

    if result.is_ok() {
        println!("=== Tokens ({}) ===\n", result.tokens.len());
        for tok in &result.tokens {
            println!("{:4}:{:<3} {:?}", tok.span.start, tok.span.end, tok.kind);
        }
        println!("\n{}", output::banner_ok("Lex"));
    } else {
        eprintln!("\n{}", output::banner_fail("Lex", result.errors.len()));
        process::exit(1);
    }
}

fn cmd_parse(source: &str, namespace: &str) {
    let result = cause_parser::parse_source(source);

    for error in &result.errors {
        show_error(source, error.span.start, &error.message, error.hint.as_deref());
    }

    match result.expr {
        Some(expr) if result.errors.is_empty() => {
            println!("{}", Printer::new(namespace).print(&expr));
            println!("\n{}", output::banner_ok("Parse"));
        }
        _ => {
            eprintln!("\n{}", output::banner_fail("Parse", result.errors.len()));
            process::exit(1);
        }
    }
}

fn cmd_compile(source: &str, symbols: Symbols, options: CompileOptions) {
    let compiled = compile_or_exit(&Compiler::new(options), symbols, source);

    println!("{} {}", output::label("type:"), output::ty(&compiled.ty.to_string()));
    if !compiled.free().is_empty() {
        println!("{} {}", output::label("free:"), compiled.free().join(", "));
    }
    println!("{}", compiled.code);
}

fn cmd_run(source: &str, symbols: Symbols, options: CompileOptions, values: &IndexMap<String, Value>) {
    let compiler = Compiler::new(options);
    let compiled = compile_or_exit(&compiler, symbols, source);
    if let Err(error) = compiler.check_bindings(&compiled, values) {
        report_compile_error(source, &error);
        process::exit(1);
    }

    let interp = Interpreter::new(&Descriptors);
    let result = compiled
        .unit
        .invoke(&interp, values)
        .and_then(|value| eager::resolve(&interp, value));
    match result {
        Ok(value) => println!("{}", value),
        Err(error) => {
            eprintln!("{}: {}", output::error_label(), error);
            process::exit(1);
        }
    }
}

fn compile_or_exit(compiler: &Compiler, symbols: Symbols, source: &str) -> Compiled {
    match compiler.compile(symbols, source) {
        Ok(compiled) => compiled,
        Err(error) => {
            report_compile_error(source, &error);
            process::exit(1);
        }
    }
}

fn report_compile_error(source: &str, error: &CompileError) {
    match error {
        CompileError::Parse(errors) if !errors.is_empty() => {
            for e in errors {
                show_error(source, e.span.start, &e.message, e.hint.as_deref());
            }
        }
        CompileError::Transform(e) => show_error(source, e.span().start, &e.to_string(), None),
        CompileError::MissingBindings(_) => {
            eprintln!("{}: {}", output::error_label(), error);
            eprintln!(
                "   {} {}: {}",
                output::hint_equals(),
                output::hint_label(),
                output::hint_text("bind them with --bind NAME=JSON")
            );
        }
        CompileError::Parse(_) => eprintln!("{}: {}", output::error_label(), error),
    }
}

fn cmd_spawn(program: PathBuf, args: Vec<String>, messaging: bool, timeout: Option<u64>) {
    let mut start = Start::new(program, args);
    start.messaging = messaging;

    let (tx, rx) = mpsc::channel();
    let Some(cancel) = cause_process::start(start, move |event| {
        let _ = tx.send(event);
    }) else {
        if let Ok(ChildEvent::Error { error }) = rx.recv() {
            eprintln!("{}: {}", output::error_label(), error);
        }
        process::exit(1);
    };

    let mut deadline = timeout.map(|secs| Instant::now() + Duration::from_secs(secs));
    loop {
        let event = match deadline {
            Some(at) => match rx.recv_timeout(at.saturating_duration_since(Instant::now())) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => {
                    deadline = None;
                    if let Err(error) = cancel.cancel() {
                        eprintln!("{}: {}", output::error_label(), error);
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(event) => event,
                Err(_) => break,
            },
        };

        match event {
            ChildEvent::Started { pid, send } => {
                println!("{} pid {}", output::event("started"), pid);
                if messaging {
                    forward_stdin(send);
                }
            }
            ChildEvent::Message { event } => println!("{} {}", output::event("message"), event),
            ChildEvent::Error { error } => eprintln!("{}: {}", output::error_label(), error),
            ChildEvent::Exited { exit_code } => {
                println!("{} {}", output::event("exited"), output::exit_status(exit_code));
                // 128 + SIGINT, as a shell reports it.
                process::exit(exit_code.unwrap_or(130));
            }
        }
    }
}

/// Send each JSON line of our stdin to the child, closing its input at EOF.
fn forward_stdin(send: Sender) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(event) => {
                    if let Err(error) = send.send(&event) {
                        warn!("stopped forwarding input: {}", error);
                        break;
                    }
                }
                Err(error) => warn!("skipping malformed input line: {}", error),
            }
        }
        send.close();
    });
}

fn show_error(source: &str, pos: usize, message: &str, hint: Option<&str>) {
    let index = LineIndex::new(source);
    let location = index.locate(pos);
    let line = index.line(source, location.line).unwrap_or_default();

    eprintln!();
    eprintln!("{}: {}", output::error_label(), message);
    eprintln!("  {} line {}:{}", output::error_arrow(), location.line, location.column);
    eprintln!("   {}", output::pipe());
    eprintln!("{}{} {}", output::line_number(location.line), output::pipe(), line);
    eprintln!(
        "   {} {}{}",
        output::pipe(),
        " ".repeat(location.column.saturating_sub(1)),
        output::caret()
    );

    if let Some(hint) = hint {
        eprintln!("   {}", output::pipe());
        eprintln!("   {} {}: {}", output::hint_equals(), output::hint_label(), output::hint_text(hint));
    }
}
