use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Result, bail};

use super::decls::{print_table, select_declarations};
use super::util::parse_cli_value;
use optstore::{Host, HostValue, Options, SessionState};

const HELP: &str = "Commands:
  set <name> <value>           kind-checked update of one global option
  get <name> [default]         kind-checked read (declared default when omitted)
  load <name> <value> ...      replace the global options with a new object
  call <method> [args...]      invoke an options method on the global options
  show                         print the global options
  clear                        replace the global options with an empty object
  bind                         route global options through a fresh session
  unbind                       go back to the process-wide options
  scope                        show where global options currently live
  decls [prefix]               list declared options
  quit/exit                    leave the REPL";

pub(crate) fn cmd_repl() -> Result<()> {
    let mut host = Host::new();
    let stdin = io::stdin();
    let mut input = String::new();

    println!("optstore REPL. Commands: set, get, load, call, show, clear, bind, unbind, scope, decls, help, quit.");
    loop {
        print!("options> ");
        io::stdout().flush().ok();
        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            continue;
        };
        let remaining: Vec<HostValue> = parts.map(|tok| HostValue::Raw(parse_cli_value(tok))).collect();

        let result = match cmd {
            "help" => {
                println!("{HELP}");
                Ok(())
            }
            "quit" | "exit" => break,
            "set" => {
                if remaining.len() != 2 {
                    println!("usage: set <name> <value>");
                    continue;
                }
                host.set_option(&remaining).map_err(Into::into)
            }
            "get" => run_get(&host, &remaining),
            "load" => host
                .options(&remaining)
                .map(|o| host.scope().set_options(o))
                .map_err(Into::into),
            "call" => run_call(&host, line),
            "show" => {
                println!("{}", host.get_options());
                Ok(())
            }
            "clear" => {
                host.scope().set_options(Options::new());
                Ok(())
            }
            "bind" => {
                let session = SessionState::new(host.get_options());
                host.bind(Arc::new(session));
                println!("bound to a new session (seeded from the current options)");
                Ok(())
            }
            "unbind" => {
                host.unbind();
                println!("using process-wide options");
                Ok(())
            }
            "scope" => {
                let label = if host.scope().is_bound() { "session" } else { "process" };
                println!("{label}");
                Ok(())
            }
            "decls" => run_decls(line),
            _ => Err(anyhow::anyhow!("unknown command `{cmd}`; try `help`")),
        };

        if let Err(err) = result {
            eprintln!("error: {err}");
        }
    }

    Ok(())
}

fn run_get(host: &Host, args: &[HostValue]) -> Result<()> {
    if args.is_empty() || args.len() > 2 {
        bail!("usage: get <name> [default]");
    }
    let value = host.call(&host.get_options(), "get", args)?;
    println!("{value}");
    Ok(())
}

fn run_call(host: &Host, line: &str) -> Result<()> {
    let mut tokens = line.split_whitespace().skip(1);
    let Some(method) = tokens.next() else {
        bail!("usage: call <method> [args...]");
    };
    let args: Vec<HostValue> = tokens.map(|tok| HostValue::Raw(parse_cli_value(tok))).collect();
    let result = host.call(&host.get_options(), method, &args)?;
    println!("{result}");
    Ok(())
}

fn run_decls(line: &str) -> Result<()> {
    let decls = select_declarations(line.split_whitespace().nth(1))?;
    print_table(&decls);
    Ok(())
}
