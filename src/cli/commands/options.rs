use anyhow::Result;

use super::util::{parse_assignment, parse_cli_value, parse_name, print_json};
use optstore::{Options, get_global_options};

pub(crate) fn cmd_build(pairs: &[String], json: bool) -> Result<()> {
    let pairs = pairs
        .iter()
        .map(|entry| parse_assignment(entry))
        .collect::<Result<Vec<_>>>()?;
    let options = Options::from_pairs(pairs)?;
    print_options(&options, json)
}

pub(crate) fn cmd_get(name: &str, default: Option<&str>) -> Result<()> {
    let name = parse_name(name)?;
    let default = default.map(parse_cli_value);
    let value = get_global_options(None).get(&name, default.as_ref())?;
    println!("{value}");
    Ok(())
}

pub(crate) fn cmd_show(json: bool) -> Result<()> {
    print_options(&get_global_options(None), json)
}

fn print_options(options: &Options, json: bool) -> Result<()> {
    if json {
        return print_json(options);
    }
    if options.empty() {
        println!("(empty)");
    } else {
        for (name, value) in options.iter() {
            println!("{name} = {value}");
        }
    }
    Ok(())
}
