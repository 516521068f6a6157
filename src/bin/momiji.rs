use std::{
    fs::File,
    io::{self, Read, Write},
    path::PathBuf,
};
const NIL_KEYWORD: &str = "NIL";

use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use momiji::rbtree::{
    cli::Cli,
    parser::{self, Parser as _, Statement},
    RbTree,
};

fn read_from_stdin(buf: &mut String) -> Result<()> {
    let mut stdin = io::stdin();
    stdin.read_to_string(buf)?;

    Ok(())
}

fn read_from_file(buf: &mut String, path: PathBuf) -> Result<()> {
    let mut f = File::open(path)?;
    f.read_to_string(buf)?;

    Ok(())
}

fn process_statements(stms: Vec<Statement>) -> Result<String> {
    let mut tree: RbTree<i64> = RbTree::default();
    let mut s = String::new();

    for stm in stms {
        match stm {
            parser::Statement::Insert(value) => {
                tree.insert(value).ok();
            }
            parser::Statement::Remove(value) => {
                tree.remove(&value);
            }
            parser::Statement::Contains(value) => {
                let answer = if tree.contains(&value) { 1 } else { 0 };
                s.push_str(&format!("HAS {value}\n{answer}\n"));
            }
            parser::Statement::Successor(value) => {
                s.push_str(&format!("SUC {value}\n"));

                match tree.successor(&value) {
                    Some(succ) => s.push_str(&format!("{succ}\n")),
                    None => s.push_str(&format!("{NIL_KEYWORD}\n")),
                }
            }
            parser::Statement::Min => {
                s.push_str("MIN\n");

                match tree.min() {
                    Some(key) => s.push_str(&format!("{key}\n")),
                    None => s.push_str(&format!("{NIL_KEYWORD}\n")),
                }
            }
            parser::Statement::Max => {
                s.push_str("MAX\n");

                match tree.max() {
                    Some(key) => s.push_str(&format!("{key}\n")),
                    None => s.push_str(&format!("{NIL_KEYWORD}\n")),
                }
            }
            parser::Statement::Peek => {
                s.push_str("TOP\n");

                match tree.peek() {
                    Some(key) => s.push_str(&format!("{key}\n")),
                    None => s.push_str(&format!("{NIL_KEYWORD}\n")),
                }
            }
            parser::Statement::Len => {
                s.push_str(&format!("LEN\n{}\n", tree.len()));
            }
            parser::Statement::SetLimit(limit) => {
                let limit = if limit == 0 { None } else { Some(limit) };
                tree.set_limit(limit).ok();
            }
            parser::Statement::Print => {
                s.push_str("ORD\n");

                let res = tree.iter().join(" ");
                s.push_str(&res);
                s.push('\n');
            }
        }
    }

    Ok(s)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut buf = String::new();

    match cli.input {
        Some(path) => read_from_file(&mut buf, path)?,
        None => read_from_stdin(&mut buf)?,
    }

    let mut writer: Box<dyn Write>;

    writer = match cli.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    let parser = parser::ScriptParser::default();
    let stms = parser.parse_lines(&buf)?;

    let output_string = process_statements(stms)?;
    writer.write_all(output_string.as_bytes())?;

    Ok(())
}
