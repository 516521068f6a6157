use anyhow::{Ok, Result};

/// One line of a tree script.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Statement {
    Insert(i64),
    Remove(i64),
    Contains(i64),
    Successor(i64),
    Min,
    Max,
    Peek,
    Len,
    SetLimit(usize),
    Print,
}

pub trait Parser {
    fn parse_lines(&self, s: &str) -> Result<Vec<Statement>>;
    fn parse_line(&self, s: &str) -> Result<Statement>;
}

pub struct ScriptParser {}

impl ScriptParser {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for ScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for ScriptParser {
    fn parse_lines(&self, s: &str) -> Result<Vec<Statement>> {
        let mut vec: Vec<Statement> = Vec::new();

        for line in s.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let stm = self.parse_line(line)?;
            vec.push(stm);
        }

        Ok(vec)
    }

    fn parse_line(&self, s: &str) -> Result<Statement> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.is_empty() || tokens.len() > 2 {
            anyhow::bail!("expected one keyword and at most one argument");
        }

        let stm = tokens[0];

        if tokens.len() == 1 {
            return match stm.to_lowercase().as_str() {
                "min" => Ok(Statement::Min),
                "max" => Ok(Statement::Max),
                "top" => Ok(Statement::Peek),
                "len" => Ok(Statement::Len),
                "ord" => Ok(Statement::Print),
                e => anyhow::bail!("unknown statement {}", e),
            };
        }

        match stm.to_lowercase().as_str() {
            "ins" => {
                let value: i64 = tokens[1].parse()?;
                Ok(Statement::Insert(value))
            }
            "rem" => {
                let value: i64 = tokens[1].parse()?;
                Ok(Statement::Remove(value))
            }
            "has" => {
                let value: i64 = tokens[1].parse()?;
                Ok(Statement::Contains(value))
            }
            "suc" => {
                let value: i64 = tokens[1].parse()?;
                Ok(Statement::Successor(value))
            }
            "lim" => {
                let limit: usize = tokens[1].parse()?;
                Ok(Statement::SetLimit(limit))
            }
            e => anyhow::bail!("unknown statement {}", e),
        }
    }
}
