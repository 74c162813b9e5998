//! Script parser for the macro DSL
//!
//! Two phases: each line is matched against its leading keyword to form a
//! statement, and a stack of open frames ties `if`/`for` blocks to their
//! closers. Parsing is all-or-nothing: a script with an unmatched block or
//! a malformed statement produces a syntax error and nothing executes.

mod ast;

pub use ast::Statement;

use crate::error::{Error, Result};

/// An open block awaiting its closer.
enum Frame {
    If {
        line: usize,
        condition: String,
        then_block: Vec<Statement>,
        else_block: Vec<Statement>,
        in_else: bool,
    },
    For {
        line: usize,
        var: String,
        items: Vec<String>,
        body: Vec<Statement>,
    },
}

impl Frame {
    fn block_mut(&mut self) -> &mut Vec<Statement> {
        match self {
            Frame::If {
                then_block,
                else_block,
                in_else,
                ..
            } => {
                if *in_else {
                    else_block
                } else {
                    then_block
                }
            }
            Frame::For { body, .. } => body,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Frame::If { .. } => "if",
            Frame::For { .. } => "for",
        }
    }

    fn closer(&self) -> &'static str {
        match self {
            Frame::If { .. } => "endif",
            Frame::For { .. } => "done",
        }
    }
}

/// Parse script text into a statement sequence.
///
/// Blank lines are dropped; `#` lines become [`Statement::Comment`] nodes.
/// Lines starting with a DSL keyword (`if`, `else`, `endif`, `for`, `done`,
/// `set`, `echo`, `wait`, `sleep`, `terminal`) become their statement; any
/// other line becomes [`Statement::Raw`].
pub fn parse(text: &str) -> Result<Vec<Statement>> {
    let mut output = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            emit(&mut output, &mut stack, Statement::Comment { line: line_no });
            continue;
        }

        let (keyword, rest) = split_keyword(line);
        match keyword {
            "if" => {
                if rest.is_empty() {
                    return Err(Error::syntax_at("\"if\" is missing a condition", line_no));
                }
                stack.push(Frame::If {
                    line: line_no,
                    condition: rest.to_string(),
                    then_block: Vec::new(),
                    else_block: Vec::new(),
                    in_else: false,
                });
            }
            "else" => {
                if !rest.is_empty() {
                    return Err(Error::syntax_at("unexpected text after \"else\"", line_no));
                }
                match stack.last_mut() {
                    Some(Frame::If { in_else, .. }) if !*in_else => *in_else = true,
                    Some(Frame::If { .. }) => {
                        return Err(Error::syntax_at("duplicate \"else\"", line_no));
                    }
                    Some(Frame::For { .. }) | None => {
                        return Err(Error::syntax_at(
                            "\"else\" without a matching \"if\"",
                            line_no,
                        ));
                    }
                }
            }
            "endif" => close_block(&mut output, &mut stack, "endif", line_no)?,
            "done" => close_block(&mut output, &mut stack, "done", line_no)?,
            "for" => {
                let (var, items) = parse_for_header(rest, line_no)?;
                stack.push(Frame::For {
                    line: line_no,
                    var,
                    items,
                    body: Vec::new(),
                });
            }
            "set" => {
                let (name, value) = parse_assignment(rest, line_no)?;
                emit(
                    &mut output,
                    &mut stack,
                    Statement::Set {
                        name,
                        value,
                        line: line_no,
                    },
                );
            }
            "echo" => emit(
                &mut output,
                &mut stack,
                Statement::Echo {
                    text: rest.to_string(),
                    line: line_no,
                },
            ),
            "wait" | "sleep" => {
                if rest.is_empty() {
                    return Err(Error::syntax_at(
                        format!("\"{keyword}\" is missing a duration"),
                        line_no,
                    ));
                }
                emit(
                    &mut output,
                    &mut stack,
                    Statement::Wait {
                        duration: rest.to_string(),
                        line: line_no,
                    },
                );
            }
            "terminal" => {
                if rest.is_empty() {
                    return Err(Error::syntax_at(
                        "\"terminal\" is missing a command",
                        line_no,
                    ));
                }
                emit(
                    &mut output,
                    &mut stack,
                    Statement::Terminal {
                        command: rest.to_string(),
                        line: line_no,
                    },
                );
            }
            _ => emit(
                &mut output,
                &mut stack,
                Statement::Raw {
                    command: line.to_string(),
                    line: line_no,
                },
            ),
        }
    }

    if let Some(frame) = stack.last() {
        return Err(Error::syntax_at(
            format!(
                "unclosed \"{}\" (missing \"{}\")",
                frame.keyword(),
                frame.closer()
            ),
            match frame {
                Frame::If { line, .. } | Frame::For { line, .. } => *line,
            },
        ));
    }

    tracing::trace!(statements = output.len(), "parsed script");
    Ok(output)
}

/// Append a statement to the innermost open block, or to the top level.
fn emit(output: &mut Vec<Statement>, stack: &mut [Frame], stmt: Statement) {
    match stack.last_mut() {
        Some(frame) => frame.block_mut().push(stmt),
        None => output.push(stmt),
    }
}

/// Pop the innermost frame for `endif`/`done`, checking the frame type.
fn close_block(
    output: &mut Vec<Statement>,
    stack: &mut Vec<Frame>,
    closer: &str,
    line_no: usize,
) -> Result<()> {
    let frame = match (stack.pop(), closer) {
        (Some(frame @ Frame::If { .. }), "endif") => frame,
        (Some(frame @ Frame::For { .. }), "done") => frame,
        (Some(frame), _) => {
            return Err(Error::syntax_at(
                format!(
                    "\"{closer}\" does not match the open \"{}\" (expected \"{}\")",
                    frame.keyword(),
                    frame.closer()
                ),
                line_no,
            ));
        }
        (None, _) => {
            let opener = if closer == "endif" { "if" } else { "for" };
            return Err(Error::syntax_at(
                format!("\"{closer}\" without a matching \"{opener}\""),
                line_no,
            ));
        }
    };

    let stmt = match frame {
        Frame::If {
            line,
            condition,
            then_block,
            else_block,
            ..
        } => Statement::If {
            condition,
            then_block,
            else_block,
            line,
        },
        Frame::For {
            line,
            var,
            items,
            body,
        } => Statement::For {
            var,
            items,
            body,
            line,
        },
    };
    emit(output, stack, stmt);
    Ok(())
}

/// Split a line into its first whitespace-delimited token and the rest.
fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    }
}

/// Parse `NAME in ITEM...` after the `for` keyword.
fn parse_for_header(rest: &str, line_no: usize) -> Result<(String, Vec<String>)> {
    let mut tokens = rest.split_whitespace();
    let var = tokens.next().unwrap_or_default();
    if !is_identifier(var) {
        return Err(Error::syntax_at(
            "expected \"for NAME in ITEM...\"",
            line_no,
        ));
    }
    if tokens.next() != Some("in") {
        return Err(Error::syntax_at(
            "expected \"in\" after the loop variable",
            line_no,
        ));
    }
    let items: Vec<String> = tokens.map(str::to_string).collect();
    Ok((var.to_string(), items))
}

/// Parse `NAME=VALUE` after the `set` keyword.
fn parse_assignment(rest: &str, line_no: usize) -> Result<(String, String)> {
    let Some((name, value)) = rest.split_once('=') else {
        return Err(Error::syntax_at(
            "expected \"set NAME=VALUE\"",
            line_no,
        ));
    };
    let name = name.trim();
    if !is_identifier(name) {
        return Err(Error::syntax_at(
            format!("invalid variable name '{name}'"),
            line_no,
        ));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flat_statements() {
        let stmts = parse("echo hello\nset name=Adrian\nwait 50\nterminal help\nstatus now")
            .unwrap();
        assert_eq!(stmts.len(), 5);
        assert_eq!(
            stmts[0],
            Statement::Echo {
                text: "hello".into(),
                line: 1
            }
        );
        assert_eq!(
            stmts[1],
            Statement::Set {
                name: "name".into(),
                value: "Adrian".into(),
                line: 2
            }
        );
        assert_eq!(
            stmts[4],
            Statement::Raw {
                command: "status now".into(),
                line: 5
            }
        );
    }

    #[test]
    fn blank_lines_dropped_comments_kept() {
        let stmts = parse("\n# a note\n\necho hi\n").unwrap();
        assert_eq!(
            stmts,
            vec![
                Statement::Comment { line: 2 },
                Statement::Echo {
                    text: "hi".into(),
                    line: 4
                },
            ]
        );
    }

    #[test]
    fn sleep_is_wait() {
        let stmts = parse("sleep 100").unwrap();
        assert_eq!(
            stmts[0],
            Statement::Wait {
                duration: "100".into(),
                line: 1
            }
        );
    }

    #[test]
    fn if_else_endif_blocks() {
        let stmts = parse("if $ready\necho yes\nelse\necho no\nendif").unwrap();
        let Statement::If {
            condition,
            then_block,
            else_block,
            line,
        } = &stmts[0]
        else {
            panic!("expected if statement");
        };
        assert_eq!(condition, "$ready");
        assert_eq!(*line, 1);
        assert_eq!(then_block.len(), 1);
        assert_eq!(else_block.len(), 1);
    }

    #[test]
    fn nested_for_in_if() {
        let stmts = parse("if 1\nfor i in a b\necho $i\ndone\nendif").unwrap();
        let Statement::If { then_block, .. } = &stmts[0] else {
            panic!("expected if statement");
        };
        let Statement::For { var, items, body, .. } = &then_block[0] else {
            panic!("expected for statement");
        };
        assert_eq!(var, "i");
        assert_eq!(items, &["a", "b"]);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn unclosed_if_names_line_and_keyword() {
        let err = parse("echo start\nif $x\necho inside").unwrap_err();
        let Error::ScriptSyntax { message, line } = err else {
            panic!("expected syntax error");
        };
        assert_eq!(line, 2);
        assert!(message.contains("endif"), "message: {message}");
    }

    #[test]
    fn unclosed_for_names_line_and_keyword() {
        let err = parse("for i in 1 2 3\necho $i").unwrap_err();
        let Error::ScriptSyntax { message, line } = err else {
            panic!("expected syntax error");
        };
        assert_eq!(line, 1);
        assert!(message.contains("done"), "message: {message}");
    }

    #[test]
    fn mismatched_closer_is_rejected() {
        let err = parse("if 1\ndone").unwrap_err();
        assert!(matches!(err, Error::ScriptSyntax { line: 2, .. }));

        let err = parse("for i in 1\nendif").unwrap_err();
        assert!(matches!(err, Error::ScriptSyntax { line: 2, .. }));
    }

    #[test]
    fn stray_closers_are_rejected() {
        assert!(parse("endif").is_err());
        assert!(parse("done").is_err());
        assert!(parse("else").is_err());
    }

    #[test]
    fn else_inside_for_is_rejected() {
        let err = parse("if 1\nfor i in a\nelse\ndone\nendif").unwrap_err();
        assert!(matches!(err, Error::ScriptSyntax { line: 3, .. }));
    }

    #[test]
    fn duplicate_else_is_rejected() {
        let err = parse("if 1\nelse\nelse\nendif").unwrap_err();
        assert!(matches!(err, Error::ScriptSyntax { line: 3, .. }));
    }

    #[test]
    fn malformed_set_is_a_parse_error() {
        assert!(parse("set novalue").is_err());
        assert!(parse("set 1bad=x").is_err());
        assert!(parse("set =x").is_err());
    }

    #[test]
    fn malformed_for_is_a_parse_error() {
        assert!(parse("for in 1 2").is_err());
        assert!(parse("for i over 1 2").is_err());
        assert!(parse("for").is_err());
    }

    #[test]
    fn for_with_no_items_parses() {
        let stmts = parse("for i in\ndone").unwrap();
        let Statement::For { items, .. } = &stmts[0] else {
            panic!("expected for statement");
        };
        assert!(items.is_empty());
    }

    #[test]
    fn keyword_prefix_is_still_raw() {
        // "echoing" is not "echo"; it routes as an ordinary command.
        let stmts = parse("echoing loudly").unwrap();
        assert!(matches!(stmts[0], Statement::Raw { .. }));
    }
}
