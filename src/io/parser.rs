// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Script parser using pest

use crate::ast::{Arg, BinOp, Expr, Modifier, ObjKind, ObjStmt, ScriptModule, Stmt};
use anyhow::{anyhow, Result};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "io/scad.pest"]
struct ScadParser;

/// Parse script source into a syntactic module
pub fn parse_script(source: &str) -> Result<ScriptModule> {
    let mut pairs = ScadParser::parse(Rule::program, source).map_err(|e| anyhow!("{}", e))?;

    let mut statements = Vec::new();

    if let Some(program) = pairs.next() {
        for pair in program.into_inner() {
            match pair.as_rule() {
                Rule::statement => statements.push(parse_statement(pair)?),
                Rule::EOI => {}
                _ => {}
            }
        }
    }

    Ok(ScriptModule { statements })
}

fn parse_statement(pair: pest::iterators::Pair<Rule>) -> Result<Stmt> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| anyhow!("empty statement"))?;

    match inner.as_rule() {
        Rule::assignment => {
            let mut parts = inner.into_inner();
            let name = parts.next().unwrap().as_str().to_string();
            let value = parse_expr(parts.next().unwrap())?;
            Ok(Stmt::Assign { name, value })
        }
        Rule::echo_stmt => {
            let args = match inner.into_inner().next() {
                Some(list) => parse_argument_list(list)?,
                None => Vec::new(),
            };
            Ok(Stmt::Echo { args })
        }
        Rule::object_stmt => Ok(Stmt::Object(parse_object_stmt(inner)?)),
        rule => Err(anyhow!("unexpected statement rule {:?}", rule)),
    }
}

fn parse_object_stmt(pair: pest::iterators::Pair<Rule>) -> Result<ObjStmt> {
    let mut modifier = Modifier::None;
    let mut object = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::modifier => {
                modifier = match part.as_str() {
                    "!" => Modifier::Root,
                    _ => Modifier::Disable,
                };
            }
            Rule::object => object = Some(part),
            _ => {}
        }
    }

    let object = object.ok_or_else(|| anyhow!("modifier without object"))?;
    let inner = object.into_inner().next().unwrap();

    let mut stmt = match inner.as_rule() {
        Rule::primitive_stmt => parse_primitive(inner)?,
        Rule::transform_stmt => parse_transform(inner)?,
        Rule::boolean_stmt => parse_boolean(inner)?,
        Rule::group_stmt => {
            let block = inner.into_inner().next().unwrap();
            ObjStmt {
                modifier: Modifier::None,
                kind: ObjKind::Group,
                args: Vec::new(),
                children: parse_block(block)?,
            }
        }
        rule => return Err(anyhow!("unexpected object rule {:?}", rule)),
    };

    stmt.modifier = modifier;
    Ok(stmt)
}

fn parse_primitive(pair: pest::iterators::Pair<Rule>) -> Result<ObjStmt> {
    let inner = pair.into_inner().next().unwrap();

    let kind = match inner.as_rule() {
        Rule::cube_stmt => ObjKind::Cube,
        Rule::sphere_stmt => ObjKind::Sphere,
        Rule::cylinder_stmt => ObjKind::Cylinder,
        Rule::square_stmt => ObjKind::Square,
        Rule::circle_stmt => ObjKind::Circle,
        rule => return Err(anyhow!("unexpected primitive rule {:?}", rule)),
    };

    let args = parse_arguments(inner.into_inner().next().unwrap())?;

    Ok(ObjStmt {
        modifier: Modifier::None,
        kind,
        args,
        children: Vec::new(),
    })
}

fn parse_transform(pair: pest::iterators::Pair<Rule>) -> Result<ObjStmt> {
    let inner = pair.into_inner().next().unwrap();

    let kind = match inner.as_rule() {
        Rule::translate_stmt => ObjKind::Translate,
        Rule::rotate_stmt => ObjKind::Rotate,
        Rule::scale_stmt => ObjKind::Scale,
        Rule::mirror_stmt => ObjKind::Mirror,
        rule => return Err(anyhow!("unexpected transform rule {:?}", rule)),
    };

    let mut parts = inner.into_inner();
    let args = parse_arguments(parts.next().unwrap())?;
    let children = parse_block_or_stmt(parts.next().unwrap())?;

    Ok(ObjStmt {
        modifier: Modifier::None,
        kind,
        args,
        children,
    })
}

fn parse_boolean(pair: pest::iterators::Pair<Rule>) -> Result<ObjStmt> {
    let inner = pair.into_inner().next().unwrap();

    let kind = match inner.as_rule() {
        Rule::union_stmt => ObjKind::Union,
        Rule::difference_stmt => ObjKind::Difference,
        Rule::intersection_stmt => ObjKind::Intersection,
        rule => return Err(anyhow!("unexpected boolean rule {:?}", rule)),
    };

    let children = parse_block_or_stmt(inner.into_inner().next().unwrap())?;

    Ok(ObjStmt {
        modifier: Modifier::None,
        kind,
        args: Vec::new(),
        children,
    })
}

fn parse_block(pair: pest::iterators::Pair<Rule>) -> Result<Vec<Stmt>> {
    pair.into_inner().map(parse_statement).collect()
}

fn parse_block_or_stmt(pair: pest::iterators::Pair<Rule>) -> Result<Vec<Stmt>> {
    let inner = pair.into_inner().next().unwrap();

    match inner.as_rule() {
        Rule::block => parse_block(inner),
        Rule::statement => Ok(vec![parse_statement(inner)?]),
        _ => Ok(Vec::new()),
    }
}

fn parse_arguments(pair: pest::iterators::Pair<Rule>) -> Result<Vec<Arg>> {
    match pair.into_inner().next() {
        Some(list) => parse_argument_list(list),
        None => Ok(Vec::new()),
    }
}

fn parse_argument_list(pair: pest::iterators::Pair<Rule>) -> Result<Vec<Arg>> {
    pair.into_inner()
        .map(|argument| {
            let inner = argument.into_inner().next().unwrap();
            match inner.as_rule() {
                Rule::named_argument => {
                    let mut parts = inner.into_inner();
                    let name = parts.next().unwrap().as_str().to_string();
                    let value = parse_expr(parts.next().unwrap())?;
                    Ok(Arg {
                        name: Some(name),
                        value,
                    })
                }
                Rule::expr => Ok(Arg {
                    name: None,
                    value: parse_expr(inner)?,
                }),
                rule => Err(anyhow!("unexpected argument rule {:?}", rule)),
            }
        })
        .collect()
}

fn parse_expr(pair: pest::iterators::Pair<Rule>) -> Result<Expr> {
    parse_sum(pair.into_inner().next().unwrap())
}

fn parse_sum(pair: pest::iterators::Pair<Rule>) -> Result<Expr> {
    let mut parts = pair.into_inner();
    let mut lhs = parse_product(parts.next().unwrap())?;

    while let Some(op) = parts.next() {
        let op = match op.as_str() {
            "+" => BinOp::Add,
            _ => BinOp::Sub,
        };
        let rhs = parse_product(parts.next().unwrap())?;
        lhs = Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }

    Ok(lhs)
}

fn parse_product(pair: pest::iterators::Pair<Rule>) -> Result<Expr> {
    let mut parts = pair.into_inner();
    let mut lhs = parse_unary(parts.next().unwrap())?;

    while let Some(op) = parts.next() {
        let op = match op.as_str() {
            "*" => BinOp::Mul,
            _ => BinOp::Div,
        };
        let rhs = parse_unary(parts.next().unwrap())?;
        lhs = Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }

    Ok(lhs)
}

fn parse_unary(pair: pest::iterators::Pair<Rule>) -> Result<Expr> {
    let mut negate = false;
    let mut primary = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::minus => negate = true,
            Rule::primary => primary = Some(part),
            _ => {}
        }
    }

    let expr = parse_primary(primary.ok_or_else(|| anyhow!("empty expression"))?)?;
    Ok(if negate {
        Expr::Neg(Box::new(expr))
    } else {
        expr
    })
}

fn parse_primary(pair: pest::iterators::Pair<Rule>) -> Result<Expr> {
    let inner = pair.into_inner().next().unwrap();

    match inner.as_rule() {
        Rule::number => {
            let num: f64 = inner.as_str().parse()?;
            Ok(Expr::Number(num))
        }
        Rule::boolean => Ok(Expr::Bool(inner.as_str() == "true")),
        Rule::string => {
            let text = inner.into_inner().next().unwrap().as_str().to_string();
            Ok(Expr::Str(text))
        }
        Rule::vector => {
            let items = inner
                .into_inner()
                .map(parse_expr)
                .collect::<Result<Vec<_>>>()?;
            Ok(Expr::Vector(items))
        }
        Rule::paren_expr => parse_expr(inner.into_inner().next().unwrap()),
        Rule::ident => Ok(Expr::Ident(inner.as_str().to_string())),
        rule => Err(anyhow!("unexpected expression rule {:?}", rule)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cube() {
        let module = parse_script("cube([10, 10, 10]);").unwrap();
        assert_eq!(module.statements.len(), 1);
    }

    #[test]
    fn test_parse_transform_chain() {
        let module = parse_script("translate([5, 0, 0]) rotate([0, 0, 45]) cube(1);").unwrap();
        let Stmt::Object(obj) = &module.statements[0] else {
            panic!("expected object");
        };
        assert_eq!(obj.kind, ObjKind::Translate);
        assert_eq!(obj.children.len(), 1);
    }

    #[test]
    fn test_parse_boolean_block() {
        let module = parse_script("difference() { cube(10); sphere(8); }").unwrap();
        let Stmt::Object(obj) = &module.statements[0] else {
            panic!("expected object");
        };
        assert_eq!(obj.kind, ObjKind::Difference);
        assert_eq!(obj.children.len(), 2);
    }

    #[test]
    fn test_parse_assignment_and_arithmetic() {
        let module = parse_script("width = 2 * 10 + 5;\ncube([width, 1, 1]);").unwrap();
        assert_eq!(module.statements.len(), 2);
        let Stmt::Assign { name, .. } = &module.statements[0] else {
            panic!("expected assignment");
        };
        assert_eq!(name, "width");
    }

    #[test]
    fn test_parse_root_modifier() {
        let module = parse_script("union() { cube(1); !sphere(2); }").unwrap();
        let Stmt::Object(obj) = &module.statements[0] else {
            panic!("expected object");
        };
        let Stmt::Object(child) = &obj.children[1] else {
            panic!("expected child object");
        };
        assert_eq!(child.modifier, Modifier::Root);
    }

    #[test]
    fn test_parse_disable_modifier() {
        let module = parse_script("*cube(1);").unwrap();
        let Stmt::Object(obj) = &module.statements[0] else {
            panic!("expected object");
        };
        assert_eq!(obj.modifier, Modifier::Disable);
    }

    #[test]
    fn test_parse_echo() {
        let module = parse_script("echo(\"hello\", 1 + 2);").unwrap();
        let Stmt::Echo { args } = &module.statements[0] else {
            panic!("expected echo");
        };
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_parse_special_variable() {
        let module = parse_script("$fn = 64;\nsphere(r = 5, $fn = 16);").unwrap();
        assert_eq!(module.statements.len(), 2);
    }

    #[test]
    fn test_parse_negative_numbers() {
        let module = parse_script("translate([-5, -2.5, 0]) cube(1);").unwrap();
        assert_eq!(module.statements.len(), 1);
    }

    #[test]
    fn test_parse_comments() {
        let module = parse_script("// a cube\ncube(1); /* trailing */").unwrap();
        assert_eq!(module.statements.len(), 1);
    }

    #[test]
    fn test_parse_failure_reports_error() {
        assert!(parse_script("cube(10").is_err());
    }
}
